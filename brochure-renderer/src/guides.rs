//! Snap guides and overlap detection for direct manipulation.

use brochure_core::{ElementId, Page, Rect};
use serde::{Deserialize, Serialize};

/// Distance in pixels within which a moving edge snaps.
pub const SNAP_THRESHOLD: f32 = 5.0;

/// Fraction of the smaller area two elements must share to overlap.
pub const OVERLAP_RATIO: f32 = 0.1;

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideAxis {
    /// Vertical line at an x position.
    Vertical,
    /// Horizontal line at a y position.
    Horizontal,
}

/// A guide line shown while snapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapGuide {
    /// Line orientation.
    pub axis: GuideAxis,
    /// Line position in page pixels.
    pub position: f32,
}

/// Correction to apply to a moving box, plus the guides that caused it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SnapResult {
    /// Horizontal correction.
    pub dx: f32,
    /// Vertical correction.
    pub dy: f32,
    /// Active guides.
    pub guides: Vec<SnapGuide>,
}

impl SnapResult {
    /// Whether any axis snapped.
    #[must_use]
    pub fn snapped(&self) -> bool {
        !self.guides.is_empty()
    }
}

/// Snap a moving box to the canvas and other boxes.
///
/// Targets are the canvas edges and center plus the edges and centers of
/// `others`. Each axis snaps to its nearest target within `threshold`.
#[must_use]
pub fn snap(moving: Rect, others: &[Rect], canvas: (f32, f32), threshold: f32) -> SnapResult {
    let (cw, ch) = canvas;
    let mut xs = vec![0.0, cw / 2.0, cw];
    let mut ys = vec![0.0, ch / 2.0, ch];
    for other in others {
        xs.extend([other.x, other.center_x(), other.right()]);
        ys.extend([other.y, other.center_y(), other.bottom()]);
    }

    let mut result = SnapResult::default();
    let moving_xs = [moving.x, moving.center_x(), moving.right()];
    if let Some((delta, target)) = nearest(&moving_xs, &xs, threshold) {
        result.dx = delta;
        result.guides.push(SnapGuide {
            axis: GuideAxis::Vertical,
            position: target,
        });
    }
    let moving_ys = [moving.y, moving.center_y(), moving.bottom()];
    if let Some((delta, target)) = nearest(&moving_ys, &ys, threshold) {
        result.dy = delta;
        result.guides.push(SnapGuide {
            axis: GuideAxis::Horizontal,
            position: target,
        });
    }
    result
}

fn nearest(edges: &[f32], targets: &[f32], threshold: f32) -> Option<(f32, f32)> {
    let mut best: Option<(f32, f32)> = None;
    for edge in edges {
        for target in targets {
            let delta = target - edge;
            if delta.abs() > threshold {
                continue;
            }
            match best {
                Some((d, _)) if d.abs() <= delta.abs() => {}
                _ => best = Some((delta, *target)),
            }
        }
    }
    best
}

/// Pairs of visible elements whose overlap exceeds [`OVERLAP_RATIO`] of the
/// smaller element's area.
#[must_use]
pub fn detect_overlaps(page: &Page) -> Vec<(ElementId, ElementId)> {
    let visible: Vec<_> = page.elements.iter().filter(|e| e.visible).collect();
    let mut pairs = Vec::new();
    for (i, a) in visible.iter().enumerate() {
        for b in &visible[i + 1..] {
            let (ra, rb) = (a.bounds(), b.bounds());
            let smaller = ra.area().min(rb.area());
            if smaller <= 0.0 {
                continue;
            }
            if ra.intersection_area(&rb) > smaller * OVERLAP_RATIO {
                pairs.push((a.id, b.id));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use brochure_core::{Color, Element, PageTemplate, ShapeVariant};

    #[test]
    fn test_snaps_to_canvas_center() {
        let moving = Rect::new(100.0, 300.0, 50.0, 50.0);
        let result = snap(moving, &[], (400.0, 800.0), SNAP_THRESHOLD);
        // right edge 150, center 125; no x target within 5
        assert!(result.dx.abs() < f32::EPSILON);
        let moving = Rect::new(172.0, 300.0, 50.0, 50.0);
        let result = snap(moving, &[], (400.0, 800.0), SNAP_THRESHOLD);
        assert!((result.dx - 3.0).abs() < 1e-4);
        assert_eq!(
            result.guides,
            vec![SnapGuide {
                axis: GuideAxis::Vertical,
                position: 200.0
            }]
        );
    }

    #[test]
    fn test_snaps_to_other_edges() {
        let moving = Rect::new(52.0, 12.0, 40.0, 40.0);
        let other = Rect::new(0.0, 0.0, 50.0, 10.0);
        let result = snap(moving, &[other], (1000.0, 1000.0), SNAP_THRESHOLD);
        assert!((result.dx + 2.0).abs() < 1e-4);
        assert!((result.dy + 2.0).abs() < 1e-4);
        assert_eq!(result.guides.len(), 2);
    }

    #[test]
    fn test_overlap_threshold() {
        let mut page = Page::new(PageTemplate::Custom, 500.0, 500.0);
        let a = page.add_element(
            Element::shape(ShapeVariant::Rectangle, Color::BLACK).with_bounds(0.0, 0.0, 100.0, 100.0),
        );
        let b = page.add_element(
            Element::shape(ShapeVariant::Rectangle, Color::BLACK).with_bounds(50.0, 50.0, 100.0, 100.0),
        );
        // shares 5% of the smaller area
        page.add_element(
            Element::shape(ShapeVariant::Rectangle, Color::BLACK).with_bounds(95.0, 300.0, 100.0, 100.0),
        );
        page.add_element(
            Element::shape(ShapeVariant::Rectangle, Color::BLACK).with_bounds(190.0, 300.0, 100.0, 100.0),
        );
        assert_eq!(detect_overlaps(&page), vec![(a, b)]);

        if let Some(element) = page.element_mut(b) {
            element.visible = false;
        }
        assert!(detect_overlaps(&page).is_empty());
    }
}
