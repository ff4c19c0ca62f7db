//! Idempotent page rendering onto a host canvas.
//!
//! [`render`] diffs a [`Page`] against the objects already on the canvas.
//! Objects are matched by the element id in their user data, so calling it
//! twice with the same page touches nothing the second time.

use std::collections::{BTreeMap, HashSet};

use brochure_core::{
    CropRect, Element, ElementId, ElementKind, Fill, ObjectFit, Page, Rect, ShapeVariant, TextAlign,
};
use serde::Serialize;

use crate::canvas::{HostCanvas, ObjectHandle};
use crate::object::{
    CanvasObject, Interaction, ObjectPaint, PaintFill, ShapePaint, StrokePaint, TextOrigin,
};

/// How a page is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Objects are selectable and evented.
    pub editable: bool,
    /// Surface width in pixels.
    pub width: f32,
    /// Surface height in pixels.
    pub height: f32,
}

impl RenderOptions {
    /// Editable render at the page's size.
    #[must_use]
    pub fn editable(page: &Page) -> Self {
        Self {
            editable: true,
            width: page.width,
            height: page.height,
        }
    }

    /// Read-only render at the page's size.
    #[must_use]
    pub fn read_only(page: &Page) -> Self {
        Self {
            editable: false,
            width: page.width,
            height: page.height,
        }
    }
}

/// Canvas churn caused by one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RenderStats {
    /// Objects created.
    pub added: usize,
    /// Objects changed in place.
    pub updated: usize,
    /// Objects removed.
    pub removed: usize,
    /// Objects left untouched.
    pub unchanged: usize,
    /// Objects moved in the stack.
    pub restacked: usize,
}

impl RenderStats {
    /// Whether the render changed nothing on the canvas.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.updated == 0 && self.removed == 0 && self.restacked == 0
    }
}

/// Render a page onto a canvas.
pub fn render<C: HostCanvas + ?Sized>(
    canvas: &mut C,
    page: &Page,
    options: &RenderOptions,
) -> RenderStats {
    canvas.set_size(options.width, options.height);
    canvas.set_background(page.background);

    let wanted: Vec<CanvasObject> = page
        .paint_order()
        .into_iter()
        .map(|element| canvas_object(element, options.editable, &|src| canvas.natural_size(src)))
        .collect();

    let mut existing: BTreeMap<ElementId, Vec<ObjectHandle>> = BTreeMap::new();
    for (handle, object) in canvas.objects() {
        existing.entry(object.element_id).or_default().push(handle);
    }

    let mut stats = RenderStats::default();
    let mut order = Vec::with_capacity(wanted.len());
    let mut kept = HashSet::with_capacity(wanted.len());

    for object in wanted {
        let found = existing
            .get(&object.element_id)
            .and_then(|handles| handles.first().copied());
        let handle = match found {
            Some(handle) if canvas.get(handle) == Some(&object) => {
                stats.unchanged += 1;
                handle
            }
            Some(handle) => match canvas.update(handle, object.clone()) {
                Ok(()) => {
                    stats.updated += 1;
                    handle
                }
                Err(e) => {
                    tracing::warn!(element = %object.element_id, error = %e, "Update failed, re-adding object");
                    stats.added += 1;
                    canvas.add(object)
                }
            },
            None => {
                stats.added += 1;
                canvas.add(object)
            }
        };
        kept.insert(handle);
        order.push(handle);
    }

    let stale: Vec<ObjectHandle> = canvas
        .objects()
        .into_iter()
        .map(|(handle, _)| handle)
        .filter(|handle| !kept.contains(handle))
        .collect();
    for handle in stale {
        if canvas.remove(handle).is_some() {
            stats.removed += 1;
        }
    }

    for (index, handle) in order.iter().enumerate() {
        let position = canvas.objects().iter().position(|(h, _)| h == handle);
        if position != Some(index) && canvas.set_stack_index(*handle, index).is_ok() {
            stats.restacked += 1;
        }
    }

    tracing::debug!(
        page = %page.id,
        editable = options.editable,
        added = stats.added,
        updated = stats.updated,
        removed = stats.removed,
        unchanged = stats.unchanged,
        restacked = stats.restacked,
        "page rendered"
    );
    stats
}

/// Build the canvas object for an element.
#[must_use]
pub fn canvas_object<F>(element: &Element, editable: bool, natural: &F) -> CanvasObject
where
    F: Fn(&str) -> Option<(f32, f32)> + ?Sized,
{
    let interaction = if editable {
        Interaction::editable(element.locked)
    } else {
        Interaction::read_only()
    };
    CanvasObject {
        element_id: element.id,
        kind: element.kind.name().to_string(),
        paint: object_paint(element, natural),
        interaction,
    }
}

/// Paint properties of an element. Independent of render mode.
#[must_use]
pub fn object_paint<F>(element: &Element, natural: &F) -> ObjectPaint
where
    F: Fn(&str) -> Option<(f32, f32)> + ?Sized,
{
    let t = &element.transform;
    let frame = Rect::new(0.0, 0.0, t.width, t.height);
    let shape = match &element.kind {
        ElementKind::Text { content, style } => {
            let (origin, origin_x) = match style.align {
                TextAlign::Left => (TextOrigin::Left, 0.0),
                TextAlign::Center => (TextOrigin::Center, t.width / 2.0),
                TextAlign::Right => (TextOrigin::Right, t.width),
            };
            let char_spacing = if style.font_size > 0.0 {
                style.letter_spacing * 1000.0 / style.font_size
            } else {
                0.0
            };
            ShapePaint::Text {
                content: content.clone(),
                font_family: style.font_family.clone(),
                font_size: style.font_size,
                font_weight: style.font_weight.value(),
                italic: style.italic,
                underline: style.underline,
                fill: style.color,
                align: style.align,
                line_height: style.line_height,
                char_spacing,
                origin,
                origin_x,
            }
        }
        ElementKind::Image {
            src,
            fit,
            crop,
            filters,
        } => {
            let crop = (*crop).filter(|c| {
                c.x.is_finite() && c.y.is_finite() && c.width > 0.0 && c.height > 0.0
            });
            let (draw, clip) = match crop {
                Some(c) => crop_image(c, natural(src), frame, *fit),
                None => {
                    let source = natural(src).unwrap_or((t.width, t.height));
                    (fit_image(source, frame, *fit), frame)
                }
            };
            ShapePaint::Image {
                src: src.clone(),
                draw,
                clip,
                crop,
                filters: filters.filter(|f| !f.is_neutral()),
                tint: None,
            }
        }
        ElementKind::Shape {
            variant,
            fill,
            stroke,
            corner_radius,
        } => {
            let fill = paint_fill(fill, t.width, t.height);
            let stroke = stroke.map(|s| StrokePaint {
                color: s.color,
                width: s.width,
            });
            match variant {
                ShapeVariant::Rectangle => ShapePaint::Rect {
                    fill,
                    stroke,
                    rx: *corner_radius,
                },
                ShapeVariant::Circle => ShapePaint::Circle {
                    fill,
                    stroke,
                    radius: t.width.min(t.height) / 2.0,
                },
            }
        }
        ElementKind::Decoration { src, tint, .. } | ElementKind::Icon { src, tint, .. } => {
            let source = natural(src).unwrap_or((t.width, t.height));
            ShapePaint::Image {
                src: src.clone(),
                draw: fit_image(source, frame, ObjectFit::Contain),
                clip: frame,
                crop: None,
                filters: None,
                tint: *tint,
            }
        }
        ElementKind::Block { children, .. } => {
            let mut ordered: Vec<&Element> = children.iter().collect();
            ordered.sort_by_key(|c| c.transform.z_index);
            ShapePaint::Group {
                children: ordered.into_iter().map(|c| object_paint(c, natural)).collect(),
            }
        }
    };

    ObjectPaint {
        left: t.x,
        top: t.y,
        width: t.width,
        height: t.height,
        angle: t.rotation,
        opacity: element.opacity,
        visible: element.visible,
        shape,
    }
}

fn paint_fill(fill: &Fill, width: f32, height: f32) -> PaintFill {
    match fill {
        Fill::Solid(color) => PaintFill::Solid { color: *color },
        Fill::Gradient(gradient) => {
            let (x1, y1, x2, y2) = gradient_coords(gradient.angle, width, height);
            PaintFill::Linear {
                x1,
                y1,
                x2,
                y2,
                stops: gradient.stops.clone(),
            }
        }
    }
}

/// Gradient line endpoints in object-local pixels for a CSS angle.
#[must_use]
pub fn gradient_coords(angle: f32, width: f32, height: f32) -> (f32, f32, f32, f32) {
    let theta = (angle - 90.0).to_radians();
    let (sin, cos) = theta.sin_cos();
    let (cx, cy) = (width / 2.0, height / 2.0);
    (
        cx - cos * cx,
        cy - sin * cy,
        cx + cos * cx,
        cy + sin * cy,
    )
}

/// Full image and visible region for a cropped image.
///
/// The crop region is fitted into `frame` and the whole image is offset so
/// that `crop.x`/`crop.y` lands on the fitted region's corner. Without a
/// natural size the image is taken to end at the crop's far edge.
#[must_use]
pub fn crop_image(
    crop: CropRect,
    natural: Option<(f32, f32)>,
    frame: Rect,
    fit: ObjectFit,
) -> (Rect, Rect) {
    let region = fit_image((crop.width, crop.height), frame, fit);
    let sx = region.width / crop.width;
    let sy = region.height / crop.height;
    let (nw, nh) = natural.unwrap_or((crop.x + crop.width, crop.y + crop.height));
    let draw = Rect::new(
        region.x - crop.x * sx,
        region.y - crop.y * sy,
        nw * sx,
        nh * sy,
    );

    let left = region.x.max(frame.x);
    let top = region.y.max(frame.y);
    let clip = Rect::new(
        left,
        top,
        (region.right().min(frame.right()) - left).max(0.0),
        (region.bottom().min(frame.bottom()) - top).max(0.0),
    );
    (draw, clip)
}

/// Where an image of `natural` size lands inside `frame`, centered.
///
/// Unknown or degenerate natural sizes fill the frame.
#[must_use]
pub fn fit_image(natural: (f32, f32), frame: Rect, fit: ObjectFit) -> Rect {
    let (nw, nh) = natural;
    let usable = nw.is_finite() && nh.is_finite() && nw > 0.0 && nh > 0.0;
    if !usable || fit == ObjectFit::Fill {
        return frame;
    }
    let sx = frame.width / nw;
    let sy = frame.height / nh;
    let scale = match fit {
        ObjectFit::Cover => sx.max(sy),
        ObjectFit::Contain | ObjectFit::Fill => sx.min(sy),
    };
    let width = nw * scale;
    let height = nh * scale;
    Rect::new(
        frame.x + (frame.width - width) / 2.0,
        frame.y + (frame.height - height) / 2.0,
        width,
        height,
    )
}
