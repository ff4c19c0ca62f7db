//! User overrides on generated elements and the regeneration merge.
//!
//! Generated elements are a pure function of template, snapshot and theme.
//! Anything the user changes on them is stored as an [`ElementOverride`] on
//! the page and re-applied every time the page is regenerated. Unbound
//! elements are not generated at all and pass through regeneration untouched.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::element::{Element, ElementId, ElementKind, Fill, FontWeight, TextAlign, TextStyle};
use crate::geometry::GeometryUpdate;

/// Partial text style; `None` keeps the generated value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyleOverride {
    /// Font family.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Font size in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// Font weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    /// Italic flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    /// Alignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
    /// Line height multiple.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    /// Letter spacing in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f32>,
    /// Fill color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Underline flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
}

impl TextStyleOverride {
    fn apply_to(&self, style: &mut TextStyle) {
        if let Some(family) = &self.font_family {
            style.font_family.clone_from(family);
        }
        if let Some(size) = self.font_size {
            style.font_size = size;
        }
        if let Some(weight) = self.font_weight {
            style.font_weight = weight;
        }
        if let Some(italic) = self.italic {
            style.italic = italic;
        }
        if let Some(align) = self.align {
            style.align = align;
        }
        if let Some(line_height) = self.line_height {
            style.line_height = line_height;
        }
        if let Some(spacing) = self.letter_spacing {
            style.letter_spacing = spacing;
        }
        if let Some(color) = self.color {
            style.color = color;
        }
        if let Some(underline) = self.underline {
            style.underline = underline;
        }
    }

    fn merge(&mut self, other: &TextStyleOverride) {
        merge_field(&mut self.font_family, other.font_family.as_ref());
        merge_field(&mut self.font_size, other.font_size.as_ref());
        merge_field(&mut self.font_weight, other.font_weight.as_ref());
        merge_field(&mut self.italic, other.italic.as_ref());
        merge_field(&mut self.align, other.align.as_ref());
        merge_field(&mut self.line_height, other.line_height.as_ref());
        merge_field(&mut self.letter_spacing, other.letter_spacing.as_ref());
        merge_field(&mut self.color, other.color.as_ref());
        merge_field(&mut self.underline, other.underline.as_ref());
    }
}

/// A partial element record layered over a generated element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementOverride {
    /// Left edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    /// Top edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    /// Width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// Height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// Rotation in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    /// Opacity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    /// Visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// Lock state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    /// Text content; ignored on non-text elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Text style; ignored on non-text elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStyleOverride>,
    /// Shape fill; ignored on non-shape elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    /// Image source; ignored on non-image elements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

impl ElementOverride {
    /// Override carrying a complete geometry write-back.
    #[must_use]
    pub fn from_geometry(update: GeometryUpdate) -> Self {
        Self {
            x: Some(update.x),
            y: Some(update.y),
            width: Some(update.width),
            height: Some(update.height),
            rotation: Some(update.rotation),
            ..Self::default()
        }
    }

    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merge(&mut self, other: &ElementOverride) {
        merge_field(&mut self.x, other.x.as_ref());
        merge_field(&mut self.y, other.y.as_ref());
        merge_field(&mut self.width, other.width.as_ref());
        merge_field(&mut self.height, other.height.as_ref());
        merge_field(&mut self.rotation, other.rotation.as_ref());
        merge_field(&mut self.opacity, other.opacity.as_ref());
        merge_field(&mut self.visible, other.visible.as_ref());
        merge_field(&mut self.locked, other.locked.as_ref());
        merge_field(&mut self.content, other.content.as_ref());
        merge_field(&mut self.fill, other.fill.as_ref());
        merge_field(&mut self.src, other.src.as_ref());
        match (&mut self.style, &other.style) {
            (Some(mine), Some(theirs)) => mine.merge(theirs),
            (None, Some(theirs)) => self.style = Some(theirs.clone()),
            _ => {}
        }
    }

    /// Write the set fields into `element`.
    ///
    /// Non-finite numbers are skipped so a corrupt override cannot poison
    /// geometry.
    pub fn apply_to(&self, element: &mut Element) {
        let t = &mut element.transform;
        set_finite(&mut t.x, self.x);
        set_finite(&mut t.y, self.y);
        set_finite(&mut t.width, self.width);
        set_finite(&mut t.height, self.height);
        set_finite(&mut t.rotation, self.rotation);
        if let Some(opacity) = self.opacity.filter(|o| o.is_finite()) {
            element.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(visible) = self.visible {
            element.visible = visible;
        }
        if let Some(locked) = self.locked {
            element.locked = locked;
        }

        match &mut element.kind {
            ElementKind::Text { content, style } => {
                if let Some(text) = &self.content {
                    content.clone_from(text);
                }
                if let Some(partial) = &self.style {
                    partial.apply_to(style);
                }
            }
            ElementKind::Shape { fill, .. } => {
                if let Some(new_fill) = &self.fill {
                    fill.clone_from(new_fill);
                }
            }
            ElementKind::Image { src, .. } => {
                if let Some(new_src) = &self.src {
                    src.clone_from(new_src);
                }
            }
            ElementKind::Decoration { .. } | ElementKind::Icon { .. } | ElementKind::Block { .. } => {}
        }
    }
}

fn merge_field<T: Clone>(target: &mut Option<T>, source: Option<&T>) {
    if let Some(value) = source {
        *target = Some(value.clone());
    }
}

fn set_finite(target: &mut f32, value: Option<f32>) {
    if let Some(v) = value.filter(|v| v.is_finite()) {
        *target = v;
    }
}

/// Apply overrides to freshly generated elements by id.
///
/// Elements without an override are returned unchanged.
#[must_use]
pub fn apply_overrides(
    mut generated: Vec<Element>,
    overrides: &BTreeMap<ElementId, ElementOverride>,
) -> Vec<Element> {
    for element in &mut generated {
        if let Some(o) = overrides.get(&element.id) {
            o.apply_to(element);
        }
    }
    generated
}

/// Merge a fresh generation into the previous element list.
///
/// 1. Generated elements take the id of the first unused previous element
///    with the same slot name.
/// 2. Overrides are applied by id.
/// 3. Unbound previous elements are carried over unchanged and replace any
///    generated element sharing their id.
/// 4. Bound elements take the z slots left free by the unbound ones, in
///    generation order.
/// 5. The merged list is renumbered `1..=n` in paint order. An unbound
///    element keeps its z-index unless the page shrank below it.
///
/// The result is sorted by paint order.
#[must_use]
pub fn regenerate(
    previous: &[Element],
    mut generated: Vec<Element>,
    overrides: &BTreeMap<ElementId, ElementOverride>,
) -> Vec<Element> {
    let mut used: HashSet<ElementId> = HashSet::new();
    for element in &mut generated {
        if element.name.is_empty() {
            continue;
        }
        let slot = previous
            .iter()
            .find(|p| p.name == element.name && !used.contains(&p.id));
        if let Some(prev) = slot {
            element.id = prev.id;
            used.insert(prev.id);
        }
    }

    let generated = apply_overrides(generated, overrides);

    let unbound: Vec<&Element> = previous.iter().filter(|p| p.is_unbound).collect();
    let unbound_ids: HashSet<ElementId> = unbound.iter().map(|e| e.id).collect();
    let pinned: BTreeSet<i32> = unbound.iter().map(|e| e.transform.z_index).collect();

    let mut bound: Vec<Element> = generated
        .into_iter()
        .filter(|e| !unbound_ids.contains(&e.id))
        .collect();
    let mut next_z = 1;
    for element in &mut bound {
        while pinned.contains(&next_z) {
            next_z += 1;
        }
        element.transform.z_index = next_z;
        next_z += 1;
    }

    tracing::debug!(
        bound = bound.len(),
        unbound = unbound.len(),
        rebound = used.len(),
        "Regenerated element list"
    );

    let mut merged = bound;
    merged.extend(unbound.into_iter().cloned());
    merged.sort_by_key(|e| e.transform.z_index);
    assign_dense_z(&mut merged);
    merged
}

/// Number elements `1..=n` in slice order.
pub fn assign_dense_z(elements: &mut [Element]) {
    for (z, element) in (1..).zip(elements.iter_mut()) {
        element.transform.z_index = z;
    }
}
