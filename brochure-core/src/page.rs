//! Pages: one printable sheet of a brochure and its element list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::Color;
use crate::element::{Element, ElementId};
use crate::error::{CoreError, CoreResult};
use crate::geometry::GeometryUpdate;
use crate::overrides::ElementOverride;
use crate::snapshot::{DataSnapshot, SourceReference};

/// Unique identifier for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageId(Uuid);

impl PageId {
    /// Create a new unique page ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse from the hyphenated string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(input: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(input).map(Self)
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Layout template a page was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageTemplate {
    /// Front cover.
    Cover,
    /// Empty notes page.
    Blank,
    /// Table of contents.
    Contents,
    /// Trip overview, left-hand page.
    OverviewLeft,
    /// Trip overview, right-hand page.
    OverviewRight,
    /// One travel day, left-hand page.
    #[serde(alias = "day-left")]
    DailyLeft,
    /// One travel day, right-hand page.
    #[serde(alias = "day-right")]
    DailyRight,
    /// Hotels, left-hand page.
    AccommodationLeft,
    /// Hotels, right-hand page.
    AccommodationRight,
    /// Free-form page.
    Custom,
}

impl PageTemplate {
    /// Every template, in brochure order.
    pub const ALL: [PageTemplate; 10] = [
        Self::Cover,
        Self::Blank,
        Self::Contents,
        Self::OverviewLeft,
        Self::OverviewRight,
        Self::DailyLeft,
        Self::DailyRight,
        Self::AccommodationLeft,
        Self::AccommodationRight,
        Self::Custom,
    ];

    /// Default page name for this template.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Cover => "Cover",
            Self::Blank => "Notes",
            Self::Contents => "Contents",
            Self::OverviewLeft => "Overview (left)",
            Self::OverviewRight => "Overview (right)",
            Self::DailyLeft => "Day (left)",
            Self::DailyRight => "Day (right)",
            Self::AccommodationLeft => "Hotels (left)",
            Self::AccommodationRight => "Hotels (right)",
            Self::Custom => "Custom",
        }
    }

    /// Whether the template renders a single travel day.
    #[must_use]
    pub fn is_daily(self) -> bool {
        matches!(self, Self::DailyLeft | Self::DailyRight)
    }
}

/// Requested change to an element's place in the paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrderChange {
    /// Paint last.
    BringToFront,
    /// Paint first.
    SendToBack,
    /// Swap with the element painted just above.
    Forward,
    /// Swap with the element painted just below.
    Backward,
    /// Move to a one-based position, clamped to the page.
    To(usize),
}

/// One printable page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Unique identifier.
    pub id: PageId,
    /// Display name.
    pub name: String,
    /// Template the page was generated from.
    pub template: PageTemplate,
    /// Page width in pixels.
    pub width: f32,
    /// Page height in pixels.
    pub height: f32,
    /// Background color.
    pub background: Color,
    /// Elements in insertion order.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Trip data the page was generated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_snapshot: Option<DataSnapshot>,
    /// Where the snapshot came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<SourceReference>,
    /// User edits to generated elements, keyed by element id.
    #[serde(default)]
    pub overrides: BTreeMap<ElementId, ElementOverride>,
}

impl Page {
    /// Create an empty page.
    #[must_use]
    pub fn new(template: PageTemplate, width: f32, height: f32) -> Self {
        Self {
            id: PageId::new(),
            name: template.display_name().to_string(),
            template,
            width,
            height,
            background: Color::WHITE,
            elements: Vec::new(),
            data_snapshot: None,
            source_ref: None,
            overrides: BTreeMap::new(),
        }
    }

    /// Set the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the background color.
    #[must_use]
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Set the data snapshot.
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: DataSnapshot) -> Self {
        self.data_snapshot = Some(snapshot);
        self
    }

    /// Set the source reference.
    #[must_use]
    pub fn with_source(mut self, source: SourceReference) -> Self {
        self.source_ref = Some(source);
        self
    }

    /// Get an element by ID.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an element by ID.
    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// First element with the given slot name.
    #[must_use]
    pub fn element_by_name(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the page has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Highest z-index on the page, zero when empty.
    #[must_use]
    pub fn max_z(&self) -> i32 {
        self.elements
            .iter()
            .map(|e| e.transform.z_index)
            .max()
            .unwrap_or(0)
    }

    /// Elements sorted back to front. Ties keep insertion order.
    #[must_use]
    pub fn paint_order(&self) -> Vec<&Element> {
        let mut ordered: Vec<&Element> = self.elements.iter().collect();
        ordered.sort_by_key(|e| e.transform.z_index);
        ordered
    }

    /// Append an element on top of everything else.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        let id = element.id;
        element.transform.z_index = self.max_z().saturating_add(1);
        tracing::trace!(element = %id, kind = element.kind.name(), "element added");
        self.elements.push(element);
        self.normalize_z_order();
        id
    }

    /// Remove an element and any override recorded for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn remove_element(&mut self, id: ElementId) -> CoreResult<Element> {
        let index = self
            .elements
            .iter()
            .position(|e| e.id == id)
            .ok_or(CoreError::ElementNotFound(id))?;
        let element = self.elements.remove(index);
        self.overrides.remove(&id);
        self.normalize_z_order();
        Ok(element)
    }

    /// Move an element within the paint order.
    ///
    /// Returns whether the order changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn reorder_element(&mut self, id: ElementId, change: ZOrderChange) -> CoreResult<bool> {
        let mut order: Vec<ElementId> = self.paint_order().iter().map(|e| e.id).collect();
        let from = order
            .iter()
            .position(|e| *e == id)
            .ok_or(CoreError::ElementNotFound(id))?;
        let last = order.len() - 1;
        let to = match change {
            ZOrderChange::BringToFront => last,
            ZOrderChange::SendToBack => 0,
            ZOrderChange::Forward => (from + 1).min(last),
            ZOrderChange::Backward => from.saturating_sub(1),
            ZOrderChange::To(position) => position.saturating_sub(1).min(last),
        };
        let moved = order.remove(from);
        order.insert(to, moved);
        let changed = self.assign_z(&order);
        Ok(changed || from != to)
    }

    /// Renumber z-indices to `1..=n` in current paint order.
    pub fn normalize_z_order(&mut self) {
        let order: Vec<ElementId> = self.paint_order().iter().map(|e| e.id).collect();
        self.assign_z(&order);
    }

    /// Whether z-indices are exactly `1..=n`.
    #[must_use]
    pub fn is_z_dense(&self) -> bool {
        let mut values: Vec<i32> = self.elements.iter().map(|e| e.transform.z_index).collect();
        values.sort_unstable();
        values.iter().zip(1..).all(|(z, expected)| *z == expected)
    }

    /// Apply a geometry write-back to an element.
    ///
    /// Non-finite updates are dropped with a warning and leave the element
    /// untouched; the return value reports whether anything was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn apply_geometry(&mut self, id: ElementId, update: GeometryUpdate) -> CoreResult<bool> {
        let element = self.element_mut(id).ok_or(CoreError::ElementNotFound(id))?;
        let Some(update) = update.validated() else {
            tracing::warn!(element = %id, ?update, "Ignoring non-finite geometry update");
            return Ok(false);
        };
        let t = &mut element.transform;
        t.x = update.x;
        t.y = update.y;
        t.width = update.width;
        t.height = update.height;
        t.rotation = update.rotation;
        Ok(true)
    }

    fn assign_z(&mut self, order: &[ElementId]) -> bool {
        let mut changed = false;
        for (z, id) in (1..).zip(order) {
            if let Some(element) = self.element_mut(*id) {
                if element.transform.z_index != z {
                    element.transform.z_index = z;
                    changed = true;
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ShapeVariant;

    fn shape(name: &str) -> Element {
        Element::shape(ShapeVariant::Rectangle, Color::BLACK).with_name(name)
    }

    fn z_of(page: &Page, id: ElementId) -> i32 {
        page.element(id).map(|e| e.transform.z_index).unwrap_or_default()
    }

    #[test]
    fn test_three_shapes_stack_in_order() {
        let mut page = Page::new(PageTemplate::Custom, 559.0, 794.0);
        let a = page.add_element(shape("a"));
        let b = page.add_element(shape("b"));
        let c = page.add_element(shape("c"));
        assert_eq!(z_of(&page, a), 1);
        assert_eq!(z_of(&page, b), 2);
        assert_eq!(z_of(&page, c), 3);
        assert!(page.is_z_dense());
    }

    #[test]
    fn test_remove_densifies() {
        let mut page = Page::new(PageTemplate::Custom, 559.0, 794.0);
        let a = page.add_element(shape("a"));
        let b = page.add_element(shape("b"));
        let c = page.add_element(shape("c"));
        page.overrides.insert(b, ElementOverride::default());

        page.remove_element(b).expect("remove");
        assert_eq!(z_of(&page, a), 1);
        assert_eq!(z_of(&page, c), 2);
        assert!(page.overrides.is_empty());
        assert!(page.remove_element(b).is_err());
    }

    #[test]
    fn test_reorder_variants() {
        let mut page = Page::new(PageTemplate::Custom, 559.0, 794.0);
        let a = page.add_element(shape("a"));
        let b = page.add_element(shape("b"));
        let c = page.add_element(shape("c"));

        assert!(page.reorder_element(a, ZOrderChange::BringToFront).expect("front"));
        let names: Vec<_> = page.paint_order().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, ["b", "c", "a"]);

        assert!(page.reorder_element(a, ZOrderChange::SendToBack).expect("back"));
        assert_eq!(z_of(&page, a), 1);

        assert!(page.reorder_element(b, ZOrderChange::Forward).expect("forward"));
        assert_eq!(z_of(&page, b), 3);
        assert_eq!(z_of(&page, c), 2);

        assert!(!page.reorder_element(b, ZOrderChange::Forward).expect("noop"));
        assert!(page.reorder_element(b, ZOrderChange::To(1)).expect("to"));
        assert_eq!(z_of(&page, b), 1);
        assert!(page.is_z_dense());
    }

    #[test]
    fn test_paint_order_breaks_ties_by_insertion() {
        let mut page = Page::new(PageTemplate::Custom, 559.0, 794.0);
        page.elements.push(shape("first"));
        page.elements.push(shape("second"));
        let names: Vec<_> = page.paint_order().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, ["first", "second"]);
        page.normalize_z_order();
        assert!(page.is_z_dense());
    }

    #[test]
    fn test_apply_geometry_rejects_nan() {
        let mut page = Page::new(PageTemplate::Custom, 559.0, 794.0);
        let id = page.add_element(shape("a").with_bounds(1.0, 2.0, 3.0, 4.0));
        let bad = GeometryUpdate {
            x: f32::NAN,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            rotation: 0.0,
        };
        assert!(!page.apply_geometry(id, bad).expect("known element"));
        let element = page.element(id).expect("element");
        assert!((element.transform.x - 1.0).abs() < f32::EPSILON);

        let good = GeometryUpdate {
            x: 11.0,
            y: 12.0,
            width: 30.0,
            height: 40.0,
            rotation: 15.0,
        };
        assert!(page.apply_geometry(id, good).expect("known element"));
        let element = page.element(id).expect("element");
        assert!((element.transform.x - 11.0).abs() < f32::EPSILON);
        assert!((element.transform.rotation - 15.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_template_aliases() {
        let t: PageTemplate = serde_json::from_str("\"day-left\"").expect("alias");
        assert_eq!(t, PageTemplate::DailyLeft);
        assert_eq!(
            serde_json::to_string(&PageTemplate::OverviewRight).expect("serialize"),
            "\"overview-right\""
        );
    }

    #[test]
    fn test_page_serde_with_overrides() {
        let mut page = Page::new(PageTemplate::Cover, 559.0, 794.0);
        let id = page.add_element(shape("bg"));
        page.overrides.insert(
            id,
            ElementOverride {
                x: Some(5.0),
                ..ElementOverride::default()
            },
        );
        let json = serde_json::to_string(&page).expect("serialize");
        let back: Page = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, page);
    }
}
