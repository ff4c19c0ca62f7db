//! Documents: an ordered list of pages plus print settings.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::element::{Element, ElementId, ElementKind};
use crate::error::{CoreError, CoreResult};
use crate::geometry::Rect;
use crate::page::{Page, PageId};

/// Default page width in pixels (A5 portrait at 96 dpi).
pub const DEFAULT_PAGE_WIDTH: f32 = 559.0;
/// Default page height in pixels.
pub const DEFAULT_PAGE_HEIGHT: f32 = 794.0;
/// Default bleed in pixels.
pub const DEFAULT_BLEED: f32 = 11.0;
/// Default safety margin in pixels.
pub const DEFAULT_SAFETY_MARGIN: f32 = 19.0;

/// Print geometry shared by every page of a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Trimmed page width.
    pub page_width: f32,
    /// Trimmed page height.
    pub page_height: f32,
    /// Extra paint area beyond the trim edge.
    pub bleed: f32,
    /// Inset that content should stay inside.
    pub safety_margin: f32,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            page_width: DEFAULT_PAGE_WIDTH,
            page_height: DEFAULT_PAGE_HEIGHT,
            bleed: DEFAULT_BLEED,
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }
}

impl DocumentSettings {
    /// Trim box extended by the bleed on every side.
    #[must_use]
    pub fn bleed_box(&self) -> Rect {
        Rect::new(
            -self.bleed,
            -self.bleed,
            self.page_width + 2.0 * self.bleed,
            self.page_height + 2.0 * self.bleed,
        )
    }

    /// Trim box inset by the safety margin.
    #[must_use]
    pub fn safe_area(&self) -> Rect {
        Rect::new(
            self.safety_margin,
            self.safety_margin,
            (self.page_width - 2.0 * self.safety_margin).max(0.0),
            (self.page_height - 2.0 * self.safety_margin).max(0.0),
        )
    }
}

/// A printable multi-page brochure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Pages in print order.
    #[serde(default)]
    pub pages: Vec<Page>,
    /// Name of the theme used to generate pages.
    pub theme: String,
    /// Print settings.
    #[serde(default)]
    pub settings: DocumentSettings,
    /// Save counter, bumped by the owner on every save.
    #[serde(default)]
    pub version: u32,
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new(name: impl Into<String>, theme: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            pages: Vec::new(),
            theme: theme.into(),
            settings: DocumentSettings::default(),
            version: 0,
        }
    }

    /// Set the print settings.
    #[must_use]
    pub fn with_settings(mut self, settings: DocumentSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Position of a page.
    #[must_use]
    pub fn page_index(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|p| p.id == id)
    }

    /// Get a page by ID.
    #[must_use]
    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Get a mutable reference to a page by ID.
    pub fn page_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == id)
    }

    /// Insert a page after `after`, or at the end.
    ///
    /// # Errors
    ///
    /// Returns an error if `after` names a page that does not exist.
    pub fn add_page(&mut self, page: Page, after: Option<PageId>) -> CoreResult<PageId> {
        let id = page.id;
        let index = match after {
            Some(anchor) => self.page_index(anchor).ok_or(CoreError::PageNotFound(anchor))? + 1,
            None => self.pages.len(),
        };
        self.pages.insert(index, page);
        tracing::debug!(page = %id, index, "page added");
        Ok(id)
    }

    /// Remove a page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page is not found.
    pub fn remove_page(&mut self, id: PageId) -> CoreResult<Page> {
        let index = self.page_index(id).ok_or(CoreError::PageNotFound(id))?;
        Ok(self.pages.remove(index))
    }

    /// Copy a page in place, right after the original.
    ///
    /// The copy gets fresh page and element ids; overrides follow their
    /// elements to the new ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the page is not found.
    pub fn duplicate_page(&mut self, id: PageId) -> CoreResult<PageId> {
        let index = self.page_index(id).ok_or(CoreError::PageNotFound(id))?;
        let mut copy = self.pages[index].clone();
        copy.id = PageId::new();
        copy.name = format!("{} (copy)", copy.name);

        let mut remap = HashMap::new();
        for element in &mut copy.elements {
            refresh_ids(element, &mut remap);
        }
        copy.overrides = copy
            .overrides
            .into_iter()
            .filter_map(|(old, o)| remap.get(&old).map(|new| (*new, o)))
            .collect::<BTreeMap<_, _>>();

        let new_id = copy.id;
        self.pages.insert(index + 1, copy);
        Ok(new_id)
    }

    /// Move a page to `new_index`, clamped to the page range.
    ///
    /// # Errors
    ///
    /// Returns an error if the page is not found.
    pub fn move_page(&mut self, id: PageId, new_index: usize) -> CoreResult<()> {
        let index = self.page_index(id).ok_or(CoreError::PageNotFound(id))?;
        let page = self.pages.remove(index);
        let target = new_index.min(self.pages.len());
        self.pages.insert(target, page);
        Ok(())
    }

    /// Page after `id`, if any.
    #[must_use]
    pub fn next_page_id(&self, id: PageId) -> Option<PageId> {
        let index = self.page_index(id)?;
        self.pages.get(index + 1).map(|p| p.id)
    }

    /// Page before `id`, if any.
    #[must_use]
    pub fn prev_page_id(&self, id: PageId) -> Option<PageId> {
        let index = self.page_index(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .map(|p| p.id)
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(self).map_err(CoreError::from)
    }

    /// Deserialize a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        serde_json::from_str(json).map_err(CoreError::from)
    }
}

fn refresh_ids(element: &mut Element, remap: &mut HashMap<ElementId, ElementId>) {
    let fresh = ElementId::new();
    remap.insert(element.id, fresh);
    element.id = fresh;
    if let ElementKind::Block { children, .. } = &mut element.kind {
        for child in children {
            refresh_ids(child, remap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::element::ShapeVariant;
    use crate::overrides::ElementOverride;
    use crate::page::PageTemplate;

    fn doc_with_pages(n: usize) -> (Document, Vec<PageId>) {
        let mut doc = Document::new("Trip", "classic");
        let ids = (0..n)
            .map(|_| {
                doc.add_page(Page::new(PageTemplate::Blank, 559.0, 794.0), None)
                    .expect("append")
            })
            .collect();
        (doc, ids)
    }

    #[test]
    fn test_settings_defaults() {
        let settings = DocumentSettings::default();
        let bleed = settings.bleed_box();
        assert!((bleed.x + 11.0).abs() < f32::EPSILON);
        assert!((bleed.width - 581.0).abs() < f32::EPSILON);
        let safe = settings.safe_area();
        assert!((safe.x - 19.0).abs() < f32::EPSILON);
        assert!((safe.height - 756.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_add_page_after() {
        let (mut doc, ids) = doc_with_pages(2);
        let inserted = doc
            .add_page(Page::new(PageTemplate::Custom, 559.0, 794.0), Some(ids[0]))
            .expect("insert");
        assert_eq!(doc.page_index(inserted), Some(1));
        assert!(doc
            .add_page(Page::new(PageTemplate::Custom, 1.0, 1.0), Some(PageId::new()))
            .is_err());
    }

    #[test]
    fn test_navigation() {
        let (doc, ids) = doc_with_pages(3);
        assert_eq!(doc.next_page_id(ids[0]), Some(ids[1]));
        assert_eq!(doc.next_page_id(ids[2]), None);
        assert_eq!(doc.prev_page_id(ids[1]), Some(ids[0]));
        assert_eq!(doc.prev_page_id(ids[0]), None);
    }

    #[test]
    fn test_move_page_clamps() {
        let (mut doc, ids) = doc_with_pages(3);
        doc.move_page(ids[0], 99).expect("move");
        assert_eq!(doc.page_index(ids[0]), Some(2));
        doc.move_page(ids[0], 0).expect("move");
        assert_eq!(doc.page_index(ids[0]), Some(0));
    }

    #[test]
    fn test_duplicate_remaps_overrides() {
        let (mut doc, ids) = doc_with_pages(1);
        let page = doc.page_mut(ids[0]).expect("page");
        let element_id =
            page.add_element(Element::shape(ShapeVariant::Rectangle, Color::BLACK).with_name("bg"));
        page.overrides.insert(
            element_id,
            ElementOverride {
                opacity: Some(0.5),
                ..ElementOverride::default()
            },
        );

        let copy_id = doc.duplicate_page(ids[0]).expect("duplicate");
        assert_eq!(doc.page_index(copy_id), Some(1));
        let copy = doc.page(copy_id).expect("copy");
        assert_eq!(copy.name, "Notes (copy)");
        let copied = copy.element_by_name("bg").expect("element");
        assert_ne!(copied.id, element_id);
        assert!(copy.overrides.contains_key(&copied.id));
        assert!(!copy.overrides.contains_key(&element_id));
    }

    #[test]
    fn test_json_round_trip() {
        let (doc, _) = doc_with_pages(2);
        let json = doc.to_json().expect("serialize");
        let back = Document::from_json(&json).expect("deserialize");
        assert_eq!(back, doc);
        assert!(Document::from_json("{not json").is_err());
    }
}
