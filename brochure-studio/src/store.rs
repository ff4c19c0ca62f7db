//! Owner of a brochure document.
//!
//! [`SchemaStore`] holds the document, the theme registry that generates its
//! pages, the current page and an optional editor session bound to that page.
//! Every mutation goes through the store so that:
//!
//! - generated pages are rebuilt through [`regenerate`], which keeps user
//!   overrides and unbound elements,
//! - geometry edits made on the canvas are recorded as overrides,
//! - the open session always shows the current page,
//! - subscribers see one [`StoreEvent`] per change.
//!
//! The store is single-threaded and has no globals: create it, use it, then
//! [`SchemaStore::dispose`] it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use brochure_core::{
    regenerate, DataSnapshot, Document, DocumentSettings, Element, ElementId, ElementOverride,
    Itinerary, Page, PageId, PageTemplate, SourceReference,
};
use brochure_renderer::{
    CanvasEvent, EditorSession, HostCanvas, PageExporter, RetainedCanvas, SyncEvent,
};
use brochure_themes::{GenerateOptions, ThemeRegistry};
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

/// Change notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A page was inserted.
    PageAdded {
        /// New page.
        page: PageId,
    },
    /// A page was removed.
    PageRemoved {
        /// Removed page.
        page: PageId,
    },
    /// A page moved to a new position.
    PageMoved {
        /// Moved page.
        page: PageId,
        /// New index.
        index: usize,
    },
    /// The current page changed.
    PageSelected {
        /// New current page, if any remain.
        page: Option<PageId>,
    },
    /// A page's elements, overrides or snapshot changed.
    PageChanged {
        /// Changed page.
        page: PageId,
    },
    /// The document theme changed and every page was regenerated.
    ThemeApplied {
        /// New theme id.
        theme: String,
    },
    /// The document was renamed.
    Renamed {
        /// New name.
        name: String,
    },
    /// The document was saved.
    Saved {
        /// Version after the save.
        version: u32,
    },
    /// The editor session reported a change on the current page.
    Canvas {
        /// Page being edited.
        page: PageId,
        /// What the session reported.
        event: SyncEvent,
    },
}

/// Handle returned by [`SchemaStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// How [`SchemaStore::apply_theme`] treats existing page state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyThemeOptions {
    /// Re-apply user overrides to the regenerated elements.
    pub preserve_overrides: bool,
    /// Regenerate from each page's stored snapshot; otherwise from an empty one.
    pub preserve_snapshots: bool,
}

impl Default for ApplyThemeOptions {
    fn default() -> Self {
        Self {
            preserve_overrides: true,
            preserve_snapshots: true,
        }
    }
}

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// Document store with an optional editor session.
pub struct SchemaStore<C: HostCanvas = RetainedCanvas> {
    document: Document,
    registry: ThemeRegistry,
    current_page: Option<PageId>,
    dirty: bool,
    session: Option<EditorSession<C>>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<C: HostCanvas> SchemaStore<C> {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Wrap an existing document. The first page becomes current.
    #[must_use]
    pub fn create(document: Document, registry: ThemeRegistry) -> Self {
        let current_page = document.pages.first().map(|p| p.id);
        tracing::debug!(
            document = %document.id,
            pages = document.pages.len(),
            "schema store created"
        );
        Self {
            document,
            registry,
            current_page,
            dirty: false,
            session: None,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Build the standard brochure for a trip.
    ///
    /// Pages, in order: cover, notes, contents, overview left and right, a
    /// left and right page per day, then hotels left and right when the trip
    /// has any. Every page records where its data came from.
    ///
    /// # Errors
    ///
    /// Returns `Layout` if `theme` is not registered.
    pub fn from_itinerary(
        itinerary: &Itinerary,
        registry: ThemeRegistry,
        theme: &str,
        settings: DocumentSettings,
    ) -> StoreResult<Self> {
        registry.get(theme)?;
        let city = itinerary.city.as_deref().unwrap_or("Travel");
        let mut document =
            Document::new(format!("{city} Brochure"), theme).with_settings(settings);
        document.version = 1;

        let mut store = Self::create(document, registry);
        for (template, day_index) in standard_sequence(itinerary) {
            let name = match day_index {
                Some(day) if template == PageTemplate::DailyLeft => {
                    format!("Day {} (left)", day + 1)
                }
                Some(day) => format!("Day {} (right)", day + 1),
                None => template.display_name().to_string(),
            };
            let mut page = Page::new(template, settings.page_width, settings.page_height)
                .with_name(name)
                .with_snapshot(snapshot_for(itinerary, template, day_index))
                .with_source(SourceReference::new(itinerary.id.clone(), day_index));
            page.elements = store.generate_for(&page)?;
            store.document.add_page(page, None)?;
        }
        store.current_page = store.document.pages.first().map(|p| p.id);
        store.dirty = true;

        tracing::info!(
            itinerary = %itinerary.id,
            pages = store.document.pages.len(),
            theme,
            "brochure generated from itinerary"
        );
        Ok(store)
    }

    /// Load a document saved with [`SchemaStore::save`].
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read and `Document` if it does not
    /// hold a document.
    pub fn open(path: &Path, registry: ThemeRegistry) -> StoreResult<Self> {
        let json = fs::read_to_string(path)?;
        let document = Document::from_json(&json)?;
        tracing::debug!(path = %path.display(), "document loaded");
        Ok(Self::create(document, registry))
    }

    /// Tear the store down and hand back the document.
    ///
    /// An open session is disposed and its canvas dropped; call
    /// [`SchemaStore::close_session`] first to keep the canvas.
    #[must_use]
    pub fn dispose(mut self) -> Document {
        if let Some(session) = self.session.take() {
            drop(session.dispose());
        }
        self.listeners.clear();
        tracing::debug!(document = %self.document.id, "schema store disposed");
        self.document
    }

    // ========================================================================
    // Document
    // ========================================================================

    /// The document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The registry pages are generated with.
    #[must_use]
    pub fn registry(&self) -> &ThemeRegistry {
        &self.registry
    }

    /// Whether there are changes since the last save.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record a save: bump the version and clear the dirty flag.
    pub fn mark_saved(&mut self) {
        self.document.version += 1;
        self.dirty = false;
        let version = self.document.version;
        self.emit(&StoreEvent::Saved { version });
    }

    /// Write the document as JSON and mark it saved.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be written. The version is unchanged
    /// on failure.
    pub fn save(&mut self, path: &Path) -> StoreResult<()> {
        self.document.version += 1;
        let written = self
            .document
            .to_json()
            .map_err(StoreError::from)
            .and_then(|json| fs::write(path, json).map_err(StoreError::from));
        self.document.version -= 1;
        written?;
        self.mark_saved();
        tracing::info!(path = %path.display(), version = self.document.version, "document saved");
        Ok(())
    }

    /// Rename the document.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.document.name = name.into();
        self.dirty = true;
        let name = self.document.name.clone();
        self.emit(&StoreEvent::Renamed { name });
    }

    // ========================================================================
    // Pages
    // ========================================================================

    /// Generate a page and insert it after `after`, or at the end.
    ///
    /// # Errors
    ///
    /// Returns an error if `after` is unknown or the theme is not registered.
    pub fn add_page(
        &mut self,
        template: PageTemplate,
        snapshot: Option<DataSnapshot>,
        after: Option<PageId>,
    ) -> StoreResult<PageId> {
        let settings = self.document.settings;
        let mut page = Page::new(template, settings.page_width, settings.page_height)
            .with_name(template.display_name());
        if let Some(snapshot) = snapshot {
            page = page.with_snapshot(snapshot);
        }
        page.elements = self.generate_for(&page)?;
        let id = self.document.add_page(page, after)?;
        if self.current_page.is_none() {
            self.current_page = Some(id);
        }
        self.dirty = true;
        self.emit(&StoreEvent::PageAdded { page: id });
        Ok(id)
    }

    /// Remove a page.
    ///
    /// If it was current, the page now at its position (or the new last
    /// page) becomes current. Removing the last remaining page closes the
    /// editor session.
    ///
    /// # Errors
    ///
    /// Returns `PageNotFound` if the page is unknown.
    pub fn remove_page(&mut self, id: PageId) -> StoreResult<Page> {
        let index = self
            .document
            .page_index(id)
            .ok_or(StoreError::PageNotFound(id))?;
        let removed = self.document.remove_page(id)?;
        self.dirty = true;
        self.emit(&StoreEvent::PageRemoved { page: id });

        if self.current_page == Some(id) {
            let len = self.document.pages.len();
            self.current_page = (len > 0).then(|| self.document.pages[index.min(len - 1)].id);
            if self.current_page.is_none() {
                if let Some(session) = self.session.take() {
                    tracing::debug!("last page removed, closing editor session");
                    drop(session.dispose());
                }
            }
            self.show_current();
            let page = self.current_page;
            self.emit(&StoreEvent::PageSelected { page });
        }
        Ok(removed)
    }

    /// Copy a page and insert the copy after it.
    ///
    /// # Errors
    ///
    /// Returns `PageNotFound` if the page is unknown.
    pub fn duplicate_page(&mut self, id: PageId) -> StoreResult<PageId> {
        let copy = self.document.duplicate_page(id)?;
        self.dirty = true;
        self.emit(&StoreEvent::PageAdded { page: copy });
        Ok(copy)
    }

    /// Move a page to `index`.
    ///
    /// # Errors
    ///
    /// Returns `PageNotFound` if the page is unknown.
    pub fn move_page(&mut self, id: PageId, index: usize) -> StoreResult<()> {
        self.document.move_page(id, index)?;
        self.dirty = true;
        let index = self.document.page_index(id).unwrap_or(index);
        self.emit(&StoreEvent::PageMoved { page: id, index });
        Ok(())
    }

    /// Make a page current. An open session switches to it.
    ///
    /// # Errors
    ///
    /// Returns `PageNotFound` if the page is unknown.
    pub fn select_page(&mut self, id: PageId) -> StoreResult<()> {
        if self.document.page(id).is_none() {
            return Err(StoreError::PageNotFound(id));
        }
        self.current_page = Some(id);
        self.show_current();
        self.emit(&StoreEvent::PageSelected { page: Some(id) });
        Ok(())
    }

    /// The current page.
    #[must_use]
    pub fn current_page(&self) -> Option<&Page> {
        self.current_page.and_then(|id| self.document.page(id))
    }

    /// The page after `id`.
    #[must_use]
    pub fn next_page_id(&self, id: PageId) -> Option<PageId> {
        self.document.next_page_id(id)
    }

    /// The page before `id`.
    #[must_use]
    pub fn prev_page_id(&self, id: PageId) -> Option<PageId> {
        self.document.prev_page_id(id)
    }

    // ========================================================================
    // Elements
    // ========================================================================

    /// Place a user element on a page. It is marked unbound and painted on
    /// top.
    ///
    /// # Errors
    ///
    /// Returns `PageNotFound` if the page is unknown.
    pub fn add_element(&mut self, page_id: PageId, mut element: Element) -> StoreResult<ElementId> {
        element.is_unbound = true;
        let id = self.page_mut(page_id)?.add_element(element);
        self.page_touched(page_id);
        Ok(id)
    }

    /// Edit an element in place.
    ///
    /// Edits to generated elements last until the next regeneration; use
    /// [`SchemaStore::set_override`] to keep them.
    ///
    /// # Errors
    ///
    /// Returns `PageNotFound` or `ElementNotFound`.
    pub fn update_element(
        &mut self,
        page_id: PageId,
        element_id: ElementId,
        edit: impl FnOnce(&mut Element),
    ) -> StoreResult<()> {
        let element = self
            .page_mut(page_id)?
            .element_mut(element_id)
            .ok_or(StoreError::ElementNotFound(element_id))?;
        edit(element);
        self.page_touched(page_id);
        Ok(())
    }

    /// Merge `patch` into an element's override and apply it.
    ///
    /// Unbound elements are edited directly; they never regenerate, so no
    /// override is kept for them.
    ///
    /// # Errors
    ///
    /// Returns `PageNotFound` or `ElementNotFound`.
    pub fn set_override(
        &mut self,
        page_id: PageId,
        element_id: ElementId,
        patch: &ElementOverride,
    ) -> StoreResult<()> {
        let page = self.page_mut(page_id)?;
        let element = page
            .element_mut(element_id)
            .ok_or(StoreError::ElementNotFound(element_id))?;
        patch.apply_to(element);
        if !element.is_unbound {
            page.overrides.entry(element_id).or_default().merge(patch);
        }
        self.page_touched(page_id);
        Ok(())
    }

    /// Drop an element's override and regenerate the page.
    ///
    /// Returns whether there was an override to drop.
    ///
    /// # Errors
    ///
    /// Returns `PageNotFound`, or a layout error if regeneration fails.
    pub fn remove_override(&mut self, page_id: PageId, element_id: ElementId) -> StoreResult<bool> {
        if self.page_mut(page_id)?.overrides.remove(&element_id).is_none() {
            return Ok(false);
        }
        self.regenerate_page(page_id)?;
        self.page_touched(page_id);
        Ok(true)
    }

    /// Detach a generated element from the template.
    ///
    /// The element keeps its current state, including applied overrides, and
    /// is carried through regeneration unchanged from now on.
    ///
    /// # Errors
    ///
    /// Returns `PageNotFound` or `ElementNotFound`.
    pub fn detach_element(&mut self, page_id: PageId, element_id: ElementId) -> StoreResult<()> {
        let page = self.page_mut(page_id)?;
        let element = page
            .element_mut(element_id)
            .ok_or(StoreError::ElementNotFound(element_id))?;
        element.is_unbound = true;
        page.overrides.remove(&element_id);
        self.page_touched(page_id);
        Ok(())
    }

    /// Clear every override on a page and regenerate it.
    ///
    /// Unbound elements stay.
    ///
    /// # Errors
    ///
    /// Returns `PageNotFound`, or a layout error if regeneration fails.
    pub fn reset_page(&mut self, page_id: PageId) -> StoreResult<()> {
        self.page_mut(page_id)?.overrides.clear();
        self.regenerate_page(page_id)?;
        self.page_touched(page_id);
        Ok(())
    }

    // ========================================================================
    // Themes and source data
    // ========================================================================

    /// Switch the document theme and regenerate every page.
    ///
    /// Every page is laid out before anything is written, so the document
    /// switches as a whole or not at all.
    ///
    /// # Errors
    ///
    /// Returns `Layout` if the theme is not registered or a page fails to
    /// generate; the document is left unchanged.
    pub fn apply_theme(&mut self, theme_id: &str, options: ApplyThemeOptions) -> StoreResult<()> {
        self.registry.get(theme_id)?;

        let empty = DataSnapshot::default();
        let no_overrides = BTreeMap::new();
        let mut layouts = Vec::with_capacity(self.document.pages.len());
        for page in &self.document.pages {
            let snapshot = if options.preserve_snapshots {
                page.data_snapshot.as_ref().unwrap_or(&empty)
            } else {
                &empty
            };
            let overrides = if options.preserve_overrides {
                &page.overrides
            } else {
                &no_overrides
            };
            let generated = self.generate_with(theme_id, page, snapshot)?;
            layouts.push(regenerate(&page.elements, generated, overrides));
        }

        let pages = layouts.len();
        for (page, elements) in self.document.pages.iter_mut().zip(layouts) {
            page.elements = elements;
            if !options.preserve_overrides {
                page.overrides.clear();
            }
            if !options.preserve_snapshots {
                page.data_snapshot = None;
            }
        }
        self.document.theme = theme_id.to_string();
        self.dirty = true;
        self.show_current();
        tracing::info!(theme = theme_id, pages, "theme applied");
        self.emit(&StoreEvent::ThemeApplied {
            theme: theme_id.to_string(),
        });
        Ok(())
    }

    /// Edit a page's data snapshot and regenerate it, keeping overrides.
    ///
    /// # Errors
    ///
    /// Returns `PageNotFound`, or a layout error if regeneration fails.
    pub fn update_page_snapshot(
        &mut self,
        page_id: PageId,
        edit: impl FnOnce(&mut DataSnapshot),
    ) -> StoreResult<()> {
        edit(self.page_mut(page_id)?.data_snapshot.get_or_insert_with(DataSnapshot::default));
        self.regenerate_page(page_id)?;
        self.page_touched(page_id);
        Ok(())
    }

    /// Re-read a page's data from the trip and regenerate it.
    ///
    /// The day comes from the page's source reference, falling back to the
    /// day in its snapshot.
    ///
    /// # Errors
    ///
    /// Returns `PageNotFound`, or a layout error if regeneration fails.
    pub fn refresh_page_from_source(
        &mut self,
        page_id: PageId,
        itinerary: &Itinerary,
    ) -> StoreResult<()> {
        let page = self.page_mut(page_id)?;
        let day_index = page
            .source_ref
            .as_ref()
            .and_then(|s| s.day_index)
            .or_else(|| {
                page.data_snapshot
                    .as_ref()
                    .and_then(|s| s.day.as_ref())
                    .map(|d| d.day_index)
            });
        page.data_snapshot = Some(snapshot_for(itinerary, page.template, day_index));
        page.source_ref = Some(SourceReference::new(itinerary.id.clone(), day_index));
        self.regenerate_page(page_id)?;
        self.page_touched(page_id);
        Ok(())
    }

    /// Refresh every page from the trip.
    ///
    /// # Errors
    ///
    /// Stops at the first page that fails to regenerate.
    pub fn refresh_all_from_source(&mut self, itinerary: &Itinerary) -> StoreResult<()> {
        let ids: Vec<PageId> = self.document.pages.iter().map(|p| p.id).collect();
        for id in ids {
            self.refresh_page_from_source(id, itinerary)?;
        }
        tracing::info!(itinerary = %itinerary.id, "document refreshed from source");
        Ok(())
    }

    // ========================================================================
    // Editor session
    // ========================================================================

    /// Open an editor session on the current page.
    ///
    /// # Errors
    ///
    /// Returns `SessionAlreadyOpen` or `NoCurrentPage`.
    pub fn open_session(&mut self, canvas: C) -> StoreResult<()> {
        if self.session.is_some() {
            return Err(StoreError::SessionAlreadyOpen);
        }
        let page = self.current_page().ok_or(StoreError::NoCurrentPage)?;
        let session = EditorSession::open(canvas, page);
        tracing::debug!(page = %page.id, "editor session opened");
        self.session = Some(session);
        Ok(())
    }

    /// The open session.
    #[must_use]
    pub fn session(&self) -> Option<&EditorSession<C>> {
        self.session.as_ref()
    }

    /// The session's canvas, for hosts that drive it directly.
    pub fn canvas_mut(&mut self) -> Option<&mut C> {
        self.session.as_mut().map(EditorSession::canvas_mut)
    }

    /// Feed a canvas event to the session.
    ///
    /// Geometry, visibility and lock changes on generated elements are
    /// recorded as overrides so they survive regeneration.
    ///
    /// # Errors
    ///
    /// Returns `NoSession` or `NoCurrentPage`.
    pub fn handle_canvas_event(&mut self, event: CanvasEvent) -> StoreResult<Vec<SyncEvent>> {
        self.with_session(|session, page| session.handle_event(page, event))
    }

    /// Run a session command, such as adding a shape, against the current
    /// page and record its effects like [`SchemaStore::handle_canvas_event`].
    ///
    /// # Errors
    ///
    /// Returns `NoSession` or `NoCurrentPage`.
    pub fn with_session(
        &mut self,
        command: impl FnOnce(&mut EditorSession<C>, &mut Page) -> Vec<SyncEvent>,
    ) -> StoreResult<Vec<SyncEvent>> {
        let page_id = self.current_page.ok_or(StoreError::NoCurrentPage)?;
        let session = self.session.as_mut().ok_or(StoreError::NoSession)?;
        let page = self
            .document
            .page_mut(page_id)
            .ok_or(StoreError::PageNotFound(page_id))?;

        let events = command(session, page);
        let mut changed = false;
        for event in &events {
            changed |= record_sync(page, event);
        }
        if changed {
            self.dirty = true;
        }
        for event in &events {
            self.emit(&StoreEvent::Canvas {
                page: page_id,
                event: event.clone(),
            });
        }
        Ok(events)
    }

    /// Close the session and return its canvas, cleared.
    pub fn close_session(&mut self) -> Option<C> {
        let canvas = self.session.take().map(EditorSession::dispose);
        if canvas.is_some() {
            tracing::debug!("editor session closed");
        }
        canvas
    }

    // ========================================================================
    // Export and subscribers
    // ========================================================================

    /// Serialize every page to SVG, in document order.
    ///
    /// # Errors
    ///
    /// Returns `Export` if a page cannot be rendered.
    pub fn export_pages(&self) -> StoreResult<Vec<String>> {
        Ok(PageExporter::with_defaults().export_document(&self.document)?)
    }

    /// Register a change listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a change listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn page_mut(&mut self, id: PageId) -> StoreResult<&mut Page> {
        self.document.page_mut(id).ok_or(StoreError::PageNotFound(id))
    }

    fn generate_for(&self, page: &Page) -> StoreResult<Vec<Element>> {
        let empty = DataSnapshot::default();
        let snapshot = page.data_snapshot.as_ref().unwrap_or(&empty);
        self.generate_with(&self.document.theme, page, snapshot)
    }

    fn generate_with(
        &self,
        theme_id: &str,
        page: &Page,
        snapshot: &DataSnapshot,
    ) -> StoreResult<Vec<Element>> {
        let options = GenerateOptions::default().with_page_size(page.width, page.height);
        Ok(self
            .registry
            .generate(theme_id, page.template, snapshot, &options)?)
    }

    fn regenerate_page(&mut self, id: PageId) -> StoreResult<()> {
        let page = self.document.page(id).ok_or(StoreError::PageNotFound(id))?;
        let generated = self.generate_for(page)?;
        let page = self.page_mut(id)?;
        page.elements = regenerate(&page.elements, generated, &page.overrides);
        Ok(())
    }

    fn page_touched(&mut self, id: PageId) {
        self.dirty = true;
        if self.current_page == Some(id) {
            self.show_current();
        }
        self.emit(&StoreEvent::PageChanged { page: id });
    }

    fn show_current(&mut self) {
        let Some(id) = self.current_page else {
            return;
        };
        if let (Some(session), Some(page)) = (self.session.as_mut(), self.document.page(id)) {
            let stats = session.page_changed(page);
            tracing::trace!(?stats, "session re-rendered");
        }
    }

    fn emit(&mut self, event: &StoreEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}

/// Record a session change on a generated element as an override.
///
/// Returns whether the page changed.
fn record_sync(page: &mut Page, event: &SyncEvent) -> bool {
    let (id, patch) = match event {
        SyncEvent::ElementUpdated { id, update } => (*id, ElementOverride::from_geometry(*update)),
        SyncEvent::VisibilityChanged { id, visible } => (
            *id,
            ElementOverride {
                visible: Some(*visible),
                ..ElementOverride::default()
            },
        ),
        SyncEvent::LockChanged { id, locked } => (
            *id,
            ElementOverride {
                locked: Some(*locked),
                ..ElementOverride::default()
            },
        ),
        SyncEvent::ElementCreated { .. }
        | SyncEvent::ElementDeleted { .. }
        | SyncEvent::ZOrderChanged { .. } => return true,
        SyncEvent::SelectionChanged { .. }
        | SyncEvent::GuidesChanged { .. }
        | SyncEvent::OverlapsDetected { .. } => return false,
    };
    if page.element(id).is_some_and(|e| !e.is_unbound) {
        page.overrides.entry(id).or_default().merge(&patch);
    }
    true
}

/// Templates and day indices of the standard brochure for a trip.
fn standard_sequence(itinerary: &Itinerary) -> Vec<(PageTemplate, Option<usize>)> {
    let mut sequence = vec![
        (PageTemplate::Cover, None),
        (PageTemplate::Blank, None),
        (PageTemplate::Contents, None),
        (PageTemplate::OverviewLeft, None),
        (PageTemplate::OverviewRight, None),
    ];
    for day in 0..itinerary.daily_itinerary.len() {
        sequence.push((PageTemplate::DailyLeft, Some(day)));
        sequence.push((PageTemplate::DailyRight, Some(day)));
    }
    if !itinerary.hotels.is_empty() {
        sequence.push((PageTemplate::AccommodationLeft, None));
        sequence.push((PageTemplate::AccommodationRight, None));
    }
    sequence
}

/// Snapshot for one page; notes pages carry no trip data.
fn snapshot_for(
    itinerary: &Itinerary,
    template: PageTemplate,
    day_index: Option<usize>,
) -> DataSnapshot {
    if template == PageTemplate::Blank {
        DataSnapshot::default()
    } else {
        DataSnapshot::from_itinerary(itinerary, template, day_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brochure_core::itinerary::{Hotel, ItineraryDay};

    fn itinerary(days: usize, hotels: usize) -> Itinerary {
        Itinerary {
            id: "trip-1".into(),
            city: Some("Osaka".into()),
            daily_itinerary: (0..days)
                .map(|d| ItineraryDay {
                    title: Some(format!("Day title {d}")),
                    ..ItineraryDay::default()
                })
                .collect(),
            hotels: (0..hotels).map(|_| Hotel::default()).collect(),
            ..Itinerary::default()
        }
    }

    fn store(days: usize, hotels: usize) -> SchemaStore {
        SchemaStore::from_itinerary(
            &itinerary(days, hotels),
            ThemeRegistry::builtin(),
            "classic",
            DocumentSettings::default(),
        )
        .expect("classic is registered")
    }

    #[test]
    fn test_standard_sequence_without_hotels() {
        let templates: Vec<_> = standard_sequence(&itinerary(1, 0))
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(
            templates,
            vec![
                PageTemplate::Cover,
                PageTemplate::Blank,
                PageTemplate::Contents,
                PageTemplate::OverviewLeft,
                PageTemplate::OverviewRight,
                PageTemplate::DailyLeft,
                PageTemplate::DailyRight,
            ]
        );
    }

    #[test]
    fn test_standard_sequence_with_hotels() {
        let sequence = standard_sequence(&itinerary(2, 1));
        assert_eq!(sequence.len(), 11);
        assert_eq!(sequence[8], (PageTemplate::DailyRight, Some(1)));
        assert_eq!(sequence[10].0, PageTemplate::AccommodationRight);
    }

    #[test]
    fn test_from_itinerary_names_and_sources() {
        let store = store(2, 0);
        let document = store.document();
        assert_eq!(document.name, "Osaka Brochure");
        assert_eq!(document.version, 1);
        assert!(store.is_dirty());
        assert_eq!(document.pages[5].name, "Day 1 (left)");
        assert_eq!(document.pages[8].name, "Day 2 (right)");
        assert_eq!(
            document.pages[8].source_ref.as_ref().and_then(|s| s.day_index),
            Some(1)
        );
        assert_eq!(document.pages[1].data_snapshot, Some(DataSnapshot::default()));
        assert_eq!(store.current_page().map(|p| p.id), Some(document.pages[0].id));
        assert!(document.pages.iter().all(|p| !p.elements.is_empty()));
    }

    #[test]
    fn test_unknown_theme_is_rejected() {
        let result = SchemaStore::<RetainedCanvas>::from_itinerary(
            &itinerary(1, 0),
            ThemeRegistry::builtin(),
            "baroque",
            DocumentSettings::default(),
        );
        assert!(matches!(result, Err(StoreError::Layout(_))));
    }

    #[test]
    fn test_mark_saved_bumps_version() {
        let mut store = store(1, 0);
        store.mark_saved();
        assert_eq!(store.document().version, 2);
        assert!(!store.is_dirty());
        store.rename("Kansai");
        assert!(store.is_dirty());
        assert_eq!(store.document().name, "Kansai");
    }

    #[test]
    fn test_remove_current_page_selects_neighbour() {
        let mut store = store(1, 0);
        let ids: Vec<PageId> = store.document().pages.iter().map(|p| p.id).collect();
        store.select_page(ids[6]).expect("select last");
        store.remove_page(ids[6]).expect("remove");
        assert_eq!(store.current_page().map(|p| p.id), Some(ids[5]));

        store.select_page(ids[2]).expect("select middle");
        store.remove_page(ids[2]).expect("remove");
        assert_eq!(store.current_page().map(|p| p.id), Some(ids[3]));
    }

    #[test]
    fn test_remove_every_page_clears_current() {
        let mut store = SchemaStore::<RetainedCanvas>::create(
            Document::new("Empty", "classic"),
            ThemeRegistry::builtin(),
        );
        let id = store
            .add_page(PageTemplate::Blank, None, None)
            .expect("add page");
        assert_eq!(store.current_page().map(|p| p.id), Some(id));
        store.open_session(RetainedCanvas::new()).expect("open");
        store.remove_page(id).expect("remove");
        assert!(store.current_page().is_none());
        assert!(store.session().is_none());
    }

    #[test]
    fn test_set_override_survives_theme_change() {
        let mut store = store(1, 0);
        let page = store.document().pages[0].clone();
        let target = page
            .elements
            .iter()
            .find(|e| !e.name.is_empty())
            .expect("named element");
        let patch = ElementOverride {
            x: Some(42.0),
            ..ElementOverride::default()
        };
        store.set_override(page.id, target.id, &patch).expect("override");
        store
            .apply_theme("modern", ApplyThemeOptions::default())
            .expect("modern is registered");

        let page = &store.document().pages[0];
        assert_eq!(store.document().theme, "modern");
        if let Some(element) = page.element(target.id) {
            assert!((element.transform.x - 42.0).abs() < f32::EPSILON);
        }
        assert!(page.overrides.contains_key(&target.id));
    }

    #[test]
    fn test_apply_theme_can_drop_overrides() {
        let mut store = store(1, 0);
        let page = store.document().pages[0].clone();
        let target = page.elements[0].id;
        let patch = ElementOverride {
            opacity: Some(0.5),
            ..ElementOverride::default()
        };
        store.set_override(page.id, target, &patch).expect("override");
        let options = ApplyThemeOptions {
            preserve_overrides: false,
            preserve_snapshots: false,
        };
        store.apply_theme("classic", options).expect("classic");
        let page = &store.document().pages[0];
        assert!(page.overrides.is_empty());
        assert!(page.data_snapshot.is_none());
    }

    #[test]
    fn test_unknown_theme_leaves_document_unchanged() {
        let mut store = store(1, 0);
        let page = store.document().pages[0].clone();
        let patch = ElementOverride {
            opacity: Some(0.5),
            ..ElementOverride::default()
        };
        store
            .set_override(page.id, page.elements[0].id, &patch)
            .expect("override");
        let before = store.document().clone();

        let drop_all = ApplyThemeOptions {
            preserve_overrides: false,
            preserve_snapshots: false,
        };
        assert!(store.apply_theme("baroque", ApplyThemeOptions::default()).is_err());
        assert!(store.apply_theme("baroque", drop_all).is_err());
        assert_eq!(store.document(), &before);
        assert_eq!(store.document().theme, "classic");
    }

    #[test]
    fn test_apply_theme_switches_every_page() {
        let mut store = store(2, 1);
        store
            .apply_theme("modern", ApplyThemeOptions::default())
            .expect("modern");
        assert_eq!(store.document().theme, "modern");
        assert!(store.is_dirty());
        for page in &store.document().pages {
            assert!(!page.is_empty(), "{} is empty", page.name);
            assert!(page.is_z_dense(), "{} z-order not dense", page.name);
        }
    }

    #[test]
    fn test_detach_drops_override_and_keeps_state() {
        let mut store = store(1, 0);
        let page_id = store.document().pages[0].id;
        let target = store.document().pages[0].elements[0].id;
        let patch = ElementOverride {
            y: Some(7.0),
            ..ElementOverride::default()
        };
        store.set_override(page_id, target, &patch).expect("override");
        store.detach_element(page_id, target).expect("detach");

        let page = store.document().page(page_id).expect("page");
        let element = page.element(target).expect("element");
        assert!(element.is_unbound);
        assert!((element.transform.y - 7.0).abs() < f32::EPSILON);
        assert!(!page.overrides.contains_key(&target));
    }

    #[test]
    fn test_remove_override_reports_absence() {
        let mut store = store(1, 0);
        let page = &store.document().pages[0];
        let (page_id, element_id) = (page.id, page.elements[0].id);
        assert!(!store.remove_override(page_id, element_id).expect("page exists"));
    }

    #[test]
    fn test_missing_ids_are_errors() {
        let mut store = store(1, 0);
        let page_id = store.document().pages[0].id;
        let missing = PageId::new();
        assert!(matches!(
            store.select_page(missing),
            Err(StoreError::PageNotFound(_))
        ));
        assert!(matches!(
            store.update_element(page_id, ElementId::new(), |_| {}),
            Err(StoreError::ElementNotFound(_))
        ));
    }

    #[test]
    fn test_session_requires_open() {
        let mut store = store(1, 0);
        assert!(matches!(
            store.handle_canvas_event(CanvasEvent::SelectionCleared),
            Err(StoreError::NoSession)
        ));
        store.open_session(RetainedCanvas::new()).expect("open");
        assert!(matches!(
            store.open_session(RetainedCanvas::new()),
            Err(StoreError::SessionAlreadyOpen)
        ));
        assert!(store.close_session().is_some());
        assert!(store.close_session().is_none());
    }

    #[test]
    fn test_subscribers_see_changes() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut store = store(1, 0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = store.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        store.rename("Namba");
        store.mark_saved();
        assert_eq!(
            *seen.borrow(),
            vec![
                StoreEvent::Renamed {
                    name: "Namba".into()
                },
                StoreEvent::Saved { version: 2 },
            ]
        );

        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.rename("Umeda");
        assert_eq!(seen.borrow().len(), 2);
    }
}
