//! Editor session: keeps a live canvas and a page in sync.
//!
//! The session owns the canvas for its whole lifetime. Host input arrives as
//! [`CanvasEvent`]s; every handler returns the [`SyncEvent`]s the caller
//! should forward to the rest of the application.
//!
//! Geometry is committed to the page only when a gesture completes. While an
//! object is being dragged, scaled or rotated the canvas alone knows where it
//! is.

use brochure_core::{
    Element, ElementId, Fill, GeometryUpdate, Page, Rect, ShapeVariant, TextStyle, ZOrderChange,
};
use serde::{Deserialize, Serialize};

use crate::canvas::{HostCanvas, ListenerId, ObjectHandle, ResolvedGeometry};
use crate::guides::{detect_overlaps, snap, SnapGuide, SNAP_THRESHOLD};
use crate::render::{render, RenderOptions, RenderStats};

/// Smallest allowed zoom.
pub const MIN_ZOOM: f32 = 0.25;
/// Largest allowed zoom.
pub const MAX_ZOOM: f32 = 4.0;

const NEW_TEXT_SIZE: (f32, f32) = (200.0, 40.0);
const NEW_SHAPE_SIZE: (f32, f32) = (120.0, 120.0);
const NEW_IMAGE_SIZE: (f32, f32) = (200.0, 150.0);

/// Kind of direct manipulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureKind {
    /// Dragging.
    Move,
    /// Resizing from a handle.
    Scale,
    /// Rotating from the rotation handle.
    Rotate,
}

/// Keys the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorKey {
    /// Clear the selection.
    Escape,
    /// Delete the selection.
    Delete,
}

/// Input from the host canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasEvent {
    /// Pointer pressed at page coordinates.
    PointerDown {
        /// X in page pixels.
        x: f32,
        /// Y in page pixels.
        y: f32,
    },
    /// Pointer released at page coordinates.
    PointerUp {
        /// X in page pixels.
        x: f32,
        /// Y in page pixels.
        y: f32,
    },
    /// A gesture started or progressed on an object.
    Gesture {
        /// Object being manipulated.
        handle: ObjectHandle,
        /// Kind of gesture.
        kind: GestureKind,
    },
    /// The host finished modifying an object.
    ObjectModified {
        /// Modified object.
        handle: ObjectHandle,
    },
    /// The host dropped its selection.
    SelectionCleared,
    /// A key was pressed.
    KeyDown {
        /// The key.
        key: EditorKey,
    },
}

/// Notification for the rest of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// The selection changed.
    SelectionChanged {
        /// Selected element, if any.
        id: Option<ElementId>,
    },
    /// Geometry was committed to the page.
    ElementUpdated {
        /// Updated element.
        id: ElementId,
        /// Committed geometry.
        update: GeometryUpdate,
    },
    /// An element was added.
    ElementCreated {
        /// New element.
        id: ElementId,
    },
    /// An element was removed.
    ElementDeleted {
        /// Removed element.
        id: ElementId,
    },
    /// Paint order changed.
    ZOrderChanged {
        /// Element that moved.
        id: ElementId,
    },
    /// Visibility toggled.
    VisibilityChanged {
        /// Element.
        id: ElementId,
        /// New visibility.
        visible: bool,
    },
    /// Lock toggled.
    LockChanged {
        /// Element.
        id: ElementId,
        /// New lock state.
        locked: bool,
    },
    /// Snap guides to draw; empty clears them.
    GuidesChanged {
        /// Active guides.
        guides: Vec<SnapGuide>,
    },
    /// Pairs of elements that overlap noticeably.
    OverlapsDetected {
        /// Overlapping pairs.
        pairs: Vec<(ElementId, ElementId)>,
    },
}

/// Selection and manipulation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing selected.
    #[default]
    Idle,
    /// Pointer is down on an object.
    Selecting {
        /// Element under the pointer.
        element: ElementId,
        /// Its canvas object.
        handle: ObjectHandle,
    },
    /// An element is selected.
    Selected {
        /// Selected element.
        element: ElementId,
        /// Its canvas object.
        handle: ObjectHandle,
    },
    /// The selected element is being manipulated.
    Transforming {
        /// Element being manipulated.
        element: ElementId,
        /// Its canvas object.
        handle: ObjectHandle,
        /// Current gesture.
        kind: GestureKind,
    },
}

impl SessionState {
    /// Element this state refers to.
    #[must_use]
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Self::Idle => None,
            Self::Selecting { element, .. }
            | Self::Selected { element, .. }
            | Self::Transforming { element, .. } => Some(*element),
        }
    }
}

/// Live editing session over one host canvas.
pub struct EditorSession<C: HostCanvas> {
    canvas: C,
    state: SessionState,
    listener: ListenerId,
    page_size: (f32, f32),
    zoom: f32,
    snapping: bool,
    guides_shown: bool,
    // the last gesture on the selection has been written to the page
    committed: bool,
}

impl<C: HostCanvas> EditorSession<C> {
    /// Take ownership of a canvas and render `page` onto it.
    #[must_use]
    pub fn open(mut canvas: C, page: &Page) -> Self {
        let listener = canvas.attach_listener();
        canvas.set_zoom(1.0);
        let stats = render(&mut canvas, page, &RenderOptions::editable(page));
        tracing::debug!(page = %page.id, objects = stats.added, "editor session opened");
        Self {
            canvas,
            state: SessionState::Idle,
            listener,
            page_size: (page.width, page.height),
            zoom: 1.0,
            snapping: true,
            guides_shown: false,
            committed: false,
        }
    }

    /// Enable or disable snapping during move gestures.
    #[must_use]
    pub fn with_snapping(mut self, snapping: bool) -> Self {
        self.snapping = snapping;
        self
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Selected element, including while it is being manipulated.
    #[must_use]
    pub fn selected(&self) -> Option<ElementId> {
        match self.state {
            SessionState::Selected { element, .. } | SessionState::Transforming { element, .. } => {
                Some(element)
            }
            SessionState::Idle | SessionState::Selecting { .. } => None,
        }
    }

    /// Current zoom.
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// The owned canvas.
    #[must_use]
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    /// The owned canvas, mutably. Hosts use this to apply live gestures.
    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    /// Process one canvas event.
    pub fn handle_event(&mut self, page: &mut Page, event: CanvasEvent) -> Vec<SyncEvent> {
        match event {
            CanvasEvent::PointerDown { x, y } => self.on_pointer_down(x, y),
            CanvasEvent::PointerUp { .. } => self.on_pointer_up(page),
            CanvasEvent::Gesture { handle, kind } => self.on_gesture(page, handle, kind),
            CanvasEvent::ObjectModified { handle } => self.on_object_modified(page, handle),
            CanvasEvent::SelectionCleared
            | CanvasEvent::KeyDown {
                key: EditorKey::Escape,
            } => self.clear_selection(),
            CanvasEvent::KeyDown {
                key: EditorKey::Delete,
            } => self.delete_selected(page),
        }
    }

    fn on_pointer_down(&mut self, x: f32, y: f32) -> Vec<SyncEvent> {
        if matches!(self.state, SessionState::Transforming { .. }) {
            return Vec::new();
        }
        let hit = self.canvas.object_at(x, y).and_then(|handle| {
            self.canvas
                .get(handle)
                .map(|object| (object.element_id, handle))
        });
        match hit {
            Some((element, handle)) => {
                self.state = SessionState::Selecting { element, handle };
                self.committed = false;
                Vec::new()
            }
            None => self.clear_selection(),
        }
    }

    fn on_pointer_up(&mut self, page: &mut Page) -> Vec<SyncEvent> {
        let prev = std::mem::replace(&mut self.state, SessionState::Idle);
        match prev {
            SessionState::Selecting { element, handle } => {
                self.canvas.set_active(Some(handle));
                self.state = SessionState::Selected { element, handle };
                vec![SyncEvent::SelectionChanged { id: Some(element) }]
            }
            SessionState::Transforming { element, handle, .. } => {
                self.commit(page, element, handle)
            }
            other => {
                self.state = other;
                Vec::new()
            }
        }
    }

    fn on_gesture(&mut self, page: &Page, handle: ObjectHandle, kind: GestureKind) -> Vec<SyncEvent> {
        let Some(element) = self.canvas.get(handle).map(|o| o.element_id) else {
            tracing::warn!(%handle, "Gesture on unknown object");
            return Vec::new();
        };
        if !page.element(element).is_some_and(Element::is_interactive) {
            tracing::debug!(element = %element, "Ignoring gesture on locked or hidden element");
            return Vec::new();
        }

        let mut events = Vec::new();
        let prev = std::mem::replace(&mut self.state, SessionState::Idle);
        let already_selected = matches!(
            prev,
            SessionState::Selected { element: e, .. } | SessionState::Transforming { element: e, .. }
                if e == element
        );
        if !already_selected {
            self.canvas.set_active(Some(handle));
            events.push(SyncEvent::SelectionChanged { id: Some(element) });
        }
        self.state = SessionState::Transforming {
            element,
            handle,
            kind,
        };
        self.committed = false;

        if kind == GestureKind::Move && self.snapping {
            events.extend(self.snap_live(handle));
        }
        events
    }

    fn snap_live(&mut self, handle: ObjectHandle) -> Option<SyncEvent> {
        let object = self.canvas.get(handle)?;
        let paint = object.bounds();
        let live = self.canvas.resolved_geometry(handle).unwrap_or_default();
        let moving = Rect::new(
            live.left.unwrap_or(paint.x),
            live.top.unwrap_or(paint.y),
            live.width.unwrap_or(paint.width),
            live.height.unwrap_or(paint.height),
        );
        if !moving.is_finite() {
            return None;
        }
        let others: Vec<Rect> = self
            .canvas
            .objects()
            .into_iter()
            .filter(|(h, o)| *h != handle && o.paint.visible)
            .map(|(_, o)| o.bounds())
            .collect();
        let result = snap(moving, &others, self.page_size, SNAP_THRESHOLD);

        if result.snapped() {
            self.canvas
                .move_live(handle, moving.x + result.dx, moving.y + result.dy);
            self.guides_shown = true;
            Some(SyncEvent::GuidesChanged {
                guides: result.guides,
            })
        } else if self.guides_shown {
            self.guides_shown = false;
            Some(SyncEvent::GuidesChanged { guides: Vec::new() })
        } else {
            None
        }
    }

    /// Hosts report `ObjectModified` after the pointer is released, so a
    /// gesture already committed by `PointerUp` is not committed again.
    fn on_object_modified(&mut self, page: &mut Page, handle: ObjectHandle) -> Vec<SyncEvent> {
        match self.state {
            SessionState::Transforming {
                element, handle: h, ..
            } if h == handle => self.commit(page, element, handle),
            SessionState::Selected { element, handle: h } if h == handle && !self.committed => {
                self.commit(page, element, handle)
            }
            _ => {
                tracing::trace!(%handle, "Ignoring modification outside a gesture");
                Vec::new()
            }
        }
    }

    /// Read back geometry for a finished gesture and write it to the page.
    fn commit(&mut self, page: &mut Page, element: ElementId, handle: ObjectHandle) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        if self.guides_shown {
            self.guides_shown = false;
            events.push(SyncEvent::GuidesChanged { guides: Vec::new() });
        }

        let read_back = self
            .canvas
            .resolved_geometry(handle)
            .and_then(|g| g.to_update());
        match read_back {
            Some(update) => match page.apply_geometry(element, update) {
                Ok(true) => events.push(SyncEvent::ElementUpdated {
                    id: element,
                    update,
                }),
                Ok(false) => {}
                Err(e) => tracing::warn!(element = %element, error = %e, "Geometry commit failed"),
            },
            None => {
                tracing::warn!(element = %element, %handle, "Geometry read-back failed, keeping previous values");
            }
        }

        self.rerender(page);
        self.resync(handle);
        self.state = SessionState::Selected { element, handle };
        self.committed = true;

        let pairs = detect_overlaps(page);
        if !pairs.is_empty() {
            events.push(SyncEvent::OverlapsDetected { pairs });
        }
        events
    }

    /// Snap the live geometry of an object back to its rendered paint.
    fn resync(&mut self, handle: ObjectHandle) {
        let Some(object) = self.canvas.get(handle).cloned() else {
            return;
        };
        let p = &object.paint;
        let painted = ResolvedGeometry::complete(p.left, p.top, p.width, p.height, p.angle);
        if self.canvas.resolved_geometry(handle) != Some(painted) {
            if let Err(e) = self.canvas.update(handle, object) {
                tracing::warn!(%handle, error = %e, "Failed to restore object");
            }
        }
    }

    fn clear_selection(&mut self) -> Vec<SyncEvent> {
        self.state = SessionState::Idle;
        self.committed = false;
        self.canvas.discard_active();
        let mut events = Vec::new();
        if self.guides_shown {
            self.guides_shown = false;
            events.push(SyncEvent::GuidesChanged { guides: Vec::new() });
        }
        events.push(SyncEvent::SelectionChanged { id: None });
        events
    }

    fn rerender(&mut self, page: &Page) -> RenderStats {
        self.page_size = (page.width, page.height);
        render(&mut self.canvas, page, &RenderOptions::editable(page))
    }

    fn insert(&mut self, page: &mut Page, element: Element) -> Vec<SyncEvent> {
        let id = page.add_element(element.unbound());
        self.rerender(page);
        let mut events = vec![SyncEvent::ElementCreated { id }];
        if let Some(handle) = self.canvas.handles_for(id).first().copied() {
            self.canvas.set_active(Some(handle));
            self.state = SessionState::Selected {
                element: id,
                handle,
            };
            self.committed = false;
            events.push(SyncEvent::SelectionChanged { id: Some(id) });
        }
        events
    }

    /// Add a text element in the middle of the page and select it.
    pub fn add_text(&mut self, page: &mut Page, content: &str) -> Vec<SyncEvent> {
        let (w, h) = NEW_TEXT_SIZE;
        let element = Element::text(content, TextStyle::default())
            .with_name("text")
            .with_bounds((page.width - w) / 2.0, (page.height - h) / 2.0, w, h);
        self.insert(page, element)
    }

    /// Add a shape in the middle of the page and select it.
    pub fn add_shape(&mut self, page: &mut Page, variant: ShapeVariant, fill: Fill) -> Vec<SyncEvent> {
        let (w, h) = NEW_SHAPE_SIZE;
        let element = Element::shape(variant, fill)
            .with_name("shape")
            .with_bounds((page.width - w) / 2.0, (page.height - h) / 2.0, w, h);
        self.insert(page, element)
    }

    /// Add an image in the middle of the page and select it.
    pub fn add_image(&mut self, page: &mut Page, src: &str) -> Vec<SyncEvent> {
        let (w, h) = NEW_IMAGE_SIZE;
        let element = Element::image(src)
            .with_name("image")
            .with_bounds((page.width - w) / 2.0, (page.height - h) / 2.0, w, h);
        self.insert(page, element)
    }

    /// Every selected element id.
    #[must_use]
    pub fn selection(&self) -> Vec<ElementId> {
        self.selected().into_iter().collect()
    }

    /// Delete the selected elements and every canvas object drawing them.
    pub fn delete_selected(&mut self, page: &mut Page) -> Vec<SyncEvent> {
        let selection = self.selection();
        if selection.is_empty() {
            return Vec::new();
        }
        let mut events = Vec::with_capacity(selection.len() + 1);
        for id in selection {
            for handle in self.canvas.handles_for(id) {
                self.canvas.remove(handle);
            }
            if let Err(e) = page.remove_element(id) {
                tracing::warn!(element = %id, error = %e, "Selected element missing from page");
            }
            events.push(SyncEvent::ElementDeleted { id });
        }
        self.rerender(page);
        events.extend(self.clear_selection());
        events
    }

    /// Paint the selected element above everything else.
    pub fn bring_to_front(&mut self, page: &mut Page) -> Vec<SyncEvent> {
        self.reorder(page, ZOrderChange::BringToFront)
    }

    /// Paint the selected element below everything else.
    pub fn send_to_back(&mut self, page: &mut Page) -> Vec<SyncEvent> {
        self.reorder(page, ZOrderChange::SendToBack)
    }

    fn reorder(&mut self, page: &mut Page, change: ZOrderChange) -> Vec<SyncEvent> {
        let Some(id) = self.selected() else {
            return Vec::new();
        };
        match page.reorder_element(id, change) {
            Ok(true) => {
                self.rerender(page);
                vec![SyncEvent::ZOrderChanged { id }]
            }
            Ok(false) => Vec::new(),
            Err(e) => {
                tracing::warn!(element = %id, error = %e, "Reorder failed");
                Vec::new()
            }
        }
    }

    /// Show or hide an element.
    pub fn toggle_visibility(&mut self, page: &mut Page, id: ElementId) -> Vec<SyncEvent> {
        let Some(element) = page.element_mut(id) else {
            return Vec::new();
        };
        element.visible = !element.visible;
        let visible = element.visible;
        self.rerender(page);
        let mut events = vec![SyncEvent::VisibilityChanged { id, visible }];
        if !visible && self.state.element() == Some(id) {
            events.extend(self.clear_selection());
        }
        events
    }

    /// Lock or unlock an element.
    pub fn toggle_lock(&mut self, page: &mut Page, id: ElementId) -> Vec<SyncEvent> {
        let Some(element) = page.element_mut(id) else {
            return Vec::new();
        };
        element.locked = !element.locked;
        let locked = element.locked;
        self.rerender(page);
        let mut events = vec![SyncEvent::LockChanged { id, locked }];
        if locked && self.state.element() == Some(id) {
            events.extend(self.clear_selection());
        }
        events
    }

    /// Set the view zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        let zoom = if zoom.is_finite() {
            zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            self.zoom
        };
        self.zoom = zoom;
        self.canvas.set_zoom(zoom);
        zoom
    }

    /// Re-render after the page changed outside the session.
    pub fn page_changed(&mut self, page: &Page) -> RenderStats {
        let stats = self.rerender(page);
        if let Some(id) = self.state.element() {
            if page.element(id).is_none() {
                self.state = SessionState::Idle;
                self.canvas.discard_active();
            }
        }
        stats
    }

    /// Tear the session down and hand back an empty canvas.
    pub fn dispose(mut self) -> C {
        self.canvas.discard_active();
        self.canvas.clear();
        if !self.canvas.detach_listener(self.listener) {
            tracing::warn!("Session listener was already detached");
        }
        tracing::debug!("editor session disposed");
        self.canvas
    }
}
