//! In-memory host canvas.
//!
//! [`RetainedCanvas`] keeps objects in a stacking-ordered list and models the
//! one thing a real interactive canvas adds on top: while a gesture is in
//! progress the live geometry diverges from the last rendered paint. Tests,
//! the print surface and the CLI all draw through it.

use std::collections::{BTreeSet, HashMap};

use brochure_core::Color;

use crate::canvas::{HostCanvas, ListenerId, ObjectHandle, ResolvedGeometry};
use crate::error::{RenderError, RenderResult};
use crate::object::CanvasObject;

#[derive(Debug, Clone)]
struct Slot {
    handle: ObjectHandle,
    object: CanvasObject,
    live: ResolvedGeometry,
}

impl Slot {
    fn new(handle: ObjectHandle, object: CanvasObject) -> Self {
        let live = paint_geometry(&object);
        Self {
            handle,
            object,
            live,
        }
    }
}

fn paint_geometry(object: &CanvasObject) -> ResolvedGeometry {
    let p = &object.paint;
    ResolvedGeometry::complete(p.left, p.top, p.width, p.height, p.angle)
}

/// Counters of mutating canvas calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CanvasCounters {
    /// `add` calls.
    pub adds: usize,
    /// Successful `update` calls.
    pub updates: usize,
    /// Successful `remove` calls.
    pub removes: usize,
}

/// Reference [`HostCanvas`] kept entirely in memory.
#[derive(Debug, Clone)]
pub struct RetainedCanvas {
    slots: Vec<Slot>,
    next_handle: u64,
    next_listener: u64,
    listeners: BTreeSet<ListenerId>,
    active: Option<ObjectHandle>,
    natural_sizes: HashMap<String, (f32, f32)>,
    width: f32,
    height: f32,
    background: Color,
    zoom: f32,
    counters: CanvasCounters,
}

impl Default for RetainedCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl RetainedCanvas {
    /// Create an empty canvas.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_handle: 1,
            next_listener: 1,
            listeners: BTreeSet::new(),
            active: None,
            natural_sizes: HashMap::new(),
            width: 0.0,
            height: 0.0,
            background: Color::WHITE,
            zoom: 1.0,
            counters: CanvasCounters::default(),
        }
    }

    /// Register the natural size of an image source.
    pub fn set_natural_size(&mut self, src: impl Into<String>, width: f32, height: f32) {
        self.natural_sizes.insert(src.into(), (width, height));
    }

    /// Override the live geometry of an object, as a host would mid-gesture.
    pub fn set_resolved(&mut self, handle: ObjectHandle, geometry: ResolvedGeometry) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.live = geometry;
        }
    }

    /// Drag an object by an offset without touching its paint.
    pub fn move_by(&mut self, handle: ObjectHandle, dx: f32, dy: f32) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.live.left = slot.live.left.map(|x| x + dx);
            slot.live.top = slot.live.top.map(|y| y + dy);
        }
    }

    /// Scale an object's live size without touching its paint.
    pub fn scale_by(&mut self, handle: ObjectHandle, sx: f32, sy: f32) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.live.width = slot.live.width.map(|w| w * sx);
            slot.live.height = slot.live.height.map(|h| h * sy);
        }
    }

    /// Rotate an object's live angle without touching its paint.
    pub fn rotate_by(&mut self, handle: ObjectHandle, degrees: f32) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.live.angle = slot.live.angle.map(|a| a + degrees);
        }
    }

    /// Mutation counters since creation or the last reset.
    #[must_use]
    pub fn counters(&self) -> CanvasCounters {
        self.counters
    }

    /// Zero the mutation counters.
    pub fn reset_counters(&mut self) {
        self.counters = CanvasCounters::default();
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the canvas has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Surface size.
    #[must_use]
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Surface background.
    #[must_use]
    pub fn background(&self) -> Color {
        self.background
    }

    /// View zoom.
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    fn index_of(&self, handle: ObjectHandle) -> Option<usize> {
        self.slots.iter().position(|s| s.handle == handle)
    }

    fn slot_mut(&mut self, handle: ObjectHandle) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.handle == handle)
    }
}

impl HostCanvas for RetainedCanvas {
    fn add(&mut self, object: CanvasObject) -> ObjectHandle {
        let handle = ObjectHandle(self.next_handle);
        self.next_handle += 1;
        self.slots.push(Slot::new(handle, object));
        self.counters.adds += 1;
        handle
    }

    fn update(&mut self, handle: ObjectHandle, object: CanvasObject) -> RenderResult<()> {
        let slot = self
            .slot_mut(handle)
            .ok_or(RenderError::UnknownObject(handle))?;
        *slot = Slot::new(handle, object);
        self.counters.updates += 1;
        Ok(())
    }

    fn remove(&mut self, handle: ObjectHandle) -> Option<CanvasObject> {
        let index = self.index_of(handle)?;
        if self.active == Some(handle) {
            self.active = None;
        }
        self.counters.removes += 1;
        Some(self.slots.remove(index).object)
    }

    fn get(&self, handle: ObjectHandle) -> Option<&CanvasObject> {
        self.slots
            .iter()
            .find(|s| s.handle == handle)
            .map(|s| &s.object)
    }

    fn objects(&self) -> Vec<(ObjectHandle, &CanvasObject)> {
        self.slots.iter().map(|s| (s.handle, &s.object)).collect()
    }

    fn set_stack_index(&mut self, handle: ObjectHandle, index: usize) -> RenderResult<()> {
        let from = self
            .index_of(handle)
            .ok_or(RenderError::UnknownObject(handle))?;
        let slot = self.slots.remove(from);
        let to = index.min(self.slots.len());
        self.slots.insert(to, slot);
        Ok(())
    }

    fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    fn resolved_geometry(&self, handle: ObjectHandle) -> Option<ResolvedGeometry> {
        self.slots.iter().find(|s| s.handle == handle).map(|s| s.live)
    }

    fn move_live(&mut self, handle: ObjectHandle, left: f32, top: f32) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.live.left = Some(left);
            slot.live.top = Some(top);
        }
    }

    fn object_at(&self, x: f32, y: f32) -> Option<ObjectHandle> {
        self.slots
            .iter()
            .rev()
            .find(|s| {
                if !s.object.is_hit_target() {
                    return false;
                }
                let b = s.object.bounds();
                let left = s.live.left.unwrap_or(b.x);
                let top = s.live.top.unwrap_or(b.y);
                let width = s.live.width.unwrap_or(b.width);
                let height = s.live.height.unwrap_or(b.height);
                x >= left && x <= left + width && y >= top && y <= top + height
            })
            .map(|s| s.handle)
    }

    fn set_active(&mut self, handle: Option<ObjectHandle>) {
        self.active = handle.filter(|h| self.index_of(*h).is_some());
    }

    fn active(&self) -> Option<ObjectHandle> {
        self.active
    }

    fn natural_size(&self, src: &str) -> Option<(f32, f32)> {
        self.natural_sizes.get(src).copied()
    }

    fn attach_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id);
        id
    }

    fn detach_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id)
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn clear(&mut self) {
        self.counters.removes += self.slots.len();
        self.slots.clear();
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::canvas_object;
    use brochure_core::{Element, ShapeVariant};

    fn object(x: f32, y: f32) -> CanvasObject {
        let element = Element::shape(ShapeVariant::Rectangle, Color::BLACK).with_bounds(x, y, 50.0, 50.0);
        canvas_object(&element, true, &|_: &str| None)
    }

    #[test]
    fn test_stacking_and_hit_testing() {
        let mut canvas = RetainedCanvas::new();
        let bottom = canvas.add(object(0.0, 0.0));
        let top = canvas.add(object(25.0, 25.0));
        assert_eq!(canvas.object_at(30.0, 30.0), Some(top));

        canvas.set_stack_index(top, 0).expect("top is on the canvas");
        assert_eq!(canvas.object_at(30.0, 30.0), Some(bottom));
        assert_eq!(canvas.object_at(70.0, 70.0), Some(top));
        assert_eq!(canvas.object_at(200.0, 200.0), None);
    }

    #[test]
    fn test_live_geometry_diverges_until_update() {
        let mut canvas = RetainedCanvas::new();
        let handle = canvas.add(object(100.0, 100.0));
        canvas.move_by(handle, 10.0, -5.0);
        let live = canvas.resolved_geometry(handle).expect("live geometry");
        assert_eq!(live.left, Some(110.0));
        assert_eq!(live.top, Some(95.0));
        assert!((canvas.get(handle).expect("object").paint.left - 100.0).abs() < f32::EPSILON);

        canvas.update(handle, object(0.0, 0.0)).expect("update");
        assert_eq!(canvas.resolved_geometry(handle).and_then(|g| g.left), Some(0.0));
    }

    #[test]
    fn test_unknown_handle_errors() {
        let mut canvas = RetainedCanvas::new();
        assert!(canvas.update(ObjectHandle(9), object(0.0, 0.0)).is_err());
        assert!(canvas.set_stack_index(ObjectHandle(9), 0).is_err());
        assert!(canvas.remove(ObjectHandle(9)).is_none());
    }

    #[test]
    fn test_listeners_and_clear() {
        let mut canvas = RetainedCanvas::new();
        let a = canvas.attach_listener();
        let b = canvas.attach_listener();
        assert_ne!(a, b);
        assert_eq!(canvas.listener_count(), 2);
        assert!(canvas.detach_listener(a));
        assert!(!canvas.detach_listener(a));

        let handle = canvas.add(object(0.0, 0.0));
        canvas.set_active(Some(handle));
        canvas.clear();
        assert!(canvas.is_empty());
        assert_eq!(canvas.active(), None);
        assert_eq!(canvas.counters().removes, 1);
    }
}
