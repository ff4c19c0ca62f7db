//! The host canvas contract.
//!
//! A host canvas is a retained-mode scene of [`CanvasObject`]s in stacking
//! order. The renderer diffs pages against it; the editor session reads
//! geometry back from it after direct manipulation.

use brochure_core::{Color, ElementId, GeometryUpdate};
use serde::{Deserialize, Serialize};

use crate::error::RenderResult;
use crate::object::CanvasObject;

/// Opaque handle of an object on the host canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHandle(pub u64);

impl std::fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle of an attached event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Live geometry of an object as the host reports it.
///
/// Hosts may fail to report any component, so every field is optional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolvedGeometry {
    /// Left edge of the unrotated box.
    pub left: Option<f32>,
    /// Top edge of the unrotated box.
    pub top: Option<f32>,
    /// Width after scaling.
    pub width: Option<f32>,
    /// Height after scaling.
    pub height: Option<f32>,
    /// Rotation in degrees.
    pub angle: Option<f32>,
}

impl ResolvedGeometry {
    /// Geometry with every component present.
    #[must_use]
    pub fn complete(left: f32, top: f32, width: f32, height: f32, angle: f32) -> Self {
        Self {
            left: Some(left),
            top: Some(top),
            width: Some(width),
            height: Some(height),
            angle: Some(angle),
        }
    }

    /// Convert to a page update.
    ///
    /// Returns `None` unless every component is present and finite.
    #[must_use]
    pub fn to_update(&self) -> Option<GeometryUpdate> {
        GeometryUpdate {
            x: self.left?,
            y: self.top?,
            width: self.width?,
            height: self.height?,
            rotation: self.angle?,
        }
        .validated()
    }
}

/// A retained-mode drawing surface owned by the host.
pub trait HostCanvas {
    /// Add an object on top of the stack.
    fn add(&mut self, object: CanvasObject) -> ObjectHandle;

    /// Replace an object's state in place.
    ///
    /// # Errors
    ///
    /// Returns `UnknownObject` if the handle is not on the canvas.
    fn update(&mut self, handle: ObjectHandle, object: CanvasObject) -> RenderResult<()>;

    /// Remove an object, returning it.
    fn remove(&mut self, handle: ObjectHandle) -> Option<CanvasObject>;

    /// Look up an object.
    fn get(&self, handle: ObjectHandle) -> Option<&CanvasObject>;

    /// All objects, bottom to top.
    fn objects(&self) -> Vec<(ObjectHandle, &CanvasObject)>;

    /// Move an object to a stacking position, 0 being the bottom.
    ///
    /// # Errors
    ///
    /// Returns `UnknownObject` if the handle is not on the canvas.
    fn set_stack_index(&mut self, handle: ObjectHandle, index: usize) -> RenderResult<()>;

    /// Resize the drawing surface.
    fn set_size(&mut self, width: f32, height: f32);

    /// Set the surface background.
    fn set_background(&mut self, color: Color);

    /// Set the view zoom.
    fn set_zoom(&mut self, zoom: f32);

    /// Live geometry after direct manipulation.
    fn resolved_geometry(&self, handle: ObjectHandle) -> Option<ResolvedGeometry>;

    /// Move an object's live position while a gesture is in progress.
    fn move_live(&mut self, handle: ObjectHandle, left: f32, top: f32);

    /// Topmost hit target at a point in page pixels.
    fn object_at(&self, x: f32, y: f32) -> Option<ObjectHandle>;

    /// Make an object the active selection, or clear it with `None`.
    fn set_active(&mut self, handle: Option<ObjectHandle>);

    /// Current active object.
    fn active(&self) -> Option<ObjectHandle>;

    /// Drop the active selection.
    fn discard_active(&mut self) {
        self.set_active(None);
    }

    /// Natural pixel size of an image source, if known.
    fn natural_size(&self, src: &str) -> Option<(f32, f32)>;

    /// Attach an input listener.
    fn attach_listener(&mut self) -> ListenerId;

    /// Detach a listener. Returns whether it was attached.
    fn detach_listener(&mut self, id: ListenerId) -> bool;

    /// Number of attached listeners.
    fn listener_count(&self) -> usize;

    /// Remove every object.
    fn clear(&mut self);

    /// Handles of every object drawing `element`.
    fn handles_for(&self, element: ElementId) -> Vec<ObjectHandle> {
        self.objects()
            .into_iter()
            .filter(|(_, object)| object.element_id == element)
            .map(|(handle, _)| handle)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_update_requires_every_component() {
        let partial = ResolvedGeometry {
            left: Some(1.0),
            top: Some(2.0),
            width: None,
            height: Some(4.0),
            angle: Some(0.0),
        };
        assert!(partial.to_update().is_none());

        let nan = ResolvedGeometry::complete(1.0, f32::NAN, 3.0, 4.0, 0.0);
        assert!(nan.to_update().is_none());

        let ok = ResolvedGeometry::complete(1.0, 2.0, 3.0, 4.0, -90.0)
            .to_update()
            .expect("complete geometry");
        assert!((ok.rotation - 270.0).abs() < f32::EPSILON);
    }
}
