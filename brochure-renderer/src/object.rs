//! Canvas objects: what the renderer hands to the host.
//!
//! Every object splits into an [`ObjectPaint`], which decides how it looks,
//! and an [`Interaction`], which decides how it responds to input. Only the
//! interaction differs between editable and read-only renders.

use brochure_core::{Color, ColorStop, CropRect, ElementId, ImageFilters, Rect, TextAlign};
use serde::{Deserialize, Serialize};

/// Paint for a shape fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PaintFill {
    /// Flat color.
    Solid {
        /// The color.
        color: Color,
    },
    /// Linear gradient in object-local pixels.
    Linear {
        /// Start x.
        x1: f32,
        /// Start y.
        y1: f32,
        /// End x.
        x2: f32,
        /// End y.
        y2: f32,
        /// Color stops.
        stops: Vec<ColorStop>,
    },
}

/// Outline paint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePaint {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in pixels.
    pub width: f32,
}

/// Horizontal anchor of a text object's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextOrigin {
    /// Origin at the left edge.
    #[default]
    Left,
    /// Origin at the horizontal center.
    Center,
    /// Origin at the right edge.
    Right,
}

/// Visual content of a canvas object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "kebab-case")]
pub enum ShapePaint {
    /// Text box.
    Text {
        /// Text content.
        content: String,
        /// Font family.
        font_family: String,
        /// Font size in pixels.
        font_size: f32,
        /// Numeric font weight.
        font_weight: u16,
        /// Italic style.
        italic: bool,
        /// Underline decoration.
        underline: bool,
        /// Text color.
        fill: Color,
        /// Alignment inside the box.
        align: TextAlign,
        /// Line height multiple.
        line_height: f32,
        /// Character spacing in 1/1000 em.
        char_spacing: f32,
        /// Where the origin sits.
        origin: TextOrigin,
        /// Origin x relative to the object's left edge.
        origin_x: f32,
    },
    /// Rectangle.
    Rect {
        /// Fill paint.
        fill: PaintFill,
        /// Optional outline.
        stroke: Option<StrokePaint>,
        /// Corner radius.
        rx: f32,
    },
    /// Circle centered in the object box.
    Circle {
        /// Fill paint.
        fill: PaintFill,
        /// Optional outline.
        stroke: Option<StrokePaint>,
        /// Radius.
        radius: f32,
    },
    /// Raster or vector image clipped to its frame.
    Image {
        /// Image source.
        src: String,
        /// Whole source image rectangle relative to the frame origin.
        draw: Rect,
        /// Visible region relative to the frame origin.
        clip: Rect,
        /// Source crop.
        crop: Option<CropRect>,
        /// Adjustments.
        filters: Option<ImageFilters>,
        /// Recolor for decorations and icons.
        tint: Option<Color>,
    },
    /// Group of child paints positioned relative to the group origin.
    Group {
        /// Children in paint order.
        children: Vec<ObjectPaint>,
    },
}

/// Everything that decides how an object looks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectPaint {
    /// Left edge of the unrotated box.
    pub left: f32,
    /// Top edge of the unrotated box.
    pub top: f32,
    /// Box width.
    pub width: f32,
    /// Box height.
    pub height: f32,
    /// Rotation in degrees about the box center.
    pub angle: f32,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Whether the object is drawn.
    pub visible: bool,
    /// Visual content.
    pub shape: ShapePaint,
}

impl ObjectPaint {
    /// Unrotated bounding box.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }
}

/// Everything that decides how an object responds to input.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Can become the active object.
    pub selectable: bool,
    /// Receives pointer events.
    pub evented: bool,
    /// Shows resize and rotate handles.
    pub has_controls: bool,
    /// Movement is locked.
    pub lock_movement: bool,
}

impl Interaction {
    /// Interaction for an editable render.
    #[must_use]
    pub fn editable(locked: bool) -> Self {
        Self {
            selectable: !locked,
            evented: true,
            has_controls: !locked,
            lock_movement: locked,
        }
    }

    /// Interaction for a read-only render.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            selectable: false,
            evented: false,
            has_controls: false,
            lock_movement: true,
        }
    }
}

/// An object on the host canvas.
///
/// The element id is the object's user data: the renderer uses it to find
/// existing objects instead of tracking handles itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasObject {
    /// Element this object draws.
    pub element_id: ElementId,
    /// Element kind name.
    pub kind: String,
    /// Visual state.
    pub paint: ObjectPaint,
    /// Input state.
    pub interaction: Interaction,
}

impl CanvasObject {
    /// The mode-independent part of the object.
    #[must_use]
    pub fn paint(&self) -> &ObjectPaint {
        &self.paint
    }

    /// Unrotated bounding box.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.paint.bounds()
    }

    /// Whether pointer input can target this object.
    #[must_use]
    pub fn is_hit_target(&self) -> bool {
        self.paint.visible && self.interaction.evented && self.interaction.selectable
    }
}
