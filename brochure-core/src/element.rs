//! Page elements - the visual primitives a brochure page is built from.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::color::Color;
use crate::geometry::Rect;

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
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

    /// The underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of element identifiers during generation.
///
/// `Random` mints a v4 UUID per element. `Seeded` derives ids from a seed and
/// a counter, so two generations with the same seed produce the same ids.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdSource {
    /// Fresh random ids.
    #[default]
    Random,
    /// Deterministic ids from a seed.
    Seeded {
        /// Seed shared by every id of one generation.
        seed: u64,
        /// Next counter value.
        counter: u64,
    },
}

impl IdSource {
    /// Deterministic source starting at counter zero.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::Seeded { seed, counter: 0 }
    }

    /// Mint the next element id.
    pub fn next_id(&mut self) -> ElementId {
        match self {
            Self::Random => ElementId::new(),
            Self::Seeded { seed, counter } => {
                let value = (u128::from(*seed) << 64) | u128::from(*counter);
                *counter += 1;
                ElementId::from_uuid(Uuid::from_u128(value))
            }
        }
    }
}

/// Font weight, normalized to named or hundred-step numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    /// Weight 400.
    #[default]
    Normal,
    /// Weight 700.
    Bold,
    /// Any other hundred step between 100 and 900.
    Numeric(u16),
}

impl FontWeight {
    /// Map a numeric CSS weight to the nearest supported step.
    ///
    /// Values are rounded to the nearest hundred and clamped to `100..=900`;
    /// 400 becomes [`FontWeight::Normal`] and 700 [`FontWeight::Bold`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_numeric(weight: f32) -> Self {
        if !weight.is_finite() {
            return Self::Normal;
        }
        let step = ((weight / 100.0).round() as i32).clamp(1, 9) as u16 * 100;
        match step {
            400 => Self::Normal,
            700 => Self::Bold,
            other => Self::Numeric(other),
        }
    }

    /// Parse a CSS weight keyword or number.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "bold" => Some(Self::Bold),
            "bolder" => Some(Self::Numeric(800)),
            "lighter" => Some(Self::Numeric(300)),
            other => other.parse::<f32>().ok().map(Self::from_numeric),
        }
    }

    /// Numeric weight.
    #[must_use]
    pub fn value(self) -> u16 {
        match self {
            Self::Normal => 400,
            Self::Bold => 700,
            Self::Numeric(n) => n,
        }
    }

    /// CSS keyword or number.
    #[must_use]
    pub fn as_css(self) -> String {
        match self {
            Self::Normal => "normal".to_string(),
            Self::Bold => "bold".to_string(),
            Self::Numeric(n) => n.to_string(),
        }
    }
}

impl Serialize for FontWeight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_css())
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid font weight: {raw}")))
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Left aligned.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
}

/// Typography of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font family name.
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Italic flag.
    #[serde(default)]
    pub italic: bool,
    /// Alignment within the element box.
    #[serde(default)]
    pub align: TextAlign,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    /// Letter spacing in pixels.
    #[serde(default)]
    pub letter_spacing: f32,
    /// Fill color.
    pub color: Color,
    /// Underline flag.
    #[serde(default)]
    pub underline: bool,
}

/// Default font family for generated and created text.
pub const DEFAULT_FONT_FAMILY: &str = "Noto Sans TC";

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: 16.0,
            font_weight: FontWeight::Normal,
            italic: false,
            align: TextAlign::Left,
            line_height: 1.2,
            letter_spacing: 0.0,
            color: Color::rgb(0x33, 0x33, 0x33),
            underline: false,
        }
    }
}

/// How an image fills its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectFit {
    /// Scale to cover the frame, cropping overflow.
    #[default]
    Cover,
    /// Scale to fit inside the frame.
    Contain,
    /// Stretch to the frame on both axes.
    Fill,
}

/// Crop rectangle in source image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left offset.
    pub x: f32,
    /// Top offset.
    pub y: f32,
    /// Crop width.
    pub width: f32,
    /// Crop height.
    pub height: f32,
}

/// Image adjustments; zero means unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageFilters {
    /// Brightness offset in `[-1, 1]`.
    #[serde(default)]
    pub brightness: f32,
    /// Contrast offset in `[-1, 1]`.
    #[serde(default)]
    pub contrast: f32,
    /// Saturation offset in `[-1, 1]`.
    #[serde(default)]
    pub saturation: f32,
    /// Blur radius in pixels.
    #[serde(default)]
    pub blur: f32,
}

impl ImageFilters {
    /// Whether every adjustment is neutral.
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        [self.brightness, self.contrast, self.saturation, self.blur]
            .iter()
            .all(|v| v.abs() < f32::EPSILON)
    }
}

/// Geometric variant of a shape element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeVariant {
    /// Rectangle, optionally with rounded corners.
    #[default]
    Rectangle,
    /// Circle inscribed in the element box.
    Circle,
}

/// One color stop of a linear gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position along the gradient line in `[0, 1]`.
    pub offset: f32,
    /// Stop color.
    pub color: Color,
}

/// A linear gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearGradient {
    /// CSS angle in degrees: 0 points up, 180 points down.
    pub angle: f32,
    /// Stops ordered by offset.
    pub stops: Vec<ColorStop>,
}

impl LinearGradient {
    /// Two-stop gradient.
    #[must_use]
    pub fn two_stop(angle: f32, start: Color, end: Color) -> Self {
        Self {
            angle,
            stops: vec![
                ColorStop {
                    offset: 0.0,
                    color: start,
                },
                ColorStop {
                    offset: 1.0,
                    color: end,
                },
            ],
        }
    }
}

/// Shape fill: a solid color or a linear gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fill {
    /// Solid color.
    Solid(Color),
    /// Linear gradient.
    Gradient(LinearGradient),
}

impl Default for Fill {
    fn default() -> Self {
        Self::Solid(Color::TRANSPARENT)
    }
}

impl From<Color> for Fill {
    fn from(color: Color) -> Self {
        Self::Solid(color)
    }
}

/// Shape outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Outline color.
    pub color: Color,
    /// Outline width in pixels.
    pub width: f32,
}

/// Named compound blocks produced by layout generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    /// Flight leg card.
    FlightInfo,
    /// Sightseeing spot card.
    SpotCard,
    /// One entry of a day timeline.
    ItineraryItem,
    /// Hotel card.
    AccommodationCard,
    /// Day number and title header.
    DayHeader,
}

/// The type of content an element contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ElementKind {
    /// A run of styled text.
    Text {
        /// Text content; may contain newlines.
        content: String,
        /// Typography.
        style: TextStyle,
    },

    /// A raster or vector image.
    Image {
        /// Image URL or opaque asset handle.
        src: String,
        /// Fit mode.
        #[serde(default)]
        fit: ObjectFit,
        /// Optional crop in source pixels.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        crop: Option<CropRect>,
        /// Optional adjustments.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filters: Option<ImageFilters>,
    },

    /// A filled rectangle or circle.
    Shape {
        /// Rectangle or circle.
        variant: ShapeVariant,
        /// Fill paint.
        fill: Fill,
        /// Optional outline.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stroke: Option<Stroke>,
        /// Rectangle corner radius.
        #[serde(default)]
        corner_radius: f32,
    },

    /// A decorative asset from the asset library.
    Decoration {
        /// Library category.
        category: String,
        /// Asset identifier within the category.
        asset_id: String,
        /// Resolved asset URL.
        src: String,
        /// Optional recolor.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tint: Option<Color>,
    },

    /// An icon from the asset library.
    Icon {
        /// Library category.
        category: String,
        /// Asset identifier within the category.
        asset_id: String,
        /// Resolved asset URL.
        src: String,
        /// Optional recolor.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tint: Option<Color>,
    },

    /// A compound bundle positioned as a unit.
    Block {
        /// Which block this is.
        block: BlockKind,
        /// Children, positioned relative to the block origin.
        children: Vec<Element>,
    },
}

impl ElementKind {
    /// Short kind name used in logs and canvas user data.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Shape { .. } => "shape",
            Self::Decoration { .. } => "decoration",
            Self::Icon { .. } => "icon",
            Self::Block { .. } => "block",
        }
    }
}

/// Transform for positioning and sizing elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Rotation in degrees, clockwise.
    pub rotation: f32,
    /// Paint order within the page.
    pub z_index: i32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
            z_index: 0,
        }
    }
}

impl Transform {
    /// Position and size without rotation or z-index.
    #[must_use]
    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Self::default()
        }
    }
}

const fn default_opacity() -> f32 {
    1.0
}

const fn default_visible() -> bool {
    true
}

/// A page element with content and transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Human-readable name; generated elements use it as a stable slot key.
    #[serde(default)]
    pub name: String,
    /// Element content type.
    pub kind: ElementKind,
    /// Position, size, rotation and paint order.
    pub transform: Transform,
    /// Opacity in `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Blocks direct manipulation.
    #[serde(default)]
    pub locked: bool,
    /// Excluded from paint and hit-testing when false.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Detached from its data source; regeneration leaves it alone.
    #[serde(default)]
    pub is_unbound: bool,
}

impl Element {
    /// Create a new element with the given kind.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::new(),
            name: String::new(),
            kind,
            transform: Transform::default(),
            opacity: 1.0,
            locked: false,
            visible: true,
            is_unbound: false,
        }
    }

    /// Text element with the given style.
    #[must_use]
    pub fn text(content: impl Into<String>, style: TextStyle) -> Self {
        Self::new(ElementKind::Text {
            content: content.into(),
            style,
        })
    }

    /// Image element with cover fit and no adjustments.
    #[must_use]
    pub fn image(src: impl Into<String>) -> Self {
        Self::new(ElementKind::Image {
            src: src.into(),
            fit: ObjectFit::Cover,
            crop: None,
            filters: None,
        })
    }

    /// Shape element without stroke.
    #[must_use]
    pub fn shape(variant: ShapeVariant, fill: impl Into<Fill>) -> Self {
        Self::new(ElementKind::Shape {
            variant,
            fill: fill.into(),
            stroke: None,
            corner_radius: 0.0,
        })
    }

    /// Set the id.
    #[must_use]
    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = id;
        self
    }

    /// Set the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set position and size, keeping rotation and z-index.
    #[must_use]
    pub fn with_bounds(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.transform.x = x;
        self.transform.y = y;
        self.transform.width = width;
        self.transform.height = height;
        self
    }

    /// Set the opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Mark as unbound from its source.
    #[must_use]
    pub fn unbound(mut self) -> Self {
        self.is_unbound = true;
        self
    }

    /// Element bounds ignoring rotation.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let t = &self.transform;
        Rect::new(t.x, t.y, t.width, t.height)
    }

    /// Check if a point (in page coordinates) is within this element.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        self.bounds().contains(x, y)
    }

    /// Whether direct manipulation is allowed.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.visible && !self.locked
    }

    /// Explode a block into ordinary primitives with absolute positions.
    ///
    /// Non-block elements are returned unchanged. Children inherit the block's
    /// opacity multiplicatively and its bound state.
    #[must_use]
    pub fn flatten_block(self) -> Vec<Element> {
        match self.kind {
            ElementKind::Block { children, .. } => {
                let origin_x = self.transform.x;
                let origin_y = self.transform.y;
                let opacity = self.opacity;
                let is_unbound = self.is_unbound;
                children
                    .into_iter()
                    .map(|mut child| {
                        child.transform.x += origin_x;
                        child.transform.y += origin_y;
                        child.opacity *= opacity;
                        child.is_unbound |= is_unbound;
                        child
                    })
                    .flat_map(Element::flatten_block)
                    .collect()
            }
            kind => vec![Element { kind, ..self }],
        }
    }
}
