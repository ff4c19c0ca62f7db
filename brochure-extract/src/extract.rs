//! DOM-to-element conversion.
//!
//! Walks the descendants of a rendered page container and turns every node
//! marked with `data-element` into an [`Element`]. Geometry is taken from
//! the layout box relative to the container and divided by the preview
//! scale; styling is read from the resolved style.

use brochure_core::element::DEFAULT_FONT_FAMILY;
use brochure_core::{
    Color, Element, ElementKind, Fill, FontWeight, IdSource, ObjectFit, Rect, ShapeVariant, Stroke,
    TextStyle, Transform,
};
use serde::{Deserialize, Serialize};

use crate::css::{
    first_font_family, has_underline, is_italic, parse_color, parse_css_url, parse_letter_spacing,
    parse_line_height, parse_linear_gradient, parse_px, parse_text_align, PerceptualColorMode,
};
use crate::dom::DomNode;
use crate::error::{ExtractError, ExtractResult};

/// Attribute that marks a node for extraction.
pub const MARKER_ATTRIBUTE: &str = "data-element";

/// Font size used when the resolved style has none.
const FALLBACK_FONT_SIZE: f32 = 16.0;

/// What a marked node becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementMarker {
    /// `data-element="text"`.
    Text,
    /// `data-element="image"`.
    Image,
    /// `data-element="shape"`.
    Shape,
    /// `data-element="decoration"`.
    Decoration,
    /// `data-element="icon"`.
    Icon,
}

impl ElementMarker {
    /// Parse a marker value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            "shape" => Some(Self::Shape),
            "decoration" => Some(Self::Decoration),
            "icon" => Some(Self::Icon),
            _ => None,
        }
    }

    /// Marker value as written in the DOM.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Shape => "shape",
            Self::Decoration => "decoration",
            Self::Icon => "icon",
        }
    }
}

/// Extraction settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Preview scale applied to the container; layout boxes are divided by it.
    pub scale: f32,
    /// How perceptual color spaces are reduced to sRGB.
    pub color_mode: PerceptualColorMode,
    /// Derive element ids from this seed instead of minting random ones.
    pub seed: Option<u64>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            color_mode: PerceptualColorMode::default(),
            seed: None,
        }
    }
}

impl ExtractOptions {
    /// Options for a preview rendered at `scale`.
    #[must_use]
    pub fn with_scale(scale: f32) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    /// Use deterministic ids.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Choose the perceptual color handling.
    #[must_use]
    pub fn with_color_mode(mut self, mode: PerceptualColorMode) -> Self {
        self.color_mode = mode;
        self
    }
}

/// Convert the marked descendants of `container` into elements.
///
/// Elements come back in document order with dense z-indices starting at 1.
/// All of them are unbound: they no longer follow the trip data that
/// produced the DOM. Nodes that cannot be converted, such as an image with
/// no resolvable source, are skipped and logged at debug level.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidScale`] if the scale is not finite and
/// positive.
pub fn extract<N: DomNode>(container: &N, options: &ExtractOptions) -> ExtractResult<Vec<Element>> {
    if !options.scale.is_finite() || options.scale <= 0.0 {
        return Err(ExtractError::InvalidScale(options.scale));
    }
    let mut extractor = Extractor {
        origin: container.bounding_rect(),
        options,
        ids: options.seed.map_or(IdSource::Random, IdSource::seeded),
        elements: Vec::new(),
        skipped: 0,
    };
    for child in container.children() {
        extractor.visit(child);
    }
    tracing::debug!(
        extracted = extractor.elements.len(),
        skipped = extractor.skipped,
        "extracted elements from DOM"
    );
    Ok(extractor.elements)
}

struct Extractor<'a> {
    origin: Rect,
    options: &'a ExtractOptions,
    ids: IdSource,
    elements: Vec<Element>,
    skipped: usize,
}

impl Extractor<'_> {
    fn visit<N: DomNode>(&mut self, node: &N) {
        if let Some(value) = node.attribute(MARKER_ATTRIBUTE) {
            match ElementMarker::parse(value) {
                Some(marker) => self.convert(node, marker),
                None => {
                    tracing::debug!(
                        marker = value,
                        tag = node.tag_name(),
                        "unknown element marker"
                    );
                    self.skipped += 1;
                }
            }
        }
        for child in node.children() {
            self.visit(child);
        }
    }

    fn convert<N: DomNode>(&mut self, node: &N, marker: ElementMarker) {
        let kind = match marker {
            ElementMarker::Text => Some(self.text_kind(node)),
            ElementMarker::Image => resolve_source(node).map(|src| ElementKind::Image {
                src,
                fit: object_fit(node),
                crop: None,
                filters: None,
            }),
            ElementMarker::Shape => Some(self.shape_kind(node)),
            ElementMarker::Decoration => {
                resolve_source(node).map(|src| ElementKind::Decoration {
                    category: node.attribute("data-category").unwrap_or_default().to_string(),
                    asset_id: node.attribute("data-asset").unwrap_or_default().to_string(),
                    src,
                    tint: None,
                })
            }
            ElementMarker::Icon => resolve_source(node).map(|src| ElementKind::Icon {
                category: node.attribute("data-category").unwrap_or_default().to_string(),
                asset_id: node.attribute("data-asset").unwrap_or_default().to_string(),
                src,
                tint: None,
            }),
        };
        let Some(kind) = kind else {
            tracing::debug!(
                marker = marker.as_str(),
                tag = node.tag_name(),
                "no resolvable source, element omitted"
            );
            self.skipped += 1;
            return;
        };

        let z_index = i32::try_from(self.elements.len() + 1).unwrap_or(i32::MAX);
        let name = node.attribute("data-name").map_or_else(
            || format!("{}-{z_index}", marker.as_str()),
            str::to_string,
        );
        let mut element = Element::new(kind)
            .with_id(self.ids.next_id())
            .with_name(name)
            .with_transform(Transform {
                z_index,
                ..self.transform_of(node)
            })
            .unbound();
        if let Some(opacity) = node.computed_style("opacity").and_then(parse_px) {
            element = element.with_opacity(opacity);
        }
        if node
            .computed_style("visibility")
            .is_some_and(|v| v.trim() == "hidden")
        {
            element.visible = false;
        }
        self.elements.push(element);
    }

    fn transform_of<N: DomNode>(&self, node: &N) -> Transform {
        let rect = node.bounding_rect();
        let scale = self.options.scale;
        Transform::rect(
            (rect.x - self.origin.x) / scale,
            (rect.y - self.origin.y) / scale,
            rect.width / scale,
            rect.height / scale,
        )
    }

    fn color(&self, value: Option<&str>) -> Option<Color> {
        value.and_then(|v| parse_color(v, self.options.color_mode))
    }

    fn text_kind<N: DomNode>(&self, node: &N) -> ElementKind {
        let defaults = TextStyle::default();
        let font_size = node
            .computed_style("font-size")
            .and_then(parse_px)
            .filter(|size| *size > 0.0)
            .unwrap_or(FALLBACK_FONT_SIZE);
        let decoration = node
            .computed_style("text-decoration-line")
            .or_else(|| node.computed_style("text-decoration"));
        let style = TextStyle {
            font_family: node
                .computed_style("font-family")
                .and_then(first_font_family)
                .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
            font_size,
            font_weight: node
                .computed_style("font-weight")
                .and_then(FontWeight::parse)
                .unwrap_or_default(),
            italic: node.computed_style("font-style").is_some_and(is_italic),
            align: node
                .computed_style("text-align")
                .map(parse_text_align)
                .unwrap_or_default(),
            line_height: node
                .computed_style("line-height")
                .map_or(defaults.line_height, |v| parse_line_height(v, font_size)),
            letter_spacing: node
                .computed_style("letter-spacing")
                .map_or(0.0, parse_letter_spacing),
            color: self
                .color(node.computed_style("color"))
                .unwrap_or(defaults.color),
            underline: decoration.is_some_and(has_underline),
        };
        ElementKind::Text {
            content: node.text_content().trim().to_string(),
            style,
        }
    }

    fn shape_kind<N: DomNode>(&self, node: &N) -> ElementKind {
        let rect = node.bounding_rect();
        let radius = node.computed_style("border-radius").unwrap_or_default().trim();
        let radius_px = parse_px(radius).unwrap_or(0.0);
        let min_side = (rect.width / self.options.scale).min(rect.height / self.options.scale);
        let round = radius.ends_with('%')
            && radius
                .trim_end_matches('%')
                .parse::<f32>()
                .is_ok_and(|pct| pct >= 50.0);
        let square = (rect.width - rect.height).abs() <= 0.5;
        let variant = if square && (round || (min_side > 0.0 && radius_px >= min_side / 2.0)) {
            ShapeVariant::Circle
        } else {
            ShapeVariant::Rectangle
        };

        let fill = node
            .computed_style("background-image")
            .and_then(|bg| parse_linear_gradient(bg, self.options.color_mode))
            .map(Fill::Gradient)
            .or_else(|| {
                self.color(node.computed_style("background-color"))
                    .map(Fill::Solid)
            })
            .unwrap_or_default();

        let stroke = node
            .computed_style("border-width")
            .and_then(parse_px)
            .filter(|width| *width > 0.0)
            .filter(|_| {
                !node
                    .computed_style("border-style")
                    .is_some_and(|style| matches!(style.trim(), "none" | "hidden"))
            })
            .and_then(|width| {
                self.color(node.computed_style("border-color"))
                    .filter(|color| !color.is_transparent())
                    .map(|color| Stroke { color, width })
            });

        ElementKind::Shape {
            variant,
            fill,
            stroke,
            corner_radius: if variant == ShapeVariant::Rectangle {
                radius_px.max(0.0)
            } else {
                0.0
            },
        }
    }
}

/// Resolve an image source: explicit override, loaded `<img>` source, then
/// the background image URL.
fn resolve_source<N: DomNode>(node: &N) -> Option<String> {
    let non_empty = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };
    if let Some(src) = node.attribute("data-src").and_then(non_empty) {
        return Some(src);
    }
    if node.tag_name().eq_ignore_ascii_case("img") {
        if let Some(src) = node
            .current_src()
            .and_then(non_empty)
            .or_else(|| node.attribute("src").and_then(non_empty))
        {
            return Some(src);
        }
    }
    node.computed_style("background-image").and_then(parse_css_url)
}

fn object_fit<N: DomNode>(node: &N) -> ObjectFit {
    let value = node
        .computed_style("object-fit")
        .or_else(|| node.computed_style("background-size"))
        .unwrap_or_default();
    match value.trim() {
        "contain" => ObjectFit::Contain,
        "fill" => ObjectFit::Fill,
        _ => ObjectFit::Cover,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::SnapshotNode;

    fn container() -> SnapshotNode {
        SnapshotNode::new("div", Rect::new(100.0, 50.0, 559.0, 794.0))
    }

    fn marked(kind: &str, x: f32, y: f32, w: f32, h: f32) -> SnapshotNode {
        SnapshotNode::new("div", Rect::new(x, y, w, h)).with_attribute(MARKER_ATTRIBUTE, kind)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_geometry_is_container_relative_and_unscaled() {
        let root = SnapshotNode::new("div", Rect::new(100.0, 50.0, 279.5, 397.0))
            .with_child(marked("shape", 120.0, 70.0, 40.0, 30.0));
        let elements = extract(&root, &ExtractOptions::with_scale(0.5)).expect("extract");
        let t = elements[0].transform;
        assert!(close(t.x, 40.0));
        assert!(close(t.y, 40.0));
        assert!(close(t.width, 80.0));
        assert!(close(t.height, 60.0));
    }

    #[test]
    fn test_invalid_scale_is_an_error() {
        for scale in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                extract(&container(), &ExtractOptions::with_scale(scale)),
                Err(ExtractError::InvalidScale(_))
            ));
        }
    }

    #[test]
    fn test_text_style_mapping() {
        let node = marked("text", 110.0, 60.0, 200.0, 30.0)
            .with_attribute("data-name", "day.title")
            .with_text("  Day 1 \n")
            .with_style("font-family", "\"Noto Serif TC\", serif")
            .with_style("font-size", "20px")
            .with_style("font-weight", "650")
            .with_style("font-style", "italic")
            .with_style("text-align", "end")
            .with_style("line-height", "30px")
            .with_style("letter-spacing", "normal")
            .with_style("color", "rgb(13, 148, 136)")
            .with_style("text-decoration-line", "underline");
        let elements = extract(&container().with_child(node), &ExtractOptions::default())
            .expect("extract");
        let element = &elements[0];
        assert_eq!(element.name, "day.title");
        let ElementKind::Text { content, style } = &element.kind else {
            panic!("expected text, got {:?}", element.kind);
        };
        assert_eq!(content, "Day 1");
        assert_eq!(style.font_family, "Noto Serif TC");
        assert!(close(style.font_size, 20.0));
        assert_eq!(style.font_weight, FontWeight::Bold);
        assert!(style.italic);
        assert_eq!(style.align, brochure_core::TextAlign::Right);
        assert!(close(style.line_height, 1.5));
        assert!(close(style.letter_spacing, 0.0));
        assert_eq!(style.color, Color::rgb(13, 148, 136));
        assert!(style.underline);
    }

    #[test]
    fn test_text_defaults_for_missing_style() {
        let elements = extract(
            &container().with_child(marked("text", 0.0, 0.0, 10.0, 10.0).with_text("x")),
            &ExtractOptions::default(),
        )
        .expect("extract");
        let ElementKind::Text { style, .. } = &elements[0].kind else {
            panic!("expected text");
        };
        assert!(close(style.font_size, 16.0));
        assert!(close(style.line_height, 1.2));
        assert_eq!(style.font_weight, FontWeight::Normal);
        assert_eq!(style.font_family, DEFAULT_FONT_FAMILY);
    }

    #[test]
    fn test_image_source_resolution_order() {
        let override_src = SnapshotNode::new("img", Rect::new(0.0, 0.0, 10.0, 10.0))
            .with_attribute(MARKER_ATTRIBUTE, "image")
            .with_attribute("data-src", "asset://hero")
            .with_attribute("src", "hero.jpg");
        let mut loaded = SnapshotNode::new("img", Rect::new(0.0, 0.0, 10.0, 10.0))
            .with_attribute(MARKER_ATTRIBUTE, "image")
            .with_attribute("src", "hero.jpg");
        loaded.current_src = Some("https://cdn/hero@2x.jpg".into());
        let plain = SnapshotNode::new("img", Rect::new(0.0, 0.0, 10.0, 10.0))
            .with_attribute(MARKER_ATTRIBUTE, "image")
            .with_attribute("src", "hero.jpg");
        let background = marked("image", 0.0, 0.0, 10.0, 10.0)
            .with_style("background-image", "url(\"bg.png\")")
            .with_style("background-size", "contain");

        let root = container()
            .with_child(override_src)
            .with_child(loaded)
            .with_child(plain)
            .with_child(background);
        let sources: Vec<_> = extract(&root, &ExtractOptions::default())
            .expect("extract")
            .into_iter()
            .map(|e| match e.kind {
                ElementKind::Image { src, fit, .. } => (src, fit),
                other => panic!("expected image, got {other:?}"),
            })
            .collect();
        assert_eq!(
            sources,
            vec![
                ("asset://hero".to_string(), ObjectFit::Cover),
                ("https://cdn/hero@2x.jpg".to_string(), ObjectFit::Cover),
                ("hero.jpg".to_string(), ObjectFit::Cover),
                ("bg.png".to_string(), ObjectFit::Contain),
            ]
        );
    }

    #[test]
    fn test_unresolvable_image_is_dropped() {
        let root = container()
            .with_child(marked("image", 0.0, 0.0, 10.0, 10.0))
            .with_child(marked("icon", 0.0, 0.0, 10.0, 10.0).with_style("background-image", "none"))
            .with_child(marked("shape", 0.0, 0.0, 10.0, 10.0));
        let elements = extract(&root, &ExtractOptions::default()).expect("extract");
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].kind.name(), "shape");
        assert_eq!(elements[0].transform.z_index, 1);
    }

    #[test]
    fn test_decoration_carries_asset_attributes() {
        let node = marked("decoration", 0.0, 0.0, 30.0, 30.0)
            .with_attribute("data-category", "floral")
            .with_attribute("data-asset", "sakura-01")
            .with_attribute("data-src", "/assets/floral/sakura-01.svg");
        let elements = extract(&container().with_child(node), &ExtractOptions::default())
            .expect("extract");
        assert_eq!(
            elements[0].kind,
            ElementKind::Decoration {
                category: "floral".into(),
                asset_id: "sakura-01".into(),
                src: "/assets/floral/sakura-01.svg".into(),
                tint: None,
            }
        );
    }

    #[test]
    fn test_shape_gradient_falls_back_to_background_color() {
        let node = marked("shape", 0.0, 0.0, 100.0, 40.0)
            .with_style("background-image", "linear-gradient(to right, red)")
            .with_style("background-color", "#0d9488")
            .with_style("border-radius", "8px");
        let elements = extract(&container().with_child(node), &ExtractOptions::default())
            .expect("extract");
        let ElementKind::Shape {
            variant,
            fill,
            corner_radius,
            stroke,
        } = &elements[0].kind
        else {
            panic!("expected shape");
        };
        assert_eq!(*variant, ShapeVariant::Rectangle);
        assert_eq!(*fill, Fill::Solid(Color::rgb(13, 148, 136)));
        assert!(close(*corner_radius, 8.0));
        assert!(stroke.is_none());
    }

    #[test]
    fn test_round_square_is_a_circle_with_stroke() {
        let node = marked("shape", 0.0, 0.0, 40.0, 40.0)
            .with_style("border-radius", "50%")
            .with_style("border-width", "2px")
            .with_style("border-style", "solid")
            .with_style("border-color", "rgb(255, 255, 255)");
        let elements = extract(&container().with_child(node), &ExtractOptions::default())
            .expect("extract");
        let ElementKind::Shape {
            variant, stroke, ..
        } = &elements[0].kind
        else {
            panic!("expected shape");
        };
        assert_eq!(*variant, ShapeVariant::Circle);
        assert_eq!(
            *stroke,
            Some(Stroke {
                color: Color::WHITE,
                width: 2.0
            })
        );
    }

    #[test]
    fn test_unknown_marker_is_skipped_but_children_visited() {
        let root = container().with_child(
            marked("chart", 0.0, 0.0, 10.0, 10.0).with_child(marked("text", 0.0, 0.0, 5.0, 5.0)),
        );
        let elements = extract(&root, &ExtractOptions::default()).expect("extract");
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].name, "text-1");
    }

    #[test]
    fn test_elements_are_unbound_with_opacity_and_visibility() {
        let node = marked("shape", 0.0, 0.0, 10.0, 10.0)
            .with_style("opacity", "0.4")
            .with_style("visibility", "hidden");
        let elements = extract(&container().with_child(node), &ExtractOptions::default())
            .expect("extract");
        assert!(elements[0].is_unbound);
        assert!(!elements[0].visible);
        assert!(close(elements[0].opacity, 0.4));
    }

    #[test]
    fn test_seeded_ids_are_deterministic() {
        let root = container()
            .with_child(marked("shape", 0.0, 0.0, 10.0, 10.0))
            .with_child(marked("shape", 5.0, 0.0, 10.0, 10.0));
        let options = ExtractOptions::default().with_seed(9);
        let a = extract(&root, &options).expect("extract");
        let b = extract(&root, &options).expect("extract");
        assert_eq!(a, b);
        assert_ne!(a[0].id, a[1].id);
    }
}
