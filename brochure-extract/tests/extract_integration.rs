//! Integration tests for DOM extraction (brochure-extract).
//!
//! Tests extraction from a serialized preview page, gradient fills and the
//! z-order and geometry invariants of the result.

use brochure_core::{Color, ColorStop, ElementKind, Fill, Page, PageTemplate, Rect};
use brochure_extract::{extract, ExtractOptions, PerceptualColorMode, SnapshotNode};

const PREVIEW: &str = r#"{
    "tag": "section",
    "rect": { "x": 20, "y": 10, "width": 279.5, "height": 397 },
    "children": [
        {
            "tag": "div",
            "attributes": { "data-element": "shape", "data-name": "hero.mask" },
            "rect": { "x": 20, "y": 10, "width": 279.5, "height": 150 },
            "style": {
                "background-image": "linear-gradient(to bottom, rgba(0, 0, 0, 0), rgba(0, 0, 0, 0.6))",
                "background-color": "rgba(0, 0, 0, 0)"
            }
        },
        {
            "tag": "img",
            "attributes": { "data-element": "image", "src": "hero.jpg" },
            "rect": { "x": 20, "y": 10, "width": 279.5, "height": 150 },
            "currentSrc": "https://cdn.example/hero.jpg",
            "style": { "object-fit": "cover" }
        },
        {
            "tag": "h1",
            "attributes": { "data-element": "text", "data-name": "cover.title" },
            "rect": { "x": 30, "y": 120, "width": 200, "height": 20 },
            "style": {
                "font-family": "\"Noto Serif TC\", serif",
                "font-size": "28px",
                "font-weight": "700",
                "color": "oklch(0.98 0.01 90)"
            },
            "text": "Kyoto ",
            "children": [
                { "tag": "span", "text": "Autumn" }
            ]
        },
        {
            "tag": "div",
            "attributes": { "data-element": "image" },
            "rect": { "x": 0, "y": 0, "width": 10, "height": 10 }
        },
        {
            "tag": "div",
            "children": [
                {
                    "tag": "div",
                    "attributes": { "data-element": "icon", "data-category": "travel", "data-asset": "plane" },
                    "rect": { "x": 40, "y": 300, "width": 12, "height": 12 },
                    "style": { "background-image": "url(\"/icons/plane.svg\")" }
                }
            ]
        }
    ]
}"#;

fn preview() -> SnapshotNode {
    SnapshotNode::from_json(PREVIEW).expect("valid preview snapshot")
}

// ============================================================================
// Snapshot Extraction Tests
// ============================================================================

#[test]
fn test_preview_extracts_in_document_order() {
    let elements = extract(&preview(), &ExtractOptions::with_scale(0.5)).expect("extract");
    let kinds: Vec<_> = elements.iter().map(|e| e.kind.name()).collect();
    assert_eq!(kinds, vec!["shape", "image", "text", "icon"]);
    let zs: Vec<_> = elements.iter().map(|e| e.transform.z_index).collect();
    assert_eq!(zs, vec![1, 2, 3, 4]);
    assert!(elements.iter().all(|e| e.is_unbound));
}

#[test]
fn test_preview_geometry_is_page_space() {
    let elements = extract(&preview(), &ExtractOptions::with_scale(0.5)).expect("extract");
    assert_eq!(elements[0].bounds(), Rect::new(0.0, 0.0, 559.0, 300.0));
    assert_eq!(elements[2].bounds(), Rect::new(20.0, 220.0, 400.0, 40.0));
    assert_eq!(elements[3].bounds(), Rect::new(40.0, 580.0, 24.0, 24.0));
}

#[test]
fn test_preview_text_and_sources() {
    let elements = extract(&preview(), &ExtractOptions::with_scale(0.5)).expect("extract");
    match &elements[1].kind {
        ElementKind::Image { src, .. } => assert_eq!(src, "https://cdn.example/hero.jpg"),
        other => panic!("expected image, got {other:?}"),
    }
    match &elements[2].kind {
        ElementKind::Text { content, style } => {
            assert_eq!(content, "Kyoto Autumn");
            assert_eq!(style.font_family, "Noto Serif TC");
            assert_eq!(style.color, Color::gray(250, 1.0));
        }
        other => panic!("expected text, got {other:?}"),
    }
    match &elements[3].kind {
        ElementKind::Icon {
            category,
            asset_id,
            src,
            ..
        } => {
            assert_eq!(category, "travel");
            assert_eq!(asset_id, "plane");
            assert_eq!(src, "/icons/plane.svg");
        }
        other => panic!("expected icon, got {other:?}"),
    }
}

#[test]
fn test_perceptual_conversion_mode() {
    let options = ExtractOptions::default().with_color_mode(PerceptualColorMode::Convert);
    let elements = extract(&preview(), &options).expect("extract");
    let ElementKind::Text { style, .. } = &elements[2].kind else {
        panic!("expected text");
    };
    // a warm near-white, not a pure gray
    assert!(style.color.r >= style.color.b);
    assert!(style.color.r > 240);
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[test]
fn test_to_bottom_gradient_becomes_two_stop_fill() {
    let elements = extract(&preview(), &ExtractOptions::default()).expect("extract");
    let ElementKind::Shape { fill, .. } = &elements[0].kind else {
        panic!("expected shape");
    };
    let Fill::Gradient(gradient) = fill else {
        panic!("expected gradient, got {fill:?}");
    };
    assert!((gradient.angle - 180.0).abs() < f32::EPSILON);
    assert_eq!(
        gradient.stops,
        vec![
            ColorStop {
                offset: 0.0,
                color: Color::TRANSPARENT
            },
            ColorStop {
                offset: 1.0,
                color: Color::rgba(0, 0, 0, 0.6)
            },
        ]
    );
}

#[test]
fn test_extracted_elements_drop_onto_a_page() {
    let mut page = Page::new(PageTemplate::Custom, 559.0, 794.0);
    for element in extract(&preview(), &ExtractOptions::with_scale(0.5)).expect("extract") {
        page.add_element(element);
    }
    assert_eq!(page.len(), 4);
    assert!(page.is_z_dense());
    assert!(page.element_by_name("cover.title").is_some());
}

// ============================================================================
// Property Tests
// ============================================================================

mod proptest_tests {
    use super::*;
    use brochure_extract::MARKER_ATTRIBUTE;
    use proptest::prelude::*;

    fn arb_node() -> impl Strategy<Value = SnapshotNode> {
        (
            prop_oneof![Just("shape"), Just("text"), Just("image"), Just("chart")],
            0.0f32..500.0,
            0.0f32..500.0,
            1.0f32..200.0,
            1.0f32..200.0,
        )
            .prop_map(|(kind, x, y, w, h)| {
                SnapshotNode::new("div", Rect::new(x, y, w, h))
                    .with_attribute(MARKER_ATTRIBUTE, kind)
                    .with_attribute("data-src", "a.png")
            })
    }

    proptest! {
        #[test]
        fn prop_z_dense_in_document_order(
            nodes in prop::collection::vec(arb_node(), 0..20),
            scale in 0.25f32..4.0,
        ) {
            let mut root = SnapshotNode::new("div", Rect::new(0.0, 0.0, 559.0, 794.0));
            for node in nodes.clone() {
                root = root.with_child(node);
            }
            let elements = extract(&root, &ExtractOptions::with_scale(scale)).expect("extract");
            let known = nodes
                .iter()
                .filter(|n| n.attributes.get(MARKER_ATTRIBUTE).map(String::as_str) != Some("chart"))
                .count();
            prop_assert_eq!(elements.len(), known);
            for (index, element) in elements.iter().enumerate() {
                prop_assert_eq!(element.transform.z_index, i32::try_from(index + 1).unwrap());
                prop_assert!(element.is_unbound);
            }
        }

        #[test]
        fn prop_geometry_divides_by_scale(
            node in arb_node(),
            scale in 0.25f32..4.0,
        ) {
            let rect = node.rect;
            let root = SnapshotNode::new("div", Rect::new(0.0, 0.0, 559.0, 794.0)).with_child(node);
            if let Some(element) = extract(&root, &ExtractOptions::with_scale(scale))
                .expect("extract")
                .first()
            {
                prop_assert!((element.transform.width * scale - rect.width).abs() < 1e-2);
                prop_assert!((element.transform.x * scale - rect.x).abs() < 1e-2);
            }
        }
    }
}
