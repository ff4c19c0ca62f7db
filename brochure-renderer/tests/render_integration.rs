//! Rendering Integration Tests
//!
//! Tests the page-to-canvas diff through the public API:
//! - Editable and read-only renders paint identically
//! - Re-rendering an unchanged page causes no churn
//! - Stale objects are removed and stacking follows paint order

use brochure_core::itinerary::{Activity, Hotel, ItineraryDay};
use brochure_core::{
    Color, DataSnapshot, Element, Itinerary, Page, PageTemplate, ShapeVariant, TextStyle,
    ZOrderChange,
};
use brochure_renderer::{
    render, HostCanvas, ObjectHandle, ObjectPaint, RenderOptions, RetainedCanvas,
};
use brochure_themes::{GenerateOptions, ThemeRegistry};

fn itinerary() -> Itinerary {
    Itinerary {
        id: "trip-7".into(),
        country: Some("Japan".into()),
        city: Some("Osaka".into()),
        departure_date: Some("2024-10-03".into()),
        daily_itinerary: vec![ItineraryDay {
            title: Some("Castle and markets".into()),
            activities: vec![
                Activity {
                    title: "Osaka Castle".into(),
                    image: Some("castle.jpg".into()),
                    ..Activity::default()
                },
                Activity {
                    title: "Kuromon Market".into(),
                    ..Activity::default()
                },
            ],
            ..ItineraryDay::default()
        }],
        hotels: vec![Hotel {
            name: "Bay Hotel".into(),
            image: Some("bay.jpg".into()),
            days: vec![1],
            ..Hotel::default()
        }],
        ..Itinerary::default()
    }
}

fn generated_page(theme: &str, template: PageTemplate) -> Page {
    let snapshot = DataSnapshot::from_itinerary(&itinerary(), template, Some(0));
    let elements = ThemeRegistry::builtin()
        .generate(theme, template, &snapshot, &GenerateOptions::default().with_seed(3))
        .expect("builtin theme");
    let mut page = Page::new(template, 559.0, 794.0).with_snapshot(snapshot);
    page.elements = elements;
    page
}

fn paints(canvas: &RetainedCanvas) -> Vec<ObjectPaint> {
    canvas
        .objects()
        .into_iter()
        .map(|(_, object)| object.paint().clone())
        .collect()
}

fn handles(canvas: &RetainedCanvas) -> Vec<ObjectHandle> {
    canvas.objects().into_iter().map(|(handle, _)| handle).collect()
}

fn shape(x: f32) -> Element {
    Element::shape(ShapeVariant::Rectangle, Color::BLACK).with_bounds(x, 10.0, 40.0, 40.0)
}

// ============================================================================
// WYSIWYG Tests
// ============================================================================

#[test]
fn test_editable_and_read_only_paint_identically() {
    for theme in ["classic", "modern"] {
        for template in PageTemplate::ALL {
            let page = generated_page(theme, template);
            let mut editable = RetainedCanvas::new();
            let mut read_only = RetainedCanvas::new();
            editable.set_natural_size("castle.jpg", 1200.0, 800.0);
            read_only.set_natural_size("castle.jpg", 1200.0, 800.0);

            render(&mut editable, &page, &RenderOptions::editable(&page));
            render(&mut read_only, &page, &RenderOptions::read_only(&page));

            assert_eq!(paints(&editable), paints(&read_only), "{theme}/{template:?}");
            assert!(read_only
                .objects()
                .iter()
                .all(|(_, o)| !o.interaction.selectable && !o.interaction.evented));
        }
    }
}

#[test]
fn test_canvas_objects_carry_element_ids() {
    let page = generated_page("classic", PageTemplate::Cover);
    let mut canvas = RetainedCanvas::new();
    render(&mut canvas, &page, &RenderOptions::editable(&page));
    let on_canvas: Vec<_> = canvas.objects().iter().map(|(_, o)| o.element_id).collect();
    let in_page: Vec<_> = page.paint_order().iter().map(|e| e.id).collect();
    assert_eq!(on_canvas, in_page);
}

// ============================================================================
// Idempotence Tests
// ============================================================================

#[test]
fn test_second_render_is_noop() {
    let page = generated_page("modern", PageTemplate::DailyRight);
    let mut canvas = RetainedCanvas::new();
    let first = render(&mut canvas, &page, &RenderOptions::editable(&page));
    assert_eq!(first.added, page.len());
    let before = handles(&canvas);
    canvas.reset_counters();

    let second = render(&mut canvas, &page, &RenderOptions::editable(&page));
    assert!(second.is_noop(), "{second:?}");
    assert_eq!(second.unchanged, page.len());
    assert_eq!(handles(&canvas), before);
    assert_eq!(canvas.counters().adds, 0);
    assert_eq!(canvas.counters().updates, 0);
    assert_eq!(canvas.counters().removes, 0);
}

#[test]
fn test_changed_element_updates_in_place() {
    let mut page = Page::new(PageTemplate::Custom, 559.0, 794.0);
    let a = page.add_element(shape(0.0));
    page.add_element(shape(100.0));
    let mut canvas = RetainedCanvas::new();
    render(&mut canvas, &page, &RenderOptions::editable(&page));
    let before = handles(&canvas);

    if let Some(element) = page.element_mut(a) {
        element.opacity = 0.5;
    }
    let stats = render(&mut canvas, &page, &RenderOptions::editable(&page));
    assert_eq!(stats.updated, 1);
    assert_eq!(stats.unchanged, 1);
    assert_eq!(stats.added + stats.removed, 0);
    assert_eq!(handles(&canvas), before);
}

#[test]
fn test_stale_and_duplicate_objects_removed() {
    let mut page = Page::new(PageTemplate::Custom, 559.0, 794.0);
    let a = page.add_element(shape(0.0));
    let b = page.add_element(shape(100.0));
    let mut canvas = RetainedCanvas::new();
    render(&mut canvas, &page, &RenderOptions::editable(&page));

    // a second object claiming the same element
    let duplicate = canvas
        .get(canvas.handles_for(a)[0])
        .cloned()
        .expect("object for a");
    canvas.add(duplicate);

    page.remove_element(b).expect("b exists");
    let stats = render(&mut canvas, &page, &RenderOptions::editable(&page));
    assert_eq!(stats.removed, 2);
    assert_eq!(canvas.len(), 1);
    assert_eq!(canvas.handles_for(a).len(), 1);
}

#[test]
fn test_restack_follows_paint_order() {
    let mut page = Page::new(PageTemplate::Custom, 559.0, 794.0);
    let a = page.add_element(shape(0.0));
    let b = page.add_element(shape(100.0));
    let c = page.add_element(shape(200.0));
    let mut canvas = RetainedCanvas::new();
    render(&mut canvas, &page, &RenderOptions::editable(&page));

    page.reorder_element(a, ZOrderChange::BringToFront)
        .expect("a exists");
    let stats = render(&mut canvas, &page, &RenderOptions::editable(&page));
    assert!(stats.restacked > 0);
    assert_eq!(stats.added + stats.updated + stats.removed, 0);
    let order: Vec<_> = canvas.objects().iter().map(|(_, o)| o.element_id).collect();
    assert_eq!(order, vec![b, c, a]);
}

#[test]
fn test_invisible_element_keeps_its_object() {
    let mut page = Page::new(PageTemplate::Custom, 559.0, 794.0);
    let id = page.add_element(Element::text("Caption", TextStyle::default()));
    let mut canvas = RetainedCanvas::new();
    render(&mut canvas, &page, &RenderOptions::editable(&page));
    let handle = canvas.handles_for(id)[0];

    if let Some(element) = page.element_mut(id) {
        element.visible = false;
    }
    render(&mut canvas, &page, &RenderOptions::editable(&page));
    assert_eq!(canvas.handles_for(id), vec![handle]);
    assert!(!canvas.get(handle).expect("object").paint.visible);
    assert_eq!(canvas.object_at(10.0, 10.0), None);
}

#[test]
fn test_render_sets_surface() {
    let page = Page::new(PageTemplate::Custom, 300.0, 200.0).with_background(Color::rgb(1, 2, 3));
    let mut canvas = RetainedCanvas::new();
    render(&mut canvas, &page, &RenderOptions::read_only(&page));
    assert_eq!(canvas.size(), (300.0, 200.0));
    assert_eq!(canvas.background(), Color::rgb(1, 2, 3));
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[test]
fn test_three_shapes_get_sequential_z() {
    let mut page = Page::new(PageTemplate::Custom, 559.0, 794.0);
    let ids: Vec<_> = (0..3).map(|i| page.add_element(shape(i as f32 * 50.0))).collect();
    let zs: Vec<i32> = ids
        .iter()
        .map(|id| page.element(*id).map_or(0, |e| e.transform.z_index))
        .collect();
    assert_eq!(zs, vec![1, 2, 3]);

    let mut canvas = RetainedCanvas::new();
    render(&mut canvas, &page, &RenderOptions::editable(&page));
    let order: Vec<_> = canvas.objects().iter().map(|(_, o)| o.element_id).collect();
    assert_eq!(order, ids);
}

// ============================================================================
// Property Tests
// ============================================================================

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Add(f32),
        Remove(usize),
        Front(usize),
        Back(usize),
        Hide(usize),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0.0f32..500.0).prop_map(Op::Add),
            (0usize..16).prop_map(Op::Remove),
            (0usize..16).prop_map(Op::Front),
            (0usize..16).prop_map(Op::Back),
            (0usize..16).prop_map(Op::Hide),
        ]
    }

    fn apply(page: &mut Page, op: &Op) {
        let pick = |page: &Page, i: usize| {
            if page.elements.is_empty() {
                None
            } else {
                Some(page.elements[i % page.elements.len()].id)
            }
        };
        match op {
            Op::Add(x) => {
                page.add_element(shape(*x));
            }
            Op::Remove(i) => {
                if let Some(id) = pick(page, *i) {
                    page.remove_element(id).expect("picked id exists");
                }
            }
            Op::Front(i) => {
                if let Some(id) = pick(page, *i) {
                    page.reorder_element(id, ZOrderChange::BringToFront)
                        .expect("picked id exists");
                }
            }
            Op::Back(i) => {
                if let Some(id) = pick(page, *i) {
                    page.reorder_element(id, ZOrderChange::SendToBack)
                        .expect("picked id exists");
                }
            }
            Op::Hide(i) => {
                if let Some(id) = pick(page, *i) {
                    if let Some(element) = page.element_mut(id) {
                        element.visible = !element.visible;
                    }
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_render_converges_after_edits(ops in prop::collection::vec(arb_op(), 0..40)) {
            let mut page = Page::new(PageTemplate::Custom, 559.0, 794.0);
            let mut canvas = RetainedCanvas::new();
            for op in &ops {
                apply(&mut page, op);
                render(&mut canvas, &page, &RenderOptions::editable(&page));
                prop_assert!(page.is_z_dense());
            }
            let before = handles(&canvas);
            let again = render(&mut canvas, &page, &RenderOptions::editable(&page));
            prop_assert!(again.is_noop());
            prop_assert_eq!(handles(&canvas), before);

            let order: Vec<_> = canvas.objects().iter().map(|(_, o)| o.element_id).collect();
            let expected: Vec<_> = page.paint_order().iter().map(|e| e.id).collect();
            prop_assert_eq!(order, expected);
        }
    }
}
