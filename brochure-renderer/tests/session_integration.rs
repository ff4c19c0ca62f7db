//! Editor Session Integration Tests
//!
//! Drives the selection and gesture state machine the way a host canvas does:
//! - Click selection and clearing
//! - Gesture completion commits exactly one geometry update
//! - Create, delete, reorder and toggle operations
//! - Dispose hands back an empty canvas

use brochure_core::{Color, Element, ElementId, Fill, Page, PageTemplate, ShapeVariant};
use brochure_renderer::{
    CanvasEvent, EditorKey, EditorSession, GestureKind, HostCanvas, ObjectHandle,
    ResolvedGeometry, RetainedCanvas, SessionState, SyncEvent,
};

fn page_with_square() -> (Page, ElementId) {
    let mut page = Page::new(PageTemplate::Custom, 559.0, 794.0);
    let id = page.add_element(
        Element::shape(ShapeVariant::Rectangle, Color::BLACK).with_bounds(100.0, 100.0, 50.0, 50.0),
    );
    (page, id)
}

fn handle_of(session: &EditorSession<RetainedCanvas>, id: ElementId) -> ObjectHandle {
    session.canvas().handles_for(id)[0]
}

fn select(session: &mut EditorSession<RetainedCanvas>, page: &mut Page, x: f32, y: f32) -> Vec<SyncEvent> {
    let mut events = session.handle_event(page, CanvasEvent::PointerDown { x, y });
    events.extend(session.handle_event(page, CanvasEvent::PointerUp { x, y }));
    events
}

fn updates(events: &[SyncEvent]) -> Vec<&SyncEvent> {
    events
        .iter()
        .filter(|e| matches!(e, SyncEvent::ElementUpdated { .. }))
        .collect()
}

// ============================================================================
// Selection Tests
// ============================================================================

#[test]
fn test_click_selects_and_escape_clears() {
    let (mut page, id) = page_with_square();
    let mut session = EditorSession::open(RetainedCanvas::new(), &page);

    let down = session.handle_event(&mut page, CanvasEvent::PointerDown { x: 120.0, y: 120.0 });
    assert!(down.is_empty());
    assert!(matches!(session.state(), SessionState::Selecting { element, .. } if element == id));

    let up = session.handle_event(&mut page, CanvasEvent::PointerUp { x: 120.0, y: 120.0 });
    assert_eq!(up, vec![SyncEvent::SelectionChanged { id: Some(id) }]);
    assert_eq!(session.selected(), Some(id));
    assert_eq!(session.canvas().active(), Some(handle_of(&session, id)));

    let cleared = session.handle_event(
        &mut page,
        CanvasEvent::KeyDown {
            key: EditorKey::Escape,
        },
    );
    assert_eq!(cleared, vec![SyncEvent::SelectionChanged { id: None }]);
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.canvas().active(), None);
}

#[test]
fn test_click_on_empty_canvas_clears_selection() {
    let (mut page, id) = page_with_square();
    let mut session = EditorSession::open(RetainedCanvas::new(), &page);
    select(&mut session, &mut page, 120.0, 120.0);
    assert_eq!(session.selected(), Some(id));

    let events = session.handle_event(&mut page, CanvasEvent::PointerDown { x: 400.0, y: 600.0 });
    assert_eq!(events, vec![SyncEvent::SelectionChanged { id: None }]);
    assert_eq!(session.selected(), None);
}

#[test]
fn test_locked_elements_are_not_hit_targets() {
    let (mut page, id) = page_with_square();
    let mut session = EditorSession::open(RetainedCanvas::new(), &page);
    session.toggle_lock(&mut page, id);

    let events = select(&mut session, &mut page, 120.0, 120.0);
    assert!(!events.contains(&SyncEvent::SelectionChanged { id: Some(id) }));
    assert_eq!(session.selected(), None);

    let handle = handle_of(&session, id);
    let gesture = session.handle_event(
        &mut page,
        CanvasEvent::Gesture {
            handle,
            kind: GestureKind::Move,
        },
    );
    assert!(gesture.is_empty());
}

// ============================================================================
// Gesture Tests
// ============================================================================

#[test]
fn test_drag_commits_one_absolute_update() {
    let (mut page, id) = page_with_square();
    let mut session = EditorSession::open(RetainedCanvas::new(), &page);
    let handle = handle_of(&session, id);
    select(&mut session, &mut page, 120.0, 120.0);

    for _ in 0..5 {
        session.canvas_mut().move_by(handle, 2.0, 2.0);
        let events = session.handle_event(
            &mut page,
            CanvasEvent::Gesture {
                handle,
                kind: GestureKind::Move,
            },
        );
        assert!(updates(&events).is_empty(), "no commit while transforming");
        let x = page.element(id).map(|e| e.transform.x);
        assert_eq!(x, Some(100.0));
    }
    assert!(matches!(session.state(), SessionState::Transforming { .. }));

    let events = session.handle_event(&mut page, CanvasEvent::ObjectModified { handle });
    let committed = updates(&events);
    assert_eq!(committed.len(), 1);
    let SyncEvent::ElementUpdated { id: updated, update } = committed[0] else {
        panic!("expected an element update");
    };
    assert_eq!(*updated, id);
    assert!((update.x - 110.0).abs() < f32::EPSILON);
    assert!((update.y - 110.0).abs() < f32::EPSILON);
    assert!((update.width - 50.0).abs() < f32::EPSILON);

    let t = page.element(id).map(|e| e.transform).expect("element");
    assert!((t.x - 110.0).abs() < f32::EPSILON);
    assert!((t.y - 110.0).abs() < f32::EPSILON);
    assert!(matches!(session.state(), SessionState::Selected { element, .. } if element == id));
    let paint = &session.canvas().get(handle).expect("object").paint;
    assert!((paint.left - 110.0).abs() < f32::EPSILON);
}

#[test]
fn test_pointer_up_then_modified_commits_once() {
    let (mut page, id) = page_with_square();
    let mut session = EditorSession::open(RetainedCanvas::new(), &page);
    let handle = handle_of(&session, id);

    let mut events = session.handle_event(&mut page, CanvasEvent::PointerDown { x: 120.0, y: 120.0 });
    session.canvas_mut().move_by(handle, 10.0, 10.0);
    events.extend(session.handle_event(
        &mut page,
        CanvasEvent::Gesture {
            handle,
            kind: GestureKind::Move,
        },
    ));
    events.extend(session.handle_event(&mut page, CanvasEvent::PointerUp { x: 130.0, y: 130.0 }));
    events.extend(session.handle_event(&mut page, CanvasEvent::ObjectModified { handle }));

    let committed = updates(&events);
    assert_eq!(committed.len(), 1);
    let SyncEvent::ElementUpdated { update, .. } = committed[0] else {
        panic!("expected an element update");
    };
    assert!((update.x - 110.0).abs() < f32::EPSILON);
    assert!((update.y - 110.0).abs() < f32::EPSILON);
    assert!(matches!(session.state(), SessionState::Selected { element, .. } if element == id));

    // the next gesture commits again
    session.canvas_mut().move_by(handle, 5.0, 0.0);
    session.handle_event(
        &mut page,
        CanvasEvent::Gesture {
            handle,
            kind: GestureKind::Move,
        },
    );
    let mut second = session.handle_event(&mut page, CanvasEvent::PointerUp { x: 0.0, y: 0.0 });
    second.extend(session.handle_event(&mut page, CanvasEvent::ObjectModified { handle }));
    assert_eq!(updates(&second).len(), 1);
    let t = page.element(id).map(|e| e.transform).expect("element");
    assert!((t.x - 115.0).abs() < f32::EPSILON);
}

#[test]
fn test_modified_outside_gesture_is_ignored() {
    let (mut page, id) = page_with_square();
    let mut session = EditorSession::open(RetainedCanvas::new(), &page);
    let handle = handle_of(&session, id);

    session.canvas_mut().move_by(handle, 10.0, 10.0);
    let events = session.handle_event(&mut page, CanvasEvent::ObjectModified { handle });
    assert!(events.is_empty());
    assert_eq!(session.state(), SessionState::Idle);
    let t = page.element(id).map(|e| e.transform).expect("element");
    assert!((t.x - 100.0).abs() < f32::EPSILON);
}

#[test]
fn test_pointer_up_completes_scale_and_rotate() {
    let (mut page, id) = page_with_square();
    let mut session = EditorSession::open(RetainedCanvas::new(), &page);
    let handle = handle_of(&session, id);
    select(&mut session, &mut page, 120.0, 120.0);

    session.canvas_mut().scale_by(handle, 2.0, 1.5);
    session.canvas_mut().rotate_by(handle, -90.0);
    session.handle_event(
        &mut page,
        CanvasEvent::Gesture {
            handle,
            kind: GestureKind::Scale,
        },
    );
    let events = session.handle_event(&mut page, CanvasEvent::PointerUp { x: 0.0, y: 0.0 });
    assert_eq!(updates(&events).len(), 1);

    let t = page.element(id).map(|e| e.transform).expect("element");
    assert!((t.width - 100.0).abs() < f32::EPSILON);
    assert!((t.height - 75.0).abs() < f32::EPSILON);
    assert!((t.rotation - 270.0).abs() < f32::EPSILON);
}

#[test]
fn test_failed_read_back_keeps_previous_geometry() {
    let (mut page, id) = page_with_square();
    let mut session = EditorSession::open(RetainedCanvas::new(), &page);
    let handle = handle_of(&session, id);
    select(&mut session, &mut page, 120.0, 120.0);

    session.handle_event(
        &mut page,
        CanvasEvent::Gesture {
            handle,
            kind: GestureKind::Scale,
        },
    );
    session.canvas_mut().set_resolved(
        handle,
        ResolvedGeometry {
            left: Some(f32::NAN),
            top: Some(100.0),
            width: None,
            height: Some(50.0),
            angle: Some(0.0),
        },
    );
    let events = session.handle_event(&mut page, CanvasEvent::ObjectModified { handle });
    assert!(updates(&events).is_empty());

    let t = page.element(id).map(|e| e.transform).expect("element");
    assert!((t.x - 100.0).abs() < f32::EPSILON);
    assert!((t.width - 50.0).abs() < f32::EPSILON);
    let live = session
        .canvas()
        .resolved_geometry(handle)
        .and_then(|g| g.to_update())
        .expect("canvas restored");
    assert!((live.x - 100.0).abs() < f32::EPSILON);
}

#[test]
fn test_gesture_without_click_selects() {
    let (mut page, id) = page_with_square();
    let mut session = EditorSession::open(RetainedCanvas::new(), &page);
    let handle = handle_of(&session, id);
    let events = session.handle_event(
        &mut page,
        CanvasEvent::Gesture {
            handle,
            kind: GestureKind::Rotate,
        },
    );
    assert_eq!(events, vec![SyncEvent::SelectionChanged { id: Some(id) }]);
    assert_eq!(session.selected(), Some(id));
}

#[test]
fn test_move_snaps_and_clears_guides() {
    let (mut page, id) = page_with_square();
    let mut session = EditorSession::open(RetainedCanvas::new(), &page);
    let handle = handle_of(&session, id);
    select(&mut session, &mut page, 120.0, 120.0);

    // center lands 2px left of the page center
    session.canvas_mut().move_live(handle, 252.5, 300.0);
    let events = session.handle_event(
        &mut page,
        CanvasEvent::Gesture {
            handle,
            kind: GestureKind::Move,
        },
    );
    assert!(events
        .iter()
        .any(|e| matches!(e, SyncEvent::GuidesChanged { guides } if !guides.is_empty())));
    let live = session.canvas().resolved_geometry(handle).expect("live");
    assert_eq!(live.left, Some(254.5));

    let done = session.handle_event(&mut page, CanvasEvent::ObjectModified { handle });
    assert!(done.contains(&SyncEvent::GuidesChanged { guides: Vec::new() }));
    let t = page.element(id).map(|e| e.transform).expect("element");
    assert!((t.x - 254.5).abs() < f32::EPSILON);
}

#[test]
fn test_overlaps_reported_after_gesture() {
    let (mut page, id) = page_with_square();
    let other = page.add_element(
        Element::shape(ShapeVariant::Circle, Color::WHITE).with_bounds(300.0, 300.0, 50.0, 50.0),
    );
    let mut session = EditorSession::open(RetainedCanvas::new(), &page).with_snapping(false);
    let handle = handle_of(&session, id);
    select(&mut session, &mut page, 120.0, 120.0);

    session.canvas_mut().move_live(handle, 290.0, 290.0);
    session.handle_event(
        &mut page,
        CanvasEvent::Gesture {
            handle,
            kind: GestureKind::Move,
        },
    );
    let events = session.handle_event(&mut page, CanvasEvent::ObjectModified { handle });
    assert!(events.contains(&SyncEvent::OverlapsDetected {
        pairs: vec![(id, other)]
    }));
}

// ============================================================================
// Operation Tests
// ============================================================================

#[test]
fn test_add_operations_select_new_unbound_elements() {
    let (mut page, _) = page_with_square();
    let mut session = EditorSession::open(RetainedCanvas::new(), &page);

    let events = session.add_text(&mut page, "Hello");
    let SyncEvent::ElementCreated { id } = events[0] else {
        panic!("expected ElementCreated first");
    };
    assert_eq!(events[1], SyncEvent::SelectionChanged { id: Some(id) });
    assert_eq!(session.selected(), Some(id));
    let element = page.element(id).expect("text added");
    assert!(element.is_unbound);
    assert_eq!(element.transform.z_index, 2);

    session.add_shape(&mut page, ShapeVariant::Circle, Fill::Solid(Color::WHITE));
    session.add_image(&mut page, "photo.jpg");
    assert_eq!(page.len(), 4);
    assert_eq!(page.max_z(), 4);
    assert_eq!(session.canvas().len(), 4);
}

#[test]
fn test_delete_removes_every_object_for_the_element() {
    let (mut page, id) = page_with_square();
    let mut session = EditorSession::open(RetainedCanvas::new(), &page);
    select(&mut session, &mut page, 120.0, 120.0);
    assert_eq!(session.selection(), vec![id]);

    let events = session.handle_event(
        &mut page,
        CanvasEvent::KeyDown {
            key: EditorKey::Delete,
        },
    );
    let deleted: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, SyncEvent::ElementDeleted { .. }))
        .collect();
    assert_eq!(deleted, vec![&SyncEvent::ElementDeleted { id }]);
    assert_eq!(events[0], SyncEvent::ElementDeleted { id });
    assert!(session.selection().is_empty());
    assert!(events.contains(&SyncEvent::SelectionChanged { id: None }));
    assert!(page.element(id).is_none());
    assert!(session.canvas().handles_for(id).is_empty());
    assert!(session.delete_selected(&mut page).is_empty());
}

#[test]
fn test_reorder_and_toggles() {
    let (mut page, id) = page_with_square();
    let top = page.add_element(Element::shape(ShapeVariant::Rectangle, Color::WHITE));
    let mut session = EditorSession::open(RetainedCanvas::new(), &page);
    select(&mut session, &mut page, 50.0, 50.0);
    assert_eq!(session.selected(), Some(top));

    assert_eq!(session.send_to_back(&mut page), vec![SyncEvent::ZOrderChanged { id: top }]);
    assert!(session.send_to_back(&mut page).is_empty());
    let order: Vec<_> = session.canvas().objects().iter().map(|(_, o)| o.element_id).collect();
    assert_eq!(order, vec![top, id]);

    let events = session.toggle_visibility(&mut page, top);
    assert_eq!(events[0], SyncEvent::VisibilityChanged { id: top, visible: false });
    assert!(events.contains(&SyncEvent::SelectionChanged { id: None }));
    let events = session.toggle_visibility(&mut page, top);
    assert_eq!(events, vec![SyncEvent::VisibilityChanged { id: top, visible: true }]);

    let events = session.toggle_lock(&mut page, id);
    assert_eq!(events, vec![SyncEvent::LockChanged { id, locked: true }]);
    assert!(page.element(id).is_some_and(|e| e.locked));
}

#[test]
fn test_zoom_is_clamped() {
    let (page, _) = page_with_square();
    let mut session = EditorSession::open(RetainedCanvas::new(), &page);
    assert!((session.set_zoom(10.0) - 4.0).abs() < f32::EPSILON);
    assert!((session.set_zoom(0.1) - 0.25).abs() < f32::EPSILON);
    assert!((session.set_zoom(f32::NAN) - 0.25).abs() < f32::EPSILON);
    assert!((session.canvas().zoom() - 0.25).abs() < f32::EPSILON);
}

#[test]
fn test_page_changed_drops_missing_selection() {
    let (mut page, id) = page_with_square();
    let mut session = EditorSession::open(RetainedCanvas::new(), &page);
    select(&mut session, &mut page, 120.0, 120.0);

    page.remove_element(id).expect("square exists");
    let stats = session.page_changed(&page);
    assert_eq!(stats.removed, 1);
    assert_eq!(session.state(), SessionState::Idle);
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[test]
fn test_dispose_returns_empty_canvas() {
    let (mut page, _) = page_with_square();
    let mut session = EditorSession::open(RetainedCanvas::new(), &page);
    assert_eq!(session.canvas().listener_count(), 1);
    select(&mut session, &mut page, 120.0, 120.0);

    let canvas = session.dispose();
    assert!(canvas.is_empty());
    assert_eq!(canvas.listener_count(), 0);
    assert_eq!(canvas.active(), None);
}
