// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the drag lifecycle: begin, publish, hover, drop and end.

mod util;

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Point;
use understory_dnd::reducers::{DirtyHandlerIds, State};
use understory_dnd::{
    BeginDragOptions, DndError, DropResult, HandlerId, ItemType, register_source, register_target,
};
use util::{TestSource, TestTarget, log, manager};

#[test]
fn state_id_advances_by_one_per_dispatch() {
    let (manager, _) = manager();
    let ids = Rc::new(RefCell::new(vec![manager.monitor().state().state_id]));
    let seen = ids.clone();
    let _sub = manager
        .core()
        .store()
        .subscribe(move |state: &State| seen.borrow_mut().push(state.state_id))
        .unwrap();

    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (t, _) = register_target("piece", TestTarget::new(&log), &manager).unwrap();
    let backend = manager.backend();
    backend.simulate_begin_drag(&[s], BeginDragOptions::default()).unwrap();
    backend.simulate_hover(&[t], None).unwrap();
    backend.simulate_hover(&[t], None).unwrap();
    backend.simulate_drop().unwrap();
    backend.simulate_end_drag().unwrap();

    let ids = ids.borrow();
    assert!(ids.len() > 5);
    for pair in ids.windows(2) {
        assert_eq!(pair[1], pair[0] + 1, "state ids {ids:?}");
    }
}

#[test]
fn begin_drag_while_dragging_fails_and_changes_nothing() {
    let (manager, _) = manager();
    let log = log();
    let (a, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (b, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    manager
        .backend()
        .simulate_begin_drag(&[a], BeginDragOptions::default())
        .unwrap();

    let before = manager.monitor().state();
    let err = manager
        .backend()
        .simulate_begin_drag(&[b], BeginDragOptions::default())
        .unwrap_err();
    assert_eq!(err, DndError::AlreadyDragging);
    let after = manager.monitor().state();
    assert!(Rc::ptr_eq(&before, &after));
    assert_eq!(manager.monitor().source_id(), Some(a));
}

#[test]
fn no_draggable_source_cancels_and_resets_coordinates() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::undraggable(&log), &manager).unwrap();

    let resolve = |_: HandlerId| Some(Point::new(1.0, 1.0));
    let options = BeginDragOptions::default().with_client_offset(Point::new(5.0, 5.0), &resolve);
    manager.backend().simulate_begin_drag(&[s], options).unwrap();

    let state = manager.monitor().state();
    assert_eq!(state.drag_operation.item_type, None);
    assert!(state.drag_operation.is_idle());
    assert_eq!(state.drag_offset.initial_client_offset, None);
    assert_eq!(state.drag_offset.initial_source_client_offset, None);
    assert_eq!(state.drag_offset.client_offset, None);
    assert!(log.borrow().is_empty(), "begin_drag must not be called");
}

#[test]
fn the_last_draggable_source_wins() {
    let (manager, _) = manager();
    let log = log();
    let (outer, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (middle, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (inner, _) = register_source("piece", TestSource::undraggable(&log), &manager).unwrap();

    manager
        .backend()
        .simulate_begin_drag(&[outer, middle, inner], BeginDragOptions::default())
        .unwrap();
    assert_eq!(manager.monitor().source_id(), Some(middle));
    assert_eq!(
        manager.monitor().item().unwrap().downcast_ref::<String>(),
        Some(&middle.to_string())
    );
    assert_eq!(manager.registry().pinned_source_id(), Some(middle));
}

#[test]
fn a_vetoing_source_cancels_the_drag() {
    let (manager, _) = manager();
    let log = log();
    let source = TestSource::new(&log);
    source.veto.set(true);
    let (s, _) = register_source("piece", source, &manager).unwrap();

    manager
        .backend()
        .simulate_begin_drag(&[s], BeginDragOptions::default())
        .unwrap();
    assert!(!manager.monitor().is_dragging());
    assert_eq!(manager.registry().pinned_source_id(), None);
    assert_eq!(*log.borrow(), vec![format!("begin {s}")]);
}

#[test]
fn client_offset_without_resolver_is_rejected() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let options = BeginDragOptions {
        client_offset: Some(Point::ORIGIN),
        ..BeginDragOptions::default()
    };
    assert_eq!(
        manager.backend().simulate_begin_drag(&[s], options),
        Err(DndError::MissingSourceClientOffset)
    );
    assert!(!manager.monitor().is_dragging());
}

#[test]
fn begin_drag_rejects_unknown_or_target_ids() {
    let (manager, _) = manager();
    let log = log();
    let (t, _) = register_target("piece", TestTarget::new(&log), &manager).unwrap();
    assert!(matches!(
        manager
            .backend()
            .simulate_begin_drag(&[t], BeginDragOptions::default()),
        Err(DndError::WrongRole { .. })
    ));
    let unknown = HandlerId::source(99);
    assert_eq!(
        manager
            .backend()
            .simulate_begin_drag(&[unknown], BeginDragOptions::default()),
        Err(DndError::UnknownHandler(unknown))
    );
}

#[test]
fn start_coordinates_are_recorded() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let resolve = |_: HandlerId| Some(Point::new(2.0, 3.0));
    let options = BeginDragOptions::default().with_client_offset(Point::new(10.0, 10.0), &resolve);
    manager.backend().simulate_begin_drag(&[s], options).unwrap();

    let monitor = manager.monitor();
    assert_eq!(monitor.initial_client_offset(), Some(Point::new(10.0, 10.0)));
    assert_eq!(monitor.initial_source_client_offset(), Some(Point::new(2.0, 3.0)));
    let t = register_target("piece", TestTarget::new(&log), &manager).unwrap().0;
    manager
        .backend()
        .simulate_hover(&[t], Some(Point::new(14.0, 7.0)))
        .unwrap();
    assert_eq!(monitor.source_client_offset(), Some(Point::new(6.0, 0.0)));
    assert_eq!(
        monitor.difference_from_initial_offset(),
        Some(kurbo::Vec2::new(4.0, -3.0))
    );
}

#[test]
fn publish_is_a_no_op_while_idle() {
    let (manager, _) = manager();
    let before = manager.monitor().state().state_id;
    manager.backend().simulate_publish_drag_source().unwrap();
    assert_eq!(manager.monitor().state().state_id, before);
}

#[test]
fn unpublished_sources_do_not_render_as_dragging() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let options = BeginDragOptions::default().with_publish_source(false);
    manager.backend().simulate_begin_drag(&[s], options).unwrap();

    assert!(manager.monitor().is_dragging());
    assert!(!manager.monitor().is_dragging_source(s).unwrap());
    manager.backend().simulate_publish_drag_source().unwrap();
    assert!(manager.monitor().is_dragging_source(s).unwrap());
}

#[test]
fn hover_with_duplicate_ids_fails() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (t, _) = register_target("piece", TestTarget::new(&log), &manager).unwrap();
    manager
        .backend()
        .simulate_begin_drag(&[s], BeginDragOptions::default())
        .unwrap();
    assert_eq!(
        manager.backend().simulate_hover(&[t, t], None),
        Err(DndError::DuplicateTargetId(t))
    );
    assert!(manager.monitor().target_ids().is_empty());
}

#[test]
fn hover_requires_an_active_drag() {
    let (manager, _) = manager();
    let log = log();
    let (t, _) = register_target("piece", TestTarget::new(&log), &manager).unwrap();
    assert_eq!(
        manager.backend().simulate_hover(&[t], None),
        Err(DndError::NotDragging("hover"))
    );
}

#[test]
fn hover_skips_targets_of_other_types() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (board, _) = register_target("piece", TestTarget::new(&log), &manager).unwrap();
    let (card, _) = register_target("card", TestTarget::new(&log), &manager).unwrap();
    let (either, _) = register_target(
        vec![ItemType::named("card"), ItemType::named("piece")],
        TestTarget::new(&log),
        &manager,
    )
    .unwrap();
    manager
        .backend()
        .simulate_begin_drag(&[s], BeginDragOptions::default())
        .unwrap();
    log.borrow_mut().clear();

    manager
        .backend()
        .simulate_hover(&[board, either, card], None)
        .unwrap();
    assert_eq!(manager.monitor().target_ids(), vec![board, either]);
    assert_eq!(
        *log.borrow(),
        vec![format!("hover {board}"), format!("hover {either}")]
    );
    assert!(manager.monitor().is_over_target(either, true).unwrap());
    assert!(manager.monitor().is_over_target(board, false).unwrap());
    assert!(!manager.monitor().is_over_target(board, true).unwrap());
    assert!(!manager.monitor().is_over_target(card, false).unwrap());
}

#[test]
fn leaving_the_innermost_target_dirties_old_and_new_innermost() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let t1 = register_target("piece", TestTarget::new(&log), &manager).unwrap().0;
    let t2 = register_target("piece", TestTarget::new(&log), &manager).unwrap().0;
    let t3 = register_target("piece", TestTarget::new(&log), &manager).unwrap().0;
    let backend = manager.backend();
    backend.simulate_begin_drag(&[s], BeginDragOptions::default()).unwrap();

    backend.simulate_hover(&[t1, t2, t3], None).unwrap();
    backend.simulate_hover(&[t1, t2], None).unwrap();
    let dirty = manager.monitor().state().dirty_handler_ids.clone();
    assert!(!matches!(dirty, DirtyHandlerIds::None | DirtyHandlerIds::All));
    assert!(dirty.contains(t2));
    assert!(dirty.contains(t3));
    assert!(!dirty.contains(t1));

    backend.simulate_hover(&[t1, t2], None).unwrap();
    assert_eq!(
        manager.monitor().state().dirty_handler_ids,
        DirtyHandlerIds::None
    );
}

#[test]
fn identical_hover_offsets_keep_the_offset_identity() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (t, _) = register_target("piece", TestTarget::new(&log), &manager).unwrap();
    let backend = manager.backend();
    backend.simulate_begin_drag(&[s], BeginDragOptions::default()).unwrap();

    backend.simulate_hover(&[t], Some(Point::new(3.0, 4.0))).unwrap();
    let first = manager.monitor().state().drag_offset.clone();
    backend.simulate_hover(&[t], Some(Point::new(3.0, 4.0))).unwrap();
    let second = manager.monitor().state().drag_offset.clone();
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn dropping_twice_fails() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (t, _) = register_target("piece", TestTarget::new(&log), &manager).unwrap();
    let backend = manager.backend();
    backend.simulate_begin_drag(&[s], BeginDragOptions::default()).unwrap();
    backend.simulate_hover(&[t], None).unwrap();

    backend.simulate_drop().unwrap();
    assert!(manager.monitor().did_drop());
    assert!(manager.monitor().target_ids().is_empty());
    assert_eq!(backend.simulate_drop(), Err(DndError::AlreadyDropped));
    assert_eq!(
        backend.simulate_hover(&[t], None),
        Err(DndError::HoverAfterDrop)
    );
}

#[test]
fn drop_runs_innermost_first_and_accumulates_results() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let outer = register_target("piece", TestTarget::new(&log), &manager).unwrap().0;
    let middle = register_target("piece", TestTarget::returning(&log, "square", "e4"), &manager)
        .unwrap()
        .0;
    let refusing = TestTarget::returning(&log, "square", "never");
    refusing.can_drop.set(false);
    let skipped = register_target("piece", refusing, &manager).unwrap().0;
    let inner = register_target("piece", TestTarget::new(&log), &manager).unwrap().0;

    let actions = manager.actions();
    actions.begin_drag(&[s], BeginDragOptions::default()).unwrap();
    actions.hover(&[outer, middle, skipped, inner], None).unwrap();
    log.borrow_mut().clear();

    let mut options = DropResult::new();
    options.insert("effect".into(), "move".into());
    actions.drop(&options).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            format!("drop {inner} seen="),
            format!(r#"drop {middle} seen={{"effect":"move"}}"#),
            format!(r#"drop {outer} seen={{"effect":"move","square":"e4"}}"#),
        ]
    );
    let result = manager.monitor().drop_result().unwrap();
    assert_eq!(result["effect"], "move");
    assert_eq!(result["square"], "e4");
}

#[test]
fn drop_without_accepting_targets_dispatches_nothing() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    manager
        .backend()
        .simulate_begin_drag(&[s], BeginDragOptions::default())
        .unwrap();
    let before = manager.monitor().state().state_id;
    manager.backend().simulate_drop().unwrap();
    assert_eq!(manager.monitor().state().state_id, before);
    assert!(!manager.monitor().did_drop());
}

#[test]
fn full_round_trip_returns_to_idle() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (t, _) = register_target("piece", TestTarget::new(&log), &manager).unwrap();
    assert!(manager.monitor().state().drag_operation.is_idle());

    let backend = manager.backend();
    backend.simulate_begin_drag(&[s], BeginDragOptions::default()).unwrap();
    backend.simulate_hover(&[t], Some(Point::new(1.0, 1.0))).unwrap();
    backend.simulate_drop().unwrap();
    backend.simulate_end_drag().unwrap();

    let state = manager.monitor().state();
    let op = &state.drag_operation;
    assert_eq!(op.item_type, None);
    assert!(op.item.is_none());
    assert_eq!(op.source_id, None);
    assert!(op.target_ids.is_empty());
    assert_eq!(op.drop_result, None);
    assert!(!op.did_drop);
    assert_eq!(op.is_source_public, None);
    assert_eq!(state.drag_offset.client_offset, None);
    assert_eq!(manager.registry().pinned_source_id(), None);
    assert_eq!(
        log.borrow().last().map(String::as_str),
        Some(format!("end {s} dropped=true").as_str())
    );
}

#[test]
fn end_drag_requires_an_active_drag() {
    let (manager, _) = manager();
    assert_eq!(
        manager.backend().simulate_end_drag(),
        Err(DndError::NotDragging("end_drag"))
    );
}

#[test]
fn removing_a_hovered_target_prunes_the_hover_list() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (outer, _) = register_target("piece", TestTarget::new(&log), &manager).unwrap();
    let (inner, unregister_inner) =
        register_target("piece", TestTarget::new(&log), &manager).unwrap();
    let backend = manager.backend();
    backend.simulate_begin_drag(&[s], BeginDragOptions::default()).unwrap();
    backend.simulate_hover(&[outer, inner], None).unwrap();

    unregister_inner.unregister().unwrap();
    assert_eq!(manager.monitor().target_ids(), vec![outer]);
    assert!(manager.monitor().is_over_target(outer, true).unwrap());
}
