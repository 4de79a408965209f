// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for handler registration, pinning, backend lifecycle and change
//! subscriptions.

mod util;

use std::cell::Cell;
use std::rc::Rc;

use kurbo::Point;
use understory_dnd::{
    Backend, BeginDragOptions, DndError, DragDropMonitor, DragSource, DragSourceMonitor, DropTargetMonitor,
    HandlerId, HandlerRole, Item, Symbol, register_source, register_target,
};
use util::{TestSource, TestTarget, log, manager};

#[test]
fn ids_share_one_counter_and_carry_their_role() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (t, _) = register_target("piece", TestTarget::new(&log), &manager).unwrap();
    assert_eq!(s.to_string(), "S0");
    assert_eq!(t.to_string(), "T1");
    assert_eq!(t.role(), HandlerRole::Target);
    assert!(manager.registry().is_source_id(s));
    assert!(!manager.registry().is_source_id(t));
    assert!(manager.registry().is_target_id(t));
    assert_eq!(
        manager.registry().target(s).err(),
        Some(DndError::WrongRole {
            expected: HandlerRole::Target,
            id: s,
        })
    );
}

#[test]
fn backend_is_set_up_while_handlers_exist() {
    let (manager, scheduler) = manager();
    let log = log();
    assert!(!manager.is_set_up());
    let (s, unregister_s) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (_, unregister_t) = register_target("piece", TestTarget::new(&log), &manager).unwrap();
    assert!(manager.is_set_up());
    assert_eq!(manager.backend().setup_count(), 1);

    unregister_t.unregister().unwrap();
    assert!(manager.is_set_up());
    unregister_s.unregister().unwrap();
    assert!(!manager.is_set_up());
    assert_eq!(manager.backend().teardown_count(), 1);

    // The source handler itself lingers until the microtask runs.
    assert!(manager.registry().source(s, false).is_ok());
    assert!(!manager.registry().contains_source(s));
    scheduler.run_microtasks();
    assert_eq!(manager.registry().source(s, false).err(), Some(DndError::UnknownHandler(s)));
    assert_eq!(manager.monitor().state().ref_count, 0);
}

#[test]
fn removing_twice_is_rejected() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (t, _) = register_target("piece", TestTarget::new(&log), &manager).unwrap();
    manager.registry().remove_source(s).unwrap();
    assert_eq!(
        manager.registry().remove_source(s),
        Err(DndError::UnknownHandler(s))
    );
    manager.registry().remove_target(t).unwrap();
    assert_eq!(
        manager.registry().remove_target(t),
        Err(DndError::UnknownHandler(t))
    );
    assert_eq!(manager.monitor().state().ref_count, 0);
}

#[test]
fn a_pinned_source_outlives_its_removal_until_end_drag() {
    let (manager, scheduler) = manager();
    let log = log();
    let (s, unregister) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (_keep_alive, _) = register_target("piece", TestTarget::new(&log), &manager).unwrap();
    manager
        .backend()
        .simulate_begin_drag(&[s], BeginDragOptions::default())
        .unwrap();

    unregister.unregister().unwrap();
    scheduler.run_microtasks();
    let registry = manager.registry();
    assert!(registry.source(s, false).is_err());
    assert!(registry.source(s, true).is_ok());

    manager.backend().simulate_end_drag().unwrap();
    assert_eq!(
        *log.borrow(),
        vec![format!("begin {s}"), format!("end {s} dropped=false")]
    );
    assert_eq!(registry.source(s, true).err(), Some(DndError::UnknownHandler(s)));
    assert_eq!(registry.unpin_source(), Err(DndError::NothingPinned));
}

#[test]
fn symbol_types_only_match_the_same_symbol() {
    let (manager, _) = manager();
    let log = log();
    let piece = Symbol::new("piece");
    let lookalike = Symbol::new("piece");
    let (s, _) = register_source(piece.clone(), TestSource::new(&log), &manager).unwrap();
    let (same, _) = register_target(piece, TestTarget::new(&log), &manager).unwrap();
    let (other, _) = register_target(lookalike, TestTarget::new(&log), &manager).unwrap();

    manager
        .backend()
        .simulate_begin_drag(&[s], BeginDragOptions::default())
        .unwrap();
    manager.backend().simulate_hover(&[same, other], None).unwrap();
    assert_eq!(manager.monitor().target_ids(), vec![same]);
    assert!(manager.monitor().can_drop_on_target(same).unwrap());
    assert!(!manager.monitor().can_drop_on_target(other).unwrap());
}

#[test]
fn filtered_subscriptions_skip_unrelated_hovers() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let t1 = register_target("piece", TestTarget::new(&log), &manager).unwrap().0;
    let t2 = register_target("piece", TestTarget::new(&log), &manager).unwrap().0;
    let t3 = register_target("piece", TestTarget::new(&log), &manager).unwrap().0;

    let hits = Rc::new(Cell::new(0));
    let counter = hits.clone();
    let _sub = manager
        .monitor()
        .subscribe_to_state_change(move || counter.set(counter.get() + 1), Some(vec![t3]))
        .unwrap();

    let backend = manager.backend();
    assert_eq!(hits.get(), 0);
    backend.simulate_begin_drag(&[s], BeginDragOptions::default()).unwrap();
    let base = hits.get();
    assert!(base >= 1, "begin dirties everything");
    backend.simulate_hover(&[t1], None).unwrap();
    backend.simulate_hover(&[t1, t2], None).unwrap();
    assert_eq!(hits.get(), base, "t3 untouched");
    backend.simulate_hover(&[t1, t2, t3], None).unwrap();
    assert_eq!(hits.get(), base + 1);
    backend.simulate_hover(&[t1, t2, t3], None).unwrap();
    assert_eq!(hits.get(), base + 1, "unchanged hover is clean");
    backend.simulate_hover(&[t1], None).unwrap();
    assert_eq!(hits.get(), base + 2);
}

#[test]
fn unfiltered_subscriptions_see_registry_changes() {
    let (manager, scheduler) = manager();
    let log = log();
    let hits = Rc::new(Cell::new(0));
    let counter = hits.clone();
    let _sub = manager
        .monitor()
        .subscribe_to_state_change(move || counter.set(counter.get() + 1), None)
        .unwrap();

    let (s, unregister_s) = register_source("card", TestSource::new(&log), &manager).unwrap();
    assert_eq!(hits.get(), 1, "add source");
    let (_, unregister_t) = register_target("card", TestTarget::new(&log), &manager).unwrap();
    assert_eq!(hits.get(), 2, "add target");
    unregister_t.unregister().unwrap();
    assert_eq!(hits.get(), 3, "remove target");

    let backend = manager.backend();
    backend.simulate_publish_drag_source().unwrap();
    assert_eq!(hits.get(), 3, "publishing while idle dispatches nothing");

    backend
        .simulate_begin_drag(&[s], BeginDragOptions::default().with_publish_source(false))
        .unwrap();
    let after_begin = hits.get();
    assert!(after_begin > 3);
    backend.simulate_publish_drag_source().unwrap();
    assert_eq!(hits.get(), after_begin + 1, "publish");
    backend.simulate_hover(&[], None).unwrap();
    backend.simulate_hover(&[], None).unwrap();
    assert_eq!(hits.get(), after_begin + 3, "clean hovers still change the state");
    backend.simulate_end_drag().unwrap();
    let after_end = hits.get();

    unregister_s.unregister().unwrap();
    assert_eq!(hits.get(), after_end + 1, "remove source");
    scheduler.run_microtasks();
    assert_eq!(hits.get(), after_end + 1, "the deferred deletion does not dispatch");
}

#[test]
fn unbound_handler_monitors_subscribe_to_everything() {
    let (manager, _) = manager();
    let log = log();
    let source_monitor = DragSourceMonitor::new(manager.monitor().clone());
    let hits = Rc::new(Cell::new(0));
    let counter = hits.clone();
    let _sub = source_monitor
        .subscribe_to_state_change(move || counter.set(counter.get() + 1))
        .unwrap();

    let _ = register_source("card", TestSource::new(&log), &manager).unwrap();
    assert_eq!(hits.get(), 1);
}

#[test]
fn offset_subscriptions_fire_only_on_movement() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (t, _) = register_target("piece", TestTarget::new(&log), &manager).unwrap();

    let hits = Rc::new(Cell::new(0));
    let counter = hits.clone();
    let sub = manager
        .monitor()
        .subscribe_to_offset_change(move || counter.set(counter.get() + 1))
        .unwrap();

    let backend = manager.backend();
    backend.simulate_begin_drag(&[s], BeginDragOptions::default()).unwrap();
    let after_begin = hits.get();
    backend.simulate_hover(&[t], Some(Point::new(1.0, 1.0))).unwrap();
    assert_eq!(hits.get(), after_begin + 1);
    backend.simulate_hover(&[t], Some(Point::new(1.0, 1.0))).unwrap();
    assert_eq!(hits.get(), after_begin + 1);
    backend.simulate_hover(&[], Some(Point::new(2.0, 1.0))).unwrap();
    assert_eq!(hits.get(), after_begin + 2);

    sub.unsubscribe().unwrap();
    backend.simulate_hover(&[t], Some(Point::new(9.0, 9.0))).unwrap();
    assert_eq!(hits.get(), after_begin + 2);
}

/// A source that asks its own monitor whether it can drag.
struct SelfReferential {
    monitor: DragSourceMonitor,
    error: std::cell::RefCell<Option<DndError>>,
}

impl DragSource for SelfReferential {
    fn can_drag(&self, _: &DragDropMonitor, _: HandlerId) -> bool {
        match self.monitor.can_drag() {
            Ok(answer) => answer,
            Err(err) => {
                *self.error.borrow_mut() = Some(err);
                false
            }
        }
    }

    fn begin_drag(&self, _: &DragDropMonitor, _: HandlerId) -> Option<Item> {
        Some(Item::new(()))
    }
}

#[test]
fn per_handler_monitors_reject_reentrant_queries() {
    let (manager, _) = manager();
    let source = Rc::new(SelfReferential {
        monitor: DragSourceMonitor::new(manager.monitor().clone()),
        error: std::cell::RefCell::new(None),
    });
    let (s, _) = register_source("piece", source.clone(), &manager).unwrap();
    source.monitor.receive_handler_id(Some(s));

    assert_eq!(source.monitor.can_drag(), Ok(false));
    assert_eq!(
        *source.error.borrow(),
        Some(DndError::ReentrantMonitorCall("can_drag"))
    );
    // The guard is released afterwards.
    assert_eq!(source.monitor.can_drag(), Ok(false));
}

#[test]
fn per_handler_monitors_answer_for_their_handler() {
    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (t, _) = register_target("piece", TestTarget::new(&log), &manager).unwrap();
    let source_monitor = DragSourceMonitor::new(manager.monitor().clone());
    let target_monitor = DropTargetMonitor::new(manager.monitor().clone());

    assert_eq!(source_monitor.can_drag(), Ok(false), "unbound");
    source_monitor.receive_handler_id(Some(s));
    target_monitor.receive_handler_id(Some(t));
    assert_eq!(source_monitor.can_drag(), Ok(true));
    assert_eq!(target_monitor.can_drop(), Ok(false));

    let backend = manager.backend();
    backend.simulate_begin_drag(&[s], BeginDragOptions::default()).unwrap();
    assert_eq!(source_monitor.is_dragging(), Ok(true));
    assert_eq!(source_monitor.can_drag(), Ok(false), "already dragging");
    assert_eq!(target_monitor.can_drop(), Ok(true));
    assert_eq!(target_monitor.is_over(false), Ok(false));
    backend.simulate_hover(&[t], None).unwrap();
    assert_eq!(target_monitor.is_over(true), Ok(true));
}

#[test]
fn teardown_follows_the_last_removal_even_mid_drag() {
    let (manager, _) = manager();
    let log = log();
    let (s, unregister) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    manager
        .backend()
        .simulate_begin_drag(&[s], BeginDragOptions::default())
        .unwrap();
    unregister.unregister().unwrap();
    assert!(!manager.is_set_up());
    assert!(manager.monitor().is_dragging());
    manager.backend().simulate_end_drag().unwrap();
    assert_eq!(manager.backend().profile(), vec![("setups", 1), ("teardowns", 1)]);
}
