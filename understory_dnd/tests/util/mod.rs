// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handlers shared by the integration tests.

#![allow(dead_code, reason = "each test binary uses a subset")]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use understory_dnd::scheduler::LocalScheduler;
use understory_dnd::test_backend::TestBackend;
use understory_dnd::{DragDropManager, DragDropMonitor, DragSource, DropResult, DropTarget, HandlerId, Item};

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn manager() -> (DragDropManager<TestBackend>, Rc<LocalScheduler>) {
    let scheduler = Rc::new(LocalScheduler::new());
    let manager = DragDropManager::new(scheduler.clone(), TestBackend::new);
    (manager, scheduler)
}

/// A source whose answers can be changed between calls.
pub struct TestSource {
    pub can_drag: Cell<bool>,
    pub veto: Cell<bool>,
    pub log: Log,
}

impl TestSource {
    pub fn new(log: &Log) -> Rc<Self> {
        Rc::new(Self {
            can_drag: Cell::new(true),
            veto: Cell::new(false),
            log: log.clone(),
        })
    }

    pub fn undraggable(log: &Log) -> Rc<Self> {
        let source = Self::new(log);
        source.can_drag.set(false);
        source
    }
}

impl DragSource for TestSource {
    fn can_drag(&self, _: &DragDropMonitor, _: HandlerId) -> bool {
        self.can_drag.get()
    }

    fn begin_drag(&self, _: &DragDropMonitor, id: HandlerId) -> Option<Item> {
        self.log.borrow_mut().push(format!("begin {id}"));
        if self.veto.get() {
            None
        } else {
            Some(Item::new(id.to_string()))
        }
    }

    fn end_drag(&self, monitor: &DragDropMonitor, id: HandlerId) {
        self.log
            .borrow_mut()
            .push(format!("end {id} dropped={}", monitor.did_drop()));
    }
}

/// A target returning a configurable drop result.
pub struct TestTarget {
    pub can_drop: Cell<bool>,
    pub result: RefCell<Option<DropResult>>,
    pub log: Log,
}

impl TestTarget {
    pub fn new(log: &Log) -> Rc<Self> {
        Rc::new(Self {
            can_drop: Cell::new(true),
            result: RefCell::new(None),
            log: log.clone(),
        })
    }

    pub fn returning(log: &Log, key: &str, value: &str) -> Rc<Self> {
        let target = Self::new(log);
        let mut result = DropResult::new();
        result.insert(key.to_string(), value.into());
        *target.result.borrow_mut() = Some(result);
        target
    }
}

impl DropTarget for TestTarget {
    fn can_drop(&self, _: &DragDropMonitor, _: HandlerId) -> bool {
        self.can_drop.get()
    }

    fn hover(&self, _: &DragDropMonitor, id: HandlerId) {
        self.log.borrow_mut().push(format!("hover {id}"));
    }

    fn drop(&self, monitor: &DragDropMonitor, id: HandlerId) -> Option<DropResult> {
        self.log.borrow_mut().push(format!(
            "drop {id} seen={}",
            monitor
                .drop_result()
                .map(|r| serde_json::Value::Object(r).to_string())
                .unwrap_or_default()
        ));
        self.result.borrow().clone()
    }
}
