// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory document with point hit-testing for driving the backend.

#![allow(dead_code, reason = "each test binary uses a subset")]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use understory_dnd::scheduler::LocalScheduler;
use understory_dnd::{
    DragDropManager, DragDropMonitor, DragSource, DropResult, DropTarget, HandlerId, Item,
};
use understory_dnd_touch::kurbo::{Point, Rect, Size};
use understory_dnd_touch::{
    PointerEvent, PointerEventKind, TouchBackend, TouchEnvironment, TouchOptions,
};

pub const ROOT: u32 = 0;

#[derive(Clone, Debug)]
struct NodeData {
    parent: Option<u32>,
    bounds: Rect,
    hidden: bool,
}

#[derive(Debug, Default)]
pub struct Document {
    nodes: RefCell<HashMap<u32, NodeData>>,
    claimed: RefCell<HashSet<u32>>,
}

/// Shared handle to a [`Document`].
#[derive(Clone, Debug)]
pub struct Dom(pub Rc<Document>);

impl Dom {
    /// A document holding only the root, which doubles as the body.
    pub fn new() -> Self {
        let dom = Self(Rc::new(Document::default()));
        dom.0.nodes.borrow_mut().insert(
            ROOT,
            NodeData {
                parent: None,
                bounds: Rect::from_origin_size(Point::ZERO, Size::new(800.0, 600.0)),
                hidden: false,
            },
        );
        dom
    }

    pub fn add(&self, id: u32, parent: u32, origin: Point, size: Size) {
        self.0.nodes.borrow_mut().insert(
            id,
            NodeData {
                parent: Some(parent),
                bounds: Rect::from_origin_size(origin, size),
                hidden: false,
            },
        );
    }

    /// Removes `id` from its parent, as a re-render would.
    pub fn remove(&self, id: u32) {
        if let Some(node) = self.0.nodes.borrow_mut().get_mut(&id) {
            node.parent = None;
        }
    }

    pub fn parent_of(&self, id: u32) -> Option<u32> {
        self.0.nodes.borrow().get(&id).and_then(|n| n.parent)
    }

    pub fn is_hidden(&self, id: u32) -> bool {
        self.0.nodes.borrow().get(&id).is_some_and(|n| n.hidden)
    }

    fn depth(nodes: &HashMap<u32, NodeData>, id: u32) -> usize {
        let mut depth = 0;
        let mut current = nodes.get(&id).and_then(|n| n.parent);
        while let Some(parent) = current {
            depth += 1;
            current = nodes.get(&parent).and_then(|n| n.parent);
        }
        depth
    }

    fn is_attached(nodes: &HashMap<u32, NodeData>, id: u32) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ROOT {
                return true;
            }
            current = nodes.get(&node).and_then(|n| n.parent);
        }
        false
    }
}

impl TouchEnvironment for Dom {
    type Node = u32;

    fn root(&self) -> Option<u32> {
        Some(ROOT)
    }

    fn parent(&self, node: &u32) -> Option<u32> {
        self.0.nodes.borrow().get(node).and_then(|n| n.parent)
    }

    /// Visible, attached, non-empty nodes under `point`, deepest first.
    fn elements_from_point(&self, point: Point) -> Vec<u32> {
        let nodes = self.0.nodes.borrow();
        let mut hits: Vec<u32> = nodes
            .iter()
            .filter(|(id, n)| {
                !n.hidden
                    && n.bounds.area() > 0.0
                    && n.bounds.contains(point)
                    && Self::is_attached(&nodes, **id)
            })
            .map(|(id, _)| *id)
            .collect();
        hits.sort_by_key(|id| (std::cmp::Reverse(Self::depth(&nodes, *id)), *id));
        hits
    }

    fn client_offset(&self, node: &u32) -> Option<Point> {
        self.0.nodes.borrow().get(node).map(|n| n.bounds.origin())
    }

    fn hide_and_append_to_body(&self, node: &u32) {
        if let Some(n) = self.0.nodes.borrow_mut().get_mut(node) {
            n.hidden = true;
            n.parent = Some(ROOT);
        }
    }

    fn claim_root(&self, root: &u32) -> bool {
        self.0.claimed.borrow_mut().insert(*root)
    }

    fn release_root(&self, root: &u32) {
        self.0.claimed.borrow_mut().remove(root);
    }
}

pub type Log = Rc<RefCell<Vec<String>>>;

pub struct Source {
    pub log: Log,
}

impl DragSource for Source {
    fn begin_drag(&self, _: &DragDropMonitor, id: HandlerId) -> Option<Item> {
        self.log.borrow_mut().push(format!("begin {id}"));
        Some(Item::new(id.to_string()))
    }

    fn end_drag(&self, monitor: &DragDropMonitor, id: HandlerId) {
        self.log
            .borrow_mut()
            .push(format!("end {id} dropped={}", monitor.did_drop()));
    }
}

pub struct Target {
    pub log: Log,
    pub name: &'static str,
}

impl DropTarget for Target {
    fn hover(&self, _: &DragDropMonitor, _: HandlerId) {
        self.log.borrow_mut().push(format!("hover {}", self.name));
    }

    fn drop(&self, _: &DragDropMonitor, _: HandlerId) -> Option<DropResult> {
        self.log.borrow_mut().push(format!("drop {}", self.name));
        let mut result = DropResult::new();
        result.insert("target".into(), self.name.into());
        Some(result)
    }
}

pub type Manager = DragDropManager<TouchBackend<Dom>>;

pub struct Harness {
    pub manager: Manager,
    pub scheduler: Rc<LocalScheduler>,
    pub dom: Dom,
    pub log: Log,
}

impl Harness {
    pub fn new(options: TouchOptions<u32>) -> Self {
        Self::with_dom(Dom::new(), options)
    }

    pub fn with_dom(dom: Dom, options: TouchOptions<u32>) -> Self {
        let scheduler = Rc::new(LocalScheduler::new());
        let env = dom.clone();
        let manager = DragDropManager::new(scheduler.clone(), move |core| {
            TouchBackend::new(core, env, options)
        });
        Self {
            manager,
            scheduler,
            dom,
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn backend(&self) -> &TouchBackend<Dom> {
        self.manager.backend()
    }

    pub fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    /// Dispatches an event and returns whether its default was prevented.
    pub fn fire(&self, mut event: PointerEvent<u32>) -> bool {
        self.backend().handle_event(&mut event).unwrap();
        event.is_default_prevented()
    }

    /// A single-finger touch event. Touch events keep targeting the node the
    /// touch started on.
    pub fn touch(&self, kind: PointerEventKind, started_on: u32, at: Point) -> bool {
        self.fire(PointerEvent::touch(kind, started_on, at))
    }

    pub fn mouse(&self, kind: PointerEventKind, target: u32, at: Point) -> bool {
        self.fire(PointerEvent::mouse(kind, target, at))
    }
}
