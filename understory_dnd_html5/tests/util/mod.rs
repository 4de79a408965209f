// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory document and data transfer for driving the backend.

#![allow(dead_code, reason = "each test binary uses a subset")]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use understory_dnd::scheduler::LocalScheduler;
use understory_dnd::{
    DragDropManager, DragDropMonitor, DragSource, DropResult, DropTarget, HandlerId, Item,
};
use understory_dnd_html5::kurbo::{Point, Size};
use understory_dnd_html5::{
    DataTransfer, DragEventKind, DropEffect, Html5Backend, Html5Environment, Html5Options,
    NativeDragEvent, NativeFile,
};

pub const ROOT: u32 = 0;

#[derive(Clone, Debug)]
struct NodeData {
    parent: Option<u32>,
    origin: Point,
    size: Size,
    image: Option<Size>,
    attached: bool,
}

#[derive(Debug, Default)]
pub struct Document {
    nodes: RefCell<HashMap<u32, NodeData>>,
    draggable: RefCell<HashSet<u32>>,
    claimed: RefCell<HashSet<u32>>,
}

/// Shared handle to a [`Document`].
#[derive(Clone, Debug)]
pub struct Dom(pub Rc<Document>);

impl Dom {
    /// A document holding only the root.
    pub fn new() -> Self {
        let dom = Self(Rc::new(Document::default()));
        dom.0.nodes.borrow_mut().insert(
            ROOT,
            NodeData {
                parent: None,
                origin: Point::ZERO,
                size: Size::new(800.0, 600.0),
                image: None,
                attached: true,
            },
        );
        dom
    }

    pub fn add(&self, id: u32, parent: u32, origin: Point, size: Size) {
        self.0.nodes.borrow_mut().insert(
            id,
            NodeData {
                parent: Some(parent),
                origin,
                size,
                image: None,
                attached: true,
            },
        );
    }

    /// Adds a detached `<img>` of `size`.
    pub fn add_image(&self, id: u32, size: Size) {
        self.0.nodes.borrow_mut().insert(
            id,
            NodeData {
                parent: None,
                origin: Point::ZERO,
                size,
                image: Some(size),
                attached: false,
            },
        );
    }

    pub fn detach(&self, id: u32) {
        if let Some(node) = self.0.nodes.borrow_mut().get_mut(&id) {
            node.attached = false;
        }
    }

    pub fn is_draggable(&self, id: u32) -> bool {
        self.0.draggable.borrow().contains(&id)
    }
}

impl Html5Environment for Dom {
    type Node = u32;

    fn root(&self) -> Option<u32> {
        Some(ROOT)
    }

    fn parent(&self, node: &u32) -> Option<u32> {
        self.0.nodes.borrow().get(node).and_then(|n| n.parent)
    }

    fn is_in_document(&self, node: &u32) -> bool {
        let nodes = self.0.nodes.borrow();
        let mut current = Some(*node);
        while let Some(id) = current {
            match nodes.get(&id) {
                Some(n) if n.attached => current = n.parent,
                _ => return false,
            }
        }
        true
    }

    fn client_offset(&self, node: &u32) -> Option<Point> {
        self.0.nodes.borrow().get(node).map(|n| n.origin)
    }

    fn offset_size(&self, node: &u32) -> Size {
        self.0
            .nodes
            .borrow()
            .get(node)
            .map_or(Size::ZERO, |n| n.size)
    }

    fn image_size(&self, node: &u32) -> Option<Size> {
        self.0.nodes.borrow().get(node).and_then(|n| n.image)
    }

    fn set_draggable(&self, node: &u32, draggable: bool) {
        let mut set = self.0.draggable.borrow_mut();
        if draggable {
            set.insert(*node);
        } else {
            set.remove(node);
        }
    }

    fn has_draggable_attribute(&self, node: &u32) -> bool {
        self.0.draggable.borrow().contains(node)
    }

    fn claim_root(&self, root: &u32) -> bool {
        self.0.claimed.borrow_mut().insert(*root)
    }

    fn release_root(&self, root: &u32) {
        self.0.claimed.borrow_mut().remove(root);
    }
}

/// A `DataTransfer` that records what the backend did with it.
#[derive(Debug, Default)]
pub struct Transfer {
    pub types: Option<Vec<String>>,
    pub data: HashMap<String, String>,
    pub files: Vec<NativeFile>,
    pub drag_image: Option<(u32, Point)>,
    pub drop_effect: Option<DropEffect>,
    pub refuse_data: bool,
}

impl Transfer {
    /// A transfer started by the page itself.
    pub fn internal() -> Self {
        Self {
            types: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// A transfer carrying files from another application.
    pub fn with_files(files: Vec<NativeFile>) -> Self {
        Self {
            types: Some(vec!["Files".into()]),
            files,
            ..Self::default()
        }
    }

    /// A transfer carrying links.
    pub fn with_urls(urls: &str) -> Self {
        let mut data = HashMap::new();
        data.insert("text/uri-list".to_string(), urls.to_string());
        Self {
            types: Some(vec!["text/uri-list".into()]),
            data,
            ..Self::default()
        }
    }
}

impl DataTransfer<u32> for Transfer {
    fn types(&self) -> Option<Vec<String>> {
        self.types.clone()
    }

    fn get_data(&self, format: &str) -> String {
        self.data.get(format).cloned().unwrap_or_default()
    }

    fn set_data(&mut self, format: &str, data: &str) -> bool {
        if self.refuse_data {
            return false;
        }
        self.data.insert(format.to_string(), data.to_string());
        true
    }

    fn files(&self) -> Vec<NativeFile> {
        self.files.clone()
    }

    fn set_drag_image(&mut self, image: &u32, offset: Point) {
        self.drag_image = Some((*image, offset));
    }

    fn set_drop_effect(&mut self, effect: DropEffect) {
        self.drop_effect = Some(effect);
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

pub type Manager = DragDropManager<Html5Backend<Dom>>;

pub struct Harness {
    pub manager: Manager,
    pub scheduler: Rc<LocalScheduler>,
    pub dom: Dom,
    pub log: Log,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_dom(Dom::new())
    }

    pub fn with_dom(dom: Dom) -> Self {
        let scheduler = Rc::new(LocalScheduler::new());
        let env = dom.clone();
        let manager = DragDropManager::new(scheduler.clone(), move |core| {
            Html5Backend::new(core, env, Html5Options::default())
        });
        Self {
            manager,
            scheduler,
            dom,
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn backend(&self) -> &Html5Backend<Dom> {
        self.manager.backend()
    }

    pub fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    /// Dispatches an event and returns whether its default was prevented.
    pub fn fire(
        &self,
        kind: DragEventKind,
        target: u32,
        at: Point,
        transfer: Option<&mut Transfer>,
    ) -> bool {
        self.fire_with(NativeDragEvent::new(kind, target, at), transfer)
    }

    pub fn fire_with<'a>(
        &self,
        event: NativeDragEvent<'a, u32>,
        transfer: Option<&'a mut Transfer>,
    ) -> bool {
        let mut event = match transfer {
            Some(dt) => event.with_data_transfer(dt),
            None => event,
        };
        self.backend().handle_event(&mut event).unwrap();
        event.is_default_prevented()
    }
}
