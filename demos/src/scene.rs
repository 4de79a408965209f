// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A laid-out chessboard document that both backends can query.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use kurbo::{Point, Rect, Size};
use understory_dnd_html5::{DataTransfer, DropEffect, Html5Environment, NativeFile};
use understory_dnd_touch::TouchEnvironment;

use crate::chess::Square;

/// Node handle.
pub type NodeId = u32;

/// The document root, also used as the body.
pub const ROOT: NodeId = 0;
/// The board element holding the 64 squares.
pub const BOARD: NodeId = 1;

const SQUARE_BASE: NodeId = 10;
const PIECE_BASE: NodeId = 100;

/// Edge length of a square.
pub const SQUARE_SIZE: f64 = 50.0;
const PIECE_INSET: f64 = 5.0;

/// Node of the square element for `square`.
#[must_use]
pub fn square_node(square: Square) -> NodeId {
    SQUARE_BASE + NodeId::from(square.index())
}

/// The square a square node stands for.
#[must_use]
pub fn node_square(node: NodeId) -> Option<Square> {
    let index = node.checked_sub(SQUARE_BASE).filter(|i| *i < 64)?;
    Square::new((index % 8) as u8, (index / 8) as u8)
}

/// Bounds of `square` with rank 8 drawn on top.
#[must_use]
pub fn square_bounds(square: Square) -> Rect {
    let origin = Point::new(
        f64::from(square.file()) * SQUARE_SIZE,
        f64::from(7 - square.rank()) * SQUARE_SIZE,
    );
    Rect::from_origin_size(origin, Size::new(SQUARE_SIZE, SQUARE_SIZE))
}

#[derive(Clone, Debug)]
struct Element {
    parent: Option<NodeId>,
    bounds: Rect,
    hidden: bool,
}

#[derive(Debug, Default)]
struct Tree {
    elements: HashMap<NodeId, Element>,
    draggable: HashSet<NodeId>,
    claimed: HashSet<NodeId>,
    next_piece: NodeId,
}

/// Shared handle to the chessboard document.
#[derive(Clone, Debug)]
pub struct Scene(Rc<RefCell<Tree>>);

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// A root holding an empty 8x8 board.
    #[must_use]
    pub fn new() -> Self {
        let board = Rect::from_origin_size(Point::ZERO, Size::new(8.0 * SQUARE_SIZE, 8.0 * SQUARE_SIZE));
        let mut tree = Tree {
            next_piece: PIECE_BASE,
            ..Tree::default()
        };
        tree.elements.insert(
            ROOT,
            Element {
                parent: None,
                bounds: Rect::from_origin_size(Point::ZERO, Size::new(1024.0, 768.0)),
                hidden: false,
            },
        );
        tree.elements.insert(
            BOARD,
            Element {
                parent: Some(ROOT),
                bounds: board,
                hidden: false,
            },
        );
        for square in Square::all() {
            tree.elements.insert(
                square_node(square),
                Element {
                    parent: Some(BOARD),
                    bounds: square_bounds(square),
                    hidden: false,
                },
            );
        }
        Self(Rc::new(RefCell::new(tree)))
    }

    /// Adds a piece element on `square` and returns its node.
    pub fn add_piece(&self, square: Square) -> NodeId {
        let mut tree = self.0.borrow_mut();
        let node = tree.next_piece;
        tree.next_piece += 1;
        tree.elements.insert(
            node,
            Element {
                parent: Some(square_node(square)),
                bounds: square_bounds(square).inset(-PIECE_INSET),
                hidden: false,
            },
        );
        node
    }

    /// Re-parents a piece element onto `square`, unhiding it.
    pub fn place_piece(&self, node: NodeId, square: Square) {
        if let Some(element) = self.0.borrow_mut().elements.get_mut(&node) {
            element.parent = Some(square_node(square));
            element.bounds = square_bounds(square).inset(-PIECE_INSET);
            element.hidden = false;
        }
    }

    /// Detaches `node` from the document.
    pub fn remove(&self, node: NodeId) {
        if let Some(element) = self.0.borrow_mut().elements.get_mut(&node) {
            element.parent = None;
        }
    }

    /// Center of `square`, where the demos point.
    #[must_use]
    pub fn center(&self, square: Square) -> Point {
        square_bounds(square).center()
    }

    fn depth(tree: &Tree, node: NodeId) -> usize {
        let mut depth = 0;
        let mut current = tree.elements.get(&node).and_then(|e| e.parent);
        while let Some(parent) = current {
            depth += 1;
            current = tree.elements.get(&parent).and_then(|e| e.parent);
        }
        depth
    }

    fn is_attached(tree: &Tree, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ROOT {
                return true;
            }
            current = tree.elements.get(&id).and_then(|e| e.parent);
        }
        false
    }
}

impl Html5Environment for Scene {
    type Node = NodeId;

    fn root(&self) -> Option<NodeId> {
        Some(ROOT)
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.0.borrow().elements.get(node).and_then(|e| e.parent)
    }

    fn is_in_document(&self, node: &NodeId) -> bool {
        Self::is_attached(&self.0.borrow(), *node)
    }

    fn client_offset(&self, node: &NodeId) -> Option<Point> {
        self.0.borrow().elements.get(node).map(|e| e.bounds.origin())
    }

    fn offset_size(&self, node: &NodeId) -> Size {
        self.0
            .borrow()
            .elements
            .get(node)
            .map_or(Size::ZERO, |e| e.bounds.size())
    }

    fn image_size(&self, _node: &NodeId) -> Option<Size> {
        None
    }

    fn set_draggable(&self, node: &NodeId, draggable: bool) {
        let mut tree = self.0.borrow_mut();
        if draggable {
            tree.draggable.insert(*node);
        } else {
            tree.draggable.remove(node);
        }
    }

    fn has_draggable_attribute(&self, node: &NodeId) -> bool {
        self.0.borrow().draggable.contains(node)
    }

    fn claim_root(&self, root: &NodeId) -> bool {
        self.0.borrow_mut().claimed.insert(*root)
    }

    fn release_root(&self, root: &NodeId) {
        self.0.borrow_mut().claimed.remove(root);
    }
}

impl TouchEnvironment for Scene {
    type Node = NodeId;

    fn root(&self) -> Option<NodeId> {
        Some(ROOT)
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.0.borrow().elements.get(node).and_then(|e| e.parent)
    }

    fn elements_from_point(&self, point: Point) -> Vec<NodeId> {
        let tree = self.0.borrow();
        let mut hits: Vec<NodeId> = tree
            .elements
            .iter()
            .filter(|(node, e)| !e.hidden && e.bounds.contains(point) && Self::is_attached(&tree, **node))
            .map(|(node, _)| *node)
            .collect();
        hits.sort_by_key(|node| (std::cmp::Reverse(Self::depth(&tree, *node)), *node));
        hits
    }

    fn client_offset(&self, node: &NodeId) -> Option<Point> {
        self.0.borrow().elements.get(node).map(|e| e.bounds.origin())
    }

    fn hide_and_append_to_body(&self, node: &NodeId) {
        if let Some(element) = self.0.borrow_mut().elements.get_mut(node) {
            element.parent = Some(ROOT);
            element.hidden = true;
        }
    }

    fn claim_root(&self, root: &NodeId) -> bool {
        self.0.borrow_mut().claimed.insert(*root)
    }

    fn release_root(&self, root: &NodeId) {
        self.0.borrow_mut().claimed.remove(root);
    }
}

/// A data transfer for drags that start on the page.
#[derive(Debug, Default)]
pub struct PageTransfer {
    data: HashMap<String, String>,
    /// Preview node and offset chosen by the backend.
    pub drag_image: Option<(NodeId, Point)>,
    /// Last drop effect chosen by the backend.
    pub drop_effect: Option<DropEffect>,
}

impl DataTransfer<NodeId> for PageTransfer {
    fn types(&self) -> Option<Vec<String>> {
        Some(self.data.keys().cloned().collect())
    }

    fn get_data(&self, format: &str) -> String {
        self.data.get(format).cloned().unwrap_or_default()
    }

    fn set_data(&mut self, format: &str, data: &str) -> bool {
        self.data.insert(format.to_owned(), data.to_owned());
        true
    }

    fn files(&self) -> Vec<NativeFile> {
        Vec::new()
    }

    fn set_drag_image(&mut self, image: &NodeId, offset: Point) {
        self.drag_image = Some((*image, offset));
    }

    fn set_drop_effect(&mut self, effect: DropEffect) {
        self.drop_effect = Some(effect);
    }
}
