// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wiring a chessboard into a drag-and-drop manager.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use understory_dnd::{
    Backend, Disconnect, DndError, DragDropManager, DragDropMonitor, DragSource, DropResult,
    DropTarget, HandlerId, Item, Unregister, register_source, register_target,
};

use crate::chess::{Piece, Position, Square};
use crate::scene::{NodeId, Scene, square_node};

/// Item type shared by all pieces.
pub const PIECE: &str = "piece";

/// The item carried by a piece drag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DraggedPiece {
    /// Where the drag started.
    pub from: Square,
    /// What is being dragged.
    pub piece: Piece,
}

/// The position and the document that shows it.
#[derive(Debug)]
pub struct Game {
    position: RefCell<Position>,
    scene: Scene,
    /// Piece node on each occupied square.
    nodes: RefCell<HashMap<Square, NodeId>>,
}

impl Game {
    /// Lays out `position` in `scene`.
    pub fn new(position: Position, scene: Scene) -> Self {
        let nodes = position
            .pieces()
            .map(|(square, _)| (square, scene.add_piece(square)))
            .collect();
        Self {
            position: RefCell::new(position),
            scene,
            nodes: RefCell::new(nodes),
        }
    }

    /// The document.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// A copy of the current position.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position.borrow().clone()
    }

    /// Node of the piece on `square`.
    #[must_use]
    pub fn piece_node(&self, square: Square) -> Option<NodeId> {
        self.nodes.borrow().get(&square).copied()
    }

    fn square_of(&self, node: NodeId) -> Option<Square> {
        self.nodes
            .borrow()
            .iter()
            .find(|(_, n)| **n == node)
            .map(|(square, _)| *square)
    }

    fn move_piece(&self, from: Square, to: Square) {
        let Some(node) = self.nodes.borrow_mut().remove(&from) else {
            return;
        };
        if let Some(captured) = self.nodes.borrow_mut().insert(to, node) {
            self.scene.remove(captured);
        }
        if let Some(captured) = self.position.borrow_mut().move_piece(from, to) {
            log::info!("{} captured on {to}", captured.symbol());
        }
        self.scene.place_piece(node, to);
        log::info!("moved {from} to {to}");
    }
}

struct PieceSource {
    game: Rc<Game>,
    node: NodeId,
}

impl DragSource for PieceSource {
    fn can_drag(&self, _: &DragDropMonitor, _: HandlerId) -> bool {
        self.game.square_of(self.node).is_some()
    }

    fn begin_drag(&self, _: &DragDropMonitor, _: HandlerId) -> Option<Item> {
        let from = self.game.square_of(self.node)?;
        let piece = self.game.position.borrow().piece_at(from)?;
        Some(Item::new(DraggedPiece { from, piece }))
    }

    fn end_drag(&self, monitor: &DragDropMonitor, _: HandlerId) {
        let Some(from) = self.game.square_of(self.node) else {
            return;
        };
        let to = monitor
            .drop_result()
            .and_then(|result| result.get("square")?.as_str()?.parse::<Square>().ok());
        if let Some(to) = to {
            self.game.move_piece(from, to);
        }
    }
}

struct SquareTarget {
    game: Rc<Game>,
    square: Square,
}

impl DropTarget for SquareTarget {
    fn can_drop(&self, monitor: &DragDropMonitor, _: HandlerId) -> bool {
        let Some(item) = monitor.item() else {
            return false;
        };
        let Some(dragged) = item.downcast_ref::<DraggedPiece>() else {
            return false;
        };
        let occupant = self.game.position.borrow().piece_at(self.square);
        dragged.from != self.square && occupant.is_none_or(|p| p.color != dragged.piece.color)
    }

    fn drop(&self, _: &DragDropMonitor, _: HandlerId) -> Option<DropResult> {
        let mut result = DropResult::new();
        result.insert("square".into(), self.square.to_string().into());
        Some(result)
    }
}

/// Registered handlers and backend connections of one board.
#[derive(Debug)]
pub struct ChessBoard {
    targets: HashMap<Square, HandlerId>,
    sources: HashMap<NodeId, HandlerId>,
    registrations: Vec<Unregister>,
    connections: Vec<Disconnect>,
}

impl ChessBoard {
    /// Registers a target per square and a source per piece, and connects
    /// them to their nodes.
    pub fn connect<B: Backend<Node = NodeId> + 'static>(
        manager: &DragDropManager<B>,
        game: &Rc<Game>,
    ) -> Result<Self, DndError> {
        let mut board = Self {
            targets: HashMap::new(),
            sources: HashMap::new(),
            registrations: Vec::new(),
            connections: Vec::new(),
        };
        for square in Square::all() {
            let target = Rc::new(SquareTarget {
                game: game.clone(),
                square,
            });
            let (id, registration) = register_target(PIECE, target, manager)?;
            board.registrations.push(registration);
            board.targets.insert(square, id);
            board.connections.push(manager.backend().connect_drop_target(
                id,
                square_node(square),
                B::TargetOptions::default(),
            ));
        }
        let pieces: Vec<NodeId> = game.nodes.borrow().values().copied().collect();
        for node in pieces {
            let source = Rc::new(PieceSource {
                game: game.clone(),
                node,
            });
            let (id, registration) = register_source(PIECE, source, manager)?;
            board.registrations.push(registration);
            board.sources.insert(node, id);
            board.connections.push(manager.backend().connect_drag_source(
                id,
                node,
                B::SourceOptions::default(),
            ));
        }
        log::debug!(
            "board connected: {} targets, {} sources",
            board.targets.len(),
            board.sources.len()
        );
        Ok(board)
    }

    /// Target handler of `square`.
    #[must_use]
    pub fn target(&self, square: Square) -> Option<HandlerId> {
        self.targets.get(&square).copied()
    }

    /// Source handler of the piece `node`.
    #[must_use]
    pub fn source(&self, node: NodeId) -> Option<HandlerId> {
        self.sources.get(&node).copied()
    }

    /// Disconnects every node and unregisters every handler.
    pub fn disconnect(self) -> Result<(), DndError> {
        for connection in self.connections {
            connection.disconnect();
        }
        for registration in self.registrations {
            registration.unregister()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use understory_dnd::scheduler::LocalScheduler;
    use understory_dnd_touch::{PointerEvent, PointerEventKind, TouchBackend, TouchOptions};

    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn setup() -> (DragDropManager<TouchBackend<Scene>>, Rc<Game>, ChessBoard) {
        let scene = Scene::new();
        let game = Rc::new(Game::new(Position::start(), scene.clone()));
        let manager = DragDropManager::new(Rc::new(LocalScheduler::new()), |core| {
            TouchBackend::new(core, scene, TouchOptions::default())
        });
        let board = ChessBoard::connect(&manager, &game).unwrap();
        (manager, game, board)
    }

    fn drag(manager: &DragDropManager<TouchBackend<Scene>>, game: &Game, from: &str, to: &str) {
        let node = game.piece_node(sq(from)).unwrap();
        let backend = manager.backend();
        let start = game.scene().center(sq(from));
        let end = game.scene().center(sq(to));
        for (kind, at) in [
            (PointerEventKind::TouchStart, start),
            (PointerEventKind::TouchMove, end),
            (PointerEventKind::TouchMove, end),
            (PointerEventKind::TouchEnd, end),
        ] {
            backend
                .handle_event(&mut PointerEvent::touch(kind, node, at))
                .unwrap();
        }
    }

    #[test]
    fn dragging_a_pawn_moves_it() {
        let (manager, game, board) = setup();
        drag(&manager, &game, "e2", "e4");
        assert_eq!(
            game.position().placement(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR"
        );
        assert!(game.piece_node(sq("e2")).is_none());
        assert!(!manager.monitor().is_dragging());
        board.disconnect().unwrap();
    }

    #[test]
    fn own_pieces_refuse_the_drop() {
        let (manager, game, _board) = setup();
        drag(&manager, &game, "b1", "d2");
        assert_eq!(game.position(), Position::start());
    }

    #[test]
    fn captures_remove_the_captured_node() {
        let scene = Scene::new();
        let position = Position::from_placement("4k3/8/8/3p4/4P3/8/8/4K3").unwrap();
        let game = Rc::new(Game::new(position, scene.clone()));
        let manager = DragDropManager::new(Rc::new(LocalScheduler::new()), |core| {
            TouchBackend::new(core, scene, TouchOptions::default())
        });
        let _board = ChessBoard::connect(&manager, &game).unwrap();
        let black_pawn = game.piece_node(sq("d5")).unwrap();

        drag(&manager, &game, "e4", "d5");
        assert_eq!(game.position().placement(), "4k3/8/8/3P4/8/8/8/4K3");
        assert_ne!(game.piece_node(sq("d5")), Some(black_pawn));
        assert_eq!(
            understory_dnd_touch::TouchEnvironment::parent(game.scene(), &black_pawn),
            None
        );
    }
}
