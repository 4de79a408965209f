// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch gestures on a chessboard.
//!
//! A held press moves a knight, a vertical swipe scrolls instead of
//! dragging, and Escape cancels a drag halfway.
//!
//! Run:
//! - `cargo run -p understory_dnd_demos --example chessboard_touch`

use std::error::Error;
use std::rc::Rc;
use std::time::Duration;

use kurbo::Point;
use understory_dnd::DragDropManager;
use understory_dnd::scheduler::LocalScheduler;
use understory_dnd_demos::board::{ChessBoard, Game};
use understory_dnd_demos::chess::{Position, Square};
use understory_dnd_demos::scene::{ROOT, Scene};
use understory_dnd_touch::{
    AngleRange, PointerEvent, PointerEventKind, TouchBackend, TouchOptions,
};

const HOLD: Duration = Duration::from_millis(150);

struct Session {
    manager: DragDropManager<TouchBackend<Scene>>,
    scheduler: Rc<LocalScheduler>,
    game: Rc<Game>,
}

impl Session {
    fn touch(&self, kind: PointerEventKind, node: u32, at: Point) -> Result<(), Box<dyn Error>> {
        let mut event = PointerEvent::touch(kind, node, at);
        self.manager.backend().handle_event(&mut event)?;
        Ok(())
    }

    /// Presses `from`, holds, and slides through `path`.
    fn gesture(&self, from: &str, path: &[Point]) -> Result<u32, Box<dyn Error>> {
        let from: Square = from.parse()?;
        let Some(node) = self.game.piece_node(from) else {
            return Err(format!("no piece on {from}").into());
        };
        self.touch(PointerEventKind::TouchStart, node, self.game.scene().center(from))?;
        self.scheduler.advance(HOLD);
        for at in path {
            self.touch(PointerEventKind::TouchMove, node, *at)?;
        }
        Ok(node)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let scheduler = Rc::new(LocalScheduler::new());
    let scene = Scene::new();
    let game = Rc::new(Game::new(Position::start(), scene.clone()));
    let options = TouchOptions::default()
        .with_delay_touch_start(HOLD)
        .with_touch_slop(5.0)
        .with_keyboard_events(true)
        .with_scroll_angle_ranges(vec![AngleRange::new(80.0, 100.0), AngleRange::new(260.0, 280.0)]);
    let manager = DragDropManager::new(scheduler.clone(), |core| {
        TouchBackend::new(core, scene, options)
    });
    let board = ChessBoard::connect(&manager, &game)?;
    let session = Session {
        manager,
        scheduler,
        game,
    };
    let center = |name: &str| -> Result<Point, Box<dyn Error>> {
        Ok(session.game.scene().center(name.parse()?))
    };

    // Knight to f3.
    let f3 = center("f3")?;
    let knight = session.gesture("g1", &[f3, f3])?;
    session.touch(PointerEventKind::TouchEnd, knight, f3)?;
    println!("{}\n", session.game.position());

    // A straight swipe up from the d2 pawn is a scroll.
    let d2 = center("d2")?;
    let pawn = session.gesture("d2", &[d2 - (0.0, 40.0), d2 - (0.0, 80.0)])?;
    println!("scrolling: {}", session.manager.backend().is_scrolling());
    session.touch(PointerEventKind::TouchEnd, pawn, d2 - (0.0, 80.0))?;

    // Escape abandons a drag.
    let c3 = center("c3")?;
    session.gesture("b1", &[c3 + (10.0, 0.0), c3])?;
    println!("dragging before Escape: {}", session.manager.monitor().is_dragging());
    let mut escape = PointerEvent::key_down(ROOT, "Escape");
    session.manager.backend().handle_event(&mut escape)?;
    println!("dragging after Escape: {}", session.manager.monitor().is_dragging());

    println!("\n{}", session.game.position());
    board.disconnect()?;
    Ok(())
}
