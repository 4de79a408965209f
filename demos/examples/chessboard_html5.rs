// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native drag events on a chessboard.
//!
//! Plays 1. e4 e5 by replaying the event sequence a browser sends for a
//! mouse drag, then tries to drop a knight on its own pawn.
//!
//! Run:
//! - `cargo run -p understory_dnd_demos --example chessboard_html5`

use std::error::Error;
use std::rc::Rc;
use std::time::Duration;

use understory_dnd::DragDropManager;
use understory_dnd::scheduler::LocalScheduler;
use understory_dnd_demos::board::{ChessBoard, Game};
use understory_dnd_demos::chess::{Position, Square};
use understory_dnd_demos::scene::{PageTransfer, Scene, square_node};
use understory_dnd_html5::{DragEventKind, Html5Backend, Html5Options, NativeDragEvent};

type Manager = DragDropManager<Html5Backend<Scene>>;

fn drag(
    manager: &Manager,
    scheduler: &LocalScheduler,
    game: &Game,
    from: &str,
    to: &str,
) -> Result<(), Box<dyn Error>> {
    let from: Square = from.parse()?;
    let to: Square = to.parse()?;
    let Some(piece) = game.piece_node(from) else {
        return Err(format!("no piece on {from}").into());
    };
    let backend = manager.backend();
    let over = square_node(to);
    let at = game.scene().center(to);
    let mut transfer = PageTransfer::default();

    let mut event = NativeDragEvent::new(DragEventKind::DragStart, piece, game.scene().center(from))
        .with_data_transfer(&mut transfer);
    backend.handle_event(&mut event)?;
    // The source is published on the next turn.
    scheduler.advance(Duration::ZERO);

    for kind in [DragEventKind::DragEnter, DragEventKind::DragOver] {
        backend.handle_event(&mut NativeDragEvent::new(kind, over, at))?;
    }
    scheduler.run_animation_frame();
    println!(
        "hovering {to}: can drop = {}",
        manager
            .monitor()
            .target_ids()
            .iter()
            .any(|id| manager.monitor().can_drop_on_target(*id).unwrap_or(false))
    );

    backend.handle_event(&mut NativeDragEvent::new(DragEventKind::Drop, over, at))?;
    backend.handle_event(&mut NativeDragEvent::new(DragEventKind::DragEnd, piece, at))?;
    println!("drag image anchored at {:?}", transfer.drag_image);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let scheduler = Rc::new(LocalScheduler::new());
    let scene = Scene::new();
    let game = Rc::new(Game::new(Position::start(), scene.clone()));
    let manager = DragDropManager::new(scheduler.clone(), |core| {
        Html5Backend::new(core, scene, Html5Options::default())
    });
    let board = ChessBoard::connect(&manager, &game)?;
    println!("{}\n", game.position());

    drag(&manager, &scheduler, &game, "e2", "e4")?;
    drag(&manager, &scheduler, &game, "e7", "e5")?;
    drag(&manager, &scheduler, &game, "g1", "d2")?;
    println!("\n{}", game.position());

    board.disconnect()?;
    scheduler.run_until_idle();
    println!("backend set up after disconnect: {}", manager.backend().is_set_up());
    Ok(())
}
