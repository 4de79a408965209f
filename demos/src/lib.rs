// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A chessboard driven by `understory_dnd`.
//!
//! The board is a laid-out [`Scene`](scene::Scene) that implements the
//! environment traits of both backends. [`ChessBoard`](board::ChessBoard)
//! registers a drop target per square and a drag source per piece; moves
//! happen when a source's drag ends with a drop result naming a square.
//!
//! Run:
//! - `cargo run -p understory_dnd_demos --example chessboard_html5`
//! - `cargo run -p understory_dnd_demos --example chessboard_touch`
//!
//! Set `RUST_LOG=debug` to follow the drag lifecycle.

pub mod board;
pub mod chess;
pub mod scene;
