// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dnd --heading-base-level=0

//! Understory DnD: backend-agnostic drag-and-drop coordination.
//!
//! This crate is the state machine behind drag and drop. It knows nothing
//! about pixels, DOM nodes or touch screens; an input backend (see
//! `understory_dnd_html5` and `understory_dnd_touch`) translates platform
//! events into a small set of lifecycle operations, and rendering code reads
//! the outcome through a monitor.
//!
//! ## Pieces
//!
//! - [`store::Store`]: a single-writer observable state container.
//! - [`reducers`]: pure transitions over the drag state, including the
//!   dirty-handler tracking that lets subscribers skip unrelated changes.
//! - [`HandlerRegistry`]: owns [`DragSource`] and [`DropTarget`] handlers,
//!   keyed by role-prefixed [`HandlerId`]s.
//! - [`DragDropActions`]: `begin_drag`, `publish_drag_source`, `hover`,
//!   `drop` and `end_drag`, each validating its preconditions.
//! - [`DragDropMonitor`]: read-only queries and change subscriptions, plus
//!   the per-handler [`DragSourceMonitor`] and [`DropTargetMonitor`].
//! - [`DragDropManager`]: binds everything to a [`Backend`] and sets the
//!   backend up only while handlers are registered.
//! - [`scheduler`]: the cooperative hooks used for deferred work.
//!
//! ## Ordering conventions
//!
//! Hovered target lists are ordered outermost first, innermost last. Drops
//! are attempted innermost first, and each target that accepts sees the
//! drop result of the targets inside it.
//!
//! ## Errors
//!
//! Calling an operation outside the state where it is valid (dropping twice,
//! hovering while idle, duplicate target ids) returns a [`DndError`]. These
//! are programmer errors. Expected no-ops, like beginning a drag when no
//! source can be dragged, succeed without dispatching.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use understory_dnd::scheduler::LocalScheduler;
//! use understory_dnd::test_backend::TestBackend;
//! use understory_dnd::{
//!     DragDropManager, DragDropMonitor, DragSource, DropResult, DropTarget, HandlerId, Item,
//!     register_source, register_target,
//! };
//!
//! struct Piece;
//! impl DragSource for Piece {
//!     fn begin_drag(&self, _: &DragDropMonitor, _: HandlerId) -> Option<Item> {
//!         Some(Item::new("knight"))
//!     }
//! }
//!
//! struct Square(&'static str);
//! impl DropTarget for Square {
//!     fn drop(&self, _: &DragDropMonitor, _: HandlerId) -> Option<DropResult> {
//!         let mut result = DropResult::new();
//!         result.insert("square".into(), self.0.into());
//!         Some(result)
//!     }
//! }
//!
//! let manager = DragDropManager::new(Rc::new(LocalScheduler::new()), TestBackend::new);
//! let (piece, _) = register_source("piece", Rc::new(Piece), &manager).unwrap();
//! let (square, _) = register_target("piece", Rc::new(Square("e4")), &manager).unwrap();
//!
//! let backend = manager.backend();
//! backend.simulate_begin_drag(&[piece], Default::default()).unwrap();
//! backend.simulate_hover(&[square], None).unwrap();
//! backend.simulate_drop().unwrap();
//! assert_eq!(manager.monitor().drop_result().unwrap()["square"], "e4");
//! backend.simulate_end_drag().unwrap();
//! assert!(!manager.monitor().is_dragging());
//! ```
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

pub mod action;
mod actions;
pub mod backend;
pub mod error;
mod handler_monitor;
pub mod id;
mod manager;
mod monitor;
pub mod reducers;
mod registry;
pub mod scheduler;
pub mod store;
pub mod test_backend;
pub mod types;

pub use action::Action;
pub use actions::{BeginDragOptions, DragDropActions};
pub use backend::{Backend, Disconnect, Profile};
pub use error::{DndError, StoreError};
pub use handler_monitor::{DragSourceMonitor, DropTargetMonitor};
pub use id::{HandlerId, HandlerRole};
pub use manager::{DragDropCore, DragDropManager, Unregister, register_source, register_target};
pub use monitor::DragDropMonitor;
pub use registry::{DragSource, DropTarget, HandlerRegistry};
pub use types::{DropResult, Item, ItemType, Symbol, TargetType, matches_type};

pub use kurbo;
