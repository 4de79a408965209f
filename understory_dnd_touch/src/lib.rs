// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dnd_touch --heading-base-level=0

//! Understory DnD Touch: a drag-and-drop backend for touch screens and mice.
//!
//! [`TouchBackend`] implements [`understory_dnd::Backend`] from plain pointer
//! events (`touchstart`/`touchmove`/`touchend`, `mousedown`/`mousemove`/
//! `mouseup`, `contextmenu` and `keydown`) that the host forwards through
//! [`TouchBackend::handle_event`]. Drop targets are found by hit-testing
//! through the [`TouchEnvironment`] trait.
//!
//! ## Gestures
//!
//! - [`TouchOptions::delay_touch_start`] and
//!   [`TouchOptions::delay_mouse_start`] require a press to be held before it
//!   can start a drag; moving earlier cancels it.
//! - [`TouchOptions::touch_slop`] is the distance the pointer travels before
//!   the drag begins.
//! - [`TouchOptions::scroll_angle_ranges`] marks gestures whose first movement
//!   points in one of the given directions as scrolls for their whole
//!   duration. See [`AngleRange`] for the angle convention.
//! - With [`TouchOptions::enable_keyboard_events`], `Escape` cancels a drag.
//!
//! Hit-testing also considers the ancestors of the elements under the pointer,
//! so zero-sized wrappers and SVG groups can be drop targets. If the host UI
//! removes the dragged node mid-gesture, report it with
//! [`TouchBackend::notify_child_list_changed`]; the node is hidden and moved to
//! the body so the touch sequence survives.
//!
//! ## Features
//!
//! - `std` (default): forwards to `kurbo/std`.
//! - `libm`: forwards to `kurbo/libm` for `no_std` targets.

#![no_std]

extern crate alloc;

mod backend;
mod environment;
mod event;
pub mod math;
mod options;

pub use backend::TouchBackend;
pub use environment::TouchEnvironment;
pub use event::{PointerEvent, PointerEventKind, TouchPoint};
pub use math::AngleRange;
pub use options::{ElementsAtPoint, PreviewOptions, TouchOptions};

pub use kurbo;
