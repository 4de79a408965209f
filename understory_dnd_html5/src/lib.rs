// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dnd_html5 --heading-base-level=0

//! Understory DnD HTML5: a drag-and-drop backend over native browser drag events.
//!
//! [`Html5Backend`] implements [`understory_dnd::Backend`] by listening to
//! `dragstart`, `dragenter`, `dragover`, `dragleave`, `drop` and `dragend`,
//! which the host forwards through [`Html5Backend::handle_event`]. The
//! document itself is reached through the [`Html5Environment`] trait, so the
//! backend runs the same under a wasm adapter and under an in-memory test
//! document.
//!
//! ## Behavior
//!
//! - The innermost connected source under the pointer starts the drag. The
//!   source is published on the next turn, after the browser has captured the
//!   drag image, unless its preview asks to capture the dragging state.
//! - The drag image offset follows [`PreviewOptions`] anchors, interpolated
//!   with a [`MonotonicInterpolant`](interpolant::MonotonicInterpolant).
//! - `dragover` hovers are coalesced to one per animation frame.
//! - Files, links, text and markup dragged in from other applications become
//!   [`NativeItem`](native_types::NativeItem)s under the
//!   [`native_types`] item types.
//! - A drag whose source node is removed from the document mid-drag is ended
//!   on the next mouse move, since browsers skip `dragend` in that case.
//!
//! Only one backend may own a given root at a time; a second one fails to set
//! up with [`DndError::BackendAlreadySetUp`](understory_dnd::DndError::BackendAlreadySetUp).
//!
//! ## Features
//!
//! - `std` (default): forwards to `kurbo/std`.
//! - `libm`: forwards to `kurbo/libm` for `no_std` targets.

#![no_std]

extern crate alloc;

mod backend;
pub mod enter_leave;
mod environment;
mod event;
pub mod interpolant;
pub mod native_types;
pub mod offset;
mod options;

pub use backend::{Html5Backend, SOURCE_REMOVAL_PROBE_DELAY};
pub use environment::Html5Environment;
pub use event::{DataTransfer, DragEventKind, DropEffect, NativeDragEvent, NativeFile};
pub use options::{Html5Options, PreviewOptions, SourceOptions};

pub use kurbo;
