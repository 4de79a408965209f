// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure state transitions.
//!
//! The store state is split into independent slices, each owned by one
//! reducer. [`reduce`] composes them; it never fails and never dispatches.

mod dirty_handler_ids;
mod drag_offset;
mod drag_operation;

use alloc::rc::Rc;

pub use dirty_handler_ids::DirtyHandlerIds;
pub use drag_offset::DragOffset;
pub use drag_operation::DragOperation;

use crate::action::Action;

/// The complete drag-and-drop state.
#[derive(Clone, Debug)]
pub struct State {
    /// Handlers whose status changed in the latest dispatch.
    pub dirty_handler_ids: DirtyHandlerIds,
    /// Coordinates; the `Rc` is replaced only when a value changes.
    pub drag_offset: Rc<DragOffset>,
    /// Number of registered handlers.
    pub ref_count: usize,
    /// The current drag operation.
    pub drag_operation: DragOperation,
    /// Incremented by exactly one on every dispatch.
    pub state_id: u64,
}

/// Computes the state following `action`. `None` is the state before the
/// first action.
#[must_use]
pub fn reduce(state: Option<&State>, action: &Action) -> State {
    let prev_target_ids = state.map_or(&[][..], |s| s.drag_operation.target_ids.as_slice());
    State {
        dirty_handler_ids: dirty_handler_ids::reduce(prev_target_ids, action),
        drag_offset: drag_offset::reduce(state.map(|s| &s.drag_offset), action),
        ref_count: reduce_ref_count(state.map_or(0, |s| s.ref_count), action),
        drag_operation: drag_operation::reduce(state.map(|s| &s.drag_operation), action),
        state_id: state.map_or(0, |s| s.state_id) + 1,
    }
}

fn reduce_ref_count(count: usize, action: &Action) -> usize {
    match action {
        Action::AddSource(_) | Action::AddTarget(_) => count + 1,
        Action::RemoveSource(_) | Action::RemoveTarget(_) => count.saturating_sub(1),
        _ => count,
    }
}
