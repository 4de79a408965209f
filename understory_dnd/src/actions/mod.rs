// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag lifecycle.
//!
//! ```text
//! Idle --begin_drag--> Dragging --drop--> Dropped
//!  ^                      |                  |
//!  +-------end_drag-------+------------------+
//! ```
//!
//! Each operation validates its preconditions, runs handler side effects,
//! and dispatches the resulting action. Preconditions that are violated are
//! contract violations and return a [`DndError`] without dispatching.
//! Conditions that are expected to happen (no draggable source, publishing
//! while idle) return `Ok(())` and dispatch nothing.

mod begin_drag;
mod drop;
mod end_drag;
mod hover;

use core::fmt;

use kurbo::Point;

pub use begin_drag::BeginDragOptions;

use crate::action::Action;
use crate::error::DndError;
use crate::id::HandlerId;
use crate::monitor::DragDropMonitor;
use crate::reducers::State;
use crate::store::Store;
use crate::types::DropResult;

/// The drag lifecycle operations, bound to one store.
#[derive(Clone)]
pub struct DragDropActions {
    store: Store<State, Action>,
    monitor: DragDropMonitor,
}

impl fmt::Debug for DragDropActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragDropActions").finish_non_exhaustive()
    }
}

impl DragDropActions {
    pub(crate) fn new(store: Store<State, Action>, monitor: DragDropMonitor) -> Self {
        Self { store, monitor }
    }

    fn dispatch(&self, action: Option<Action>) -> Result<(), DndError> {
        match action {
            Some(action) => dispatch(&self.store, action),
            None => Ok(()),
        }
    }

    /// Begins dragging the innermost draggable source among `source_ids`.
    ///
    /// Sources are tried from the end of the slice backwards. If none can be
    /// dragged, or the chosen one returns no item, nothing begins and the
    /// start coordinates are left cleared or recorded respectively.
    ///
    /// Fails with [`DndError::AlreadyDragging`] during a drag and with
    /// [`DndError::UnknownHandler`] if any id is not a registered source.
    pub fn begin_drag(
        &self,
        source_ids: &[HandlerId],
        options: BeginDragOptions<'_>,
    ) -> Result<(), DndError> {
        let action = begin_drag::begin_drag(&self.store, &self.monitor, source_ids, options)?;
        self.dispatch(action)
    }

    /// Makes the dragged source visible as dragging. Does nothing when idle.
    pub fn publish_drag_source(&self) -> Result<(), DndError> {
        let action = self
            .monitor
            .is_dragging()
            .then_some(Action::PublishDragSource);
        self.dispatch(action)
    }

    /// Moves the pointer over `target_ids`, ordered outermost first.
    ///
    /// Targets that do not accept the dragged type are left out; the rest
    /// receive [`DropTarget::hover`](crate::DropTarget::hover) in order.
    pub fn hover(
        &self,
        target_ids: &[HandlerId],
        client_offset: Option<Point>,
    ) -> Result<(), DndError> {
        let action = hover::hover(&self.monitor, target_ids, client_offset)?;
        self.dispatch(action)
    }

    /// Drops on every hovered target that accepts the item, innermost first.
    ///
    /// `options` are merged under each target's own result.
    pub fn drop(&self, options: &DropResult) -> Result<(), DndError> {
        drop::drop(&self.store, &self.monitor, options)
    }

    /// Ends the drag, notifying the source that began it.
    pub fn end_drag(&self) -> Result<(), DndError> {
        let action = end_drag::end_drag(&self.monitor)?;
        self.dispatch(action)
    }
}

/// Dispatches `action`, tracing its name.
fn dispatch(store: &Store<State, Action>, action: Action) -> Result<(), DndError> {
    log::trace!("dispatch {}", action.name());
    store.dispatch(action)?;
    Ok(())
}
