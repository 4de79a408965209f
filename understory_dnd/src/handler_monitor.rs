// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monitors bound to a single handler.
//!
//! A rendering layer typically creates one of these per connected component,
//! binds it with `receive_handler_id` once the handler is registered, and
//! collects `can_drag`/`is_dragging` or `can_drop`/`is_over` on every
//! relevant state change. An unbound monitor answers `false` to everything.
//!
//! Querying a monitor from inside the handler method it delegates to (for
//! example calling [`DragSourceMonitor::can_drag`] from
//! [`DragSource::can_drag`](crate::DragSource::can_drag)) would recurse, and
//! fails with [`DndError::ReentrantMonitorCall`] instead.

use alloc::vec;
use core::cell::Cell;

use crate::error::DndError;
use crate::id::HandlerId;
use crate::monitor::DragDropMonitor;
use crate::store::Subscription;

/// Resets a reentrancy flag on scope exit.
struct Reentry<'a>(&'a Cell<bool>);

impl<'a> Reentry<'a> {
    fn enter(flag: &'a Cell<bool>, name: &'static str) -> Result<Self, DndError> {
        if flag.replace(true) {
            return Err(DndError::ReentrantMonitorCall(name));
        }
        Ok(Self(flag))
    }
}

impl Drop for Reentry<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Monitor bound to one drag source.
#[derive(Debug)]
pub struct DragSourceMonitor {
    monitor: DragDropMonitor,
    source_id: Cell<Option<HandlerId>>,
}

impl DragSourceMonitor {
    /// Creates an unbound monitor.
    #[must_use]
    pub fn new(monitor: DragDropMonitor) -> Self {
        Self {
            monitor,
            source_id: Cell::new(None),
        }
    }

    /// Binds (or with `None`, unbinds) the source this monitor reports on.
    pub fn receive_handler_id(&self, source_id: Option<HandlerId>) {
        self.source_id.set(source_id);
    }

    /// The bound source.
    #[must_use]
    pub fn handler_id(&self) -> Option<HandlerId> {
        self.source_id.get()
    }

    /// The global monitor.
    #[must_use]
    pub fn global(&self) -> &DragDropMonitor {
        &self.monitor
    }

    /// Whether a drag may begin from the bound source.
    pub fn can_drag(&self) -> Result<bool, DndError> {
        let Some(id) = self.source_id.get() else {
            return Ok(false);
        };
        let _entered = Reentry::enter(&self.monitor.guards.calling_can_drag, "can_drag")?;
        self.monitor.can_drag_source(id)
    }

    /// Whether the bound source renders as the dragged one.
    pub fn is_dragging(&self) -> Result<bool, DndError> {
        let Some(id) = self.source_id.get() else {
            return Ok(false);
        };
        let _entered = Reentry::enter(&self.monitor.guards.calling_is_dragging, "is_dragging")?;
        self.monitor.is_dragging_source(id)
    }

    /// Subscribes to changes that concern the bound source.
    ///
    /// Unbound monitors subscribe to every change.
    pub fn subscribe_to_state_change(
        &self,
        listener: impl Fn() + 'static,
    ) -> Result<Subscription, DndError> {
        let ids = self.source_id.get().map(|id| vec![id]);
        self.monitor.subscribe_to_state_change(listener, ids)
    }
}

/// Monitor bound to one drop target.
#[derive(Debug)]
pub struct DropTargetMonitor {
    monitor: DragDropMonitor,
    target_id: Cell<Option<HandlerId>>,
}

impl DropTargetMonitor {
    /// Creates an unbound monitor.
    #[must_use]
    pub fn new(monitor: DragDropMonitor) -> Self {
        Self {
            monitor,
            target_id: Cell::new(None),
        }
    }

    /// Binds (or with `None`, unbinds) the target this monitor reports on.
    pub fn receive_handler_id(&self, target_id: Option<HandlerId>) {
        self.target_id.set(target_id);
    }

    /// The bound target.
    #[must_use]
    pub fn handler_id(&self) -> Option<HandlerId> {
        self.target_id.get()
    }

    /// The global monitor.
    #[must_use]
    pub fn global(&self) -> &DragDropMonitor {
        &self.monitor
    }

    /// Whether the dragged item may be dropped on the bound target.
    pub fn can_drop(&self) -> Result<bool, DndError> {
        let Some(id) = self.target_id.get() else {
            return Ok(false);
        };
        let _entered = Reentry::enter(&self.monitor.guards.calling_can_drop, "can_drop")?;
        self.monitor.can_drop_on_target(id)
    }

    /// Whether the pointer is over the bound target; with `shallow`, only as
    /// the innermost target.
    pub fn is_over(&self, shallow: bool) -> Result<bool, DndError> {
        let Some(id) = self.target_id.get() else {
            return Ok(false);
        };
        self.monitor.is_over_target(id, shallow)
    }

    /// Subscribes to changes that concern the bound target.
    ///
    /// Unbound monitors subscribe to every change.
    pub fn subscribe_to_state_change(
        &self,
        listener: impl Fn() + 'static,
    ) -> Result<Subscription, DndError> {
        let ids = self.target_id.get().map(|id| vec![id]);
        self.monitor.subscribe_to_state_change(listener, ids)
    }
}
