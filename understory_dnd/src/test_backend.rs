// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A backend driven by explicit calls, for tests.
//!
//! [`TestBackend`] has no nodes and listens to nothing. It records setup and
//! teardown, and forwards `simulate_*` calls straight to the actions, so tests
//! can walk the drag lifecycle without an input system.

use core::cell::Cell;

use kurbo::Point;

use crate::actions::BeginDragOptions;
use crate::backend::{Backend, Disconnect, Profile};
use crate::error::DndError;
use crate::id::HandlerId;
use crate::manager::DragDropCore;
use crate::types::DropResult;

/// Backend that only does what the test tells it to.
#[derive(Debug)]
pub struct TestBackend {
    core: DragDropCore,
    setups: Cell<usize>,
    teardowns: Cell<usize>,
}

impl TestBackend {
    /// Creates the backend; pass this function to
    /// [`DragDropManager::new`](crate::DragDropManager::new).
    #[must_use]
    pub fn new(core: DragDropCore) -> Self {
        Self {
            core,
            setups: Cell::new(0),
            teardowns: Cell::new(0),
        }
    }

    /// Whether `setup` has been called at least once.
    #[must_use]
    pub fn did_call_setup(&self) -> bool {
        self.setups.get() > 0
    }

    /// Whether `teardown` has been called at least once.
    #[must_use]
    pub fn did_call_teardown(&self) -> bool {
        self.teardowns.get() > 0
    }

    /// Number of `setup` calls so far.
    #[must_use]
    pub fn setup_count(&self) -> usize {
        self.setups.get()
    }

    /// Number of `teardown` calls so far.
    #[must_use]
    pub fn teardown_count(&self) -> usize {
        self.teardowns.get()
    }

    /// Begins a drag as if the pointer pressed on `source_ids`.
    pub fn simulate_begin_drag(
        &self,
        source_ids: &[HandlerId],
        options: BeginDragOptions<'_>,
    ) -> Result<(), DndError> {
        self.core.actions().begin_drag(source_ids, options)
    }

    /// Publishes the dragged source.
    pub fn simulate_publish_drag_source(&self) -> Result<(), DndError> {
        self.core.actions().publish_drag_source()
    }

    /// Hovers `target_ids`, outermost first.
    pub fn simulate_hover(
        &self,
        target_ids: &[HandlerId],
        client_offset: Option<Point>,
    ) -> Result<(), DndError> {
        self.core.actions().hover(target_ids, client_offset)
    }

    /// Drops with no extra options.
    pub fn simulate_drop(&self) -> Result<(), DndError> {
        self.core.actions().drop(&DropResult::new())
    }

    /// Ends the drag.
    pub fn simulate_end_drag(&self) -> Result<(), DndError> {
        self.core.actions().end_drag()
    }
}

impl Backend for TestBackend {
    type Node = ();
    type SourceOptions = ();
    type PreviewOptions = ();
    type TargetOptions = ();

    fn setup(&self) -> Result<(), DndError> {
        self.setups.set(self.setups.get() + 1);
        Ok(())
    }

    fn teardown(&self) {
        self.teardowns.set(self.teardowns.get() + 1);
    }

    fn connect_drag_source(&self, _: HandlerId, _: (), _: ()) -> Disconnect {
        Disconnect::noop()
    }

    fn connect_drag_preview(&self, _: HandlerId, _: (), _: ()) -> Disconnect {
        Disconnect::noop()
    }

    fn connect_drop_target(&self, _: HandlerId, _: (), _: ()) -> Disconnect {
        Disconnect::noop()
    }

    fn profile(&self) -> Profile {
        alloc::vec![("setups", self.setups.get()), ("teardowns", self.teardowns.get())]
    }
}
