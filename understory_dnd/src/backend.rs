// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam between the drag-and-drop core and an input system.
//!
//! A backend turns platform input (native drag events, touches, test calls)
//! into [`DragDropActions`](crate::DragDropActions) calls. The manager sets
//! it up when the first handler is registered and tears it down when the last
//! one leaves.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::error::DndError;
use crate::id::HandlerId;

/// Node map sizes reported by [`Backend::profile`], for leak checks.
pub type Profile = Vec<(&'static str, usize)>;

/// An input backend.
pub trait Backend {
    /// The platform's handle for an element.
    type Node;
    /// Per-source connection options.
    type SourceOptions: Default;
    /// Per-preview connection options.
    type PreviewOptions: Default;
    /// Per-target connection options.
    type TargetOptions: Default;

    /// Starts listening for input.
    fn setup(&self) -> Result<(), DndError>;

    /// Stops listening for input and forgets transient drag state.
    fn teardown(&self);

    /// Associates a registered source with the node that starts its drags.
    fn connect_drag_source(
        &self,
        source_id: HandlerId,
        node: Self::Node,
        options: Self::SourceOptions,
    ) -> Disconnect;

    /// Associates a registered source with the node rendered as its preview.
    fn connect_drag_preview(
        &self,
        source_id: HandlerId,
        node: Self::Node,
        options: Self::PreviewOptions,
    ) -> Disconnect;

    /// Associates a registered target with the node that receives hovers.
    fn connect_drop_target(
        &self,
        target_id: HandlerId,
        node: Self::Node,
        options: Self::TargetOptions,
    ) -> Disconnect;

    /// Sizes of the backend's internal maps.
    fn profile(&self) -> Profile {
        Profile::new()
    }
}

/// Undoes one `connect_*` call.
///
/// Dropping a `Disconnect` without calling [`Disconnect::disconnect`] leaves
/// the node connected.
#[must_use = "dropping a Disconnect leaves the node connected"]
pub struct Disconnect(Option<Box<dyn FnOnce()>>);

impl Disconnect {
    /// Wraps the cleanup to run on disconnect.
    pub fn new(cleanup: impl FnOnce() + 'static) -> Self {
        Self(Some(Box::new(cleanup)))
    }

    /// A disconnect that does nothing.
    pub fn noop() -> Self {
        Self(None)
    }

    /// Runs the cleanup.
    pub fn disconnect(self) {
        if let Some(cleanup) = self.0 {
            cleanup();
        }
    }
}

impl fmt::Debug for Disconnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Disconnect")
            .field(&if self.0.is_some() { "pending" } else { "noop" })
            .finish()
    }
}
