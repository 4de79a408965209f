// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract violations.
//!
//! Every error in this crate is a programmer error: an operation was called
//! outside the state in which it is valid. None of them are meant to be
//! recovered from at runtime; they exist so integrators find misuse early.
//! Conditions that are expected to happen (no draggable source under the
//! pointer, publishing when nothing is being dragged) are not errors and
//! produce no action instead.

use alloc::string::String;

use thiserror::Error;

use crate::id::{HandlerId, HandlerRole};

/// Misuse of the [`Store`](crate::store::Store).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    /// `dispatch` was re-entered from inside a reducer.
    #[error("reducers may not dispatch actions")]
    DispatchInReducer,
    /// The state was read while a reducer was executing.
    #[error(
        "you may not read the store state while the reducer is executing; \
         the reducer has already received the state as an argument"
    )]
    StateInReducer,
    /// `subscribe` was called while a reducer was executing.
    #[error("you may not subscribe to the store while the reducer is executing")]
    SubscribeInReducer,
    /// A subscription was cancelled while a reducer was executing.
    #[error("you may not unsubscribe from the store while the reducer is executing")]
    UnsubscribeInReducer,
}

/// A drag-and-drop contract violation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DndError {
    /// `begin_drag` was called while a drag operation is active.
    #[error("cannot call begin_drag while dragging")]
    AlreadyDragging,
    /// An operation that needs an active drag was called without one.
    #[error("cannot call {0} while not dragging")]
    NotDragging(&'static str),
    /// `hover` was called after the current drag was dropped.
    #[error("cannot call hover after drop")]
    HoverAfterDrop,
    /// `drop` was called twice during one drag operation.
    #[error("cannot call drop twice during one drag operation")]
    AlreadyDropped,
    /// The same target id appeared more than once in a hover list.
    #[error("expected target ids to be unique in the passed list, {0} appears more than once")]
    DuplicateTargetId(HandlerId),
    /// An id of the wrong role was handed to a role-specific operation.
    #[error("expected a valid {expected} id, got {id}")]
    WrongRole {
        /// The role the operation works with.
        expected: HandlerRole,
        /// The id that was passed.
        id: HandlerId,
    },
    /// The id is well formed but nothing is registered under it.
    #[error("expected {0} to be registered")]
    UnknownHandler(HandlerId),
    /// A string could not be parsed as a handler id.
    #[error("cannot parse handler id {0:?}")]
    InvalidHandlerId(String),
    /// Every handler id of the registry has been issued.
    #[error("no handler ids left to allocate")]
    HandlerIdsExhausted,
    /// `unpin_source` was called with nothing pinned.
    #[error("cannot unpin a source that is not pinned")]
    NothingPinned,
    /// `begin_drag` received a client offset but no way to resolve the
    /// dragged element's own offset.
    #[error("a source client offset resolver must be given together with a client offset")]
    MissingSourceClientOffset,
    /// A monitor query was made from inside the handler method it delegates to.
    #[error("you may not call monitor.{0}() inside your {0}() implementation")]
    ReentrantMonitorCall(&'static str),
    /// Another backend already owns the root node.
    #[error("cannot have two {0} backends at the same time")]
    BackendAlreadySetUp(&'static str),
    /// The state store was misused.
    #[error(transparent)]
    Store(#[from] StoreError),
}
