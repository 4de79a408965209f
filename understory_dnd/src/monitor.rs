// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only queries over the drag-and-drop state.
//!
//! [`DragDropMonitor`] answers "is anything being dragged", "can this target
//! accept it", "is the pointer over that one" and exposes the drag
//! coordinates. Rendering code subscribes to changes instead of polling:
//!
//! - [`subscribe_to_state_change`](DragDropMonitor::subscribe_to_state_change)
//!   with a list of handler ids skips dispatches that did not touch any of
//!   them, which keeps thousands of subscribers cheap during hover.
//! - [`subscribe_to_offset_change`](DragDropMonitor::subscribe_to_offset_change)
//!   only fires when the coordinates actually moved.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use kurbo::{Point, Vec2};

use crate::action::Action;
use crate::error::DndError;
use crate::id::HandlerId;
use crate::reducers::State;
use crate::registry::HandlerRegistry;
use crate::store::{Store, Subscription};
use crate::types::{DropResult, Item, ItemType, matches_type};

/// Flags guarding against a handler querying its own per-handler monitor from
/// inside the handler method that query delegates to.
#[derive(Debug, Default)]
pub(crate) struct MonitorGuards {
    pub(crate) calling_can_drag: Cell<bool>,
    pub(crate) calling_is_dragging: Cell<bool>,
    pub(crate) calling_can_drop: Cell<bool>,
}

/// Read-only view over the store and registry.
///
/// Cloning is cheap. Handler methods receive a reference to it.
#[derive(Clone)]
pub struct DragDropMonitor {
    store: Store<State, Action>,
    registry: HandlerRegistry,
    pub(crate) guards: Rc<MonitorGuards>,
}

impl fmt::Debug for DragDropMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragDropMonitor")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl DragDropMonitor {
    pub(crate) fn new(store: Store<State, Action>, registry: HandlerRegistry) -> Self {
        Self {
            store,
            registry,
            guards: Rc::default(),
        }
    }

    /// The registry this monitor resolves handlers in.
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// A snapshot of the full state.
    #[must_use]
    pub fn state(&self) -> Rc<State> {
        self.store.state()
    }

    /// Calls `listener` after dispatches that concern `handler_ids`.
    ///
    /// A dispatch is skipped when the state did not advance, or advanced by a
    /// single step whose dirty handlers do not intersect `handler_ids`. With
    /// `None`, every dispatch notifies.
    pub fn subscribe_to_state_change(
        &self,
        listener: impl Fn() + 'static,
        handler_ids: Option<Vec<HandlerId>>,
    ) -> Result<Subscription, DndError> {
        let prev_state_id = Cell::new(self.store.try_state()?.state_id);
        let subscription = self.store.subscribe(move |state: &State| {
            let current = state.state_id;
            let prev = prev_state_id.replace(current);
            let can_skip = current == prev
                || (current == prev + 1
                    && !state.dirty_handler_ids.are_dirty(handler_ids.as_deref()));
            if !can_skip {
                listener();
            }
        })?;
        Ok(subscription)
    }

    /// Calls `listener` whenever the drag coordinates change.
    pub fn subscribe_to_offset_change(
        &self,
        listener: impl Fn() + 'static,
    ) -> Result<Subscription, DndError> {
        let previous = RefCell::new(self.store.try_state()?.drag_offset.clone());
        let subscription = self.store.subscribe(move |state: &State| {
            if Rc::ptr_eq(&*previous.borrow(), &state.drag_offset) {
                return;
            }
            *previous.borrow_mut() = state.drag_offset.clone();
            listener();
        })?;
        Ok(subscription)
    }

    /// Whether a drag may begin from `source_id`.
    ///
    /// Always `false` while another drag is active.
    pub fn can_drag_source(&self, source_id: HandlerId) -> Result<bool, DndError> {
        let source = self.registry.source(source_id, false)?;
        if self.is_dragging() {
            return Ok(false);
        }
        Ok(source.can_drag(self, source_id))
    }

    /// Whether the dragged item may be dropped on `target_id`.
    pub fn can_drop_on_target(&self, target_id: HandlerId) -> Result<bool, DndError> {
        let target = self.registry.target(target_id)?;
        if !self.is_dragging() || self.did_drop() {
            return Ok(false);
        }
        let target_type = self.registry.target_type(target_id)?;
        Ok(matches_type(&target_type, self.item_type().as_ref())
            && target.can_drop(self, target_id))
    }

    /// Whether any drag is active.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.store.state().drag_operation.item_type.is_some()
    }

    /// Whether `source_id` should render as the dragged source.
    ///
    /// `false` until the source has been published.
    pub fn is_dragging_source(&self, source_id: HandlerId) -> Result<bool, DndError> {
        let source = self.registry.source(source_id, true)?;
        if !self.is_dragging() || !self.is_source_public() {
            return Ok(false);
        }
        let source_type = match self.registry.source_type(source_id) {
            Ok(t) => t,
            Err(DndError::UnknownHandler(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        if Some(source_type) != self.item_type() {
            return Ok(false);
        }
        Ok(source.is_dragging(self, source_id))
    }

    /// Whether the pointer is over `target_id`.
    ///
    /// With `shallow`, only the innermost hovered target counts.
    pub fn is_over_target(&self, target_id: HandlerId, shallow: bool) -> Result<bool, DndError> {
        if !self.is_dragging() {
            return Ok(false);
        }
        let target_type = self.registry.target_type(target_id)?;
        if !matches_type(&target_type, self.item_type().as_ref()) {
            return Ok(false);
        }
        let state = self.store.state();
        let target_ids = &state.drag_operation.target_ids;
        Ok(if shallow {
            target_ids.last() == Some(&target_id)
        } else {
            target_ids.contains(&target_id)
        })
    }

    /// Type of the dragged item.
    #[must_use]
    pub fn item_type(&self) -> Option<ItemType> {
        self.store.state().drag_operation.item_type.clone()
    }

    /// The dragged item.
    #[must_use]
    pub fn item(&self) -> Option<Item> {
        self.store.state().drag_operation.item.clone()
    }

    /// The source that began the drag.
    #[must_use]
    pub fn source_id(&self) -> Option<HandlerId> {
        self.store.state().drag_operation.source_id
    }

    /// Hovered targets, outermost first.
    #[must_use]
    pub fn target_ids(&self) -> Vec<HandlerId> {
        self.store.state().drag_operation.target_ids.clone()
    }

    /// The result of the latest drop.
    #[must_use]
    pub fn drop_result(&self) -> Option<DropResult> {
        self.store.state().drag_operation.drop_result.clone()
    }

    /// Whether a target accepted the drop.
    #[must_use]
    pub fn did_drop(&self) -> bool {
        self.store.state().drag_operation.did_drop
    }

    /// Whether the dragged source has been published.
    #[must_use]
    pub fn is_source_public(&self) -> bool {
        self.store.state().drag_operation.is_source_public == Some(true)
    }

    /// Pointer position when the drag began.
    #[must_use]
    pub fn initial_client_offset(&self) -> Option<Point> {
        self.store.state().drag_offset.initial_client_offset
    }

    /// Position of the dragged element when the drag began.
    #[must_use]
    pub fn initial_source_client_offset(&self) -> Option<Point> {
        self.store.state().drag_offset.initial_source_client_offset
    }

    /// Latest pointer position.
    #[must_use]
    pub fn client_offset(&self) -> Option<Point> {
        self.store.state().drag_offset.client_offset
    }

    /// Current position of the dragged element.
    #[must_use]
    pub fn source_client_offset(&self) -> Option<Point> {
        self.store.state().drag_offset.source_client_offset()
    }

    /// How far the pointer moved since the drag began.
    #[must_use]
    pub fn difference_from_initial_offset(&self) -> Option<Vec2> {
        self.store.state().drag_offset.difference_from_initial_offset()
    }
}
