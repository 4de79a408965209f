// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag source and drop target handlers, keyed by [`HandlerId`].
//!
//! The registry owns every handler. Adding or removing one dispatches the
//! matching action so the reference count (and with it backend setup) stays in
//! sync.
//!
//! ## Removal
//!
//! - Targets are removed immediately.
//! - Sources stay resolvable until the next microtask, so lookups already in
//!   flight during the current turn still find them.
//! - While a drag is active, the source that began it is *pinned*: it stays
//!   reachable through [`HandlerRegistry::source`] with `include_pinned` even
//!   after removal, until the drag ends.
//!
//! Handlers are handed out as `Rc` clones; the registry never holds one of its
//! own borrows while a handler method runs.

use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;

use hashbrown::{HashMap, HashSet};

use crate::action::Action;
use crate::error::DndError;
use crate::id::{HandlerId, HandlerIdAllocator, HandlerRole};
use crate::monitor::DragDropMonitor;
use crate::reducers::State;
use crate::scheduler::Scheduler;
use crate::store::Store;
use crate::types::{DropResult, Item, ItemType, TargetType};

/// A draggable origin.
pub trait DragSource {
    /// Whether a drag may begin from this source right now.
    fn can_drag(&self, monitor: &DragDropMonitor, id: HandlerId) -> bool {
        let _ = (monitor, id);
        true
    }

    /// Produces the dragged item. Returning `None` vetoes the drag.
    fn begin_drag(&self, monitor: &DragDropMonitor, id: HandlerId) -> Option<Item>;

    /// Whether this source should render as the one being dragged.
    ///
    /// The default compares against the source that began the drag. Override
    /// it when the dragged entity can move between sources while dragging.
    fn is_dragging(&self, monitor: &DragDropMonitor, id: HandlerId) -> bool {
        monitor.source_id() == Some(id)
    }

    /// Called once when the drag ends, dropped or not.
    fn end_drag(&self, monitor: &DragDropMonitor, id: HandlerId) {
        let _ = (monitor, id);
    }
}

/// A droppable destination.
pub trait DropTarget {
    /// Whether the dragged item may be dropped here.
    fn can_drop(&self, monitor: &DragDropMonitor, id: HandlerId) -> bool {
        let _ = (monitor, id);
        true
    }

    /// Called while a matching item hovers over this target.
    fn hover(&self, monitor: &DragDropMonitor, id: HandlerId) {
        let _ = (monitor, id);
    }

    /// Called when the item is dropped here. `None` leaves the drop result of
    /// a nested target in place.
    fn drop(&self, monitor: &DragDropMonitor, id: HandlerId) -> Option<DropResult> {
        let _ = (monitor, id);
        None
    }
}

struct Pinned {
    id: HandlerId,
    source: Rc<dyn DragSource>,
}

struct RegistryInner {
    store: Store<State, Action>,
    scheduler: Rc<dyn Scheduler>,
    ids: HandlerIdAllocator,
    source_types: RefCell<HashMap<HandlerId, ItemType>>,
    target_types: RefCell<HashMap<HandlerId, TargetType>>,
    sources: RefCell<HashMap<HandlerId, Rc<dyn DragSource>>>,
    targets: RefCell<HashMap<HandlerId, Rc<dyn DropTarget>>>,
    retiring: RefCell<HashSet<HandlerId>>,
    pinned: RefCell<Option<Pinned>>,
}

/// Shared handle to the handler registry.
#[derive(Clone)]
pub struct HandlerRegistry {
    inner: Rc<RegistryInner>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("sources", &self.inner.sources.borrow().len())
            .field("targets", &self.inner.targets.borrow().len())
            .field("retiring", &self.inner.retiring.borrow().len())
            .field(
                "pinned",
                &self.inner.pinned.borrow().as_ref().map(|p| p.id),
            )
            .finish_non_exhaustive()
    }
}

impl HandlerRegistry {
    pub(crate) fn new(store: Store<State, Action>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                store,
                scheduler,
                ids: HandlerIdAllocator::default(),
                source_types: RefCell::default(),
                target_types: RefCell::default(),
                sources: RefCell::default(),
                targets: RefCell::default(),
                retiring: RefCell::default(),
                pinned: RefCell::new(None),
            }),
        }
    }

    /// Registers a drag source and dispatches [`Action::AddSource`].
    pub fn add_source(
        &self,
        item_type: impl Into<ItemType>,
        source: Rc<dyn DragSource>,
    ) -> Result<HandlerId, DndError> {
        let id = self.inner.ids.next(HandlerRole::Source)?;
        self.inner
            .source_types
            .borrow_mut()
            .insert(id, item_type.into());
        self.inner.sources.borrow_mut().insert(id, source);
        self.inner.store.dispatch(Action::AddSource(id))?;
        Ok(id)
    }

    /// Registers a drop target and dispatches [`Action::AddTarget`].
    pub fn add_target(
        &self,
        target_type: impl Into<TargetType>,
        target: Rc<dyn DropTarget>,
    ) -> Result<HandlerId, DndError> {
        let id = self.inner.ids.next(HandlerRole::Target)?;
        self.inner
            .target_types
            .borrow_mut()
            .insert(id, target_type.into());
        self.inner.targets.borrow_mut().insert(id, target);
        self.inner.store.dispatch(Action::AddTarget(id))?;
        Ok(id)
    }

    /// Returns `true` if `id` is a source that has not been removed.
    #[must_use]
    pub fn contains_source(&self, id: HandlerId) -> bool {
        self.inner.sources.borrow().contains_key(&id) && !self.inner.retiring.borrow().contains(&id)
    }

    /// Returns `true` if `id` is a registered target.
    #[must_use]
    pub fn contains_target(&self, id: HandlerId) -> bool {
        self.inner.targets.borrow().contains_key(&id)
    }

    /// Returns `true` if `id` was handed out for a source of this registry.
    #[must_use]
    pub fn is_source_id(&self, id: HandlerId) -> bool {
        id.is_source() && self.inner.source_types.borrow().contains_key(&id)
    }

    /// Returns `true` if `id` was handed out for a target of this registry.
    #[must_use]
    pub fn is_target_id(&self, id: HandlerId) -> bool {
        id.is_target() && self.inner.target_types.borrow().contains_key(&id)
    }

    /// Number of sources still resolvable, including ones awaiting deletion.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.inner.sources.borrow().len()
    }

    /// Number of registered targets.
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.inner.targets.borrow().len()
    }

    /// Looks up a source.
    ///
    /// With `include_pinned`, the pinned source resolves even after it was
    /// removed.
    pub fn source(
        &self,
        id: HandlerId,
        include_pinned: bool,
    ) -> Result<Rc<dyn DragSource>, DndError> {
        id.expect_role(HandlerRole::Source)?;
        if include_pinned {
            if let Some(pinned) = self.inner.pinned.borrow().as_ref() {
                if pinned.id == id {
                    return Ok(pinned.source.clone());
                }
            }
        }
        self.inner
            .sources
            .borrow()
            .get(&id)
            .cloned()
            .ok_or(DndError::UnknownHandler(id))
    }

    /// Looks up a target.
    pub fn target(&self, id: HandlerId) -> Result<Rc<dyn DropTarget>, DndError> {
        id.expect_role(HandlerRole::Target)?;
        self.inner
            .targets
            .borrow()
            .get(&id)
            .cloned()
            .ok_or(DndError::UnknownHandler(id))
    }

    /// The item type a source was registered with.
    pub fn source_type(&self, id: HandlerId) -> Result<ItemType, DndError> {
        id.expect_role(HandlerRole::Source)?;
        self.inner
            .source_types
            .borrow()
            .get(&id)
            .cloned()
            .ok_or(DndError::UnknownHandler(id))
    }

    /// The item types a target accepts.
    pub fn target_type(&self, id: HandlerId) -> Result<TargetType, DndError> {
        id.expect_role(HandlerRole::Target)?;
        self.inner
            .target_types
            .borrow()
            .get(&id)
            .cloned()
            .ok_or(DndError::UnknownHandler(id))
    }

    /// Unregisters a source.
    ///
    /// [`Action::RemoveSource`] is dispatched right away; the handler itself
    /// is deleted on the next microtask.
    pub fn remove_source(&self, id: HandlerId) -> Result<(), DndError> {
        id.expect_role(HandlerRole::Source)?;
        if !self.contains_source(id) {
            return Err(DndError::UnknownHandler(id));
        }
        self.inner.retiring.borrow_mut().insert(id);
        self.inner.store.dispatch(Action::RemoveSource(id))?;

        let weak: Weak<RegistryInner> = Rc::downgrade(&self.inner);
        self.inner.scheduler.queue_microtask(alloc::boxed::Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                let removed = inner.sources.borrow_mut().remove(&id);
                inner.source_types.borrow_mut().remove(&id);
                inner.retiring.borrow_mut().remove(&id);
                drop(removed);
            }
        }));
        Ok(())
    }

    /// Unregisters a target immediately.
    pub fn remove_target(&self, id: HandlerId) -> Result<(), DndError> {
        id.expect_role(HandlerRole::Target)?;
        if !self.contains_target(id) {
            return Err(DndError::UnknownHandler(id));
        }
        self.inner.store.dispatch(Action::RemoveTarget(id))?;
        let removed = self.inner.targets.borrow_mut().remove(&id);
        self.inner.target_types.borrow_mut().remove(&id);
        drop(removed);
        Ok(())
    }

    /// Keeps the source `id` reachable for the rest of the drag.
    ///
    /// Replaces any previously pinned source.
    pub fn pin_source(&self, id: HandlerId) -> Result<(), DndError> {
        let source = self.source(id, false)?;
        *self.inner.pinned.borrow_mut() = Some(Pinned { id, source });
        Ok(())
    }

    /// Releases the pinned source.
    pub fn unpin_source(&self) -> Result<(), DndError> {
        let pinned = self
            .inner
            .pinned
            .borrow_mut()
            .take()
            .ok_or(DndError::NothingPinned)?;
        drop(pinned);
        Ok(())
    }

    /// The id of the pinned source, if any.
    #[must_use]
    pub fn pinned_source_id(&self) -> Option<HandlerId> {
        self.inner.pinned.borrow().as_ref().map(|p| p.id)
    }
}
