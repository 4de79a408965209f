// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The composition root.
//!
//! [`DragDropCore`] bundles the store, registry, monitor and actions; it is
//! what a backend receives when it is built. [`DragDropManager`] adds the
//! backend and keeps it set up exactly while at least one handler is
//! registered.
//!
//! ```
//! use std::rc::Rc;
//! use understory_dnd::scheduler::LocalScheduler;
//! use understory_dnd::test_backend::TestBackend;
//! use understory_dnd::{DragDropManager, DragSource, DragDropMonitor, HandlerId, Item};
//!
//! struct Card;
//! impl DragSource for Card {
//!     fn begin_drag(&self, _: &DragDropMonitor, _: HandlerId) -> Option<Item> {
//!         Some(Item::new("ace"))
//!     }
//! }
//!
//! let manager = DragDropManager::new(Rc::new(LocalScheduler::new()), TestBackend::new);
//! assert!(!manager.is_set_up());
//! let (id, unregister) = understory_dnd::register_source("card", Rc::new(Card), &manager).unwrap();
//! assert!(manager.is_set_up());
//!
//! manager.backend().simulate_begin_drag(&[id], Default::default()).unwrap();
//! assert!(manager.monitor().is_dragging());
//! manager.backend().simulate_end_drag().unwrap();
//! unregister.unregister().unwrap();
//! assert!(!manager.is_set_up());
//! ```

use alloc::rc::{Rc, Weak};
use core::cell::Cell;
use core::fmt;

use crate::action::Action;
use crate::actions::DragDropActions;
use crate::backend::Backend;
use crate::error::DndError;
use crate::id::{HandlerId, HandlerRole};
use crate::monitor::DragDropMonitor;
use crate::reducers::{self, State};
use crate::registry::{DragSource, DropTarget, HandlerRegistry};
use crate::scheduler::Scheduler;
use crate::store::{Store, Subscription};
use crate::types::{ItemType, TargetType};

/// Store, registry, monitor and actions of one drag-and-drop context.
///
/// Cloning is cheap; all clones share the same state.
#[derive(Clone)]
pub struct DragDropCore {
    store: Store<State, Action>,
    registry: HandlerRegistry,
    monitor: DragDropMonitor,
    actions: DragDropActions,
    scheduler: Rc<dyn Scheduler>,
}

impl fmt::Debug for DragDropCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragDropCore")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl DragDropCore {
    /// Creates an idle context whose deferred work runs on `scheduler`.
    #[must_use]
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        let store = Store::new(Action::Init, reducers::reduce);
        let registry = HandlerRegistry::new(store.clone(), scheduler.clone());
        let monitor = DragDropMonitor::new(store.clone(), registry.clone());
        let actions = DragDropActions::new(store.clone(), monitor.clone());
        Self {
            store,
            registry,
            monitor,
            actions,
            scheduler,
        }
    }

    /// The state store.
    #[must_use]
    pub fn store(&self) -> &Store<State, Action> {
        &self.store
    }

    /// The handler registry.
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// The read-only monitor.
    #[must_use]
    pub fn monitor(&self) -> &DragDropMonitor {
        &self.monitor
    }

    /// The drag lifecycle operations.
    #[must_use]
    pub fn actions(&self) -> &DragDropActions {
        &self.actions
    }

    /// The scheduler deferred work runs on.
    #[must_use]
    pub fn scheduler(&self) -> &Rc<dyn Scheduler> {
        &self.scheduler
    }
}

/// A drag-and-drop context bound to a backend.
pub struct DragDropManager<B> {
    core: DragDropCore,
    backend: Rc<B>,
    is_set_up: Rc<Cell<bool>>,
    ref_count: Option<Subscription>,
}

impl<B: fmt::Debug> fmt::Debug for DragDropManager<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragDropManager")
            .field("core", &self.core)
            .field("backend", &self.backend)
            .field("is_set_up", &self.is_set_up.get())
            .finish_non_exhaustive()
    }
}

impl<B: Backend + 'static> DragDropManager<B> {
    /// Creates a context and builds its backend with `backend`.
    ///
    /// The backend is not set up until the first handler is registered.
    pub fn new(scheduler: Rc<dyn Scheduler>, backend: impl FnOnce(DragDropCore) -> B) -> Self {
        let core = DragDropCore::new(scheduler);
        let backend = Rc::new(backend(core.clone()));
        let is_set_up = Rc::new(Cell::new(false));

        let weak: Weak<B> = Rc::downgrade(&backend);
        let flag = is_set_up.clone();
        let ref_count = core
            .store
            .subscribe(move |state: &State| {
                let Some(backend) = weak.upgrade() else {
                    return;
                };
                let should_set_up = state.ref_count > 0;
                if should_set_up && !flag.get() {
                    flag.set(true);
                    match backend.setup() {
                        Ok(()) => log::debug!("backend set up"),
                        Err(err) => {
                            flag.set(false);
                            log::error!("backend setup failed: {err}");
                        }
                    }
                } else if !should_set_up && flag.get() {
                    flag.set(false);
                    backend.teardown();
                    log::debug!("backend torn down");
                }
            })
            .ok();

        Self {
            core,
            backend,
            is_set_up,
            ref_count,
        }
    }

    /// The shared context.
    #[must_use]
    pub fn core(&self) -> &DragDropCore {
        &self.core
    }

    /// The backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The read-only monitor.
    #[must_use]
    pub fn monitor(&self) -> &DragDropMonitor {
        &self.core.monitor
    }

    /// The handler registry.
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.core.registry
    }

    /// The drag lifecycle operations.
    #[must_use]
    pub fn actions(&self) -> &DragDropActions {
        &self.core.actions
    }

    /// Whether the backend is currently set up.
    #[must_use]
    pub fn is_set_up(&self) -> bool {
        self.is_set_up.get()
    }

    /// Dispatches a raw action.
    pub fn dispatch(&self, action: Action) -> Result<(), DndError> {
        log::trace!("dispatch {}", action.name());
        self.core.store.dispatch(action)?;
        Ok(())
    }
}

impl<B> Drop for DragDropManager<B> {
    fn drop(&mut self) {
        if let Some(subscription) = self.ref_count.take() {
            // Only fails inside a reducer, which cannot own a manager.
            let _ = subscription.unsubscribe();
        }
    }
}

/// Removes a handler registered with [`register_source`] or
/// [`register_target`].
#[must_use = "dropping an Unregister keeps the handler registered"]
#[derive(Debug)]
pub struct Unregister {
    registry: HandlerRegistry,
    id: HandlerId,
}

impl Unregister {
    /// The id being unregistered.
    #[must_use]
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Removes the handler.
    pub fn unregister(self) -> Result<(), DndError> {
        match self.id.role() {
            HandlerRole::Source => self.registry.remove_source(self.id),
            HandlerRole::Target => self.registry.remove_target(self.id),
        }
    }
}

/// Registers a drag source with `manager`.
pub fn register_source<B: Backend + 'static>(
    item_type: impl Into<ItemType>,
    source: Rc<dyn DragSource>,
    manager: &DragDropManager<B>,
) -> Result<(HandlerId, Unregister), DndError> {
    let registry = manager.registry().clone();
    let id = registry.add_source(item_type, source)?;
    Ok((id, Unregister { registry, id }))
}

/// Registers a drop target with `manager`.
pub fn register_target<B: Backend + 'static>(
    target_type: impl Into<TargetType>,
    target: Rc<dyn DropTarget>,
    manager: &DragDropManager<B>,
) -> Result<(HandlerId, Unregister), DndError> {
    let registry = manager.registry().clone();
    let id = registry.add_target(target_type, target)?;
    Ok((id, Unregister { registry, id }))
}
