// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A minimal single-writer observable state container.
//!
//! [`Store`] owns one immutable state value and replaces it on every
//! [`dispatch`](Store::dispatch) with the output of a pure reducer. Listeners
//! are notified synchronously after each dispatch.
//!
//! ## Ordering
//!
//! - The listener list is snapshotted when a dispatch starts notifying.
//!   Listeners added or removed during notification do not affect the round in
//!   progress; they take effect from the next dispatch.
//! - Every listener registered before `dispatch` is called has run before
//!   `dispatch` returns.
//! - Each listener receives the latest state at the time it is called, so a
//!   listener that dispatches again is observed by later listeners.
//!
//! ## Misuse
//!
//! While the reducer is executing the store is locked: dispatching, reading
//! the state, subscribing or unsubscribing fail with a [`StoreError`].
//!
//! ```
//! use understory_dnd::store::Store;
//!
//! let store = Store::new(0_u32, |state: Option<&u32>, action: &u32| {
//!     state.copied().unwrap_or_default() + action
//! });
//! store.dispatch(5).unwrap();
//! assert_eq!(*store.state(), 5);
//! ```

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::error::StoreError;

type Reducer<S, A> = Box<dyn Fn(Option<&S>, &A) -> S>;
type Listener<S> = Rc<dyn Fn(&S)>;

struct StoreInner<S, A> {
    state: RefCell<Option<Rc<S>>>,
    reducer: Reducer<S, A>,
    is_dispatching: Cell<bool>,
    listeners: RefCell<Rc<Vec<(u64, Listener<S>)>>>,
    next_listener: Cell<u64>,
}

/// Shared handle to an observable state container.
///
/// Cloning the handle is cheap; all clones address the same state.
pub struct Store<S, A> {
    inner: Rc<StoreInner<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: fmt::Debug + 'static, A: 'static> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Store");
        match self.inner.state.try_borrow() {
            Ok(state) => s.field("state", &*state),
            Err(_) => s.field("state", &"<locked>"),
        };
        s.field("is_dispatching", &self.inner.is_dispatching.get())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Resets the dispatching flag even if the reducer panics.
struct DispatchGuard<'a>(&'a Cell<bool>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<S: 'static, A: 'static> Store<S, A> {
    /// Creates a store and dispatches `init` once, so the reducer establishes
    /// the initial state from `None`.
    pub fn new(init: A, reducer: impl Fn(Option<&S>, &A) -> S + 'static) -> Self {
        let inner = StoreInner {
            state: RefCell::new(None),
            reducer: Box::new(reducer),
            is_dispatching: Cell::new(false),
            listeners: RefCell::new(Rc::new(Vec::new())),
            next_listener: Cell::new(0),
        };
        let store = Self {
            inner: Rc::new(inner),
        };
        store.reduce(&init);
        store
    }

    fn reduce(&self, action: &A) {
        let inner = &*self.inner;
        let _guard = DispatchGuard(&inner.is_dispatching);
        inner.is_dispatching.set(true);
        let previous = inner.state.borrow().clone();
        let next = (inner.reducer)(previous.as_deref(), action);
        *inner.state.borrow_mut() = Some(Rc::new(next));
    }

    /// Applies the reducer to `action` and notifies every listener.
    ///
    /// Fails with [`StoreError::DispatchInReducer`] when called from inside
    /// the reducer.
    pub fn dispatch(&self, action: A) -> Result<(), StoreError> {
        if self.inner.is_dispatching.get() {
            return Err(StoreError::DispatchInReducer);
        }
        self.reduce(&action);

        let snapshot = self.inner.listeners.borrow().clone();
        for (_, listener) in snapshot.iter() {
            let state = self.current();
            listener(&state);
        }
        Ok(())
    }

    /// Returns the current state.
    ///
    /// Fails with [`StoreError::StateInReducer`] while the reducer runs.
    pub fn try_state(&self) -> Result<Rc<S>, StoreError> {
        if self.inner.is_dispatching.get() {
            return Err(StoreError::StateInReducer);
        }
        Ok(self.current())
    }

    /// Returns the current state.
    ///
    /// # Panics
    ///
    /// Panics if called while the reducer runs. Use [`Store::try_state`] where
    /// that can happen.
    #[must_use]
    pub fn state(&self) -> Rc<S> {
        assert!(
            !self.inner.is_dispatching.get(),
            "{}",
            StoreError::StateInReducer
        );
        self.current()
    }

    fn current(&self) -> Rc<S> {
        match &*self.inner.state.borrow() {
            Some(state) => state.clone(),
            None => unreachable!("the store is initialized on construction"),
        }
    }

    /// Registers `listener` to run after every dispatch.
    ///
    /// Fails with [`StoreError::SubscribeInReducer`] while the reducer runs.
    pub fn subscribe(&self, listener: impl Fn(&S) + 'static) -> Result<Subscription, StoreError> {
        if self.inner.is_dispatching.get() {
            return Err(StoreError::SubscribeInReducer);
        }
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        let mut listeners = self.inner.listeners.borrow_mut();
        Rc::make_mut(&mut listeners).push((id, Rc::new(listener)));
        let weak: Weak<StoreInner<S, A>> = Rc::downgrade(&self.inner);
        Ok(Subscription {
            id,
            store: weak,
        })
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

trait Unsubscribe {
    fn unsubscribe(&self, id: u64) -> Result<(), StoreError>;
}

impl<S, A> Unsubscribe for StoreInner<S, A> {
    fn unsubscribe(&self, id: u64) -> Result<(), StoreError> {
        if self.is_dispatching.get() {
            return Err(StoreError::UnsubscribeInReducer);
        }
        let mut listeners = self.listeners.borrow_mut();
        if listeners.iter().any(|(l, _)| *l == id) {
            Rc::make_mut(&mut listeners).retain(|(l, _)| *l != id);
        }
        Ok(())
    }
}

/// A registered store listener.
///
/// Dropping a `Subscription` leaves the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[must_use = "dropping a subscription does not unsubscribe"]
pub struct Subscription {
    id: u64,
    store: Weak<dyn Unsubscribe>,
}

impl Subscription {
    /// Removes the listener.
    ///
    /// Unsubscribing from a store that no longer exists succeeds. Fails with
    /// [`StoreError::UnsubscribeInReducer`] while the reducer runs.
    pub fn unsubscribe(self) -> Result<(), StoreError> {
        match self.store.upgrade() {
            Some(store) => store.unsubscribe(self.id),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("live", &(self.store.strong_count() > 0))
            .finish()
    }
}
