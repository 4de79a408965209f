// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cooperative scheduling.
//!
//! Everything in this crate runs on one thread, driven by the host's event
//! loop. The few places that must run *later* (deferred source deletion,
//! publishing a drag source on the next turn, coalescing hovers into one per
//! frame, delayed touch starts) go through the [`Scheduler`] trait so a host
//! can map them onto its own loop.
//!
//! [`LocalScheduler`] is a deterministic implementation with a manual clock.
//! Tests drive it explicitly; single-threaded hosts without a native loop can
//! pump it from their main loop.
//!
//! ```
//! use core::cell::Cell;
//! use core::time::Duration;
//! use std::rc::Rc;
//! use understory_dnd::scheduler::{LocalScheduler, Scheduler};
//!
//! let scheduler = LocalScheduler::new();
//! let fired = Rc::new(Cell::new(0));
//! let f = fired.clone();
//! scheduler.set_timeout(Duration::from_millis(10), Box::new(move || f.set(f.get() + 1)));
//! scheduler.advance(Duration::from_millis(9));
//! assert_eq!(fired.get(), 0);
//! scheduler.advance(Duration::from_millis(1));
//! assert_eq!(fired.get(), 1);
//! ```

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::time::Duration;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// Identifies a pending timer or animation frame callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a host-assigned id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Host hook for deferred work.
///
/// Tasks are run on the same thread that scheduled them, never re-entrantly
/// from inside the call that scheduled them.
pub trait Scheduler {
    /// Runs `task` after the current synchronous work completes, before any
    /// timer or frame callback.
    fn queue_microtask(&self, task: Task);

    /// Runs `task` once `delay` has elapsed. A zero delay means the next turn
    /// of the event loop.
    fn set_timeout(&self, delay: Duration, task: Task) -> TaskId;

    /// Cancels a pending timer. Unknown or already fired ids are ignored.
    fn clear_timeout(&self, id: TaskId);

    /// Runs `task` before the next frame is presented.
    fn request_animation_frame(&self, task: Task) -> TaskId;

    /// Cancels a pending frame callback. Unknown or already fired ids are
    /// ignored.
    fn cancel_animation_frame(&self, id: TaskId);
}

struct Timer {
    id: TaskId,
    deadline: Duration,
    task: Task,
}

/// A deterministic scheduler with a manually advanced clock.
///
/// Nothing runs until the owner calls one of the `run_*` or `advance` methods.
/// Tasks may schedule further tasks while running.
#[derive(Default)]
pub struct LocalScheduler {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    microtasks: RefCell<VecDeque<Task>>,
    timers: RefCell<Vec<Timer>>,
    frames: RefCell<Vec<(TaskId, Task)>>,
}

impl fmt::Debug for LocalScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalScheduler")
            .field("now", &self.now.get())
            .field("pending_microtasks", &self.pending_microtasks())
            .field("pending_timers", &self.pending_timers())
            .field("pending_animation_frames", &self.pending_animation_frames())
            .finish_non_exhaustive()
    }
}

impl LocalScheduler {
    /// Creates an idle scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&self) -> TaskId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        TaskId(id)
    }

    /// Time elapsed on the manual clock.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Runs queued microtasks, including ones queued while draining, and
    /// returns how many ran.
    pub fn run_microtasks(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.microtasks.borrow_mut().pop_front();
            let Some(task) = next else {
                return ran;
            };
            task();
            ran += 1;
        }
    }

    /// Moves the clock forward by `by`, firing due timers in deadline order.
    ///
    /// Microtasks are drained before the first timer and after each one.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        self.run_microtasks();
        while let Some(timer) = self.take_due_timer(target) {
            self.now.set(timer.deadline);
            (timer.task)();
            self.run_microtasks();
        }
        self.now.set(target);
    }

    fn take_due_timer(&self, limit: Duration) -> Option<Timer> {
        let mut timers = self.timers.borrow_mut();
        let index = timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= limit)
            .min_by_key(|(_, t)| (t.deadline, t.id))
            .map(|(i, _)| i)?;
        Some(timers.swap_remove(index))
    }

    /// Runs the callbacks requested before this call, then drains microtasks.
    ///
    /// Callbacks requested while the frame runs wait for the next frame, and
    /// callbacks cancelled by an earlier callback of the same frame are
    /// skipped. Returns how many frame callbacks ran.
    pub fn run_animation_frame(&self) -> usize {
        self.run_microtasks();
        let due: Vec<TaskId> = self.frames.borrow().iter().map(|(id, _)| *id).collect();
        let mut ran = 0;
        for id in due {
            let task = {
                let mut frames = self.frames.borrow_mut();
                let Some(at) = frames.iter().position(|(i, _)| *i == id) else {
                    continue;
                };
                frames.remove(at).1
            };
            task();
            ran += 1;
            self.run_microtasks();
        }
        ran
    }

    /// Runs everything that is pending, advancing the clock to each timer's
    /// deadline, until nothing is left.
    pub fn run_until_idle(&self) {
        loop {
            self.run_microtasks();
            if self.pending_animation_frames() > 0 {
                self.run_animation_frame();
                continue;
            }
            let next_deadline = self.timers.borrow().iter().map(|t| t.deadline).min();
            match next_deadline {
                Some(deadline) => {
                    let by = deadline.saturating_sub(self.now.get());
                    self.advance(by);
                }
                None => return,
            }
        }
    }

    /// Number of queued microtasks.
    #[must_use]
    pub fn pending_microtasks(&self) -> usize {
        self.microtasks.borrow().len()
    }

    /// Number of pending timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Number of pending animation frame callbacks.
    #[must_use]
    pub fn pending_animation_frames(&self) -> usize {
        self.frames.borrow().len()
    }
}

impl Scheduler for LocalScheduler {
    fn queue_microtask(&self, task: Task) {
        self.microtasks.borrow_mut().push_back(task);
    }

    fn set_timeout(&self, delay: Duration, task: Task) -> TaskId {
        let id = self.allocate();
        self.timers.borrow_mut().push(Timer {
            id,
            deadline: self.now.get() + delay,
            task,
        });
        id
    }

    fn clear_timeout(&self, id: TaskId) {
        self.timers.borrow_mut().retain(|t| t.id != id);
    }

    fn request_animation_frame(&self, task: Task) -> TaskId {
        let id = self.allocate();
        self.frames.borrow_mut().push((id, task));
        id
    }

    fn cancel_animation_frame(&self, id: TaskId) {
        self.frames.borrow_mut().retain(|(i, _)| *i != id);
    }
}
