// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch backend configuration.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;
use core::time::Duration;

use kurbo::Point;

use crate::math::AngleRange;

/// Replaces `elements_from_point` when hit-testing drop targets.
///
/// Receives the pointer position and the nodes of the targets the pointer is
/// over, and returns candidate nodes topmost first.
pub type ElementsAtPoint<N> = Rc<dyn Fn(Point, &[N]) -> Vec<N>>;

/// Options for [`TouchBackend::new`](crate::TouchBackend::new).
pub struct TouchOptions<N> {
    /// Listen to touch events.
    pub enable_touch_events: bool,
    /// Listen to mouse events.
    pub enable_mouse_events: bool,
    /// Cancel drags with Escape.
    pub enable_keyboard_events: bool,
    /// Keep dragging when the context menu opens.
    pub ignore_context_menu: bool,
    /// Keep hovering the target containing the source node while the pointer
    /// is outside it.
    pub enable_hover_outside_target: bool,
    /// Hold time before a touch may start a drag.
    pub delay_touch_start: Duration,
    /// Hold time before a mouse press may start a drag.
    pub delay_mouse_start: Duration,
    /// Distance the pointer must travel before a drag begins.
    pub touch_slop: f64,
    /// Movement directions treated as scrolling rather than dragging.
    pub scroll_angle_ranges: Vec<AngleRange>,
    /// Custom drop target hit-testing.
    pub drop_target_elements_at_point: Option<ElementsAtPoint<N>>,
    /// Node to install listeners on instead of
    /// [`TouchEnvironment::root`](crate::TouchEnvironment::root).
    pub root: Option<N>,
}

impl<N> Default for TouchOptions<N> {
    fn default() -> Self {
        Self {
            enable_touch_events: true,
            enable_mouse_events: false,
            enable_keyboard_events: false,
            ignore_context_menu: false,
            enable_hover_outside_target: false,
            delay_touch_start: Duration::ZERO,
            delay_mouse_start: Duration::ZERO,
            touch_slop: 0.0,
            scroll_angle_ranges: Vec::new(),
            drop_target_elements_at_point: None,
            root: None,
        }
    }
}

impl<N: Clone> Clone for TouchOptions<N> {
    fn clone(&self) -> Self {
        Self {
            enable_touch_events: self.enable_touch_events,
            enable_mouse_events: self.enable_mouse_events,
            enable_keyboard_events: self.enable_keyboard_events,
            ignore_context_menu: self.ignore_context_menu,
            enable_hover_outside_target: self.enable_hover_outside_target,
            delay_touch_start: self.delay_touch_start,
            delay_mouse_start: self.delay_mouse_start,
            touch_slop: self.touch_slop,
            scroll_angle_ranges: self.scroll_angle_ranges.clone(),
            drop_target_elements_at_point: self.drop_target_elements_at_point.clone(),
            root: self.root.clone(),
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for TouchOptions<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TouchOptions")
            .field("enable_touch_events", &self.enable_touch_events)
            .field("enable_mouse_events", &self.enable_mouse_events)
            .field("enable_keyboard_events", &self.enable_keyboard_events)
            .field("ignore_context_menu", &self.ignore_context_menu)
            .field(
                "enable_hover_outside_target",
                &self.enable_hover_outside_target,
            )
            .field("delay_touch_start", &self.delay_touch_start)
            .field("delay_mouse_start", &self.delay_mouse_start)
            .field("touch_slop", &self.touch_slop)
            .field("scroll_angle_ranges", &self.scroll_angle_ranges)
            .field(
                "drop_target_elements_at_point",
                &self.drop_target_elements_at_point.as_ref().map(|_| "<fn>"),
            )
            .field("root", &self.root)
            .finish()
    }
}

impl<N> TouchOptions<N> {
    /// Enables or disables touch events.
    #[must_use]
    pub fn with_touch_events(mut self, enable: bool) -> Self {
        self.enable_touch_events = enable;
        self
    }

    /// Enables or disables mouse events.
    #[must_use]
    pub fn with_mouse_events(mut self, enable: bool) -> Self {
        self.enable_mouse_events = enable;
        self
    }

    /// Enables or disables Escape to cancel.
    #[must_use]
    pub fn with_keyboard_events(mut self, enable: bool) -> Self {
        self.enable_keyboard_events = enable;
        self
    }

    /// Sets `ignore_context_menu`.
    #[must_use]
    pub fn with_ignore_context_menu(mut self, ignore: bool) -> Self {
        self.ignore_context_menu = ignore;
        self
    }

    /// Sets `enable_hover_outside_target`.
    #[must_use]
    pub fn with_hover_outside_target(mut self, enable: bool) -> Self {
        self.enable_hover_outside_target = enable;
        self
    }

    /// Sets the same start delay for touch and mouse.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_touch_start = delay;
        self.delay_mouse_start = delay;
        self
    }

    /// Sets the touch start delay.
    #[must_use]
    pub fn with_delay_touch_start(mut self, delay: Duration) -> Self {
        self.delay_touch_start = delay;
        self
    }

    /// Sets the mouse start delay.
    #[must_use]
    pub fn with_delay_mouse_start(mut self, delay: Duration) -> Self {
        self.delay_mouse_start = delay;
        self
    }

    /// Sets the drag start distance.
    #[must_use]
    pub fn with_touch_slop(mut self, slop: f64) -> Self {
        self.touch_slop = slop;
        self
    }

    /// Sets the scroll angle ranges.
    #[must_use]
    pub fn with_scroll_angle_ranges(mut self, ranges: Vec<AngleRange>) -> Self {
        self.scroll_angle_ranges = ranges;
        self
    }

    /// Overrides drop target hit-testing.
    #[must_use]
    pub fn with_drop_target_elements_at_point(
        mut self,
        elements: impl Fn(Point, &[N]) -> Vec<N> + 'static,
    ) -> Self {
        self.drop_target_elements_at_point = Some(Rc::new(elements));
        self
    }

    /// Sets the root node.
    #[must_use]
    pub fn with_root(mut self, root: N) -> Self {
        self.root = Some(root);
        self
    }
}

/// Options for [`Backend::connect_drag_preview`](understory_dnd::Backend::connect_drag_preview).
///
/// Touch previews are rendered by the application; the options are stored
/// for it and otherwise unused.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PreviewOptions {
    /// Horizontal anchor, from 0 (left) to 1 (right).
    pub anchor_x: Option<f64>,
    /// Vertical anchor, from 0 (top) to 1 (bottom).
    pub anchor_y: Option<f64>,
}
