// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer, touch and keyboard events as the backend sees them.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Point;

/// The events the backend listens to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// `mousedown`
    MouseDown,
    /// `mousemove`
    MouseMove,
    /// `mouseup`
    MouseUp,
    /// `contextmenu`
    ContextMenu,
    /// `touchstart`
    TouchStart,
    /// `touchmove`
    TouchMove,
    /// `touchend`
    TouchEnd,
    /// `keydown`
    KeyDown,
}

impl PointerEventKind {
    /// Whether this is one of the touch events.
    #[must_use]
    pub const fn is_touch(self) -> bool {
        matches!(self, Self::TouchStart | Self::TouchMove | Self::TouchEnd)
    }

    /// Whether this is one of the mouse events, including `contextmenu`.
    #[must_use]
    pub const fn is_mouse(self) -> bool {
        matches!(
            self,
            Self::MouseDown | Self::MouseMove | Self::MouseUp | Self::ContextMenu
        )
    }
}

/// One contact point of a touch event.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchPoint<N> {
    /// The node the touch started on.
    pub target: N,
    /// `clientX`, `clientY`.
    pub client_offset: Point,
}

impl<N> TouchPoint<N> {
    /// Creates a contact point.
    pub fn new(target: N, client_offset: Point) -> Self {
        Self {
            target,
            client_offset,
        }
    }
}

/// An event handed to
/// [`TouchBackend::handle_event`](crate::TouchBackend::handle_event).
#[derive(Clone, Debug)]
pub struct PointerEvent<N> {
    /// Which event this is.
    pub kind: PointerEventKind,
    /// The node the event was dispatched to.
    pub target: N,
    /// Mouse position; unused for touch and key events.
    pub client_offset: Point,
    /// `MouseEvent.button`; `None` when the platform does not report it.
    pub button: Option<i16>,
    /// `MouseEvent.buttons`; `None` when the platform does not report it.
    pub buttons: Option<u16>,
    /// `TouchEvent.touches`: every active contact.
    pub touches: Vec<TouchPoint<N>>,
    /// `TouchEvent.targetTouches`: contacts that started on `target`.
    pub target_touches: Vec<TouchPoint<N>>,
    /// `KeyboardEvent.key`.
    pub key: Option<String>,
    /// Whether the default action may be prevented.
    pub cancelable: bool,
    default_prevented: bool,
}

impl<N: Clone> PointerEvent<N> {
    fn base(kind: PointerEventKind, target: N) -> Self {
        Self {
            kind,
            target,
            client_offset: Point::ZERO,
            button: None,
            buttons: None,
            touches: Vec::new(),
            target_touches: Vec::new(),
            key: None,
            cancelable: true,
            default_prevented: false,
        }
    }

    /// A mouse event at `client_offset`.
    pub fn mouse(kind: PointerEventKind, target: N, client_offset: Point) -> Self {
        Self {
            client_offset,
            ..Self::base(kind, target)
        }
    }

    /// A touch event with a single contact on `target`.
    pub fn touch(kind: PointerEventKind, target: N, client_offset: Point) -> Self {
        let contact = TouchPoint::new(target.clone(), client_offset);
        Self {
            touches: alloc::vec![contact.clone()],
            target_touches: alloc::vec![contact],
            ..Self::base(kind, target)
        }
    }

    /// A touch event with explicit contact lists.
    pub fn touches(
        kind: PointerEventKind,
        target: N,
        touches: Vec<TouchPoint<N>>,
        target_touches: Vec<TouchPoint<N>>,
    ) -> Self {
        Self {
            touches,
            target_touches,
            ..Self::base(kind, target)
        }
    }

    /// A `keydown` for `key`.
    pub fn key_down(target: N, key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::base(PointerEventKind::KeyDown, target)
        }
    }

    /// Sets `button`.
    #[must_use]
    pub fn with_button(mut self, button: i16) -> Self {
        self.button = Some(button);
        self
    }

    /// Sets `buttons`.
    #[must_use]
    pub fn with_buttons(mut self, buttons: u16) -> Self {
        self.buttons = Some(buttons);
        self
    }

    /// Sets `cancelable`.
    #[must_use]
    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }
}

impl<N> PointerEvent<N> {
    /// Suppresses the default action, if the event is cancelable.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Whether the default action was suppressed.
    #[must_use]
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Only the primary mouse button starts a drag.
    pub(crate) fn should_start_drag(&self) -> bool {
        self.button.is_none_or(|b| b == 0)
    }

    /// A drag ends once the primary button is no longer held.
    pub(crate) fn should_end_drag(&self) -> bool {
        self.buttons.is_none_or(|b| b & 1 == 0)
    }
}

impl<N: Clone + PartialEq> PointerEvent<N> {
    /// The pointer position, or `None` for touch events that do not identify
    /// a single contact.
    ///
    /// A touch with several contacts on the target has no position; with one
    /// contact in total that started where `fallback` did, that contact is
    /// used.
    pub fn position(&self, fallback: Option<&TouchPoint<N>>) -> Option<Point> {
        if !self.kind.is_touch() {
            return Some(self.client_offset);
        }
        if let [only] = self.target_touches.as_slice() {
            return Some(only.client_offset);
        }
        match (fallback, self.touches.as_slice()) {
            (Some(fallback), [only]) if only.target == fallback.target => Some(only.client_offset),
            _ => None,
        }
    }
}
