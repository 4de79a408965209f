// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend and per-connection options.

use crate::event::DropEffect;

/// Options for [`Html5Backend::new`](crate::Html5Backend::new).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Html5Options<N> {
    /// Node to install listeners on instead of
    /// [`Html5Environment::root`](crate::Html5Environment::root).
    pub root: Option<N>,
}

impl<N> Default for Html5Options<N> {
    fn default() -> Self {
        Self { root: None }
    }
}

impl<N> Html5Options<N> {
    /// Sets the root node.
    #[must_use]
    pub fn with_root(mut self, root: N) -> Self {
        self.root = Some(root);
        self
    }
}

/// Options for [`Backend::connect_drag_source`](understory_dnd::Backend::connect_drag_source).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceOptions {
    /// Drop effect shown while this source is dragged. When unset, the effect
    /// is [`DropEffect::Copy`] while Alt is held and [`DropEffect::Move`]
    /// otherwise.
    pub drop_effect: Option<DropEffect>,
}

impl SourceOptions {
    /// Sets the drop effect.
    #[must_use]
    pub fn with_drop_effect(mut self, effect: DropEffect) -> Self {
        self.drop_effect = Some(effect);
        self
    }
}

/// Options for [`Backend::connect_drag_preview`](understory_dnd::Backend::connect_drag_preview).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PreviewOptions {
    /// Horizontal anchor of the pointer inside the preview, from 0 (left
    /// edge) to 1 (right edge).
    pub anchor_x: f64,
    /// Vertical anchor, from 0 (top) to 1 (bottom).
    pub anchor_y: f64,
    /// Fixed horizontal pointer offset, overriding the anchor.
    pub offset_x: Option<f64>,
    /// Fixed vertical pointer offset, overriding the anchor.
    pub offset_y: Option<f64>,
    /// Publish the source synchronously in `dragstart`, so the browser
    /// captures the preview in its dragging state.
    pub capture_dragging_state: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            anchor_x: 0.5,
            anchor_y: 0.5,
            offset_x: None,
            offset_y: None,
            capture_dragging_state: false,
        }
    }
}

impl PreviewOptions {
    /// Sets both anchors.
    #[must_use]
    pub fn with_anchor(mut self, anchor_x: f64, anchor_y: f64) -> Self {
        self.anchor_x = anchor_x;
        self.anchor_y = anchor_y;
        self
    }

    /// Sets both manual offsets.
    #[must_use]
    pub fn with_offset(mut self, offset_x: f64, offset_y: f64) -> Self {
        self.offset_x = Some(offset_x);
        self.offset_y = Some(offset_y);
        self
    }

    /// Sets `capture_dragging_state`.
    #[must_use]
    pub fn with_capture_dragging_state(mut self, capture: bool) -> Self {
        self.capture_dragging_state = capture;
        self
    }
}
