// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native drag events and their data transfer.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Point;

/// The operation shown to the user while hovering a drop target.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DropEffect {
    /// Dropping is not allowed here.
    None,
    /// The item would be copied.
    Copy,
    /// The item would be moved.
    #[default]
    Move,
    /// A link to the item would be created.
    Link,
}

impl DropEffect {
    /// The `dropEffect` keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Copy => "copy",
            Self::Move => "move",
            Self::Link => "link",
        }
    }
}

impl fmt::Display for DropEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The native events the backend listens to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DragEventKind {
    /// `dragstart`
    DragStart,
    /// `dragend`
    DragEnd,
    /// `dragenter`
    DragEnter,
    /// `dragleave`
    DragLeave,
    /// `dragover`
    DragOver,
    /// `drop`
    Drop,
    /// `mousemove`, only used to detect a removed source node.
    MouseMove,
}

/// A file carried by a native drag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NativeFile {
    /// File name without a path.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type, empty if unknown.
    pub mime_type: String,
}

impl NativeFile {
    /// Creates a file entry.
    #[must_use]
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }
}

/// The `DataTransfer` object attached to a drag event.
pub trait DataTransfer<N> {
    /// The formats on offer. Some browsers report `None` during `dragstart`.
    fn types(&self) -> Option<Vec<String>>;

    /// Data for `format`, empty if absent or not yet readable.
    fn get_data(&self, format: &str) -> String;

    /// Stores data for `format`. Returns `false` if the browser refused.
    fn set_data(&mut self, format: &str, data: &str) -> bool;

    /// The dragged files.
    fn files(&self) -> Vec<NativeFile>;

    /// Whether [`set_drag_image`](Self::set_drag_image) is available.
    fn supports_drag_image(&self) -> bool {
        true
    }

    /// Uses `image` as the drag preview, with the pointer at `offset` inside it.
    fn set_drag_image(&mut self, image: &N, offset: Point);

    /// Sets `dropEffect`.
    fn set_drop_effect(&mut self, effect: DropEffect);
}

/// A native drag event handed to
/// [`Html5Backend::handle_event`](crate::Html5Backend::handle_event).
///
/// The backend calls [`prevent_default`](Self::prevent_default) where the
/// browser default must be suppressed; the host forwards that to the real
/// event afterwards.
pub struct NativeDragEvent<'a, N> {
    /// Which event this is.
    pub kind: DragEventKind,
    /// The node the event was dispatched to.
    pub target: N,
    /// `clientX`, `clientY`.
    pub client_offset: Point,
    /// Whether Alt (Option) was held.
    pub alt_key: bool,
    /// The attached data transfer, if any.
    pub data_transfer: Option<&'a mut dyn DataTransfer<N>>,
    default_prevented: bool,
}

impl<'a, N> NativeDragEvent<'a, N> {
    /// Creates an event without modifiers or data.
    pub fn new(kind: DragEventKind, target: N, client_offset: Point) -> Self {
        Self {
            kind,
            target,
            client_offset,
            alt_key: false,
            data_transfer: None,
            default_prevented: false,
        }
    }

    /// Sets `alt_key`.
    #[must_use]
    pub fn with_alt_key(mut self, alt_key: bool) -> Self {
        self.alt_key = alt_key;
        self
    }

    /// Attaches a data transfer.
    #[must_use]
    pub fn with_data_transfer(mut self, data_transfer: &'a mut dyn DataTransfer<N>) -> Self {
        self.data_transfer = Some(data_transfer);
        self
    }

    /// Marks the event as already default-prevented by another listener.
    #[must_use]
    pub fn with_default_prevented(mut self, prevented: bool) -> Self {
        self.default_prevented = prevented;
        self
    }

    /// Suppresses the browser's default action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether the default action was suppressed.
    #[must_use]
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub(crate) fn set_drop_effect(&mut self, effect: DropEffect) {
        if let Some(dt) = self.data_transfer.as_deref_mut() {
            dt.set_drop_effect(effect);
        }
    }

    pub(crate) fn data_transfer(&self) -> Option<&dyn DataTransfer<N>> {
        self.data_transfer.as_deref().map(|dt| dt as &dyn DataTransfer<N>)
    }
}

impl<N: fmt::Debug> fmt::Debug for NativeDragEvent<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeDragEvent")
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("client_offset", &self.client_offset)
            .field("alt_key", &self.alt_key)
            .field("data_transfer", &self.data_transfer.is_some())
            .field("default_prevented", &self.default_prevented)
            .finish()
    }
}
