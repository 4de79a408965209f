// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Items dragged in from outside the document.
//!
//! When the user drags files, links, text or markup from another application,
//! no registered source exists. The backend registers a transient
//! [`NativeDragSource`] for the duration of such a drag; its item is a
//! [`NativeItem`] that targets accept by registering for one of the
//! [`FILE`], [`URL`], [`TEXT`] or [`HTML`] item types.
//!
//! Browsers only expose the payload once the drop happens, so the item starts
//! empty and is filled from the `DataTransfer` on `dragenter`, `dragover` and
//! `drop`.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use understory_dnd::{DragDropMonitor, DragSource, HandlerId, Item, ItemType};

use crate::event::{DataTransfer, NativeFile};

/// Item type of dragged files.
pub const FILE: ItemType = ItemType::named("__NATIVE_FILE__");
/// Item type of dragged links.
pub const URL: ItemType = ItemType::named("__NATIVE_URL__");
/// Item type of dragged plain text.
pub const TEXT: ItemType = ItemType::named("__NATIVE_TEXT__");
/// Item type of dragged markup.
pub const HTML: ItemType = ItemType::named("__NATIVE_HTML__");

/// The kinds of native payload, in matching precedence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NativeKind {
    /// Files from the file system.
    File,
    /// Markup.
    Html,
    /// Links.
    Url,
    /// Plain text.
    Text,
}

impl NativeKind {
    /// All kinds, in the order they are matched.
    pub const ALL: [Self; 4] = [Self::File, Self::Html, Self::Url, Self::Text];

    /// The item type targets register for.
    #[must_use]
    pub fn item_type(self) -> ItemType {
        match self {
            Self::File => FILE,
            Self::Html => HTML,
            Self::Url => URL,
            Self::Text => TEXT,
        }
    }

    /// `DataTransfer` formats that identify this kind, in reading order.
    #[must_use]
    pub const fn formats(self) -> &'static [&'static str] {
        match self {
            Self::File => &["Files"],
            Self::Html => &["Html", "text/html"],
            Self::Url => &["Url", "text/uri-list"],
            Self::Text => &["Text", "text/plain"],
        }
    }

    /// The kind whose item type is `item_type`.
    #[must_use]
    pub fn from_item_type(item_type: &ItemType) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.item_type() == *item_type)
    }

    /// Picks the kind offered by a data transfer, if any.
    pub fn matching<N>(data_transfer: Option<&dyn DataTransfer<N>>) -> Option<Self> {
        let types = data_transfer.and_then(|dt| dt.types()).unwrap_or_default();
        Self::ALL.into_iter().find(|kind| {
            kind.formats()
                .iter()
                .any(|format| types.iter().any(|t| t == format))
        })
    }
}

/// The payload of a native item once the browser exposes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NativePayload {
    /// Dragged files.
    Files(Vec<NativeFile>),
    /// Dragged markup.
    Html(String),
    /// Dragged links, one per line of `text/uri-list`.
    Urls(Vec<String>),
    /// Dragged text.
    Text(String),
}

/// The item of a native drag.
///
/// Shared between the backend, which fills it in, and the targets, which read
/// it through [`DragDropMonitor::item`].
pub struct NativeItem {
    kind: NativeKind,
    payload: RefCell<Option<NativePayload>>,
}

impl NativeItem {
    /// Creates an item whose payload has not been read yet.
    #[must_use]
    pub fn new(kind: NativeKind) -> Self {
        Self {
            kind,
            payload: RefCell::new(None),
        }
    }

    /// The kind of payload this item carries.
    #[must_use]
    pub fn kind(&self) -> NativeKind {
        self.kind
    }

    /// Whether the payload has been read from the data transfer.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.payload.borrow().is_some()
    }

    /// The payload, or `None` (with a warning) before the browser allows
    /// reading it.
    #[must_use]
    pub fn payload(&self) -> Option<NativePayload> {
        let payload = self.payload.borrow().clone();
        if payload.is_none() {
            log::warn!(
                "the browser does not allow reading {:?} data until the drop event",
                self.kind
            );
        }
        payload
    }

    /// Dragged files, for [`NativeKind::File`] items.
    #[must_use]
    pub fn files(&self) -> Option<Vec<NativeFile>> {
        match self.payload()? {
            NativePayload::Files(files) => Some(files),
            _ => None,
        }
    }

    /// Dragged links, for [`NativeKind::Url`] items.
    #[must_use]
    pub fn urls(&self) -> Option<Vec<String>> {
        match self.payload()? {
            NativePayload::Urls(urls) => Some(urls),
            _ => None,
        }
    }

    /// Dragged text, for [`NativeKind::Text`] items.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match self.payload()? {
            NativePayload::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Dragged markup, for [`NativeKind::Html`] items.
    #[must_use]
    pub fn html(&self) -> Option<String> {
        match self.payload()? {
            NativePayload::Html(html) => Some(html),
            _ => None,
        }
    }

    /// Reads the payload from `data_transfer`, replacing any earlier read.
    pub fn load<N>(&self, data_transfer: Option<&dyn DataTransfer<N>>) {
        let Some(dt) = data_transfer else {
            return;
        };
        let payload = match self.kind {
            NativeKind::File => NativePayload::Files(dt.files()),
            NativeKind::Html => NativePayload::Html(first_data(dt, self.kind)),
            NativeKind::Url => NativePayload::Urls(
                first_data(dt, self.kind)
                    .split('\n')
                    .map(String::from)
                    .collect(),
            ),
            NativeKind::Text => NativePayload::Text(first_data(dt, self.kind)),
        };
        *self.payload.borrow_mut() = Some(payload);
    }
}

impl fmt::Debug for NativeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeItem")
            .field("kind", &self.kind)
            .field("payload", &self.payload.borrow())
            .finish()
    }
}

/// The first non-empty value among the kind's formats.
fn first_data<N>(dt: &dyn DataTransfer<N>, kind: NativeKind) -> String {
    kind.formats()
        .iter()
        .map(|format| dt.get_data(format))
        .find(|data| !data.is_empty())
        .unwrap_or_default()
}

/// The transient source registered while a native item is dragged.
#[derive(Debug)]
pub struct NativeDragSource {
    item: Rc<NativeItem>,
}

impl NativeDragSource {
    /// Creates a source for a payload of `kind`.
    #[must_use]
    pub fn new(kind: NativeKind) -> Self {
        Self {
            item: Rc::new(NativeItem::new(kind)),
        }
    }

    /// The shared item.
    #[must_use]
    pub fn item(&self) -> &Rc<NativeItem> {
        &self.item
    }
}

impl DragSource for NativeDragSource {
    fn begin_drag(&self, _: &DragDropMonitor, _: HandlerId) -> Option<Item> {
        Some(Item::from_rc(self.item.clone()))
    }
}
