// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Actions dispatched to the drag-and-drop store.

use alloc::vec::Vec;

use kurbo::Point;

use crate::id::HandlerId;
use crate::types::{DropResult, Item, ItemType};

/// Payload of [`Action::BeginDrag`].
#[derive(Clone, Debug)]
pub struct BeginDragPayload {
    /// Type of the dragged item.
    pub item_type: ItemType,
    /// The item returned by the source.
    pub item: Item,
    /// The source that began the drag.
    pub source_id: HandlerId,
    /// Pointer position when the drag began.
    pub client_offset: Option<Point>,
    /// Position of the dragged element when the drag began.
    pub source_client_offset: Option<Point>,
    /// Whether the source is visible as dragging right away.
    pub is_source_public: bool,
}

/// Every state transition of the drag-and-drop store.
#[derive(Clone, Debug)]
pub enum Action {
    /// Dispatched once when the store is created.
    Init,
    /// Records (or clears) the coordinates a drag starts from.
    InitCoords {
        /// Pointer position.
        client_offset: Option<Point>,
        /// Position of the dragged element.
        source_client_offset: Option<Point>,
    },
    /// A drag operation began.
    BeginDrag(BeginDragPayload),
    /// The dragged source becomes visible as dragging.
    PublishDragSource,
    /// The pointer moved over a new, ordered list of targets.
    Hover {
        /// Matching targets, outermost first.
        target_ids: Vec<HandlerId>,
        /// Pointer position.
        client_offset: Option<Point>,
    },
    /// One target accepted the drop.
    Drop {
        /// The accumulated drop result.
        drop_result: DropResult,
    },
    /// The drag operation ended.
    EndDrag,
    /// A source was registered.
    AddSource(HandlerId),
    /// A target was registered.
    AddTarget(HandlerId),
    /// A source was unregistered.
    RemoveSource(HandlerId),
    /// A target was unregistered.
    RemoveTarget(HandlerId),
}

impl Action {
    /// A stable name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::InitCoords { .. } => "INIT_COORDS",
            Self::BeginDrag(_) => "BEGIN_DRAG",
            Self::PublishDragSource => "PUBLISH_DRAG_SOURCE",
            Self::Hover { .. } => "HOVER",
            Self::Drop { .. } => "DROP",
            Self::EndDrag => "END_DRAG",
            Self::AddSource(_) => "ADD_SOURCE",
            Self::AddTarget(_) => "ADD_TARGET",
            Self::RemoveSource(_) => "REMOVE_SOURCE",
            Self::RemoveTarget(_) => "REMOVE_TARGET",
        }
    }

    /// Clears both recorded start coordinates.
    #[must_use]
    pub const fn reset_coordinates() -> Self {
        Self::InitCoords {
            client_offset: None,
            source_client_offset: None,
        }
    }
}
