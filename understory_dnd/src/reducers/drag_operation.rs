// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use crate::action::Action;
use crate::id::HandlerId;
use crate::types::{DropResult, Item, ItemType};

/// What is being dragged, from where, and over which targets.
///
/// The default value is the idle state.
#[derive(Clone, Debug, Default)]
pub struct DragOperation {
    /// Type of the dragged item; `None` when idle.
    pub item_type: Option<ItemType>,
    /// The dragged item; `None` when idle.
    pub item: Option<Item>,
    /// The source that began the drag.
    pub source_id: Option<HandlerId>,
    /// Hovered targets, outermost first and innermost last.
    pub target_ids: Vec<HandlerId>,
    /// Result produced by the latest drop.
    pub drop_result: Option<DropResult>,
    /// Whether a target accepted the drop.
    pub did_drop: bool,
    /// Whether the source is visible as dragging; `None` when idle.
    pub is_source_public: Option<bool>,
}

impl DragOperation {
    /// Returns `true` if this is the idle state.
    ///
    /// Items compare by identity, so an operation holding any item is not idle.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.item_type.is_none()
            && self.item.is_none()
            && self.source_id.is_none()
            && self.target_ids.is_empty()
            && self.drop_result.is_none()
            && !self.did_drop
            && self.is_source_public.is_none()
    }
}

pub(crate) fn reduce(state: Option<&DragOperation>, action: &Action) -> DragOperation {
    let mut next = state.cloned().unwrap_or_default();
    match action {
        Action::BeginDrag(payload) => {
            next.item_type = Some(payload.item_type.clone());
            next.item = Some(payload.item.clone());
            next.source_id = Some(payload.source_id);
            next.is_source_public = Some(payload.is_source_public);
            next.drop_result = None;
            next.did_drop = false;
        }
        Action::PublishDragSource => {
            next.is_source_public = Some(true);
        }
        Action::Hover { target_ids, .. } => {
            next.target_ids.clone_from(target_ids);
        }
        Action::RemoveTarget(id) => {
            next.target_ids.retain(|t| t != id);
        }
        Action::Drop { drop_result } => {
            next.drop_result = Some(drop_result.clone());
            next.did_drop = true;
            next.target_ids.clear();
        }
        Action::EndDrag => {
            next = DragOperation::default();
        }
        _ => {}
    }
    next
}
