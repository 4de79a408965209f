// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use kurbo::Point;

use crate::action::Action;
use crate::error::DndError;
use crate::id::HandlerId;
use crate::monitor::DragDropMonitor;
use crate::types::matches_type;

pub(crate) fn hover(
    monitor: &DragDropMonitor,
    target_ids: &[HandlerId],
    client_offset: Option<Point>,
) -> Result<Option<Action>, DndError> {
    let registry = monitor.registry();
    if !monitor.is_dragging() {
        return Err(DndError::NotDragging("hover"));
    }
    if monitor.did_drop() {
        return Err(DndError::HoverAfterDrop);
    }
    for (i, id) in target_ids.iter().enumerate() {
        if target_ids[i + 1..].contains(id) {
            return Err(DndError::DuplicateTargetId(*id));
        }
        registry.target(*id)?;
    }

    // Incompatible overlapping targets must not count as the innermost one.
    let dragged = monitor.item_type();
    let mut matching = Vec::with_capacity(target_ids.len());
    for &id in target_ids {
        if matches_type(&registry.target_type(id)?, dragged.as_ref()) {
            matching.push(id);
        }
    }

    for &id in &matching {
        registry.target(id)?.hover(monitor, id);
    }

    Ok(Some(Action::Hover {
        target_ids: matching,
        client_offset,
    }))
}
