// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use super::dispatch;
use crate::action::Action;
use crate::error::DndError;
use crate::id::HandlerId;
use crate::monitor::DragDropMonitor;
use crate::registry::DropTarget;
use crate::reducers::State;
use crate::store::Store;
use crate::types::DropResult;

/// Dispatches one [`Action::Drop`] per accepting target, innermost first.
///
/// A target that returns no result inherits `{}` if it is the innermost
/// candidate, or else whatever the monitor holds from the previous drop.
pub(crate) fn drop(
    store: &Store<State, Action>,
    monitor: &DragDropMonitor,
    options: &DropResult,
) -> Result<(), DndError> {
    if !monitor.is_dragging() {
        return Err(DndError::NotDragging("drop"));
    }
    if monitor.did_drop() {
        return Err(DndError::AlreadyDropped);
    }

    let mut candidates: Vec<HandlerId> = Vec::new();
    for id in monitor.target_ids() {
        if monitor.can_drop_on_target(id)? {
            candidates.push(id);
        }
    }
    candidates.reverse();

    for (index, id) in candidates.into_iter().enumerate() {
        let own = match monitor.registry().target(id) {
            Ok(target) => DropTarget::drop(&*target, monitor, id),
            Err(DndError::UnknownHandler(_)) => None,
            Err(e) => return Err(e),
        };
        let result = match own {
            Some(result) => result,
            None if index == 0 => DropResult::new(),
            None => monitor.drop_result().unwrap_or_default(),
        };

        let mut drop_result = options.clone();
        drop_result.extend(result);
        log::debug!("dropped on {id}");
        dispatch(store, Action::Drop { drop_result })?;
    }
    Ok(())
}
