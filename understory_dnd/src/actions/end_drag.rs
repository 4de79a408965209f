// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::action::Action;
use crate::error::DndError;
use crate::monitor::DragDropMonitor;

pub(crate) fn end_drag(monitor: &DragDropMonitor) -> Result<Option<Action>, DndError> {
    if !monitor.is_dragging() {
        return Err(DndError::NotDragging("end_drag"));
    }
    if let Some(source_id) = monitor.source_id() {
        let registry = monitor.registry();
        let source = registry.source(source_id, true)?;
        source.end_drag(monitor, source_id);
        registry.unpin_source()?;
        log::debug!("drag from {source_id} ended");
    }
    Ok(Some(Action::EndDrag))
}
