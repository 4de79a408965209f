// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;

use super::dispatch;
use crate::action::{Action, BeginDragPayload};
use crate::error::DndError;
use crate::id::HandlerId;
use crate::monitor::DragDropMonitor;
use crate::reducers::State;
use crate::store::Store;

/// Options for [`DragDropActions::begin_drag`](crate::DragDropActions::begin_drag).
#[derive(Clone, Copy)]
pub struct BeginDragOptions<'a> {
    /// Make the source visible as dragging right away. Backends that must wait
    /// for the platform to capture a drag image pass `false` and publish later.
    pub publish_source: bool,
    /// Pointer position at drag start.
    pub client_offset: Option<Point>,
    /// Resolves the position of the dragged element. Required whenever
    /// `client_offset` is given.
    pub source_client_offset: Option<&'a dyn Fn(HandlerId) -> Option<Point>>,
}

impl Default for BeginDragOptions<'_> {
    fn default() -> Self {
        Self {
            publish_source: true,
            client_offset: None,
            source_client_offset: None,
        }
    }
}

impl core::fmt::Debug for BeginDragOptions<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BeginDragOptions")
            .field("publish_source", &self.publish_source)
            .field("client_offset", &self.client_offset)
            .field(
                "source_client_offset",
                &self.source_client_offset.map(|_| "<fn>"),
            )
            .finish()
    }
}

impl<'a> BeginDragOptions<'a> {
    /// Sets `publish_source`.
    #[must_use]
    pub fn with_publish_source(mut self, publish: bool) -> Self {
        self.publish_source = publish;
        self
    }

    /// Sets the pointer position together with the element position resolver.
    #[must_use]
    pub fn with_client_offset(
        mut self,
        client_offset: Point,
        source_client_offset: &'a dyn Fn(HandlerId) -> Option<Point>,
    ) -> Self {
        self.client_offset = Some(client_offset);
        self.source_client_offset = Some(source_client_offset);
        self
    }
}

pub(crate) fn begin_drag(
    store: &Store<State, Action>,
    monitor: &DragDropMonitor,
    source_ids: &[HandlerId],
    options: BeginDragOptions<'_>,
) -> Result<Option<Action>, DndError> {
    let registry = monitor.registry();
    if monitor.is_dragging() {
        return Err(DndError::AlreadyDragging);
    }
    for &id in source_ids {
        registry.source(id, false)?;
    }
    if options.client_offset.is_some() && options.source_client_offset.is_none() {
        return Err(DndError::MissingSourceClientOffset);
    }

    dispatch(
        store,
        Action::InitCoords {
            client_offset: options.client_offset,
            source_client_offset: None,
        },
    )?;

    let mut source_id = None;
    for &id in source_ids.iter().rev() {
        if monitor.can_drag_source(id)? {
            source_id = Some(id);
            break;
        }
    }
    let Some(source_id) = source_id else {
        log::debug!("no draggable source among {source_ids:?}");
        dispatch(store, Action::reset_coordinates())?;
        return Ok(None);
    };

    let source_client_offset = match (options.client_offset, options.source_client_offset) {
        (Some(_), Some(resolve)) => resolve(source_id),
        _ => None,
    };
    dispatch(
        store,
        Action::InitCoords {
            client_offset: options.client_offset,
            source_client_offset,
        },
    )?;

    let source = registry.source(source_id, false)?;
    let Some(item) = source.begin_drag(monitor, source_id) else {
        log::debug!("{source_id} vetoed the drag");
        return Ok(None);
    };
    registry.pin_source(source_id)?;
    let item_type = registry.source_type(source_id)?;
    log::debug!("drag began from {source_id} with {item_type}");

    Ok(Some(Action::BeginDrag(BeginDragPayload {
        item_type,
        item,
        source_id,
        client_offset: options.client_offset,
        source_client_offset,
        is_source_public: options.publish_source,
    })))
}
