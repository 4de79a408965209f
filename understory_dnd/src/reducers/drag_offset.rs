// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;

use kurbo::{Point, Vec2};

use crate::action::Action;

/// Coordinates of the current drag operation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragOffset {
    /// Pointer position when the drag began.
    pub initial_client_offset: Option<Point>,
    /// Position of the dragged element when the drag began.
    pub initial_source_client_offset: Option<Point>,
    /// Latest pointer position.
    pub client_offset: Option<Point>,
}

impl DragOffset {
    /// Current position of the dragged element: where it started plus how far
    /// the pointer moved.
    #[must_use]
    pub fn source_client_offset(&self) -> Option<Point> {
        match (
            self.client_offset,
            self.initial_client_offset,
            self.initial_source_client_offset,
        ) {
            (Some(client), Some(initial), Some(source)) => Some(source + (client - initial)),
            _ => None,
        }
    }

    /// How far the pointer moved since the drag began.
    #[must_use]
    pub fn difference_from_initial_offset(&self) -> Option<Vec2> {
        match (self.client_offset, self.initial_client_offset) {
            (Some(client), Some(initial)) => Some(client - initial),
            _ => None,
        }
    }
}

pub(crate) fn reduce(state: Option<&Rc<DragOffset>>, action: &Action) -> Rc<DragOffset> {
    let current = || state.cloned().unwrap_or_default();
    match action {
        Action::InitCoords {
            client_offset,
            source_client_offset,
        } => Rc::new(DragOffset {
            initial_client_offset: *client_offset,
            initial_source_client_offset: *source_client_offset,
            client_offset: *client_offset,
        }),
        Action::BeginDrag(payload) => Rc::new(DragOffset {
            initial_client_offset: payload.client_offset,
            initial_source_client_offset: payload.source_client_offset,
            client_offset: payload.client_offset,
        }),
        Action::Hover { client_offset, .. } => {
            let prev = current();
            if prev.client_offset == *client_offset {
                prev
            } else {
                Rc::new(DragOffset {
                    client_offset: *client_offset,
                    ..*prev
                })
            }
        }
        Action::EndDrag | Action::Drop { .. } => Rc::default(),
        _ => current(),
    }
}
