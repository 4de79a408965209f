// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use smallvec::SmallVec;

use crate::action::Action;
use crate::id::HandlerId;

/// Handlers whose drag-related status changed in the latest dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DirtyHandlerIds {
    /// Nothing observable changed.
    #[default]
    None,
    /// Everything may have changed.
    All,
    /// Exactly these handlers changed.
    Some(SmallVec<[HandlerId; 4]>),
}

impl DirtyHandlerIds {
    /// Returns `true` if a subscriber interested in `handler_ids` must be
    /// notified.
    ///
    /// `None` for `handler_ids` means the subscriber cares about everything,
    /// including changes that dirty no handler.
    #[must_use]
    pub fn are_dirty(&self, handler_ids: Option<&[HandlerId]>) -> bool {
        match (self, handler_ids) {
            (_, None) | (Self::All, _) => true,
            (Self::None, Some(_)) => false,
            (Self::Some(dirty), Some(ids)) => ids.iter().any(|id| dirty.contains(id)),
        }
    }

    /// Returns `true` if `id` is in the explicit set, or the set is [`All`](Self::All).
    #[must_use]
    pub fn contains(&self, id: HandlerId) -> bool {
        self.are_dirty(Some(&[id]))
    }
}

pub(crate) fn reduce(prev_target_ids: &[HandlerId], action: &Action) -> DirtyHandlerIds {
    match action {
        Action::Hover { target_ids, .. } => diff_targets(prev_target_ids, target_ids),
        Action::AddSource(_)
        | Action::AddTarget(_)
        | Action::RemoveSource(_)
        | Action::RemoveTarget(_) => DirtyHandlerIds::None,
        _ => DirtyHandlerIds::All,
    }
}

fn diff_targets(prev: &[HandlerId], next: &[HandlerId]) -> DirtyHandlerIds {
    if prev == next {
        return DirtyHandlerIds::None;
    }
    let mut dirty: SmallVec<[HandlerId; 4]> = next
        .iter()
        .filter(|id| !prev.contains(id))
        .chain(prev.iter().filter(|id| !next.contains(id)))
        .copied()
        .collect();

    // Shallow `is_over` depends on the innermost position, not just membership.
    let prev_innermost = prev.last().copied();
    let next_innermost = next.last().copied();
    if prev_innermost != next_innermost {
        for id in [prev_innermost, next_innermost].into_iter().flatten() {
            if !dirty.contains(&id) {
                dirty.push(id);
            }
        }
    }
    DirtyHandlerIds::Some(dirty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn t(i: u32) -> HandlerId {
        HandlerId::target(i)
    }

    #[test]
    fn leaving_the_innermost_target_marks_old_and_new_innermost() {
        let dirty = diff_targets(&[t(1), t(2), t(3)], &[t(1), t(2)]);
        assert!(dirty.contains(t(3)));
        assert!(dirty.contains(t(2)));
        assert!(!dirty.contains(t(1)));
    }

    #[test]
    fn reorder_without_membership_change_is_dirty() {
        let dirty = diff_targets(&[t(1), t(2)], &[t(2), t(1)]);
        assert_eq!(dirty, DirtyHandlerIds::Some([t(2), t(1)].into_iter().collect()));
    }

    #[test]
    fn unchanged_targets_are_clean() {
        assert_eq!(diff_targets(&[t(1)], &[t(1)]), DirtyHandlerIds::None);
        assert_eq!(
            reduce(&[t(1)], &Action::AddSource(HandlerId::source(0))),
            DirtyHandlerIds::None
        );
        assert_eq!(reduce(&[], &Action::EndDrag), DirtyHandlerIds::All);
    }

    #[test]
    fn omitted_handler_ids_match_any_change() {
        let dirty = DirtyHandlerIds::Some(vec![t(4)].into_iter().collect());
        assert!(dirty.are_dirty(None));
        assert!(!dirty.are_dirty(Some(&[t(5)])));
        assert!(DirtyHandlerIds::None.are_dirty(None));
        assert!(!DirtyHandlerIds::None.are_dirty(Some(&[t(4)])));
    }
}
