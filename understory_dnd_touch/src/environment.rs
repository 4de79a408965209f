// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use kurbo::Point;

/// Host document queries and side effects used by
/// [`TouchBackend`](crate::TouchBackend).
pub trait TouchEnvironment {
    /// Handle to a DOM node.
    type Node: Clone + Eq + Hash + Debug;

    /// The node listeners are installed on. `None` leaves the backend inert.
    fn root(&self) -> Option<Self::Node>;

    /// The parent element of `node`, or `None` if it is detached or at the
    /// top of the tree.
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool {
        let mut current = Some(node.clone());
        while let Some(n) = current {
            if &n == ancestor {
                return true;
            }
            current = self.parent(&n);
        }
        false
    }

    /// Hit-testable elements under `point`, topmost first
    /// (`document.elementsFromPoint`).
    fn elements_from_point(&self, point: Point) -> Vec<Self::Node>;

    /// The topmost element under `point` (`document.elementFromPoint`).
    fn element_from_point(&self, point: Point) -> Option<Self::Node> {
        self.elements_from_point(point).into_iter().next()
    }

    /// Top-left corner of the bounding rect of `node`.
    fn client_offset(&self, node: &Self::Node) -> Option<Point>;

    /// Hides `node` and appends it to the document body, keeping an
    /// in-flight touch sequence alive after the UI removed its target.
    fn hide_and_append_to_body(&self, node: &Self::Node);

    /// Marks `root` as owned by a backend. Returns `false` if another backend
    /// already owns it.
    fn claim_root(&self, root: &Self::Node) -> bool;

    /// Releases a root claimed with [`claim_root`](Self::claim_root).
    fn release_root(&self, root: &Self::Node);
}
