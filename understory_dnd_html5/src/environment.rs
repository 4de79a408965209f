// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document as seen by the backend.

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::{Point, Size};

/// Host document queries and side effects used by
/// [`Html5Backend`](crate::Html5Backend).
///
/// A wasm host implements this over `web_sys`; tests implement it over an
/// in-memory tree. Nodes are cheap handles compared by identity.
pub trait Html5Environment {
    /// Handle to a DOM node.
    type Node: Clone + Eq + Hash + Debug;

    /// The node listeners are installed on, typically the window or document.
    ///
    /// `None` means there is no document (server rendering); the backend then
    /// stays inert.
    fn root(&self) -> Option<Self::Node>;

    /// The parent of `node`, or `None` at the top of the tree.
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

    /// Whether `node` is attached to the document.
    fn is_in_document(&self, node: &Self::Node) -> bool;

    /// Top-left corner of the bounding rect of `node`, or of its parent
    /// element for text nodes. `None` if neither is an element.
    fn client_offset(&self, node: &Self::Node) -> Option<Point>;

    /// Layout size (`offsetWidth`, `offsetHeight`).
    fn offset_size(&self, node: &Self::Node) -> Size;

    /// Rendered size of an `<img>` element; `None` for anything else.
    fn image_size(&self, node: &Self::Node) -> Option<Size>;

    /// Sets or clears the `draggable` attribute.
    fn set_draggable(&self, node: &Self::Node, draggable: bool);

    /// Whether the node carries a `draggable` attribute.
    fn has_draggable_attribute(&self, node: &Self::Node) -> bool;

    /// `window.devicePixelRatio`.
    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }

    /// Whether the user agent is Safari.
    fn is_safari(&self) -> bool {
        false
    }

    /// Whether the user agent is Firefox.
    fn is_firefox(&self) -> bool {
        false
    }

    /// Marks `root` as owned by a backend. Returns `false` if another backend
    /// already owns it.
    fn claim_root(&self, root: &Self::Node) -> bool;

    /// Releases a root claimed with [`claim_root`](Self::claim_root).
    fn release_root(&self, root: &Self::Node);
}
