// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outermost enter/leave detection.
//!
//! Browsers fire `dragenter` and `dragleave` for every element crossed, so
//! moving between nested children produces a leave right after an enter. The
//! counter keeps the set of entered nodes and only reports the transitions
//! into and out of the whole document.

use alloc::vec::Vec;

/// Tracks which nodes the pointer is currently inside during a native drag.
#[derive(Clone, Debug)]
pub struct EnterLeaveCounter<N> {
    entered: Vec<N>,
}

impl<N> Default for EnterLeaveCounter<N> {
    fn default() -> Self {
        Self {
            entered: Vec::new(),
        }
    }
}

impl<N: Clone + PartialEq> EnterLeaveCounter<N> {
    /// Creates an empty counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a `dragenter` on `node`. Returns `true` on the first enter.
    ///
    /// Previously entered nodes that left the document or do not contain
    /// `node` are forgotten first.
    pub fn enter(
        &mut self,
        node: N,
        is_in_document: impl Fn(&N) -> bool,
        contains: impl Fn(&N, &N) -> bool,
    ) -> bool {
        let previous = self.entered.len();
        self.entered
            .retain(|entered| is_in_document(entered) && contains(entered, &node));
        if !self.entered.contains(&node) {
            self.entered.push(node);
        }
        previous == 0 && !self.entered.is_empty()
    }

    /// Records a `dragleave` on `node`. Returns `true` on the last leave.
    pub fn leave(&mut self, node: &N, is_in_document: impl Fn(&N) -> bool) -> bool {
        let previous = self.entered.len();
        self.entered
            .retain(|entered| is_in_document(entered) && entered != node);
        previous > 0 && self.entered.is_empty()
    }

    /// Forgets every entered node.
    pub fn reset(&mut self) {
        self.entered.clear();
    }

    /// Number of nodes currently entered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entered.len()
    }

    /// Whether no node is entered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty()
    }
}
