// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handler identifiers.
//!
//! Every registered drag source or drop target is addressed by a [`HandlerId`].
//! An id carries its [`HandlerRole`] and an index drawn from a counter owned by
//! the registry that allocated it. Its textual form is the role prefix followed
//! by the index (`S0`, `T1`, ...).
//!
//! ```
//! use understory_dnd::{HandlerId, HandlerRole};
//!
//! let id: HandlerId = "T7".parse().unwrap();
//! assert_eq!(id.role(), HandlerRole::Target);
//! assert_eq!(id.index(), 7);
//! assert_eq!(id.to_string(), "T7");
//! assert!("X7".parse::<HandlerId>().is_err());
//! ```

use alloc::string::ToString;
use core::cell::Cell;
use core::fmt;
use core::str::FromStr;

use crate::error::DndError;

/// The capability a handler was registered with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandlerRole {
    /// A drag source.
    Source,
    /// A drop target.
    Target,
}

impl HandlerRole {
    /// The single-character prefix used in the textual id form.
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Source => 'S',
            Self::Target => 'T',
        }
    }
}

impl fmt::Display for HandlerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// Identifies a registered drag source or drop target.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId {
    role: HandlerRole,
    index: u32,
}

impl HandlerId {
    /// Builds an id from its parts.
    ///
    /// Ids are normally handed out by the registry; building one by hand is
    /// mostly useful in tests.
    #[must_use]
    #[inline]
    pub const fn new(role: HandlerRole, index: u32) -> Self {
        Self { role, index }
    }

    /// Shorthand for a source id.
    #[must_use]
    #[inline]
    pub const fn source(index: u32) -> Self {
        Self::new(HandlerRole::Source, index)
    }

    /// Shorthand for a target id.
    #[must_use]
    #[inline]
    pub const fn target(index: u32) -> Self {
        Self::new(HandlerRole::Target, index)
    }

    /// The role encoded in this id.
    #[must_use]
    #[inline]
    pub const fn role(self) -> HandlerRole {
        self.role
    }

    /// The counter value this id was allocated with.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns `true` if this id names a drag source.
    #[must_use]
    #[inline]
    pub fn is_source(self) -> bool {
        self.role == HandlerRole::Source
    }

    /// Returns `true` if this id names a drop target.
    #[must_use]
    #[inline]
    pub fn is_target(self) -> bool {
        self.role == HandlerRole::Target
    }

    /// Fails with [`DndError::WrongRole`] unless this id has the `expected` role.
    pub fn expect_role(self, expected: HandlerRole) -> Result<Self, DndError> {
        if self.role == expected {
            Ok(self)
        } else {
            Err(DndError::WrongRole { expected, id: self })
        }
    }
}

impl fmt::Debug for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerId({}{})", self.role.prefix(), self.index)
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.role.prefix(), self.index)
    }
}

impl FromStr for HandlerId {
    type Err = DndError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let role = match chars.next() {
            Some('S') => HandlerRole::Source,
            Some('T') => HandlerRole::Target,
            _ => return Err(DndError::InvalidHandlerId(s.to_string())),
        };
        let index = chars
            .as_str()
            .parse::<u32>()
            .map_err(|_| DndError::InvalidHandlerId(s.to_string()))?;
        Ok(Self { role, index })
    }
}

/// Monotonic id counter shared by both roles.
///
/// Owned by a single registry; two registries hand out overlapping indices.
/// Indices are never reused, so the counter stops once `u32::MAX` is issued.
#[derive(Debug)]
pub(crate) struct HandlerIdAllocator {
    next: Cell<Option<u32>>,
}

impl Default for HandlerIdAllocator {
    fn default() -> Self {
        Self {
            next: Cell::new(Some(0)),
        }
    }
}

impl HandlerIdAllocator {
    pub(crate) fn next(&self, role: HandlerRole) -> Result<HandlerId, DndError> {
        let index = self.next.get().ok_or(DndError::HandlerIdsExhausted)?;
        self.next.set(index.checked_add(1));
        Ok(HandlerId::new(role, index))
    }
}
