// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Item types, dragged items and drop results.

use alloc::borrow::Cow;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::hash::{Hash, Hasher};

/// Free-form drop result produced by drop targets.
///
/// When several nested targets accept a drop, each result is layered on top
/// of the drop options handed to [`drop`](crate::DragDropActions::drop), so
/// later keys win.
pub type DropResult = serde_json::Map<alloc::string::String, serde_json::Value>;

/// A unique, identity-compared type tag.
///
/// Two symbols are equal only if one was cloned from the other, even when
/// their descriptions match.
#[derive(Clone)]
pub struct Symbol(Rc<str>);

impl Symbol {
    /// Creates a fresh symbol with a human-readable description.
    #[must_use]
    pub fn new(description: &str) -> Self {
        Self(Rc::from(description))
    }

    /// The description given at creation.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).cast::<u8>().hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description())
    }
}

/// Tag matching drag sources to drop targets.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemType {
    /// A named type; names compare by content.
    Name(Cow<'static, str>),
    /// A unique symbol; symbols compare by identity.
    Symbol(Symbol),
}

impl ItemType {
    /// A named type from a static string.
    #[must_use]
    pub const fn named(name: &'static str) -> Self {
        Self::Name(Cow::Borrowed(name))
    }

    /// Returns the name for [`ItemType::Name`] types.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Symbol(_) => None,
        }
    }
}

impl From<&'static str> for ItemType {
    fn from(name: &'static str) -> Self {
        Self::named(name)
    }
}

impl From<alloc::string::String> for ItemType {
    fn from(name: alloc::string::String) -> Self {
        Self::Name(Cow::Owned(name))
    }
}

impl From<Symbol> for ItemType {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Symbol(symbol) => write!(f, "Symbol({})", symbol.description()),
        }
    }
}

/// The item types a drop target accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetType {
    /// Exactly one item type.
    One(ItemType),
    /// Any of several item types.
    Any(Vec<ItemType>),
}

impl TargetType {
    /// Returns `true` if an item of `item_type` may be hovered over or dropped
    /// on a target of this type.
    #[must_use]
    pub fn accepts(&self, item_type: &ItemType) -> bool {
        match self {
            Self::One(t) => t == item_type,
            Self::Any(types) => types.iter().any(|t| t == item_type),
        }
    }
}

impl From<ItemType> for TargetType {
    fn from(t: ItemType) -> Self {
        Self::One(t)
    }
}

impl From<&'static str> for TargetType {
    fn from(name: &'static str) -> Self {
        Self::One(ItemType::named(name))
    }
}

impl From<Symbol> for TargetType {
    fn from(symbol: Symbol) -> Self {
        Self::One(ItemType::Symbol(symbol))
    }
}

impl From<Vec<ItemType>> for TargetType {
    fn from(types: Vec<ItemType>) -> Self {
        Self::Any(types)
    }
}

/// Returns `true` if `target_type` accepts the currently dragged type.
///
/// Nothing matches while no item is being dragged.
#[must_use]
pub fn matches_type(target_type: &TargetType, dragged: Option<&ItemType>) -> bool {
    dragged.is_some_and(|t| target_type.accepts(t))
}

/// The record describing what is being dragged.
///
/// Produced by [`DragSource::begin_drag`](crate::DragSource::begin_drag) and
/// shared with every target through the monitor. Cloning is cheap.
#[derive(Clone)]
pub struct Item(Rc<dyn Any>);

impl Item {
    /// Wraps a value as a dragged item.
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Wraps an already shared value, keeping the allocation.
    ///
    /// Sources that keep updating their item while it is dragged (for example
    /// native items whose data arrives late) hand out a clone of their `Rc`.
    pub fn from_rc<T: Any>(value: Rc<T>) -> Self {
        Self(value)
    }

    /// Borrows the item as `T` if that is its concrete type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Returns `true` if the item's concrete type is `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Returns `true` if both handles point at the same item.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Item").finish_non_exhaustive()
    }
}
