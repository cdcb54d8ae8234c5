//! Materialized side-input views.
//!
//! A view node converts a fully computed collection into a value a downstream
//! per-element transform can consume directly. The shapes here mirror the
//! view kinds in [`ViewKind`](crate::node::ViewKind).

use crate::element::Element;

/// The result of materializing a side-input view.
#[derive(Clone, Debug, PartialEq)]
pub enum SideInputValue {
    /// A singleton view over exactly one element (or its declared default),
    /// unwrapped.
    Singleton(Element),
    /// A singleton view over an empty collection with no declared default.
    /// Consumers must branch on this marker; it is not a usable value.
    EmptySideInput,
    /// Forward-traversal view over every payload, in collection order.
    Iterable(Vec<Element>),
    /// Random-access view over every payload, in collection order.
    List(Vec<Element>),
}

impl SideInputValue {
    /// The payload sequence behind an iterable or list view.
    pub fn elements(&self) -> Option<&[Element]> {
        match self {
            SideInputValue::Iterable(items) | SideInputValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// The unwrapped value of a singleton view, if it holds one.
    pub fn singleton(&self) -> Option<&Element> {
        match self {
            SideInputValue::Singleton(value) => Some(value),
            _ => None,
        }
    }
}
