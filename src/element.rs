//! Dynamic element values flowing through a pipeline.
//!
//! The execution core is untyped at node boundaries: every collection is a
//! sequence of [`Element`] values, and transforms decide at runtime what shape
//! they expect (grouping, for example, requires key/value pairs). `Element` is
//! a closed enum rather than an open `Any` so values stay `Clone`, comparable,
//! and serializable through the key coder.

use serde::{Deserialize, Serialize};

/// A single dynamically-typed value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Element>),
    /// A key/value pair, the shape grouping and dictionary collection expect.
    Pair(Box<Element>, Box<Element>),
}

impl Element {
    /// Build a key/value pair from anything convertible to elements.
    pub fn pair(key: impl Into<Element>, value: impl Into<Element>) -> Self {
        Element::Pair(Box::new(key.into()), Box::new(value.into()))
    }

    /// View this element as a key/value pair.
    ///
    /// A two-element list also counts as a pair, matching how grouping accepts
    /// any two-item sequence.
    pub fn as_pair(&self) -> Option<(&Element, &Element)> {
        match self {
            Element::Pair(k, v) => Some((k, v)),
            Element::List(items) if items.len() == 2 => Some((&items[0], &items[1])),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Element::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Element::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view; integers are promoted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Element::Int(n) => Some(*n as f64),
            Element::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Element]> {
        match self {
            Element::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Element {
    fn from(v: bool) -> Self {
        Element::Bool(v)
    }
}

impl From<i32> for Element {
    fn from(v: i32) -> Self {
        Element::Int(i64::from(v))
    }
}

impl From<i64> for Element {
    fn from(v: i64) -> Self {
        Element::Int(v)
    }
}

impl From<f64> for Element {
    fn from(v: f64) -> Self {
        Element::Float(v)
    }
}

impl From<&str> for Element {
    fn from(v: &str) -> Self {
        Element::Str(v.to_string())
    }
}

impl From<String> for Element {
    fn from(v: String) -> Self {
        Element::Str(v)
    }
}

impl From<Vec<Element>> for Element {
    fn from(v: Vec<Element>) -> Self {
        Element::List(v)
    }
}

impl From<(Element, Element)> for Element {
    fn from((k, v): (Element, Element)) -> Self {
        Element::Pair(Box::new(k), Box::new(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_views() {
        let p = Element::pair("k", 7);
        assert_eq!(p.as_pair().unwrap().0.as_str(), Some("k"));
        assert_eq!(p.as_pair().unwrap().1.as_i64(), Some(7));

        // A two-element list is pair-shaped too.
        let l = Element::List(vec![Element::from("k"), Element::from(7)]);
        assert!(l.as_pair().is_some());
        assert!(Element::List(vec![Element::from(1)]).as_pair().is_none());
        assert!(Element::from("k").as_pair().is_none());
    }

    #[test]
    fn numeric_promotion() {
        assert_eq!(Element::from(2).as_f64(), Some(2.0));
        assert_eq!(Element::from(2.5).as_f64(), Some(2.5));
        assert_eq!(Element::from("x").as_f64(), None);
    }
}
