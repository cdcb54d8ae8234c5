//! Windowed values.
//!
//! This core implements a single global window: every value produced by a
//! transform is assigned the same implicit window. The window set is carried
//! explicitly so the data model matches what a windowing-aware executor would
//! consume, but only [`GlobalWindow`] exists here.

use crate::element::Element;
use serde::{Deserialize, Serialize};

/// The one window every value belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalWindow;

/// An immutable value paired with its window assignment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowedValue {
    pub value: Element,
    pub windows: Vec<GlobalWindow>,
}

impl WindowedValue {
    /// Wrap a value in the global window.
    pub fn in_global_window(value: impl Into<Element>) -> Self {
        Self {
            value: value.into(),
            windows: vec![GlobalWindow],
        }
    }
}
