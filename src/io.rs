//! Source and sink collaborator interfaces.
//!
//! The runner never opens files or sockets itself; it asks a [`Source`] for a
//! scoped [`Reader`] (and a [`Sink`] for a scoped [`Writer`]) immediately
//! before use, and closes the handle on every exit path, including failures.
//! Concrete implementations live outside this core; in-memory ones for tests
//! are in [`crate::testing`].

use crate::element::Element;
use anyhow::Result;

/// A bounded collection of raw elements that can be read on demand.
pub trait Source: Send + Sync {
    /// Acquire a reader positioned at the start of the source.
    fn reader(&self) -> Result<Box<dyn Reader>>;
}

/// A scoped handle over one read pass.
pub trait Reader {
    /// Pull the next element, `Ok(None)` at end of input.
    fn read_next(&mut self) -> Result<Option<Element>>;

    /// Release the handle. Must be safe to call after a failed read.
    fn close(&mut self) -> Result<()>;
}

/// A destination accepting one raw element payload at a time.
pub trait Sink: Send + Sync {
    /// Acquire a writer for one write pass.
    fn writer(&self) -> Result<Box<dyn Writer>>;
}

/// A scoped handle over one write pass.
pub trait Writer {
    fn write(&mut self, value: Element) -> Result<()>;

    /// Release the handle. Must be safe to call after a failed write.
    fn close(&mut self) -> Result<()>;
}
