//! In-memory sources and sinks for exercising pipelines without real I/O.
//!
//! These are the collaborator implementations the integration tests use:
//! a vector-backed [`VecSource`], a [`CollectSink`] that gathers writes into
//! shared memory, and failing variants that let tests observe that the
//! runner releases readers and writers on error paths.

use crate::element::Element;
use crate::io::{Reader, Sink, Source, Writer};
use anyhow::{bail, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A bounded source backed by a vector.
pub struct VecSource {
    elements: Vec<Element>,
}

impl VecSource {
    pub fn new(elements: Vec<Element>) -> Self {
        Self { elements }
    }
}

impl Source for VecSource {
    fn reader(&self) -> Result<Box<dyn Reader>> {
        Ok(Box::new(VecReader {
            remaining: self.elements.clone().into_iter(),
        }))
    }
}

struct VecReader {
    remaining: std::vec::IntoIter<Element>,
}

impl Reader for VecReader {
    fn read_next(&mut self) -> Result<Option<Element>> {
        Ok(self.remaining.next())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A source whose reader yields a few elements and then fails, recording
/// whether the runner closed it.
pub struct FailingSource {
    yield_before_failure: usize,
    closed: Arc<AtomicUsize>,
}

impl FailingSource {
    pub fn new(yield_before_failure: usize) -> Self {
        Self {
            yield_before_failure,
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// How many readers have been closed so far.
    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Source for FailingSource {
    fn reader(&self) -> Result<Box<dyn Reader>> {
        Ok(Box::new(FailingReader {
            left: self.yield_before_failure,
            closed: Arc::clone(&self.closed),
        }))
    }
}

struct FailingReader {
    left: usize,
    closed: Arc<AtomicUsize>,
}

impl Reader for FailingReader {
    fn read_next(&mut self) -> Result<Option<Element>> {
        if self.left == 0 {
            bail!("simulated read failure");
        }
        self.left -= 1;
        Ok(Some(Element::from(self.left as i64)))
    }

    fn close(&mut self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A sink that collects written payloads into shared memory.
#[derive(Clone, Default)]
pub struct CollectSink {
    written: Arc<Mutex<Vec<Element>>>,
    closes: Arc<AtomicUsize>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, in write order.
    pub fn written(&self) -> Vec<Element> {
        self.written.lock().unwrap().clone()
    }

    /// How many writers have been closed so far.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Sink for CollectSink {
    fn writer(&self) -> Result<Box<dyn Writer>> {
        Ok(Box::new(CollectWriter {
            written: Arc::clone(&self.written),
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct CollectWriter {
    written: Arc<Mutex<Vec<Element>>>,
    closes: Arc<AtomicUsize>,
}

impl Writer for CollectWriter {
    fn write(&mut self, value: Element) -> Result<()> {
        self.written.lock().unwrap().push(value);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A sink whose writer rejects every write, recording whether the runner
/// closed it anyway.
pub struct FailingSink {
    closes: Arc<AtomicUsize>,
}

impl FailingSink {
    pub fn new() -> Self {
        Self {
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Default for FailingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for FailingSink {
    fn writer(&self) -> Result<Box<dyn Writer>> {
        Ok(Box::new(FailingWriter {
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct FailingWriter {
    closes: Arc<AtomicUsize>,
}

impl Writer for FailingWriter {
    fn write(&mut self, _value: Element) -> Result<()> {
        bail!("simulated write failure")
    }

    fn close(&mut self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
