//! Key coders.
//!
//! Grouping serializes every key to a canonical string before accumulating,
//! so that structurally equal keys coalesce regardless of their runtime
//! representation. This mimics remote execution, where keys are encoded
//! before being handed to the shuffle layer. A coder must round-trip:
//! `decode(encode(k))` is structurally equal to `k` for every key used in a
//! grouping.

use crate::element::Element;
use crate::error::RunError;
use anyhow::Result;

pub trait Coder: Send + Sync {
    /// Serialize a key to its canonical form.
    fn encode(&self, element: &Element) -> Result<String>;

    /// Recover a key from its canonical form.
    fn decode(&self, encoded: &str) -> Result<Element>;
}

/// The default coder: canonical JSON text.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCoder;

impl Coder for JsonCoder {
    fn encode(&self, element: &Element) -> Result<String> {
        Ok(serde_json::to_string(element).map_err(RunError::Coder)?)
    }

    fn decode(&self, encoded: &str) -> Result<Element> {
        Ok(serde_json::from_str(encoded).map_err(RunError::Coder)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_coder_round_trips() -> Result<()> {
        let coder = JsonCoder;
        let keys = [
            Element::from("word"),
            Element::from(42),
            Element::pair("compound", 1),
            Element::List(vec![Element::from(1), Element::from("x")]),
        ];
        for key in keys {
            assert_eq!(coder.decode(&coder.encode(&key)?)?, key);
        }
        Ok(())
    }

    #[test]
    fn structurally_equal_keys_encode_identically() -> Result<()> {
        let coder = JsonCoder;
        let a = Element::pair("k", 1);
        let b = Element::pair(String::from("k"), 1i64);
        assert_eq!(coder.encode(&a)?, coder.encode(&b)?);
        Ok(())
    }
}
