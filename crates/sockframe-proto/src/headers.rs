//! UTF-8 `key=value` header block.

use std::collections::BTreeMap;

use crate::errors::{ProtocolError, Result};

/// An ordered set of unique header key/value pairs.
///
/// Serialized on the wire as `key=value\n` entries, concatenated in key
/// order. Keys and values may not contain `=` or `\n` — both are rejected at
/// insertion time rather than escaped, keeping the wire format trivial to
/// parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    /// An empty header set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, validating that neither key nor value contains a
    /// forbidden byte.
    ///
    /// # Errors
    ///
    /// `ProtocolError::InvalidHeader` if `key` or `value` contains `=` or
    /// `\n`.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let key = key.into();
        let value = value.into();
        validate_component(&key)?;
        validate_component(&value)?;
        self.0.insert(key, value);
        Ok(())
    }

    /// Look up a header by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over key/value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize to the wire's `key=value\n` block.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (key, value) in self.iter() {
            out.extend_from_slice(key.as_bytes());
            out.push(b'=');
            out.extend_from_slice(value.as_bytes());
            out.push(b'\n');
        }
        out
    }

    /// Parse from a header block.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::InvalidHeaderEncoding` if the block is not UTF-8.
    /// - `ProtocolError::InvalidHeader` if an entry is missing `=`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|_| ProtocolError::InvalidHeaderEncoding)?;

        let mut headers = Self::new();
        for line in text.split('\n') {
            if line.is_empty() {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| ProtocolError::InvalidHeader(format!("missing '=' in {line:?}")))?;
            headers.0.insert(key.to_string(), value.to_string());
        }
        Ok(headers)
    }
}

fn validate_component(s: &str) -> Result<()> {
    if s.contains('=') || s.contains('\n') {
        return Err(ProtocolError::InvalidHeader(format!(
            "header component {s:?} contains '=' or newline"
        )));
    }
    Ok(())
}
