//! Source units and content hashes.

use std::fmt;
use std::hash::Hasher;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

/// A 64-bit content hash.
///
/// Used both for the exact text of a [`SourceUnit`] and, by the lexer, for
/// the layout-insensitive token fingerprint that keys the source cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentHash(u64);

impl ContentHash {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Format as a fixed-width hex string.
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }

    /// Hash raw bytes with `FxHasher`.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = FxHasher::default();
        hasher.write(bytes);
        hasher.write_usize(bytes.len());
        Self(hasher.finish())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Where a source unit came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceOrigin {
    /// Read from a file on disk.
    File(PathBuf),
    /// An inline snippet with no backing file.
    Inline,
}

impl SourceOrigin {
    /// Display name used in diagnostics.
    pub fn display_name(&self) -> String {
        match self {
            SourceOrigin::File(path) => path.display().to_string(),
            SourceOrigin::Inline => "<inline>".to_string(),
        }
    }
}

/// Immutable source text with its exact-content hash.
///
/// Cloning is cheap: the text is shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    text: Arc<str>,
    hash: ContentHash,
    origin: SourceOrigin,
}

impl SourceUnit {
    pub fn new(origin: SourceOrigin, text: impl Into<Arc<str>>) -> Self {
        let text = text.into();
        let hash = ContentHash::of_bytes(text.as_bytes());
        SourceUnit { text, hash, origin }
    }

    /// A snippet with no file behind it.
    pub fn inline(text: impl Into<Arc<str>>) -> Self {
        Self::new(SourceOrigin::Inline, text)
    }

    pub fn from_file(path: &Path, text: impl Into<Arc<str>>) -> Self {
        Self::new(SourceOrigin::File(path.to_path_buf()), text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    pub fn origin(&self) -> &SourceOrigin {
        &self.origin
    }

    pub fn name(&self) -> String {
        self.origin.display_name()
    }

    /// Text covered by a span, or `""` when the span is out of range.
    pub fn slice(&self, span: crate::Span) -> &str {
        self.text.get(span.to_range()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Span;

    #[test]
    fn inline_units_use_marker_name() {
        let unit = SourceUnit::inline("x = 1");
        assert_eq!(unit.name(), "<inline>");
        assert_eq!(unit.origin(), &SourceOrigin::Inline);
    }

    #[test]
    fn hash_depends_on_exact_text() {
        let a = SourceUnit::inline("x = 1");
        let b = SourceUnit::inline("x =  1");
        let c = SourceUnit::inline("x = 1");
        assert_ne!(a.hash(), b.hash());
        assert_eq!(a.hash(), c.hash());
    }

    #[test]
    fn content_hash_hex_is_fixed_width() {
        assert_eq!(ContentHash::new(0xab).to_hex(), "00000000000000ab");
        assert_eq!(ContentHash::new(0xab).to_string(), "00000000000000ab");
    }

    #[test]
    fn slice_out_of_range_is_empty() {
        let unit = SourceUnit::inline("abc");
        assert_eq!(unit.slice(Span::new(1, 3)), "bc");
        assert_eq!(unit.slice(Span::new(2, 9)), "");
    }
}
