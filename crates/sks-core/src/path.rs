//! # Paths: Locations Inside Instances and Schemas
//!
//! Errors are built leaf-first: a keyword validator creates the error with
//! an empty path, and each enclosing level prepends its own chunk on the way
//! out. [`JsonPath`] is therefore a deque, read root-to-leaf once complete.

use std::collections::VecDeque;
use std::fmt;

/// One step in a path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathChunk {
    /// Object property name (or schema keyword).
    Key(String),
    /// Array position.
    Index(usize),
}

impl From<&str> for PathChunk {
    fn from(value: &str) -> Self {
        Self::Key(value.to_string())
    }
}

impl From<String> for PathChunk {
    fn from(value: String) -> Self {
        Self::Key(value)
    }
}

impl From<usize> for PathChunk {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

impl fmt::Display for PathChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// An ordered root-to-leaf sequence of [`PathChunk`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPath {
    chunks: VecDeque<PathChunk>,
}

impl JsonPath {
    /// The empty path (the root).
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a chunk, as an enclosing level does when an error bubbles up.
    pub fn push_front(&mut self, chunk: impl Into<PathChunk>) {
        self.chunks.push_front(chunk.into());
    }

    /// Append a chunk.
    pub fn push_back(&mut self, chunk: impl Into<PathChunk>) {
        self.chunks.push_back(chunk.into());
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathChunk> {
        self.chunks.iter()
    }

    /// Dot-joined rendering used in assertion reports: `vessels.0.name`.
    pub fn dotted(&self) -> String {
        self.chunks
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Bracketed rendering used in error descriptions: `['vessels'][0]`.
    pub fn bracketed(&self) -> String {
        self.chunks
            .iter()
            .map(|chunk| match chunk {
                PathChunk::Key(key) => format!("['{key}']"),
                PathChunk::Index(index) => format!("[{index}]"),
            })
            .collect()
    }
}

impl<C: Into<PathChunk>> FromIterator<C> for JsonPath {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self {
            chunks: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}
