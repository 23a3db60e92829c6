//! Byte offsets, spans and locations inside of source files.

use std::{fmt, ops::Range};

pub use source_map::{FileName, Position, SourceFile, SourceFileIndex, SourceMap};

mod source_map;

/// A byte offset into a single source file.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ByteIndex(u32);

impl ByteIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub fn usize(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for ByteIndex {
    fn from(index: usize) -> Self {
        // Source files larger than 4 GiB are rejected when they are loaded.
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }
}

impl std::ops::Add<u32> for ByteIndex {
    type Output = Self;

    fn add(self, offset: u32) -> Self {
        Self(self.0 + offset)
    }
}

impl fmt::Debug for ByteIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}b", self.0)
    }
}

/// A half-open byte range inside of a single source file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: ByteIndex,
    pub end: ByteIndex,
}

impl Span {
    pub fn new(start: ByteIndex, end: ByteIndex) -> Self {
        debug_assert!(start <= end, "span starts after it ends");

        Self { start, end }
    }

    pub fn empty(index: ByteIndex) -> Self {
        Self::new(index, index)
    }

    pub fn length(self) -> u32 {
        self.end.0 - self.start.0
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// The smallest span covering both spans.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn range(self) -> Range<usize> {
        self.start.usize()..self.end.usize()
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.0, self.end.0)
    }
}

/// Construct a span from raw offsets, mostly useful in tests.
pub fn span(start: u32, end: u32) -> Span {
    Span::new(ByteIndex(start), ByteIndex(end))
}

/// A span together with the file it points into.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Location {
    pub file: SourceFileIndex,
    pub span: Span,
}

impl Location {
    pub fn new(file: SourceFileIndex, span: Span) -> Self {
        Self { file, span }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Spanned<T> {
    pub bare: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub const fn new(span: Span, bare: T) -> Self {
        Self { bare, span }
    }

    pub fn map<U>(self, mapper: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned::new(self.span, mapper(self.bare))
    }
}

impl<T: fmt::Debug> fmt::Debug for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.span, self.bare)
    }
}
