//! Source positions and ranges.
//!
//! Positions are 1-based `(row, col)` pairs. A [`Span`] ties a begin and an
//! end position to the file it came from; the file itself is identified by a
//! [`FileId`] that a [`SourceMap`] resolves to a display name.

use core::fmt;

/// Identifier of a source file registered in a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileId(pub u32);

/// A 1-based row/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: u32,
    pub col: u32,
}

impl Pos {
    pub const fn new(row: u32, col: u32) -> Self {
        Pos { row, col }
    }
}

impl Default for Pos {
    fn default() -> Self {
        Pos::new(1, 1)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

/// A range of source text, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub file: FileId,
    pub begin: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(file: FileId, begin: Pos, end: Pos) -> Self {
        Span { file, begin, end }
    }

    /// A span covering exactly one position.
    pub const fn point(file: FileId, pos: Pos) -> Self {
        Span::new(file, pos, pos)
    }

    /// The single-point span at this span's beginning.
    pub const fn to_begin(self) -> Self {
        Span::point(self.file, self.begin)
    }

    /// Smallest span covering both `self` and `other`.
    pub fn join(self, other: Span) -> Span {
        Span::new(self.file, self.begin, other.end)
    }

    /// Render this span with the file name looked up in `files`.
    pub fn display<'a>(&'a self, files: &'a SourceMap) -> SpanDisplay<'a> {
        SpanDisplay { span: self, files }
    }
}

/// Helper returned by [`Span::display`].
pub struct SpanDisplay<'a> {
    span: &'a Span,
    files: &'a SourceMap,
}

impl fmt::Display for SpanDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Span { file, begin, end } = *self.span;
        let name = self.files.name(file);
        if begin == end {
            write!(f, "{name}:{begin}")
        } else if begin.row == end.row {
            write!(f, "{name}:{begin}-{}", end.col)
        } else {
            write!(f, "{name}:{begin}-{end}")
        }
    }
}

/// Registry of file names, indexed by [`FileId`].
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    names: Vec<String>,
}

impl SourceMap {
    pub fn new() -> Self {
        SourceMap { names: Vec::new() }
    }

    /// Register a file name and return its id.
    pub fn add(&mut self, name: impl Into<String>) -> FileId {
        let id = FileId(self.names.len() as u32);
        self.names.push(name.into());
        id
    }

    /// Display name of `file`, or `<unknown>` for ids not issued by this map.
    pub fn name(&self, file: FileId) -> &str {
        self.names
            .get(file.0 as usize)
            .map(String::as_str)
            .unwrap_or("<unknown>")
    }
}
