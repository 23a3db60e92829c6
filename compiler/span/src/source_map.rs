use crate::{ByteIndex, Span};
use index_map::{Index, IndexMap};
use std::{
    fmt, io,
    path::{Path, PathBuf},
};

#[cfg(test)]
mod test;

/// A mapping from [index](SourceFileIndex) to [source file](SourceFile).
#[derive(Default)]
pub struct SourceMap {
    files: IndexMap<SourceFileIndex, SourceFile>,
}

impl SourceMap {
    /// Open a file given its path and add it to the map.
    pub fn load(&mut self, path: &Path) -> io::Result<SourceFileIndex> {
        let content = std::fs::read_to_string(path)?;

        if u32::try_from(content.len()).is_err() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "the file is larger than 4 GiB",
            ));
        }

        Ok(self.add(FileName::Path(path.to_owned()), content))
    }

    /// Add text to the map creating a [`SourceFile`] in the process.
    pub fn add(&mut self, name: impl Into<FileName>, content: impl Into<String>) -> SourceFileIndex {
        self.files.insert(SourceFile::new(name.into(), content.into()))
    }

    pub fn add_str(&mut self, content: &str) -> SourceFileIndex {
        self.add(FileName::Anonymous, content)
    }

    pub fn get(&self, index: SourceFileIndex) -> Option<&SourceFile> {
        self.files.get(index)
    }

    /// The index the next added file is going to receive.
    pub fn next_index(&self) -> SourceFileIndex {
        self.files.next_index()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The text covered by a span in the given file.
    pub fn snippet(&self, file: SourceFileIndex, span: Span) -> &str {
        &self[file][span]
    }
}

impl std::ops::Index<SourceFileIndex> for SourceMap {
    type Output = SourceFile;

    fn index(&self, index: SourceFileIndex) -> &Self::Output {
        &self.files[index]
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Index)]
pub struct SourceFileIndex(u16);

impl fmt::Debug for SourceFileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// A 1-based line and column, the latter counted in characters.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

pub struct SourceFile {
    name: FileName,
    content: String,
    /// The byte offset of the start of every line.
    line_starts: Vec<ByteIndex>,
}

impl SourceFile {
    fn new(name: FileName, content: String) -> Self {
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(index, _)| index + 1))
            .map(ByteIndex::from)
            .collect();

        Self {
            name,
            content,
            line_starts,
        }
    }

    pub fn name(&self) -> &FileName {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Convert a byte offset into a line and column.
    ///
    /// Offsets past the end of the file are clamped to the end of the file.
    pub fn position(&self, offset: ByteIndex) -> Position {
        let offset = offset.min(ByteIndex::from(self.content.len()));

        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next_line) => next_line - 1,
        };

        let start = self.line_starts[line];
        let column = self
            .content
            .get(start.usize()..offset.usize())
            .map_or(0, |prefix| prefix.chars().count());

        Position {
            line: line as u32 + 1,
            column: column as u32 + 1,
        }
    }

    /// The text of the given 1-based line without its line terminator.
    pub fn line(&self, number: u32) -> Option<&str> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        let start = self.line_starts.get(index)?.usize();
        let end = self
            .line_starts
            .get(index + 1)
            .map_or(self.content.len(), |end| end.usize());

        let line = &self.content[start..end];
        let line = line.strip_suffix('\n').unwrap_or(line);
        Some(line.strip_suffix('\r').unwrap_or(line))
    }

    pub fn span(&self) -> Span {
        Span::new(ByteIndex::default(), ByteIndex::from(self.content.len()))
    }
}

impl std::ops::Index<Span> for SourceFile {
    type Output = str;

    fn index(&self, span: Span) -> &Self::Output {
        &self.content[span.range()]
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FileName {
    Anonymous,
    Path(PathBuf),
}

impl FileName {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::Anonymous => None,
        }
    }
}

impl From<PathBuf> for FileName {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for FileName {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_owned())
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("⟨anonymous⟩"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}
