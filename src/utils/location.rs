use std::fmt;

use text_size::TextSize;

/// Location of token in the code.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Location {
    /// The lineno, counting from 1.
    pub lineno: u32,
    /// The column, counting from 1.
    pub column: u32,
    /// The character offset, counting from 0.
    pub offset: u32,
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}({})", self.lineno, self.column, self.offset)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.lineno, self.column)
    }
}

/// Maps byte offsets of a source text to line / column pairs.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(input: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        line_starts.extend(
            input
                .char_indices()
                .filter(|(_, c)| *c == '\n')
                .filter_map(|(i, _)| TextSize::try_from(i + 1).ok()),
        );
        LineIndex { line_starts }
    }

    pub fn location(&self, offset: TextSize) -> Location {
        let line = self
            .line_starts
            .partition_point(|start| *start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts.get(line).copied().unwrap_or_default();
        Location {
            lineno: u32::try_from(line + 1).unwrap_or(u32::MAX),
            column: u32::from(offset - line_start) + 1,
            offset: offset.into(),
        }
    }
}
