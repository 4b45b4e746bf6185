//! Source location tracking for the AHK compiler
//!
//! Positions carry a byte offset plus a 1-based line and a 1-based character
//! column. Columns count Unicode scalar values, not display cells, so they can be
//! handed straight to editor tooling.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Offset 0, line 1, column 1
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Advance position by one character.
    ///
    /// `\r\n` is treated as one break: the `\r` only moves the offset and the
    /// following `\n` starts the new line. A lone `\r` also ends a line.
    pub fn advance(self, ch: char, next: Option<char>) -> Self {
        match ch {
            '\n' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            },
            '\r' if next == Some('\n') => Self {
                offset: self.offset + 1,
                line: self.line,
                column: self.column + 1,
            },
            '\r' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            },
            _ => Self {
                offset: self.offset + ch.len_utf8(),
                line: self.line,
                column: self.column + 1,
            },
        }
    }

    /// Advance position across a whole string
    pub fn advance_str(self, s: &str) -> Self {
        let mut pos = self;
        let mut chars = s.chars().peekable();
        while let Some(ch) = chars.next() {
            pos = pos.advance(ch, chars.peek().copied());
        }
        pos
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Zero-width span at a position
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Merge two spans into one covering both
    pub fn merge(self, other: Self) -> Self {
        let start = if self.start.offset <= other.start.offset {
            self.start
        } else {
            other.start
        };

        let end = if self.end.offset >= other.end.offset {
            self.end
        } else {
            other.end
        };

        Self { start, end }
    }

    /// Byte length of this span
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Placeholder span for synthesized nodes
    pub fn dummy() -> Self {
        Self {
            start: Position::start(),
            end: Position::start(),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Line index over a source buffer for offset lookups and error rendering
#[derive(Debug, Clone)]
pub struct SourceMap {
    pub source: String,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: String) -> Self {
        let mut line_starts = vec![0];
        let bytes = source.as_bytes();
        for (offset, &b) in bytes.iter().enumerate() {
            match b {
                b'\n' => line_starts.push(offset + 1),
                b'\r' if bytes.get(offset + 1) != Some(&b'\n') => line_starts.push(offset + 1),
                _ => {}
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// A line of text by line number (1-based), without its terminator
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        if line_num == 0 {
            return None;
        }

        let line_idx = (line_num - 1) as usize;
        let start = *self.line_starts.get(line_idx)?;
        let end = self
            .line_starts
            .get(line_idx + 1)
            .copied()
            .unwrap_or(self.source.len());

        self.source
            .get(start..end)
            .map(|line| line.trim_end_matches(&['\n', '\r'][..]))
    }

    /// Render a message with the offending line and a caret underline
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let mut result = String::new();

        result.push_str(&format!("Error: {}\n", message));
        result.push_str(&format!(
            "  --> {}:{}\n",
            span.start.line, span.start.column
        ));

        if let Some(line) = self.get_line(span.start.line) {
            let line_num_str = format!("{}", span.start.line);
            let padding = " ".repeat(line_num_str.len());

            result.push_str(&format!("   {} |\n", padding));
            result.push_str(&format!("{} | {}\n", line_num_str, line));

            let mut underline = String::new();
            underline.push_str(&format!("   {} | ", padding));

            for _ in 1..span.start.column {
                underline.push(' ');
            }

            let line_chars = line.chars().count();
            let span_len = if span.start.line == span.end.line {
                span.end.column.saturating_sub(span.start.column) as usize
            } else {
                line_chars.saturating_sub((span.start.column - 1) as usize)
            };

            for _ in 0..span_len.max(1) {
                underline.push('^');
            }

            result.push_str(&underline);
            result.push('\n');
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance_handles_crlf_as_one_break() {
        let pos = Position::start().advance_str("ab\r\ncd");
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
        assert_eq!(pos.offset, 6);
    }

    #[test]
    fn test_position_counts_chars_not_bytes() {
        let pos = Position::start().advance_str("é=");
        assert_eq!(pos.column, 3);
        assert_eq!(pos.offset, 3);
    }

    #[test]
    fn test_source_map_lookup() {
        let map = SourceMap::new("x := 1\ny := 2\r\nz".to_string());
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.get_line(2), Some("y := 2"));
        assert_eq!(map.get_line(3), Some("z"));
        assert_eq!(map.get_line(4), None);
    }

    #[test]
    fn test_format_error_underlines_span() {
        let map = SourceMap::new("Foo, 1".to_string());
        let start = Position::new(3, 1, 4);
        let end = Position::new(4, 1, 5);
        let rendered = map.format_error(&Span::new(start, end), "bad comma");
        assert!(rendered.contains("--> 1:4"));
        assert!(rendered.contains("1 | Foo, 1"));
        assert!(rendered.trim_end().ends_with('^'));
    }
}
