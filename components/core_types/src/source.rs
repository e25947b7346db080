//! Source position tracking for diagnostics.

use std::fmt;

/// Represents a position in script source code.
///
/// Used for error reporting to indicate where an issue occurred. Lines and
/// columns are 1-based; `offset` is the byte offset from the start of the
/// source text.
///
/// # Examples
///
/// ```
/// use core_types::SourcePosition;
///
/// let src = "void Init() {\n  oops();\n}";
/// let pos = SourcePosition::from_offset(src, 16);
///
/// assert_eq!(pos.line, 2);
/// assert_eq!(pos.column, 3);
/// assert_eq!(pos.offset, 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourcePosition {
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based, counted in characters)
    pub column: u32,
    /// Byte offset from the start of the source
    pub offset: usize,
}

impl SourcePosition {
    /// Create a new source position
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Compute line and column for a byte offset into `source`.
    ///
    /// Offsets past the end of the source are clamped to the end.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let mut line = 1;
        let mut column = 1;
        for (idx, ch) in source.char_indices() {
            if idx >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} (offset {})", self.line, self.column, self.offset)
    }
}
