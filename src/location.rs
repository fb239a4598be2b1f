//! Source location utilities.

use std::fmt;

/// Row/column location within the source YAML document (1-indexed, character-based).
///
/// Nodes produced by the parser remember where they started, so binding errors can point
/// back at the offending value even after migrations moved it under another key.
///
/// ```
/// let err = axiom::Document::parse("a: 'unterminated\n").unwrap_err();
/// let loc = err.location().unwrap();
/// assert_eq!((loc.line(), loc.column()), (1, 4));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Location {
    /// 1-indexed row number in the input stream.
    pub(crate) line: u32,
    /// 1-indexed column number in the input stream.
    pub(crate) column: u32,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    ///
    /// Nodes built programmatically (by the binder or by callers) carry this location.
    pub const UNKNOWN: Self = Self { line: 0, column: 0 };

    /// Create a new location record.
    ///
    /// Arguments:
    /// - `line`: 1-indexed line.
    /// - `column`: 1-indexed column.
    pub(crate) const fn new(line: usize, column: usize) -> Self {
        // 4 Gb is larger than any configuration file, and this is error reporting only.
        Self {
            line: line as u32,
            column: column as u32,
        }
    }

    /// 1-indexed line.
    #[inline]
    pub fn line(&self) -> u64 {
        self.line as u64
    }

    /// 1-indexed column.
    #[inline]
    pub fn column(&self) -> u64 {
        self.column as u64
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        *self != Self::UNKNOWN
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}
