//! Position tracking for symbols and references
//!
//! Stores the source location (line/column) of declarations and name usages for
//! LSP features like hover, go-to-definition, and error reporting.

use serde::{Deserialize, Serialize};

/// A position in source code (0-indexed)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A range representing a region of source code (0-indexed for LSP compatibility)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a range from line/column coordinates
    pub fn from_coords(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start: Position::new(start_line, start_col),
            end: Position::new(end_line, end_col),
        }
    }

    /// Check if a position falls within this range
    pub fn contains(&self, position: Position) -> bool {
        if position.line < self.start.line || position.line > self.end.line {
            return false;
        }
        if position.line == self.start.line && position.column < self.start.column {
            return false;
        }
        if position.line == self.end.line && position.column > self.end.column {
            return false;
        }
        true
    }

    /// Check if `other` lies completely inside this range
    pub fn encloses(&self, other: &Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the range spans more than one line
    pub fn is_multiline(&self) -> bool {
        self.end.line > self.start.line
    }
}

/// Dual location of a symbol or reference.
///
/// `symbol_range` covers the whole declaration (or expression), `identifier_range`
/// only the name token. Hover and navigation use the identifier range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub symbol_range: Range,
    pub identifier_range: Range,
}

impl Location {
    pub fn new(symbol_range: Range, identifier_range: Range) -> Self {
        Self {
            symbol_range,
            identifier_range,
        }
    }

    /// A location whose symbol and identifier ranges coincide
    pub fn single(range: Range) -> Self {
        Self::new(range, range)
    }
}
