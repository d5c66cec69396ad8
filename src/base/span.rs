//! Source text positions and ranges.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::FileId;

/// A line and column position in source text.
///
/// Both line and column are 0-indexed internally, but displayed as 1-indexed.
/// Ordering is lexicographic on (line, col), which makes range containment
/// checks plain comparisons.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Serialize, Deserialize)]
pub struct LineCol {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column
    pub col: u32,
}

impl LineCol {
    /// Create a new LineCol position.
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// Create from 1-indexed line and column (as displayed to users).
    #[inline]
    pub const fn from_one_indexed(line: u32, col: u32) -> Self {
        Self {
            line: line.saturating_sub(1),
            col: col.saturating_sub(1),
        }
    }

    /// Get 1-indexed line number (for display).
    #[inline]
    pub const fn line_one_indexed(self) -> u32 {
        self.line + 1
    }

    /// Get 1-indexed column number (for display).
    #[inline]
    pub const fn col_one_indexed(self) -> u32 {
        self.col + 1
    }
}

impl fmt::Debug for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

/// A contiguous range of source text within one file.
///
/// `start` is inclusive, `end` is exclusive (the position just past the last
/// character). All scope bodies, definitions, and references carry one.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// The file containing this range.
    pub file: FileId,
    /// Inclusive start position.
    pub start: LineCol,
    /// Exclusive end position.
    pub end: LineCol,
}

impl Location {
    /// Create a new location.
    #[inline]
    pub const fn new(file: FileId, start: LineCol, end: LineCol) -> Self {
        Self { file, start, end }
    }

    /// Check whether `other` lies entirely within this range.
    ///
    /// Containment requires the same file and `start <= other.start`,
    /// `other.end <= end`. A range contains itself.
    pub fn contains(&self, other: &Location) -> bool {
        self.file == other.file && self.start <= other.start && other.end <= self.end
    }

    /// Check whether a single position lies within this range.
    ///
    /// `end` is exclusive, so the position one past the last character is
    /// outside; an empty range contains nothing.
    pub fn contains_pos(&self, pos: LineCol) -> bool {
        self.start <= pos && pos < self.end
    }

    /// The extent of this range as (line span, column span).
    ///
    /// Used as the tie-break when two scopes at equal depth both contain a
    /// location: the smaller extent (compared lexicographically) wins.
    pub fn extent(&self) -> (u32, i64) {
        (
            self.end.line - self.start.line,
            i64::from(self.end.col) - i64::from(self.start.col),
        )
    }

    /// Check whether the range is empty (start == end).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}..{}", self.file, self.start, self.end)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}..{}", self.file, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(start: (u32, u32), end: (u32, u32)) -> Location {
        Location::new(
            FileId::new(0),
            LineCol::new(start.0, start.1),
            LineCol::new(end.0, end.1),
        )
    }

    #[test]
    fn test_line_col_display() {
        let pos = LineCol::new(0, 0);
        assert_eq!(format!("{}", pos), "1:1");

        let pos = LineCol::new(5, 10);
        assert_eq!(format!("{}", pos), "6:11");
    }

    #[test]
    fn test_line_col_ordering() {
        assert!(LineCol::new(1, 0) < LineCol::new(2, 0));
        assert!(LineCol::new(1, 3) < LineCol::new(1, 4));
        assert!(LineCol::new(1, 9) < LineCol::new(2, 0));
    }

    #[test]
    fn test_location_contains() {
        let outer = loc((0, 0), (10, 0));
        let inner = loc((2, 4), (5, 1));

        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.contains(&outer)); // self-containment
    }

    #[test]
    fn test_location_contains_other_file() {
        let a = loc((0, 0), (10, 0));
        let mut b = loc((2, 0), (3, 0));
        b.file = FileId::new(1);

        assert!(!a.contains(&b));
    }

    #[test]
    fn test_location_contains_pos() {
        let range = loc((1, 4), (3, 0));

        assert!(range.contains_pos(LineCol::new(1, 4)));
        assert!(range.contains_pos(LineCol::new(2, 100)));
        assert!(!range.contains_pos(LineCol::new(0, 9)));
        assert!(!range.contains_pos(LineCol::new(3, 0))); // end is exclusive
        assert!(!range.contains_pos(LineCol::new(3, 1)));

        let empty = loc((1, 4), (1, 4));
        assert!(!empty.contains_pos(LineCol::new(1, 4)));
    }

    #[test]
    fn test_extent_ordering() {
        let small = loc((1, 0), (1, 10));
        let large = loc((1, 0), (4, 0));

        assert!(small.extent() < large.extent());
    }
}
