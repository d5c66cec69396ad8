//! Byte-offset ↔ line/column conversion for one file's text.

use super::LineCol;

/// Precomputed line starts of a text, for O(log n) offset lookups.
///
/// Offsets are byte offsets into the original text; columns count bytes
/// within the line, matching how captures report positions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of each line's first byte; `line_starts[0] == 0`.
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self {
            line_starts,
            len: text.len() as u32,
        }
    }

    /// The position of a byte offset. Offsets past the end clamp to the end.
    pub fn line_col(&self, offset: u32) -> LineCol {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        LineCol::new(line as u32, offset - self.line_starts[line])
    }

    /// The byte offset of a position, or `None` when it lies outside the
    /// text.
    pub fn offset(&self, pos: LineCol) -> Option<u32> {
        let start = *self.line_starts.get(pos.line as usize)?;
        let line_end = self
            .line_starts
            .get(pos.line as usize + 1)
            .copied()
            .unwrap_or(self.len);
        let offset = start + pos.col;
        (offset <= line_end).then_some(offset)
    }

    /// The position just past the last character.
    pub fn end(&self) -> LineCol {
        self.line_col(self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_round_trip() {
        let index = LineIndex::new("ab\ncde\n\nf");

        for offset in 0..=9 {
            let pos = index.line_col(offset);
            assert_eq!(index.offset(pos), Some(offset));
        }

        assert_eq!(index.line_col(0), LineCol::new(0, 0));
        assert_eq!(index.line_col(3), LineCol::new(1, 0));
        // Offset 7 starts the empty line; the last line begins at 8.
        assert_eq!(index.line_col(7), LineCol::new(2, 0));
        assert_eq!(index.line_col(8), LineCol::new(3, 0));
    }

    #[test]
    fn test_end_position() {
        assert_eq!(LineIndex::new("").end(), LineCol::new(0, 0));
        assert_eq!(LineIndex::new("abc").end(), LineCol::new(0, 3));
        assert_eq!(LineIndex::new("abc\n").end(), LineCol::new(1, 0));
        assert_eq!(LineIndex::new("a\nbc").end(), LineCol::new(1, 2));
    }

    #[test]
    fn test_offset_out_of_range() {
        let index = LineIndex::new("ab\nc");

        assert_eq!(index.offset(LineCol::new(5, 0)), None);
        assert_eq!(index.offset(LineCol::new(0, 10)), None);
    }
}
