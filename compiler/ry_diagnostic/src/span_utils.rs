//! Line and column lookup.

/// Pre-computed line offset table for line/column lookup.
///
/// # Example
///
/// ```
/// use ry_diagnostic::span_utils::LineOffsetTable;
///
/// let source = "line1\nline2\nline3";
/// let table = LineOffsetTable::build(source);
///
/// assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
/// assert_eq!(table.offset_to_line_col(source, 6), (2, 1));
/// assert_eq!(table.offset_to_line_col(source, 14), (3, 3));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    /// Byte offset of each line start; `offsets[0] == 0`.
    offsets: Vec<u32>,
}

impl LineOffsetTable {
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                offsets.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineOffsetTable { offsets }
    }

    /// 1-based line containing `offset`.
    #[inline]
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(line_idx).unwrap_or(u32::MAX - 1) + 1
    }

    /// 1-based (line, column); the column counts characters, not bytes.
    pub fn offset_to_line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let line_start = self.offsets.get((line - 1) as usize).copied().unwrap_or(0) as usize;
        let end = (offset as usize).min(source.len());
        let col_text = source.get(line_start..end).unwrap_or("");
        let col = u32::try_from(col_text.chars().count()).unwrap_or(u32::MAX - 1) + 1;
        (line, col)
    }

    /// Byte offset of a line start (1-based line number).
    pub fn line_start_offset(&self, line: u32) -> Option<u32> {
        if line == 0 {
            return None;
        }
        self.offsets.get((line - 1) as usize).copied()
    }

    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }

    /// Text of a 1-based line without its trailing newline.
    pub fn line_text<'a>(&self, source: &'a str, line: u32) -> &'a str {
        let Some(start) = self.line_start_offset(line) else {
            return "";
        };
        let end = self
            .line_start_offset(line + 1)
            .map_or(source.len(), |next| (next as usize).saturating_sub(1));
        source
            .get(start as usize..end.max(start as usize))
            .unwrap_or("")
            .trim_end_matches('\r')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_source_has_one_line() {
        let table = LineOffsetTable::build("");
        assert_eq!(table.line_count(), 1);
        assert_eq!(table.offset_to_line_col("", 0), (1, 1));
        assert_eq!(table.line_text("", 1), "");
    }

    #[test]
    fn columns_count_characters() {
        let source = "é = 1\nx";
        let table = LineOffsetTable::build(source);
        // 'é' is two bytes; '=' sits at byte 3 but column 3.
        assert_eq!(table.offset_to_line_col(source, 3), (1, 3));
    }

    #[test]
    fn line_text_strips_newline_and_cr() {
        let source = "a\r\nbb\nccc";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.line_text(source, 1), "a");
        assert_eq!(table.line_text(source, 2), "bb");
        assert_eq!(table.line_text(source, 3), "ccc");
        assert_eq!(table.line_text(source, 4), "");
    }

    proptest! {
        #[test]
        fn lookup_matches_linear_scan(source in "[a-z \n]{0,200}", pick in 0usize..200) {
            let offset = pick.min(source.len());
            let table = LineOffsetTable::build(&source);
            let expected_line = source[..offset].matches('\n').count() + 1;
            let (line, col) = table.offset_to_line_col(&source, offset as u32);
            prop_assert_eq!(line as usize, expected_line);
            let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
            prop_assert_eq!(col as usize, offset - line_start + 1);
        }
    }
}
