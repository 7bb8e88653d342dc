use std::ops::Range;

/// Position inside one stage of a translation unit.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct StageLocation {
    /// Index of the stage as passed to [`TranslationUnit::new`].
    pub stage: usize,
    /// 1-based line within the stage text.
    pub line: usize,
    /// 1-based column (in chars) within the line.
    pub column: usize,
}

/// The stages of one program concatenated into a single source string.
///
/// Each stage keeps its byte range so compiler spans can be mapped back to
/// the resource that produced them.
pub(crate) struct TranslationUnit {
    text: String,
    ranges: Vec<(usize, Range<usize>)>,
}

impl TranslationUnit {
    /// Concatenates `parts` in order. Each part is `(stage index, text)`.
    pub fn new<'a>(parts: impl IntoIterator<Item = (usize, &'a str)>) -> Self {
        let mut text = String::new();
        let mut ranges = Vec::new();

        for (stage, part) in parts {
            let start = text.len();
            text.push_str(part);
            if !part.ends_with('\n') {
                text.push('\n');
            }
            ranges.push((stage, start..text.len()));
        }

        Self { text, ranges }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Maps a byte offset of the unit to a stage-relative location.
    ///
    /// Offsets at the very end of the unit (end-of-input errors) belong to
    /// the last stage.
    pub fn locate(&self, offset: usize) -> Option<StageLocation> {
        let (stage, range) = self
            .ranges
            .iter()
            .find(|(_, r)| r.contains(&offset))
            .or_else(|| self.ranges.last().filter(|_| offset == self.text.len()))?;

        let before = self.text.get(range.start..offset)?;
        let line = before.matches('\n').count() + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map_or(0, |tail| tail.chars().count())
            + 1;

        Some(StageLocation {
            stage: *stage,
            line,
            column,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> TranslationUnit {
        TranslationUnit::new([(0, "aaa\nbbb\n"), (3, "ccc"), (7, "dd\ne")])
    }

    #[test]
    fn parts_are_joined_with_newlines() {
        assert_eq!(unit().text(), "aaa\nbbb\nccc\ndd\ne\n");
    }

    #[test]
    fn locate_first_stage() {
        let loc = unit().locate(5).unwrap();
        assert_eq!(loc, StageLocation { stage: 0, line: 2, column: 2 });
    }

    #[test]
    fn locate_uses_caller_stage_indices() {
        // "ccc\n" starts at byte 8.
        let loc = unit().locate(9).unwrap();
        assert_eq!(loc, StageLocation { stage: 3, line: 1, column: 2 });
    }

    #[test]
    fn locate_line_is_stage_relative() {
        // "dd\ne\n" starts at byte 12; 'e' is at 15.
        let loc = unit().locate(15).unwrap();
        assert_eq!(loc, StageLocation { stage: 7, line: 2, column: 1 });
    }

    #[test]
    fn end_of_input_belongs_to_last_stage() {
        let u = unit();
        let loc = u.locate(u.text().len()).unwrap();
        assert_eq!(loc.stage, 7);
    }

    #[test]
    fn out_of_range_offset_is_unmapped() {
        let u = unit();
        assert!(u.locate(u.text().len() + 1).is_none());
    }

    #[test]
    fn columns_count_chars_not_bytes() {
        let u = TranslationUnit::new([(0, "// é\nx")]);
        // 'x' follows "// é\n" which is 6 bytes.
        assert_eq!(u.locate(6).unwrap().column, 1);
        // byte 5 is the newline after 'é' (2 bytes wide); four chars precede it.
        assert_eq!(u.locate(5).unwrap().column, 5);
    }
}
