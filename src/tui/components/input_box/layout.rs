//! Visual row layout for the input buffer.
//!
//! The buffer is split into rows by hard newlines, then soft-wrapped at the
//! last space that fits (or mid-word when a single word is wider than the
//! box). Rows are byte ranges into the buffer, so the renderer and the cursor
//! math see the exact same layout.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Border (2) + padding (2) consumed horizontally by the bordered block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders consumed vertically
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Rows shown before the box starts scrolling internally
pub(super) const MAX_VISIBLE_ROWS: u16 = 5;

/// Byte range `[start, end)` of one visual row. Excludes the hard newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Row {
    pub start: usize,
    pub end: usize,
}

pub(super) fn inner_width(area_width: u16) -> u16 {
    area_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Lay `text` out in rows no wider than `width` columns. Never empty.
pub(super) fn rows(text: &str, width: u16) -> Vec<Row> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();
    let mut offset = 0;
    for line in text.split('\n') {
        wrap_line(line, offset, width, &mut rows);
        offset += line.len() + 1;
    }
    rows
}

fn wrap_line(line: &str, offset: usize, width: usize, rows: &mut Vec<Row>) {
    let mut start = 0;
    let mut col = 0;
    // Byte index just past the last space seen in the current row
    let mut after_space: Option<usize> = None;

    for (i, c) in line.char_indices() {
        let w = c.width().unwrap_or(0);
        if col + w > width && i > start {
            let cut = after_space.filter(|&s| s > start).unwrap_or(i);
            rows.push(Row {
                start: offset + start,
                end: offset + cut,
            });
            start = cut;
            col = line[cut..i].width();
            after_space = None;
        }
        col += w;
        if c == ' ' {
            after_space = Some(i + 1);
        }
    }
    rows.push(Row {
        start: offset + start,
        end: offset + line.len(),
    });
}

/// Row index and display column of byte offset `pos`.
///
/// At a soft-wrap boundary the cursor belongs to the following row.
pub(super) fn locate(text: &str, rows: &[Row], pos: usize) -> (usize, u16) {
    let row = rows
        .iter()
        .rposition(|r| r.start <= pos)
        .unwrap_or(0);
    let r = rows[row];
    let col = text[r.start..pos.min(r.end).max(r.start)].width();
    (row, col as u16)
}

/// Byte offset in row `row` closest to display column `col` without passing it.
pub(super) fn offset_at(text: &str, rows: &[Row], row: usize, col: u16) -> usize {
    let r = rows[row];
    let soft_wrapped = rows.get(row + 1).is_some_and(|next| next.start == r.end);
    let mut acc = 0usize;
    let mut pos = r.start;
    for (i, c) in text[r.start..r.end].char_indices() {
        let w = c.width().unwrap_or(0);
        if acc + w > usize::from(col) {
            return r.start + i;
        }
        acc += w;
        pos = r.start + i + c.len_utf8();
    }
    // The end of a soft-wrapped row is the start of the next one
    if soft_wrapped && pos == r.end && pos > r.start {
        return prev_char_boundary(text, pos);
    }
    pos
}

pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slices<'a>(text: &'a str, rows: &[Row]) -> Vec<&'a str> {
        rows.iter().map(|r| &text[r.start..r.end]).collect()
    }

    #[test]
    fn empty_text_is_one_row() {
        assert_eq!(rows("", 10), vec![Row { start: 0, end: 0 }]);
    }

    #[test]
    fn wraps_at_last_space() {
        let text = "where is the library";
        assert_eq!(slices(text, &rows(text, 10)), vec!["where is ", "the ", "library"]);
    }

    #[test]
    fn long_word_breaks_mid_word() {
        let text = "abcdefghij";
        assert_eq!(slices(text, &rows(text, 4)), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn hard_newlines_and_trailing_newline() {
        let text = "a\nb\n";
        assert_eq!(slices(text, &rows(text, 10)), vec!["a", "b", ""]);
    }

    #[test]
    fn wide_chars_count_two_columns() {
        let text = "日本語です";
        assert_eq!(slices(text, &rows(text, 4)), vec!["日本", "語で", "す"]);
    }

    #[test]
    fn locate_moves_to_next_row_at_soft_wrap() {
        let text = "abcdefgh";
        let r = rows(text, 4);
        assert_eq!(locate(text, &r, 0), (0, 0));
        assert_eq!(locate(text, &r, 3), (0, 3));
        assert_eq!(locate(text, &r, 4), (1, 0));
        assert_eq!(locate(text, &r, 8), (1, 4));
    }

    #[test]
    fn locate_after_newline() {
        let text = "ab\ncd";
        let r = rows(text, 10);
        assert_eq!(locate(text, &r, 2), (0, 2));
        assert_eq!(locate(text, &r, 3), (1, 0));
    }

    #[test]
    fn offset_at_clamps_to_row() {
        let text = "abcdefgh\nxy";
        let r = rows(text, 4);
        // Soft-wrapped row: stay on it, not at the next row's start
        assert_eq!(offset_at(text, &r, 0, 9), 3);
        // Hard-ended row: may sit right before the newline
        assert_eq!(offset_at(text, &r, 1, 9), 8);
        assert_eq!(offset_at(text, &r, 2, 1), 10);
    }

    #[test]
    fn char_boundaries_respect_utf8() {
        let text = "aé b";
        assert_eq!(next_char_boundary(text, 1), 3);
        assert_eq!(prev_char_boundary(text, 3), 1);
        assert_eq!(next_char_boundary(text, text.len()), text.len());
        assert_eq!(prev_char_boundary(text, 0), 0);
    }
}
