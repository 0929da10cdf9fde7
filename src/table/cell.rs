//! Cell-level encoding shared by the parser and the text renderer.
//!
//! Grammar inside a row:
//! - `|` separates cells.
//! - A backslash escapes the next character when it is one of `|`, `\`, `<`,
//!   `-` or `:`; any other backslash is kept as is.
//! - [`BREAK_MARKER`] (matched case-insensitively, also `<br/>` and `<br />`)
//!   separates the lines of one multi-line cell. An escaped `\<br>` is text.
//! - Every line is trimmed, so leading indentation inside a cell is not kept.
//!
//! The encoder escapes `|`, `\`, a `<` that would start a marker, and the first
//! character of a line that would otherwise read as a separator cell (`---`).

use crate::record::CellValue;
use regex::Regex;
use std::sync::LazyLock;

/// Reserved in-cell line break marker written by the renderer.
pub const BREAK_MARKER: &str = "<br>";

static BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^<br\s*/?>").expect("break marker pattern is valid"));

const ESCAPABLE: &[char] = &['|', '\\', '<', '-', ':'];

/// Split one table line into raw cells.
///
/// Leading and trailing pipes are optional. Escapes are left in place for
/// [`decode_cell`]; only an unescaped `|` ends a cell.
pub(crate) fn split_row(line: &str) -> Vec<String> {
    let body = line.trim();
    let body = body.strip_prefix('|').unwrap_or(body);

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut ended_on_delimiter = false;
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        ended_on_delimiter = false;
        match c {
            '\\' => {
                current.push(c);
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '|' => {
                cells.push(std::mem::take(&mut current));
                ended_on_delimiter = true;
            }
            other => current.push(other),
        }
    }

    if !ended_on_delimiter {
        cells.push(current);
    }
    cells
}

/// Whether `line` contains at least one unescaped pipe.
pub(crate) fn has_delimiter(line: &str) -> bool {
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '|' => return true,
            _ => {}
        }
    }
    false
}

/// Separator cells look like `---`, `:--`, `:-:`.
pub(crate) fn is_separator_cell(cell: &str) -> bool {
    let cell = cell.trim();
    cell.contains('-') && cell.chars().all(|c| c == '-' || c == ':')
}

/// Decode a raw cell into trimmed lines, resolving escapes and break markers.
pub fn decode_cell(raw: &str) -> CellValue {
    let raw = raw.trim();
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = raw.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        match c {
            '\\' if chars.peek().is_some_and(|&(_, next)| ESCAPABLE.contains(&next)) => {
                if let Some((_, escaped)) = chars.next() {
                    current.push(escaped);
                }
            }
            '<' => match raw.get(index..).and_then(|rest| BREAK_RE.find(rest)) {
                Some(marker) => {
                    lines.push(std::mem::take(&mut current));
                    let end = index + marker.end();
                    while chars.next_if(|&(i, _)| i < end).is_some() {}
                }
                None => current.push(c),
            },
            other => current.push(other),
        }
    }
    lines.push(current);

    CellValue::from_lines(lines.iter().map(|line| line.trim()))
}

/// Encode a cell for a table line: lines trimmed, escaped, joined with the marker.
pub fn encode_cell(value: &CellValue) -> String {
    value
        .lines()
        .iter()
        .map(|line| escape_line(line.trim()))
        .collect::<Vec<_>>()
        .join(BREAK_MARKER)
}

fn escape_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 1);
    if is_separator_cell(line) {
        out.push('\\');
    }
    for (index, c) in line.char_indices() {
        match c {
            '|' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '<' if line.get(index..).is_some_and(|rest| BREAK_RE.is_match(rest)) => {
                out.push_str("\\<");
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_row_with_and_without_outer_pipes() {
        assert_eq!(split_row("| a | b |"), vec![" a ", " b "]);
        assert_eq!(split_row("a | b"), vec!["a ", " b"]);
        assert_eq!(split_row("| a | |"), vec![" a ", " "]);
    }

    #[test]
    fn test_split_row_keeps_escapes_for_decoding() {
        assert_eq!(split_row(r"| a\|b | c\\ |"), vec![r" a\|b ", r" c\\ "]);
        assert_eq!(decode_cell(r" a\|b "), CellValue::new("a|b"));
        assert_eq!(decode_cell(r" c\\ "), CellValue::new(r"c\"));
        assert_eq!(decode_cell(r" C:\dir "), CellValue::new(r"C:\dir"));
    }

    #[test]
    fn test_decode_break_markers() {
        let cell = decode_cell(" 1. Open <br> 2. Click<BR/>3. Check<br />");
        assert_eq!(cell.lines(), ["1. Open", "2. Click", "3. Check", ""]);
        assert_eq!(decode_cell(" plain "), CellValue::new("plain"));
    }

    #[test]
    fn test_literal_marker_survives_encoding() {
        let value = CellValue::new("Check that <br> tag is escaped");
        let encoded = encode_cell(&value);
        assert_eq!(encoded, r"Check that \<br> tag is escaped");
        assert_eq!(decode_cell(&encoded), value);
        assert_eq!(encode_cell(&CellValue::new("a <b> c")), "a <b> c");
    }

    #[test]
    fn test_separator_like_lines_are_escaped() {
        assert_eq!(encode_cell(&CellValue::new("---")), r"\---");
        assert_eq!(encode_cell(&CellValue::new(":-:")), r"\:-:");
        assert_eq!(encode_cell(&CellValue::new("-5")), "-5");

        let row = format!(
            "| {} | {} |",
            encode_cell(&CellValue::new("-")),
            encode_cell(&CellValue::new("---"))
        );
        let cells = split_row(&row);
        assert!(!cells.iter().all(|c| is_separator_cell(c)));
        assert_eq!(decode_cell(&cells[0]), CellValue::new("-"));
        assert_eq!(decode_cell(&cells[1]), CellValue::new("---"));
    }

    #[test]
    fn test_lines_are_trimmed() {
        let value = CellValue::from_lines(["1. Open", "   - nested bullet"]);
        let decoded = decode_cell(&encode_cell(&value));
        assert_eq!(decoded.lines(), ["1. Open", "- nested bullet"]);
    }

    #[test]
    fn test_separator_cells() {
        assert!(is_separator_cell(" --- "));
        assert!(is_separator_cell(":-:"));
        assert!(!is_separator_cell(":"));
        assert!(!is_separator_cell("- x"));
        assert!(!is_separator_cell(r"\---"));
    }

    #[test]
    fn test_has_delimiter_ignores_escaped_pipes() {
        assert!(has_delimiter("a | b"));
        assert!(!has_delimiter(r"a \| b"));
        assert!(!has_delimiter("plain prose"));
    }

    proptest! {
        #[test]
        fn encoded_lines_decode_to_the_same_lines(
            lines in proptest::collection::vec(
                "([a-zA-Z0-9 |\\\\<>!.:-]|<br>|<BR />|<br/>|---){0,8}",
                1..4,
            )
        ) {
            let value = CellValue::from_lines(lines.iter().map(|l| l.trim().to_owned()));
            let encoded = encode_cell(&value);
            let row = format!("| {encoded} |");
            let cells = split_row(&row);
            prop_assert_eq!(cells.len(), 1);
            prop_assert!(!is_separator_cell(&cells[0]));
            prop_assert_eq!(decode_cell(&cells[0]), value);
        }
    }
}
