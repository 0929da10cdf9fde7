//! Table grammar: header, separator, data rows.

use super::cell::{decode_cell, has_delimiter, is_separator_cell, split_row};
use crate::record::{CellValue, Record};
use std::collections::HashSet;
use thiserror::Error;

/// Why a text could not be read as exactly one table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedTableError {
    #[error("no table found (expected a header line followed by a separator line)")]
    NoTable,

    #[error("table has a header but no data rows")]
    NoDataRows,

    #[error("line {line}: expected {expected} cells, found {found}")]
    ArityMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("more than one table in the document")]
    MultipleTables,

    #[error("header column {column} is empty")]
    EmptyHeader { column: usize },

    #[error("duplicate header '{0}'")]
    DuplicateHeader(String),
}

/// Headers and rows of one parsed table. Every row has `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ParsedTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Every cell of column `index`, top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Rows keyed by header name.
    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        self.rows
            .iter()
            .map(|row| Record::from_row(&self.headers, row))
    }
}

fn is_separator_line(line: &str) -> bool {
    has_delimiter(line) && {
        let cells = split_row(line);
        !cells.is_empty() && cells.iter().all(|c| is_separator_cell(c))
    }
}

/// Index of the first header line, i.e. a delimited line directly followed by a separator.
fn find_header(lines: &[&str], from: usize) -> Option<usize> {
    (from..lines.len()).find(|&i| {
        lines.get(i).is_some_and(|l| has_delimiter(l) && !is_separator_line(l))
            && lines.get(i + 1).is_some_and(|l| is_separator_line(l))
    })
}

fn parse_headers(line: &str) -> Result<Vec<String>, MalformedTableError> {
    let headers: Vec<String> = split_row(line)
        .iter()
        .map(|h| decode_cell(h).joined(" "))
        .collect();

    let mut seen = HashSet::new();
    for (index, header) in headers.iter().enumerate() {
        if header.is_empty() {
            return Err(MalformedTableError::EmptyHeader { column: index + 1 });
        }
        if !seen.insert(header.as_str()) {
            return Err(MalformedTableError::DuplicateHeader(header.clone()));
        }
    }
    Ok(headers)
}

/// Parse `text` as exactly one table.
///
/// Line numbers in errors are 1-based. `<br>` markers inside a cell produce a
/// multi-line [`CellValue`], never extra rows.
pub fn parse_table(text: &str) -> Result<ParsedTable, MalformedTableError> {
    let lines: Vec<&str> = text.lines().collect();
    let header_idx = find_header(&lines, 0).ok_or(MalformedTableError::NoTable)?;
    let header_line = lines.get(header_idx).copied().unwrap_or_default();
    let headers = parse_headers(header_line)?;
    let expected = headers.len();

    let separator_idx = header_idx + 1;
    let separator_arity = lines
        .get(separator_idx)
        .map(|l| split_row(l).len())
        .unwrap_or_default();
    if separator_arity != expected {
        return Err(MalformedTableError::ArityMismatch {
            line: separator_idx + 1,
            expected,
            found: separator_arity,
        });
    }

    let mut rows = Vec::new();
    let mut next = separator_idx + 1;
    while let Some(line) = lines.get(next) {
        if line.trim().is_empty() || !has_delimiter(line) {
            break;
        }
        // A separator right after a row means that row was the header of a second table.
        if is_separator_line(line) {
            return Err(MalformedTableError::MultipleTables);
        }

        let cells = split_row(line);
        if cells.len() != expected {
            return Err(MalformedTableError::ArityMismatch {
                line: next + 1,
                expected,
                found: cells.len(),
            });
        }
        rows.push(cells.iter().map(|c| decode_cell(c)).collect());
        next += 1;
    }

    if rows.is_empty() {
        return Err(MalformedTableError::NoDataRows);
    }
    if find_header(&lines, next).is_some() {
        return Err(MalformedTableError::MultipleTables);
    }

    Ok(ParsedTable { headers, rows })
}
