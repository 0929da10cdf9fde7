//! Plain-text table rendering.

use crate::record::{CellValue, Record};
use crate::schema::StyleSchema;
use crate::table::encode_cell;

/// Render `record` as a one-row table in schema column order.
///
/// Columns missing from the record render as empty cells. The output parses
/// back into an equal record, and rendering that record again yields the
/// same text.
pub fn to_text(schema: &StyleSchema, record: &Record) -> String {
    let headers: Vec<String> = schema.column_names().map(str::to_owned).collect();
    let row: Vec<CellValue> = headers
        .iter()
        .map(|name| record.get(name).cloned().unwrap_or_default())
        .collect();
    table_to_text(&headers, std::slice::from_ref(&row))
}

/// Render a header and any number of rows.
pub fn table_to_text(headers: &[String], rows: &[Vec<CellValue>]) -> String {
    let mut out = String::new();

    let header_cells: Vec<String> = headers
        .iter()
        .map(|h| encode_cell(&CellValue::new(h)))
        .collect();
    push_line(&mut out, &header_cells);
    push_line(&mut out, &vec!["---".to_owned(); headers.len()]);

    for row in rows {
        let cells: Vec<String> = row.iter().map(encode_cell).collect();
        push_line(&mut out, &cells);
    }
    out
}

fn push_line(out: &mut String, cells: &[String]) {
    out.push_str("| ");
    out.push_str(&cells.join(" | "));
    out.push_str(" |\n");
}
