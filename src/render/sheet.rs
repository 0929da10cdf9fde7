//! Spreadsheet layout for one record, independent of the file format.

use crate::record::{CellValue, Record};
use crate::schema::StyleSchema;

/// Default narrowest column, in character units.
pub const DEFAULT_MIN_WIDTH: u16 = 10;
/// Default widest column, in character units.
pub const DEFAULT_MAX_WIDTH: u16 = 60;
/// Padding added to the longest line of a column.
const WIDTH_PADDING: usize = 2;

/// Clamp range for computed column widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthBounds {
    pub min: u16,
    pub max: u16,
}

impl Default for WidthBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_WIDTH,
            max: DEFAULT_MAX_WIDTH,
        }
    }
}

impl WidthBounds {
    /// Bounds with `min <= max` enforced.
    pub fn new(min: u16, max: u16) -> Self {
        Self {
            min: min.min(max),
            max,
        }
    }
}

/// Background of a data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFill {
    Plain,
    Banded,
}

impl RowFill {
    /// Fill for the data row at 0-based `index`: even rows plain, odd rows banded.
    pub fn for_row(index: usize) -> Self {
        if index % 2 == 0 { Self::Plain } else { Self::Banded }
    }
}

/// One sheet: a styled header row, data rows and column widths.
///
/// Cell text uses `\n` between lines; the writer turns on wrapping so
/// spreadsheet viewers show them as separate lines.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSpec {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub column_widths: Vec<u16>,
}

impl SheetSpec {
    pub fn fill_for(&self, row_index: usize) -> RowFill {
        RowFill::for_row(row_index)
    }
}

/// `max(header chars, longest data line chars) + 2`, clamped to `bounds`.
pub fn column_width<'a>(
    header: &str,
    cells: impl IntoIterator<Item = &'a str>,
    bounds: WidthBounds,
) -> u16 {
    let longest = cells
        .into_iter()
        .flat_map(|cell| cell.split('\n'))
        .map(|line| line.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0);

    let width = u16::try_from(longest + WIDTH_PADDING).unwrap_or(u16::MAX);
    width.clamp(bounds.min, bounds.max.max(bounds.min))
}

/// Lay out `record` as a one-row sheet named `sheet_name`.
pub fn to_sheet(
    schema: &StyleSchema,
    record: &Record,
    sheet_name: &str,
    bounds: WidthBounds,
) -> SheetSpec {
    let header: Vec<String> = schema.column_names().map(str::to_owned).collect();
    let row: Vec<String> = header
        .iter()
        .map(|name| record.get(name).map(CellValue::to_string).unwrap_or_default())
        .collect();

    let column_widths = header
        .iter()
        .zip(&row)
        .map(|(name, cell)| column_width(name, [cell.as_str()], bounds))
        .collect();

    SheetSpec {
        name: sheet_name.to_owned(),
        header,
        rows: vec![row],
        column_widths,
    }
}
