//! `.xlsx` output through `rust_xlsxwriter` and read-back through `calamine`.

use super::sheet::{RowFill, SheetSpec};
use crate::error::{CaselyError, Result};
use crate::record::{CellValue, Record};
use crate::utils::write_atomic;
use calamine::{Data, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};
use std::path::Path;

/// Extension of spreadsheet artifacts.
pub const SPREADSHEET_EXTENSION: &str = "xlsx";

const HEADER_FILL: u32 = 0xD9E1F2;
const BAND_FILL: u32 = 0xF2F2F2;

fn column_index(index: usize) -> Result<u16> {
    u16::try_from(index)
        .map_err(|_| CaselyError::Spreadsheet(format!("column {index} is out of range")))
}

fn row_index(index: usize) -> Result<u32> {
    u32::try_from(index)
        .map_err(|_| CaselyError::Spreadsheet(format!("row {index} is out of range")))
}

/// Serialize `sheet` into workbook bytes.
pub fn workbook_bytes(sheet: &SheetSpec) -> Result<Vec<u8>> {
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin);
    let plain = Format::new()
        .set_align(FormatAlign::Top)
        .set_text_wrap()
        .set_border(FormatBorder::Thin);
    let banded = plain.clone().set_background_color(Color::RGB(BAND_FILL));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&sheet.name)?;

    for (col, title) in sheet.header.iter().enumerate() {
        worksheet.write_string_with_format(0, column_index(col)?, title, &header_format)?;
    }

    for (index, row) in sheet.rows.iter().enumerate() {
        let format = match sheet.fill_for(index) {
            RowFill::Plain => &plain,
            RowFill::Banded => &banded,
        };
        let row_num = row_index(index + 1)?;
        for (col, value) in row.iter().enumerate() {
            let col = column_index(col)?;
            if value.is_empty() {
                worksheet.write_blank(row_num, col, format)?;
            } else {
                worksheet.write_string_with_format(row_num, col, value, format)?;
            }
        }
    }

    for (col, width) in sheet.column_widths.iter().enumerate() {
        worksheet.set_column_width(column_index(col)?, *width)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    Ok(workbook.save_to_buffer()?)
}

/// Write `sheet` as a one-sheet workbook at `path`.
///
/// The workbook is built in memory and renamed into place, so a failure never
/// leaves a partial file behind.
pub fn write_xlsx(sheet: &SheetSpec, path: &Path) -> Result<()> {
    let bytes = workbook_bytes(sheet)?;
    write_atomic(path, &bytes)
}

/// First sheet of a workbook: header row and data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetContents {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetContents {
    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        self.rows
            .iter()
            .map(|row| Record::from_row(&self.headers, row))
    }
}

fn cell_text(data: Option<&Data>) -> String {
    match data {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Read the first sheet of the workbook at `path`.
///
/// The header row ends at the first empty header cell; rows with no content
/// are skipped. Lines inside a cell are split on `\n`.
pub fn read_xlsx(path: &Path) -> Result<SheetContents> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let name = workbook.sheet_names().first().cloned().ok_or_else(|| {
        CaselyError::Spreadsheet(format!("{} has no worksheets", path.display()))
    })?;
    let range = workbook.worksheet_range(&name)?;

    let Some((last_row, last_col)) = range.end() else {
        return Ok(SheetContents {
            name,
            headers: Vec::new(),
            rows: Vec::new(),
        });
    };

    let headers: Vec<String> = (0..=last_col)
        .map(|col| cell_text(range.get_value((0, col))))
        .take_while(|h| !h.trim().is_empty())
        .map(|h| h.trim().to_owned())
        .collect();
    let width = u32::try_from(headers.len()).unwrap_or(u32::MAX);

    let rows = (1..=last_row)
        .map(|row| {
            (0..width)
                .map(|col| CellValue::new(cell_text(range.get_value((row, col)))))
                .collect::<Vec<_>>()
        })
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .collect();

    Ok(SheetContents {
        name,
        headers,
        rows,
    })
}
