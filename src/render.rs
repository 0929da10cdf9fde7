//! Rendering a record into its two representations.
//!
//! - [`text`]: the canonical plain-text single-row table
//! - [`sheet`]: the in-memory spreadsheet layout (widths, fills, wrapping)
//! - [`sheet_name`]: tab-name sanitizing and collision handling
//! - [`xlsx`]: writing and reading `.xlsx` workbooks
//!
//! Column order always comes from the schema, never from the record.

pub mod sheet;
pub mod sheet_name;
pub mod text;
pub mod xlsx;

pub use sheet::{RowFill, SheetSpec, WidthBounds, column_width, to_sheet};
pub use sheet_name::{MAX_SHEET_NAME_LEN, SheetNameRegistry, sanitize_sheet_name};
pub use text::{table_to_text, to_text};
pub use xlsx::{SPREADSHEET_EXTENSION, SheetContents, read_xlsx, write_xlsx};
