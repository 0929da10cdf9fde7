//! Strict single-table parsing.
//!
//! Input is normalized text holding exactly one pipe-delimited table: a header
//! line, a separator line and one or more data lines. Prose around the table is
//! ignored; anything that makes the table ambiguous is an error.
//!
//! ```
//! use casely::table::parse_table;
//!
//! let table = parse_table("| ID | Steps |\n|---|---|\n| 1 | 1. Open<br>2. Close |\n").unwrap();
//! assert_eq!(table.headers, ["ID", "Steps"]);
//! assert_eq!(table.rows[0][1].lines(), ["1. Open", "2. Close"]);
//! ```

pub mod cell;
pub mod parser;

pub use cell::{BREAK_MARKER, decode_cell, encode_cell};
pub use parser::{MalformedTableError, ParsedTable, parse_table};
