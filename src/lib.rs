//! # Casely - Style-Guide-Driven Test Case Tables
//!
//! Casely turns test cases written as plain-text (Markdown-style) tables into
//! spreadsheet artifacts that a test management system can import, while keeping
//! every generated artifact faithful to the column structure a team already uses.
//!
//! ## Quick Start
//!
//! ```no_run
//! use casely::schema::{ExtractOptions, extract_schema};
//! use casely::table::parse_table;
//!
//! # fn example() -> casely::error::Result<()> {
//! let example = std::fs::read_to_string("examples/login.md")?;
//! let table = parse_table(&example)?;
//!
//! let schema = extract_schema(&[table], &ExtractOptions::default())?;
//! for column in &schema.columns {
//!     println!("{}: {} (required: {})", column.name, column.kind, column.required);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`table`]: strict single-table parser with in-cell line break decoding
//! - [`schema`]: style schema model, extraction from examples, persistence
//! - [`record`]: records, validation against a schema, the artifact store
//! - [`render`]: plain-text and spreadsheet rendering, XLSX read/write
//! - [`export`]: batch export with partial-failure reporting
//! - [`ingest`]: splitting multi-row tables and importing spreadsheets back
//! - [`report`]: per-artifact batch outcomes
//! - [`config`]: persistent user configuration
//! - [`workspace`]: project directory layout and discovery
//! - [`error`]: error types and handling utilities
//!
//! ## Key Concepts
//!
//! ### The Style Schema Is Authoritative
//!
//! A [`schema::StyleSchema`] is inferred once from example test cases and saved as
//! human-editable JSON. Every run loads it afresh and passes it as an immutable
//! snapshot to each stage, so a manual edit takes effect on the next run.
//!
//! ### One Record, One Artifact
//!
//! Each test case lives in its own file named `{type}_{id}_{shortDescription}`.
//! Export produces exactly one `.xlsx` per source `.md`, or reports why it could not.
//!
//! ```no_run
//! use casely::export::ExportOrchestrator;
//! use casely::record::RecordStore;
//! use casely::schema::load_schema;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn example() -> casely::error::Result<()> {
//! let schema = Arc::new(load_schema(Path::new("style_schema.json"))?);
//! let source = RecordStore::open("results")?;
//!
//! let report = ExportOrchestrator::new(schema).run(&source, Path::new("exports"))?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod record;
pub mod render;
pub mod report;
pub mod schema;
pub mod table;
pub mod utils;
pub mod workspace;
