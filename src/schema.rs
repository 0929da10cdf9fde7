//! Style schema: the canonical column structure learned from example test cases.
//!
//! ## Lifecycle
//!
//! 1. [`extract_schema`] infers a [`StyleSchema`] from parsed example tables.
//! 2. [`save_schema`] persists it as pretty JSON next to the project.
//! 3. Every run calls [`load_schema`] again, so manual edits to the file are
//!    authoritative from the next run on. The loaded value is shared as an
//!    immutable snapshot for the whole run.
//!
//! ## Architecture
//!
//! - [`model`]: schema data structures and invariants
//! - [`extractor`]: deterministic inference from examples
//! - [`storage`]: JSON persistence with validation on load
//! - [`guide`]: human-readable Markdown style guide

pub mod extractor;
pub mod guide;
pub mod model;
pub mod storage;

pub use extractor::{DEFAULT_ENUM_THRESHOLD, ExtractOptions, SchemaConflictError, extract_schema};
pub use guide::render_style_guide;
pub use model::{
    ColumnKind, ColumnSpec, ResultGrouping, SCHEMA_VERSION, StepNumbering, StyleMeta,
    StyleSchema,
};
pub use storage::{SCHEMA_FILE_NAME, load_schema, save_schema};
