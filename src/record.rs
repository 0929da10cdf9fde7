//! Records, their validation and the one-record-per-artifact store.
//!
//! - [`model`]: [`Record`] and [`CellValue`]
//! - [`naming`]: `{type}_{id}_{shortDescription}` artifact names
//! - [`validator`]: the gate every record passes before it is accepted
//! - [`store`]: directory-backed artifact set

pub mod model;
pub mod naming;
pub mod store;
pub mod validator;

pub use model::{CellValue, Record};
pub use naming::{ArtifactName, SHORT_DESCRIPTION_WORDS, sanitize_id, slugify};
pub use store::{RecordStore, TEXT_EXTENSION};
pub use validator::{ValidationError, check_record, validate_record};
