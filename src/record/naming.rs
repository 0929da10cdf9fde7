//! Artifact naming: `{type}_{id}_{shortDescription}`.
//!
//! The same base name is used for the text artifact (`.md`) and the spreadsheet
//! artifact (`.xlsx`) of one record.

use crate::error::{CaselyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Words kept from a title when building a short description.
pub const SHORT_DESCRIPTION_WORDS: usize = 5;

const FORBIDDEN_CHARS: &[char] = &['/', '\\', '\0'];

/// Validated artifact base name.
///
/// `type` and `id` may not contain `_`; the description may. Ordering is the
/// lexical order of the full name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactName {
    full: String,
    kind_len: usize,
    id_len: usize,
}

impl ArtifactName {
    /// Assemble a name from its three parts.
    pub fn new(kind: &str, id: &str, description: &str) -> Result<Self> {
        let full = format!("{kind}_{id}_{description}");
        if kind.contains('_') || id.contains('_') {
            return Err(CaselyError::InvalidArtifactName(full));
        }
        Self::parse(&full)
    }

    /// Parse a base name (no extension).
    pub fn parse(name: &str) -> Result<Self> {
        let invalid = || CaselyError::InvalidArtifactName(name.to_owned());

        if name.chars().any(|c| FORBIDDEN_CHARS.contains(&c) || c.is_control())
            || name.starts_with('.')
        {
            return Err(invalid());
        }

        let mut parts = name.splitn(3, '_');
        let kind = parts.next().unwrap_or_default();
        let id = parts.next().unwrap_or_default();
        let description = parts.next().unwrap_or_default();
        if [kind, id, description]
            .iter()
            .any(|p| p.trim().is_empty() || p.trim() != *p)
        {
            return Err(invalid());
        }

        Ok(Self {
            full: name.to_owned(),
            kind_len: kind.len(),
            id_len: id.len(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// The `{type}` part, e.g. `functional`.
    pub fn kind(&self) -> &str {
        self.full.get(..self.kind_len).unwrap_or_default()
    }

    pub fn id(&self) -> &str {
        let start = self.kind_len + 1;
        self.full
            .get(start..start + self.id_len)
            .unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.full
            .get(self.kind_len + self.id_len + 2..)
            .unwrap_or_default()
    }

    /// File name with the given extension, e.g. `functional_TC001_login.xlsx`.
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.full)
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl FromStr for ArtifactName {
    type Err = CaselyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ArtifactName {
    type Error = CaselyError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ArtifactName> for String {
    fn from(name: ArtifactName) -> Self {
        name.full
    }
}

/// Short, filesystem-friendly description built from a title.
///
/// Lowercases, keeps alphanumerics (any script), turns everything else into
/// single underscores and keeps at most `max_words` words.
pub fn slugify(text: &str, max_words: usize) -> String {
    let clean: String = text
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let slug = clean
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join("_");

    if slug.is_empty() {
        "untitled".to_owned()
    } else {
        slug
    }
}

/// Make an id usable as the `{id}` part: no underscores, no separators.
pub fn sanitize_id(id: &str) -> String {
    let clean: String = id
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '.' { c } else { '-' })
        .collect();

    let mut result = String::with_capacity(clean.len());
    let mut last_was_dash = false;
    for c in clean.chars() {
        if c == '-' {
            if !last_was_dash {
                result.push(c);
            }
            last_was_dash = true;
        } else {
            result.push(c);
            last_was_dash = false;
        }
    }

    let result = result.trim_matches(|c| c == '-' || c == '.').to_owned();
    if result.is_empty() { "none".to_owned() } else { result }
}
