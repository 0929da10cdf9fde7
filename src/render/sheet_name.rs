//! Worksheet tab names.
//!
//! Spreadsheet applications reject some characters in tab names, cap their
//! length and compare them case-insensitively within a workbook.

use std::collections::HashSet;

/// Longest tab name a spreadsheet accepts, in characters.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const DISALLOWED: &[char] = &['[', ']', ':', '*', '?', '/', '\\', '!', '\'', '"', '<', '>', '|'];
const FALLBACK_NAME: &str = "Sheet";
/// Names the application reserves for itself.
const RESERVED: &[&str] = &["history"];

/// Strip disallowed and control characters, trim, truncate.
///
/// Never returns an empty string.
pub fn sanitize_sheet_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !DISALLOWED.contains(c) && !c.is_control())
        .collect();
    let truncated = truncate(cleaned.trim(), MAX_SHEET_NAME_LEN);
    let trimmed = truncated.trim();
    if trimmed.is_empty() {
        FALLBACK_NAME.to_owned()
    } else {
        trimmed.to_owned()
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s.get(..idx).unwrap_or(s),
        None => s,
    }
}

/// Hands out unique tab names.
///
/// Allocation order decides which artifact keeps the plain name, so callers
/// allocate in a fixed order (e.g. lexical artifact order) and from one thread.
#[derive(Debug, Clone)]
pub struct SheetNameRegistry {
    used: HashSet<String>,
}

impl Default for SheetNameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetNameRegistry {
    pub fn new() -> Self {
        Self {
            used: RESERVED.iter().map(|r| (*r).to_owned()).collect(),
        }
    }

    /// Sanitize `raw` and disambiguate it with `_2`, `_3`, ... if already taken.
    pub fn allocate(&mut self, raw: &str) -> String {
        let base = sanitize_sheet_name(raw);
        if self.used.insert(base.to_lowercase()) {
            return base;
        }

        let mut n = 2usize;
        loop {
            let suffix = format!("_{n}");
            let room = MAX_SHEET_NAME_LEN.saturating_sub(suffix.chars().count());
            let candidate = format!("{}{suffix}", truncate(&base, room));
            if self.used.insert(candidate.to_lowercase()) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.used.len() - RESERVED.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
