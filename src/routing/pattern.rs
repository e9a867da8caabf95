//! Route pattern compilation.
//!
//! # Responsibilities
//! - Turn a textual route pattern into a compiled matcher
//! - Report unusable patterns at load time, never at match time
//!
//! # Design Decisions
//! - `?` is a single-segment wildcard (`[^/]+`)
//! - Every other character is handed to the regex engine verbatim, so regex
//!   metacharacters keep their regex meaning
//! - Matching is an unanchored substring search: `/a/?` matches `/x/a/1/y`.
//!   Route ordering relies on this, so do not anchor it here.

use regex::Regex;
use thiserror::Error;

/// Regex fragment substituted for every `?` in a pattern.
pub const SEGMENT_WILDCARD: &str = "[^/]+";

/// A route pattern could not be turned into a matcher.
#[derive(Debug, Error)]
#[error("invalid route pattern '{pattern}': {source}")]
pub struct CompileError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `pattern`, replacing each `?` with [`SEGMENT_WILDCARD`].
    pub fn compile(pattern: &str) -> Result<Self, CompileError> {
        let expanded = pattern.replace('?', SEGMENT_WILDCARD);
        let regex = Regex::new(&expanded).map_err(|source| CompileError {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Returns true if the pattern occurs anywhere in `uri`.
    pub fn matches(&self, uri: &str) -> bool {
        self.regex.is_match(uri)
    }

    /// The pattern text as written in the route table.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}
