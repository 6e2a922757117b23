//! Shared types used across the highlighting, annotation and scan stages.
//!
//! These values travel from fence extraction through rendering and end up
//! serialized in the scan manifest, so they must stay identical everywhere.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language of a code block, as declared by its fence.
///
/// `NoHighlight` is the explicit "no language" sentinel: such blocks are
/// HTML-escaped but never tokenized and never line-numbered. Everything else
/// is `Named`, whether or not a grammar exists for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageTag {
    NoHighlight,
    Named(String),
}

impl LanguageTag {
    /// Parse a fence language.
    ///
    /// - `""` or `"none"` → `NoHighlight`
    /// - anything else → `Named`, lower-cased
    pub fn parse(tag: &str) -> Self {
        let tag = tag.trim();
        if tag.is_empty() || tag.eq_ignore_ascii_case("none") {
            LanguageTag::NoHighlight
        } else {
            LanguageTag::Named(tag.to_ascii_lowercase())
        }
    }

    pub fn is_no_highlight(&self) -> bool {
        matches!(self, LanguageTag::NoHighlight)
    }

    /// The value used in `language-*` CSS classes.
    pub fn as_str(&self) -> &str {
        match self {
            LanguageTag::NoHighlight => "none",
            LanguageTag::Named(name) => name,
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which point of a file's history a date lookup asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    Created,
    Modified,
}
