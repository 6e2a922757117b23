//! Line numbering and line-range highlighting for rendered code blocks.
//!
//! The highlighter emits one code block as a single string of markup, with
//! exactly one `\n` between source lines and none after the last. This module
//! turns that string into numbered lines:
//!
//! ```text
//! <span class="line"></span>extends Node
//! <span class="line hl"></span>func _ready():
//! <span class="line"></span>    pass
//! ```
//!
//! The markers are empty on purpose. The stylesheet renders each one as a
//! counter cell (`.line-numbers .line::before`), and the container carries
//! `counter-reset: linenumber N` so the first marker shows `start_line`.
//!
//! ## Highlight specs
//!
//! `data-highlight="10-11 15"` is a whitespace-separated list of tokens, each
//! either a line number or an inclusive `from-to` range, in *displayed* line
//! numbers. Resolution against a block:
//!
//! - `index = displayed - start_line`
//! - both bounds are clamped to `[0, line_count - 1]`
//! - a range that clamps to nothing (entirely before or after the block)
//!   flags nothing and is not an error
//! - a reversed range `3-1` collapses to the single line `3`
//!
//! Only malformed tokens (`"a"`, `"3-"`, `"-3"`, `"1-2-3"`) are errors.

use crate::types::LanguageTag;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotateError {
    #[error("Invalid line range '{0}' in data-highlight")]
    InvalidRangeSpec(String),
}

const LINE_MARKER: &str = r#"<span class="line"></span>"#;
const LINE_MARKER_HL: &str = r#"<span class="line hl"></span>"#;

/// An inclusive range of displayed line numbers.
///
/// Always normalized so that `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    from: u32,
    to: u32,
}

impl LineRange {
    /// Build a range. A reversed range collapses to the single line `from`.
    pub fn new(from: u32, to: u32) -> Self {
        if to < from {
            Self { from, to: from }
        } else {
            Self { from, to }
        }
    }

    pub fn single(line: u32) -> Self {
        Self {
            from: line,
            to: line,
        }
    }

    pub fn from(&self) -> u32 {
        self.from
    }

    pub fn to(&self) -> u32 {
        self.to
    }
}

/// Parsed `data-highlight` value: ranges in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSpec {
    ranges: Vec<LineRange>,
}

impl HighlightSpec {
    pub fn new(ranges: Vec<LineRange>) -> Self {
        Self { ranges }
    }

    /// Parse a `data-highlight` attribute value such as `"10-11 15"`.
    pub fn parse(spec: &str) -> Result<Self, AnnotateError> {
        let ranges = spec
            .split_whitespace()
            .map(parse_range)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    pub fn ranges(&self) -> &[LineRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Resolve against a block, returning one flag per physical line.
    ///
    /// Overlapping ranges are fine: flagging is idempotent.
    pub fn resolve(&self, start_line: u32, line_count: usize) -> Vec<bool> {
        let mut flags = vec![false; line_count];
        let last = line_count as i64 - 1;
        let start = i64::from(start_line);
        for range in &self.ranges {
            let from = (i64::from(range.from) - start).max(0);
            let to = (i64::from(range.to) - start).min(last);
            if from > to {
                continue;
            }
            for flag in &mut flags[from as usize..=to as usize] {
                *flag = true;
            }
        }
        flags
    }
}

impl FromStr for HighlightSpec {
    type Err = AnnotateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_range(token: &str) -> Result<LineRange, AnnotateError> {
    let invalid = || AnnotateError::InvalidRangeSpec(token.to_string());
    let mut parts = token.split('-');
    let from = parts.next().and_then(parse_line_number).ok_or_else(invalid)?;
    match (parts.next(), parts.next()) {
        (None, _) => Ok(LineRange::single(from)),
        (Some(to), None) => {
            let to = parse_line_number(to).ok_or_else(invalid)?;
            Ok(LineRange::new(from, to))
        }
        (Some(_), Some(_)) => Err(invalid()),
    }
}

/// Digits only: `+5` and the empty string are rejected. Numbers too large
/// for `u32` saturate, so they clamp away like any other out-of-range line.
fn parse_line_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(s.parse().unwrap_or(u32::MAX))
}

/// One highlighted code block, as produced by the highlighter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Highlighted markup, `\n` between lines, no trailing newline.
    pub markup: String,
    /// Displayed number of the first line. Defaults to 1.
    pub start_line: u32,
    /// Raw `data-highlight` value, if any.
    pub highlight: Option<String>,
    pub language: LanguageTag,
}

impl CodeBlock {
    pub fn new(markup: impl Into<String>, language: LanguageTag) -> Self {
        Self {
            markup: markup.into(),
            start_line: 1,
            highlight: None,
            language,
        }
    }

    pub fn with_start_line(mut self, start_line: u32) -> Self {
        self.start_line = start_line;
        self
    }

    pub fn with_highlight(mut self, spec: impl Into<String>) -> Self {
        self.highlight = Some(spec.into());
        self
    }
}

/// Line-number metadata for an annotated block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineNumbering {
    /// Number of physical lines (= markers inserted).
    pub line_count: usize,
    /// `start_line - 1`, the value the rendering counter is reset to.
    pub start_counter: i64,
    /// Zero-based physical indices of highlighted lines, ascending.
    pub highlighted: Vec<usize>,
}

impl LineNumbering {
    pub fn counter_reset_style(&self) -> String {
        format!("counter-reset: linenumber {};", self.start_counter)
    }
}

/// Result of [`annotate`]. `numbering` is `None` for bypassed blocks, whose
/// markup is returned untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedBlock {
    pub markup: String,
    pub numbering: Option<LineNumbering>,
}

/// Byte offsets where each physical line starts.
///
/// A newline at the very end of the markup does not open another line, so
/// `"a\nb\nc"` and `"a\nb\nc\n"` both have three lines.
pub fn line_starts(markup: &str) -> Vec<usize> {
    let mut starts = vec![0];
    starts.extend(
        markup
            .match_indices('\n')
            .map(|(i, _)| i + 1)
            .filter(|&next| next < markup.len()),
    );
    starts
}

/// Number the lines of a block and flag the ranges from `data-highlight`.
///
/// `NoHighlight` blocks pass through unchanged, even when their highlight
/// spec is malformed.
pub fn annotate(block: &CodeBlock) -> Result<AnnotatedBlock, AnnotateError> {
    if block.language.is_no_highlight() {
        return Ok(AnnotatedBlock {
            markup: block.markup.clone(),
            numbering: None,
        });
    }

    let spec = match &block.highlight {
        Some(raw) => HighlightSpec::parse(raw)?,
        None => HighlightSpec::default(),
    };

    let starts = line_starts(&block.markup);
    let line_count = starts.len();
    let flags = spec.resolve(block.start_line, line_count);

    let mut markup = String::with_capacity(block.markup.len() + line_count * LINE_MARKER_HL.len());
    for (idx, &start) in starts.iter().enumerate() {
        let end = starts.get(idx + 1).copied().unwrap_or(block.markup.len());
        markup.push_str(if flags[idx] { LINE_MARKER_HL } else { LINE_MARKER });
        markup.push_str(&block.markup[start..end]);
    }

    let highlighted = flags
        .iter()
        .enumerate()
        .filter_map(|(idx, &on)| on.then_some(idx))
        .collect();

    Ok(AnnotatedBlock {
        markup,
        numbering: Some(LineNumbering {
            line_count,
            start_counter: i64::from(block.start_line) - 1,
            highlighted,
        }),
    })
}
