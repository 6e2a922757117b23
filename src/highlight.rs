//! Grammar-driven tokenizer and HTML renderer.
//!
//! The source text is kept as a flat list of contiguous segments, each either
//! claimed by a token category or still unclaimed. Rules run in grammar order
//! and only ever split unclaimed segments, except greedy rules, which may
//! absorb the claimed segments their match runs over:
//!
//! ```text
//! "a # b"            source
//! [ "a ][# b"]       after comment:  plain, comment
//! ["a # b"]          after string (greedy): string
//! ```
//!
//! Rendering wraps each claimed segment in `<span class="token CATEGORY">`
//! and escapes everything. Newlines are emitted as-is, including inside
//! multi-line tokens, so the line annotator can split the result.

use crate::grammar::{self, Category, CompiledRule, Grammar};
use crate::types::LanguageTag;
use maud::{Markup, html};
use regex::Captures;

/// A contiguous byte range of the source, claimed by `category` or plain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
    pub category: Option<Category>,
}

impl Token {
    fn plain(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            category: None,
        }
    }

    fn is_plain(&self) -> bool {
        self.category.is_none()
    }
}

/// Split `source` into tokens. The result covers the whole source in order.
pub fn tokenize(source: &str, grammar: &Grammar) -> Vec<Token> {
    if source.is_empty() {
        return Vec::new();
    }
    let mut segments = vec![Token::plain(0, source.len())];
    for compiled in &grammar.rules {
        if compiled.rule.flags.greedy {
            apply_greedy(source, compiled, &mut segments);
        } else {
            apply(source, compiled, &mut segments);
        }
    }
    segments
}

/// Match a rule inside each unclaimed segment independently.
fn apply(source: &str, compiled: &CompiledRule, segments: &mut Vec<Token>) {
    let mut i = 0;
    while i < segments.len() {
        let seg = segments[i];
        if !seg.is_plain() {
            i += 1;
            continue;
        }
        let text = &source[seg.start..seg.end];
        let Some((start, end)) = find_token(text, compiled, 0, seg.start) else {
            i += 1;
            continue;
        };
        i += split(segments, i, i, start, end, compiled.rule.category);
    }
}

/// Match a rule against the whole source, starting at each unclaimed segment.
fn apply_greedy(source: &str, compiled: &CompiledRule, segments: &mut Vec<Token>) {
    let mut i = 0;
    while i < segments.len() {
        if !segments[i].is_plain() {
            i += 1;
            continue;
        }
        let Some((start, end)) = find_token(source, compiled, segments[i].start, 0) else {
            break;
        };
        let Some(first) = (i..segments.len()).find(|&j| segments[j].end > start) else {
            break;
        };
        if !segments[first].is_plain() {
            i = first + 1;
            continue;
        }
        let last = (first..segments.len())
            .find(|&j| segments[j].end >= end)
            .unwrap_or(segments.len() - 1);
        i = first + split(segments, first, last, start, end, compiled.rule.category);
    }
}

/// Replace `segments[first..=last]` with `[plain?, token, plain?]`.
///
/// Returns how many segments precede the remainder, so the caller can resume
/// on the unclaimed text after the new token.
fn split(
    segments: &mut Vec<Token>,
    first: usize,
    last: usize,
    start: usize,
    end: usize,
    category: Category,
) -> usize {
    let outer_start = segments[first].start;
    let outer_end = segments[last].end;
    let mut replacement = Vec::with_capacity(3);
    if outer_start < start {
        replacement.push(Token::plain(outer_start, start));
    }
    replacement.push(Token {
        start,
        end,
        category: Some(category),
    });
    if end < outer_end {
        replacement.push(Token::plain(end, outer_end));
    }
    let consumed = if outer_start < start { 2 } else { 1 };
    segments.splice(first..=last, replacement);
    consumed
}

/// Find the first non-empty token span at or after `from` in `haystack`.
/// Returned offsets are shifted by `offset`.
fn find_token(
    haystack: &str,
    compiled: &CompiledRule,
    mut from: usize,
    offset: usize,
) -> Option<(usize, usize)> {
    while from <= haystack.len() {
        let caps = compiled.regex.captures_at(haystack, from)?;
        let whole = caps.get(0)?;
        if let Some((start, end)) = token_span(compiled, &caps) {
            return Some((start + offset, end + offset));
        }
        from = if whole.end() > from {
            whole.end()
        } else {
            from + haystack[from..].chars().next()?.len_utf8()
        };
    }
    None
}

fn token_span(compiled: &CompiledRule, caps: &Captures) -> Option<(usize, usize)> {
    let whole = caps.get(0)?;
    let (start, end) = if let Some(token) = caps.name("token") {
        (token.start(), token.end())
    } else if compiled.rule.flags.lookbehind {
        let context = caps.get(1).map_or(0, |g| g.len());
        (whole.start() + context, whole.end())
    } else {
        (whole.start(), whole.end())
    };
    (start < end).then_some((start, end))
}

/// Render tokens as escaped HTML.
pub fn render_tokens(source: &str, tokens: &[Token]) -> Markup {
    html! {
        @for token in tokens {
            @let text = &source[token.start..token.end];
            @match token.category {
                Some(category) => {
                    span class={ "token " (category.css_class()) } { (text) }
                },
                None => { (text) },
            }
        }
    }
}

/// Highlight a source string for a fence language.
///
/// Languages without a grammar (and the no-highlight sentinel) are escaped
/// but not tokenized.
pub fn highlight(source: &str, language: &LanguageTag) -> String {
    match grammar::lookup(language) {
        Some(grammar) => render_tokens(source, &tokenize(source, grammar)).into_string(),
        None => html! { (source) }.into_string(),
    }
}
