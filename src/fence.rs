//! Fenced code block extraction.
//!
//! Markdown sources are parsed with pulldown-cmark and every fenced block is
//! pulled out with its info string and the 1-based line it starts on. The
//! info string carries everything the renderer needs:
//!
//! ```text
//! ```gdscript:player.gd {data-start=10 data-highlight="10-11 15"}
//!    ^^^^^^^^ ^^^^^^^^^  ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^
//!    language filename   attributes
//! ```
//!
//! - **language**: first word, up to an optional `:`. Empty or `none` means
//!   no highlighting.
//! - **filename**: after the `:`. Rendered as a caption above the code.
//! - **attributes**: a trailing `{...}` group of `key=value`, `key="value"`,
//!   `.class` and `#id` items. Only `data-start` and `data-highlight` are
//!   used; everything else is ignored.
//!
//! `data-highlight` is kept verbatim here. It is validated when the block is
//! annotated, so a bad range only fails that block.

use crate::types::LanguageTag;
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenceError {
    #[error("data-start must be a positive integer, got '{0}'")]
    InvalidStart(String),
    #[error("Unterminated quote in fence attributes: {0}")]
    UnterminatedQuote(String),
}

/// A fenced code block as found in the Markdown source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFence {
    /// 1-based line of the opening fence.
    pub line: usize,
    /// Raw info string (everything after the backticks).
    pub info: String,
    /// Block content, including its final newline.
    pub code: String,
}

/// Extract all fenced code blocks from a Markdown document, in order.
pub fn extract_fences(markdown: &str) -> Vec<CodeFence> {
    let mut fences = Vec::new();
    let mut current: Option<CodeFence> = None;

    for (event, range) in Parser::new(markdown).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                current = Some(CodeFence {
                    line: markdown[..range.start].matches('\n').count() + 1,
                    info: info.to_string(),
                    code: String::new(),
                });
            }
            Event::Text(text) => {
                if let Some(fence) = current.as_mut() {
                    fence.code.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(fence) = current.take() {
                    fences.push(fence);
                }
            }
            _ => {}
        }
    }

    fences
}

/// Parsed fence info string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceInfo {
    pub language: LanguageTag,
    pub filename: Option<String>,
    pub start_line: Option<u32>,
    /// Raw `data-highlight` value.
    pub highlight: Option<String>,
}

impl FenceInfo {
    /// Parse an info string. `default_language` applies when the fence names
    /// no language at all (but not when it says `none`).
    pub fn parse(info: &str, default_language: &str) -> Result<Self, FenceError> {
        let info = info.trim();
        let (head, attrs) = match info.find('{') {
            Some(pos) if info.ends_with('}') => (&info[..pos], &info[pos + 1..info.len() - 1]),
            _ => (info, ""),
        };

        let word = head.split_whitespace().next().unwrap_or("");
        let (lang, filename) = match word.split_once(':') {
            Some((lang, name)) => (lang, Some(name).filter(|n| !n.is_empty())),
            None => (word, None),
        };
        let language = if lang.is_empty() {
            LanguageTag::parse(default_language)
        } else {
            LanguageTag::parse(lang)
        };

        let mut start_line = None;
        let mut highlight = None;
        for (key, value) in parse_attributes(attrs)? {
            match key.as_str() {
                "data-start" => start_line = Some(parse_start(&value)?),
                "data-highlight" => highlight = Some(value),
                _ => {}
            }
        }

        Ok(Self {
            language,
            filename: filename.map(String::from),
            start_line,
            highlight,
        })
    }
}

fn parse_start(value: &str) -> Result<u32, FenceError> {
    value
        .parse::<u32>()
        .ok()
        .filter(|&n| n >= 1 && value.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| FenceError::InvalidStart(value.to_string()))
}

/// Split `key=value key="quoted value" .class #id flag` into pairs.
///
/// `.class` and `#id` come back as `("class", ..)` and `("id", ..)`; bare
/// flags get an empty value.
fn parse_attributes(attrs: &str) -> Result<Vec<(String, String)>, FenceError> {
    let mut pairs = Vec::new();
    let mut rest = attrs.trim_start();

    while !rest.is_empty() {
        let key_end = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        let key = &rest[..key_end];
        rest = &rest[key_end..];

        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            if let Some(quoted) = after_eq.strip_prefix('"') {
                let close = quoted
                    .find('"')
                    .ok_or_else(|| FenceError::UnterminatedQuote(attrs.to_string()))?;
                rest = &quoted[close + 1..];
                quoted[..close].to_string()
            } else {
                let end = after_eq
                    .find(char::is_whitespace)
                    .unwrap_or(after_eq.len());
                rest = &after_eq[end..];
                after_eq[..end].to_string()
            }
        } else {
            String::new()
        };

        if let Some(class) = key.strip_prefix('.') {
            pairs.push(("class".to_string(), class.to_string()));
        } else if let Some(id) = key.strip_prefix('#') {
            pairs.push(("id".to_string(), id.to_string()));
        } else if !key.is_empty() {
            pairs.push((key.to_string(), value));
        }
        rest = rest.trim_start();
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // extract_fences
    // =========================================================================

    #[test]
    fn extracts_fences_in_order_with_lines() {
        let md = "# Title\n\n```gdscript\nextends Node\n```\n\nText.\n\n~~~gdshader\nshader_type spatial;\n~~~\n";
        let fences = extract_fences(md);
        assert_eq!(fences.len(), 2);
        assert_eq!(fences[0].line, 3);
        assert_eq!(fences[0].info, "gdscript");
        assert_eq!(fences[0].code, "extends Node\n");
        assert_eq!(fences[1].line, 9);
        assert_eq!(fences[1].info, "gdshader");
    }

    #[test]
    fn indented_blocks_are_ignored() {
        let md = "Para.\n\n    indented code\n\n```\nfenced\n```\n";
        let fences = extract_fences(md);
        assert_eq!(fences.len(), 1);
        assert_eq!(fences[0].code, "fenced\n");
    }

    #[test]
    fn fence_inside_list_item() {
        let md = "- item\n\n  ```gd\n  pass\n  ```\n";
        let fences = extract_fences(md);
        assert_eq!(fences.len(), 1);
        assert_eq!(fences[0].code, "pass\n");
    }

    #[test]
    fn no_fences() {
        assert!(extract_fences("just *text*").is_empty());
    }

    // =========================================================================
    // FenceInfo::parse
    // =========================================================================

    #[test]
    fn bare_language() {
        let info = FenceInfo::parse("gdscript", "").unwrap();
        assert_eq!(info.language, LanguageTag::parse("gdscript"));
        assert_eq!(info.filename, None);
        assert_eq!(info.start_line, None);
        assert_eq!(info.highlight, None);
    }

    #[test]
    fn named_fence() {
        let info = FenceInfo::parse("gdscript:player.gd", "").unwrap();
        assert_eq!(info.language, LanguageTag::parse("gdscript"));
        assert_eq!(info.filename.as_deref(), Some("player.gd"));
    }

    #[test]
    fn empty_filename_is_none() {
        let info = FenceInfo::parse("gdscript:", "").unwrap();
        assert_eq!(info.filename, None);
    }

    #[test]
    fn attributes_are_parsed() {
        let info = FenceInfo::parse(
            r#"gdscript:main.gd {data-start=10 data-highlight="10-11 15" .wide #intro}"#,
            "",
        )
        .unwrap();
        assert_eq!(info.filename.as_deref(), Some("main.gd"));
        assert_eq!(info.start_line, Some(10));
        assert_eq!(info.highlight.as_deref(), Some("10-11 15"));
    }

    #[test]
    fn unquoted_highlight_value() {
        let info = FenceInfo::parse("gd {data-highlight=3-5}", "").unwrap();
        assert_eq!(info.highlight.as_deref(), Some("3-5"));
    }

    #[test]
    fn empty_info_uses_default_language() {
        assert_eq!(
            FenceInfo::parse("", "").unwrap().language,
            LanguageTag::NoHighlight
        );
        assert_eq!(
            FenceInfo::parse("", "gdscript").unwrap().language,
            LanguageTag::parse("gdscript")
        );
    }

    #[test]
    fn explicit_none_ignores_default_language() {
        let info = FenceInfo::parse("none", "gdscript").unwrap();
        assert_eq!(info.language, LanguageTag::NoHighlight);
    }

    #[test]
    fn attributes_without_language() {
        let info = FenceInfo::parse("{data-start=3}", "").unwrap();
        assert_eq!(info.language, LanguageTag::NoHighlight);
        assert_eq!(info.start_line, Some(3));
    }

    #[test]
    fn invalid_start_is_error() {
        for bad in ["0", "abc", "-2", "+4", ""] {
            let info = format!("gd {{data-start={bad}}}");
            assert_eq!(
                FenceInfo::parse(&info, ""),
                Err(FenceError::InvalidStart(bad.to_string())),
                "{info}"
            );
        }
    }

    #[test]
    fn unterminated_quote_is_error() {
        let result = FenceInfo::parse(r#"gd {data-highlight="1-2}"#, "");
        assert!(matches!(result, Err(FenceError::UnterminatedQuote(_))));
    }

    #[test]
    fn malformed_highlight_is_kept_for_the_annotator() {
        let info = FenceInfo::parse(r#"gd {data-highlight="x"}"#, "").unwrap();
        assert_eq!(info.highlight.as_deref(), Some("x"));
    }

    #[test]
    fn unclosed_brace_is_not_attributes() {
        let info = FenceInfo::parse("gd {data-start=3", "").unwrap();
        assert_eq!(info.language, LanguageTag::parse("gd"));
        assert_eq!(info.start_line, None);
    }
}
