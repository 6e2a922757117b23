//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Pages lead with their positional index and title; source paths and dates
//! follow as indented context lines. Blocks are listed under their page the
//! same way, with the fence line as the link back to the file.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Pages
//! 001 Player Movement
//!     Source: guides/player.md
//!     Created: 1700000000 (git)
//!     Modified: 1712000000 (git)
//!     001 gdscript player.gd (line 3)
//!         Lines: 4, highlighted 14
//!     002 gdscript (line 12)
//!         Error: Invalid line range '3-' in data-highlight
//!
//! Config
//!     config.toml
//!
//! Scanned 1 page, 2 blocks, 1 error
//! ```
//!
//! ## Check
//!
//! ```text
//! guides/player.md:12: Invalid line range '3-' in data-highlight
//! 1 error in 2 blocks
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::block::RenderedBlock;
use crate::dates::ResolvedDate;
use crate::fence::CodeFence;
use crate::scan::{BlockError, BlockReport, Manifest, Page, PageDate};
use crate::types::DateMode;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn page_date(label: &str, date: &PageDate) -> String {
    format!("{}: {} ({})", label, date.timestamp, date.source)
}

/// Block header: index, language, optional filename, fence line.
///
/// ```text
/// 001 gdscript player.gd (line 3)
/// 002 none (line 12)
/// ```
fn block_header(index: usize, block: &BlockReport) -> String {
    match &block.filename {
        Some(name) => format!(
            "{} {} {} (line {})",
            format_index(index),
            block.language,
            name,
            block.line
        ),
        None => format!(
            "{} {} (line {})",
            format_index(index),
            block.language,
            block.line
        ),
    }
}

/// Context line under a block header, if there is anything to say.
fn block_detail(block: &BlockReport) -> Option<String> {
    if let Some(error) = &block.error {
        return Some(format!("Error: {error}"));
    }
    let count = block.line_count?;
    if block.highlighted.is_empty() {
        Some(format!("Lines: {count}"))
    } else {
        let lines: Vec<String> = block.highlighted.iter().map(|n| n.to_string()).collect();
        Some(format!("Lines: {count}, highlighted {}", lines.join(", ")))
    }
}

/// `"3 pages, 5 blocks, 1 error"`
pub fn format_summary(manifest: &Manifest) -> String {
    format!(
        "{}, {}, {}",
        plural(manifest.pages.len(), "page"),
        plural(manifest.block_count(), "block"),
        plural(manifest.error_count(), "error")
    )
}

// ============================================================================
// Scan
// ============================================================================

/// Format the content inventory for `scan`.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !manifest.pages.is_empty() {
        lines.push("Pages".to_string());
        for (i, page) in manifest.pages.iter().enumerate() {
            lines.extend(format_page(i + 1, page));
        }
        lines.push(String::new());
    }

    lines.push("Config".to_string());
    if source_root.join("config.toml").exists() {
        lines.push(format!("{}config.toml", indent(1)));
    } else {
        lines.push(format!("{}(defaults)", indent(1)));
    }

    lines.push(String::new());
    lines.push(format!("Scanned {}", format_summary(manifest)));
    lines
}

fn format_page(index: usize, page: &Page) -> Vec<String> {
    let mut lines = vec![
        format!("{} {}", format_index(index), page.title),
        format!("{}Source: {}", indent(1), page.source_path),
        format!("{}{}", indent(1), page_date("Created", &page.created)),
        format!("{}{}", indent(1), page_date("Modified", &page.modified)),
    ];
    for (i, block) in page.blocks.iter().enumerate() {
        lines.push(format!("{}{}", indent(1), block_header(i + 1, block)));
        if let Some(detail) = block_detail(block) {
            lines.push(format!("{}{}", indent(2), detail));
        }
    }
    lines
}

pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// `path:line: message`, the way compilers report.
pub fn format_block_error(page: &Page, block: &BlockReport) -> String {
    format!(
        "{}:{}: {}",
        page.source_path,
        block.line,
        block.error.as_deref().unwrap_or("unknown error")
    )
}

/// One line per failed block, then a count.
pub fn format_check_output(manifest: &Manifest) -> Vec<String> {
    let mut lines: Vec<String> = manifest
        .errors()
        .map(|(page, block)| format_block_error(page, block))
        .collect();
    let errors = manifest.error_count();
    if errors == 0 {
        lines.push(format!(
            "All {} valid",
            plural(manifest.block_count(), "block")
        ));
    } else {
        lines.push(format!(
            "{} in {}",
            plural(errors, "error"),
            plural(manifest.block_count(), "block")
        ));
    }
    lines
}

pub fn print_check_output(manifest: &Manifest) {
    for line in format_check_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Render
// ============================================================================

/// Rendered HTML for each block; failed blocks become HTML comments so the
/// output stays pasteable.
pub fn format_render_output(results: &[(CodeFence, Result<RenderedBlock, BlockError>)]) -> Vec<String> {
    results
        .iter()
        .enumerate()
        .map(|(i, (fence, result))| match result {
            Ok(rendered) => rendered.html.clone(),
            Err(e) => format!(
                "<!-- {} line {}: {} -->",
                format_index(i + 1),
                fence.line,
                e.to_string().replace("--", "- -")
            ),
        })
        .collect()
}

pub fn print_render_output(results: &[(CodeFence, Result<RenderedBlock, BlockError>)]) {
    for line in format_render_output(results) {
        println!("{}", line);
    }
}

// ============================================================================
// Date
// ============================================================================

pub fn format_date_output(path: &Path, mode: DateMode, resolved: &ResolvedDate) -> Vec<String> {
    let label = match mode {
        DateMode::Created => "Created",
        DateMode::Modified => "Modified",
    };
    vec![
        path.display().to_string(),
        format!(
            "{}{}: {} ({})",
            indent(1),
            label,
            resolved.unix_seconds(),
            resolved.source
        ),
    ]
}

pub fn print_date_output(path: &Path, mode: DateMode, resolved: &ResolvedDate) {
    for line in format_date_output(path, mode, resolved) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::dates::DateSource;
    use std::time::{Duration, UNIX_EPOCH};

    fn date(timestamp: u64) -> PageDate {
        PageDate {
            timestamp,
            source: DateSource::Git,
        }
    }

    fn block(line: usize) -> BlockReport {
        BlockReport {
            line,
            language: "gdscript".to_string(),
            filename: None,
            line_count: Some(4),
            highlighted: Vec::new(),
            error: None,
        }
    }

    fn page(blocks: Vec<BlockReport>) -> Page {
        Page {
            title: "Player Movement".to_string(),
            slug: "guides/player".to_string(),
            source_path: "guides/player.md".to_string(),
            created: date(1_700_000_000),
            modified: date(1_712_000_000),
            blocks,
        }
    }

    fn manifest(pages: Vec<Page>) -> Manifest {
        Manifest {
            pages,
            config: SiteConfig::default(),
        }
    }

    fn failed(line: usize) -> BlockReport {
        BlockReport {
            line_count: None,
            error: Some("Invalid line range '3-' in data-highlight".to_string()),
            ..block(line)
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "page"), "1 page");
        assert_eq!(plural(0, "error"), "0 errors");
    }

    #[test]
    fn block_header_with_and_without_filename() {
        let mut b = block(3);
        assert_eq!(block_header(1, &b), "001 gdscript (line 3)");
        b.filename = Some("player.gd".to_string());
        assert_eq!(block_header(2, &b), "002 gdscript player.gd (line 3)");
    }

    #[test]
    fn block_detail_variants() {
        let mut b = block(3);
        assert_eq!(block_detail(&b).as_deref(), Some("Lines: 4"));
        b.highlighted = vec![14, 15];
        assert_eq!(block_detail(&b).as_deref(), Some("Lines: 4, highlighted 14, 15"));
        b.line_count = None;
        assert_eq!(block_detail(&b), None);
        assert!(block_detail(&failed(3)).unwrap().starts_with("Error: "));
    }

    // =========================================================================
    // Scan / check
    // =========================================================================

    #[test]
    fn scan_output_lists_pages_and_blocks() {
        let m = manifest(vec![page(vec![block(3), failed(12)])]);
        let lines = format_scan_output(&m, Path::new("/no/such/root"));
        assert_eq!(lines[0], "Pages");
        assert_eq!(lines[1], "001 Player Movement");
        assert_eq!(lines[2], "    Source: guides/player.md");
        assert_eq!(lines[3], "    Created: 1700000000 (git)");
        assert_eq!(lines[5], "    001 gdscript (line 3)");
        assert_eq!(lines[6], "        Lines: 4");
        assert_eq!(lines[7], "    002 gdscript (line 12)");
        assert!(lines[8].starts_with("        Error: "));
        assert!(lines.contains(&"    (defaults)".to_string()));
        assert_eq!(lines.last().unwrap(), "Scanned 1 page, 2 blocks, 1 error");
    }

    #[test]
    fn scan_output_without_pages() {
        let lines = format_scan_output(&manifest(vec![]), Path::new("/no/such/root"));
        assert_eq!(lines[0], "Config");
        assert_eq!(lines.last().unwrap(), "Scanned 0 pages, 0 blocks, 0 errors");
    }

    #[test]
    fn check_output_reports_errors() {
        let m = manifest(vec![page(vec![block(3), failed(12)])]);
        assert_eq!(
            format_check_output(&m),
            vec![
                "guides/player.md:12: Invalid line range '3-' in data-highlight".to_string(),
                "1 error in 2 blocks".to_string(),
            ]
        );
    }

    #[test]
    fn check_output_all_valid() {
        let m = manifest(vec![page(vec![block(3)])]);
        assert_eq!(format_check_output(&m), vec!["All 1 block valid".to_string()]);
    }

    // =========================================================================
    // Render / date
    // =========================================================================

    #[test]
    fn render_output_comments_out_errors() {
        let fence = CodeFence {
            line: 9,
            info: "gd".to_string(),
            code: "x\n".to_string(),
        };
        let err = BlockError::Annotate(crate::lines::AnnotateError::InvalidRangeSpec(
            "1--2".to_string(),
        ));
        let lines = format_render_output(&[(fence, Err(err))]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("<!-- 001 line 9: "));
        assert!(!lines[0][4..lines[0].len() - 3].contains("--"));
    }

    #[test]
    fn date_output() {
        let resolved = ResolvedDate {
            time: UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            source: DateSource::Filesystem,
        };
        let lines = format_date_output(Path::new("page.md"), DateMode::Modified, &resolved);
        assert_eq!(lines, vec!["page.md", "    Modified: 1700000000 (filesystem)"]);
    }
}
