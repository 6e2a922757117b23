//! Content scanning and manifest generation.
//!
//! Walks a content directory for Markdown pages, renders every fenced code
//! block the way the site would, and records what happened to each one:
//!
//! ```text
//! content/
//! ├── config.toml                  # Site configuration (optional)
//! ├── 010-getting-started.md       # Page
//! ├── guides/
//! │   └── player.md                # Nested page, slug "guides/player"
//! └── .drafts/                     # Hidden directories are skipped
//! ```
//!
//! ## Per-block containment
//!
//! A block with a bad `data-start` or `data-highlight` is recorded with its
//! error and the scan moves on. Only I/O, walk and config failures abort.
//!
//! ## Dates
//!
//! Each page gets `created` and `modified` timestamps from [`crate::dates`],
//! with the tier that produced them. `[dates] use_git = false` skips git.
//!
//! Pages are processed in parallel on the global rayon pool.

use crate::block::{self, RenderedBlock};
use crate::config::{self, HighlightConfig, SiteConfig};
use crate::dates::{self, DateSource, GitHistory, History, NoHistory};
use crate::fence::{self, CodeFence, FenceError, FenceInfo};
use crate::lines::AnnotateError;
use crate::types::DateMode;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Why one code block could not be rendered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    #[error(transparent)]
    Fence(#[from] FenceError),
    #[error(transparent)]
    Annotate(#[from] AnnotateError),
}

/// Manifest output from the scan stage
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub pages: Vec<Page>,
    pub config: SiteConfig,
}

impl Manifest {
    pub fn block_count(&self) -> usize {
        self.pages.iter().map(|p| p.blocks.len()).sum()
    }

    /// Every failed block with the page it belongs to.
    pub fn errors(&self) -> impl Iterator<Item = (&Page, &BlockReport)> {
        self.pages.iter().flat_map(|page| {
            page.blocks
                .iter()
                .filter(|b| b.error.is_some())
                .map(move |b| (page, b))
        })
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }
}

/// A Markdown page and its code blocks.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Text of the first `# heading`, or the file stem.
    pub title: String,
    /// Path relative to the content root, without extension, `/`-separated.
    pub slug: String,
    /// Path relative to the content root.
    pub source_path: String,
    pub created: PageDate,
    pub modified: PageDate,
    pub blocks: Vec<BlockReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageDate {
    /// Unix seconds.
    pub timestamp: u64,
    pub source: DateSource,
}

/// Outcome of rendering one fenced block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockReport {
    /// 1-based line of the opening fence.
    pub line: usize,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// `None` when the block was not numbered (no highlighting, or failed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_count: Option<usize>,
    /// Displayed numbers of the highlighted lines.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub highlighted: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BlockReport {
    fn new(fence: &CodeFence, info: Option<&FenceInfo>, outcome: &Result<RenderedBlock, BlockError>) -> Self {
        let language = info
            .map(|i| i.language.as_str().to_string())
            .unwrap_or_else(|| fence.info.split_whitespace().next().unwrap_or("").to_string());
        let filename = info.and_then(|i| i.filename.clone());

        match outcome {
            Ok(rendered) => {
                let numbering = rendered.numbering.as_ref();
                Self {
                    line: fence.line,
                    language,
                    filename,
                    line_count: numbering.map(|n| n.line_count),
                    highlighted: numbering
                        .map(|n| {
                            n.highlighted
                                .iter()
                                .map(|&i| n.start_counter + 1 + i as i64)
                                .collect()
                        })
                        .unwrap_or_default(),
                    error: None,
                }
            }
            Err(e) => Self {
                line: fence.line,
                language,
                filename,
                line_count: None,
                highlighted: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }
}

/// Render a single fence under the given highlight settings.
pub fn render_fence(
    fence: &CodeFence,
    settings: &HighlightConfig,
) -> (Option<FenceInfo>, Result<RenderedBlock, BlockError>) {
    match FenceInfo::parse(&fence.info, &settings.default_language) {
        Ok(info) => {
            let rendered = block::render_block(&fence.code, &info, settings.line_numbers)
                .map_err(BlockError::from);
            (Some(info), rendered)
        }
        Err(e) => (None, Err(e.into())),
    }
}

/// Render every fenced block of a Markdown document, in order.
pub fn render_markdown(
    markdown: &str,
    settings: &HighlightConfig,
) -> Vec<(CodeFence, Result<RenderedBlock, BlockError>)> {
    fence::extract_fences(markdown)
        .into_iter()
        .map(|fence| {
            let (_, rendered) = render_fence(&fence, settings);
            (fence, rendered)
        })
        .collect()
}

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    let config = config::load_config(root)?;
    scan_with_config(root, config)
}

/// Scan with an already loaded config.
pub fn scan_with_config(root: &Path, config: SiteConfig) -> Result<Manifest, ScanError> {
    let files = collect_markdown(root)?;
    let history: &dyn History = if config.dates.use_git {
        &GitHistory
    } else {
        &NoHistory
    };

    let pages = files
        .par_iter()
        .map(|path| parse_page(root, path, &config.highlight, history))
        .collect::<Result<Vec<_>, ScanError>>()?;

    Ok(Manifest { pages, config })
}

/// All `.md` files under `root`, sorted, skipping hidden entries.
fn collect_markdown(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
    for entry in walker {
        let entry = entry?;
        let is_md = entry
            .path()
            .extension()
            .map(|e| e.eq_ignore_ascii_case("md"))
            .unwrap_or(false);
        if entry.file_type().is_file() && is_md {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn parse_page(
    root: &Path,
    path: &Path,
    settings: &HighlightConfig,
    history: &dyn History,
) -> Result<Page, ScanError> {
    let content = fs::read_to_string(path)?;
    let rel = path.strip_prefix(root).unwrap_or(path);
    let source_path = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let slug = source_path
        .strip_suffix(".md")
        .or_else(|| source_path.strip_suffix(".MD"))
        .unwrap_or(source_path.as_str())
        .to_string();

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let title = content
        .lines()
        .find(|line| line.starts_with("# "))
        .map(|line| line.trim_start_matches("# ").trim().to_string())
        .unwrap_or(stem);

    let blocks = fence::extract_fences(&content)
        .iter()
        .map(|fence| {
            let (info, outcome) = render_fence(fence, settings);
            BlockReport::new(fence, info.as_ref(), &outcome)
        })
        .collect();

    Ok(Page {
        title,
        slug,
        source_path,
        created: page_date(path, DateMode::Created, history),
        modified: page_date(path, DateMode::Modified, history),
        blocks,
    })
}

fn page_date(path: &Path, mode: DateMode, history: &dyn History) -> PageDate {
    let resolved = dates::resolve_date(path, mode, history);
    PageDate {
        timestamp: resolved.unix_seconds(),
        source: resolved.source,
    }
}
