//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a `config.toml` in the content root overrides just the keys
//! it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [highlight]
//! line_numbers = true       # Number lines and honour data-highlight
//! default_language = ""     # Language for fences without one ("" = none)
//!
//! [links]
//! base_url = "https://docs.godotengine.org/en/stable/classes"
//! class = "gd-link"         # CSS class on reference links
//! new_tab = true            # target="_blank"
//!
//! [dates]
//! use_git = true            # Ask git history before filesystem times
//!
//! [colors.light]
//! background = "#fafafa"
//! text = "#1f2328"
//! line_number = "#8c959f"
//! highlighted_line = "#fff8c5"
//! comment = "#6e7781"
//! keyword = "#cf222e"
//! string = "#0a3069"
//! number = "#0550ae"
//! function = "#8250df"
//! class_name = "#953800"
//! operator = "#1f2328"
//! annotation = "#116329"
//! node = "#0550ae"
//!
//! [colors.dark]
//! # same keys, dark palette
//!
//! [processing]
//! max_processes = 4         # Max parallel page workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Code block rendering.
    pub highlight: HighlightConfig,
    /// Class reference links.
    pub links: LinksConfig,
    /// Page date resolution.
    pub dates: DatesConfig,
    /// Token and gutter colours for light and dark modes.
    pub colors: ColorConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.links.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "links.base_url must not be empty".into(),
            ));
        }
        if self.links.class.split_whitespace().count() != 1 {
            return Err(ConfigError::Validation(
                "links.class must be a single CSS class".into(),
            ));
        }
        if self
            .highlight
            .default_language
            .contains(char::is_whitespace)
        {
            return Err(ConfigError::Validation(
                "highlight.default_language must not contain whitespace".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Code block rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
    /// Number lines and flag `data-highlight` ranges.
    pub line_numbers: bool,
    /// Language assumed for fences that declare none. Empty means no highlighting.
    pub default_language: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            line_numbers: true,
            default_language: String::new(),
        }
    }
}

/// Class reference link settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinksConfig {
    /// Directory holding the `class_<name>.html` pages.
    pub base_url: String,
    /// CSS class on the generated `<a>`.
    pub class: String,
    /// Open links in a new tab.
    pub new_tab: bool,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            base_url: "https://docs.godotengine.org/en/stable/classes".to_string(),
            class: "gd-link".to_string(),
            new_tab: true,
        }
    }
}

/// Page date settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatesConfig {
    /// Consult git history before filesystem timestamps.
    pub use_git: bool,
}

impl Default for DatesConfig {
    fn default() -> Self {
        Self { use_git: true }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of pages processed in parallel.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Colour configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual colour scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Code block background.
    pub background: String,
    /// Untokenized text.
    pub text: String,
    /// Line-number gutter.
    pub line_number: String,
    /// Background of lines flagged by `data-highlight`.
    pub highlighted_line: String,
    /// Comments and doc comments.
    pub comment: String,
    /// Keywords and control flow.
    pub keyword: String,
    /// Strings, string names and node paths.
    pub string: String,
    /// Numbers and booleans.
    pub number: String,
    /// Function definitions, calls and global functions.
    pub function: String,
    /// Class names.
    pub class_name: String,
    /// Operators and punctuation.
    pub operator: String,
    /// `@annotations`.
    pub annotation: String,
    /// `$Node` and `%Unique` references.
    pub node: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fafafa".to_string(),
            text: "#1f2328".to_string(),
            line_number: "#8c959f".to_string(),
            highlighted_line: "#fff8c5".to_string(),
            comment: "#6e7781".to_string(),
            keyword: "#cf222e".to_string(),
            string: "#0a3069".to_string(),
            number: "#0550ae".to_string(),
            function: "#8250df".to_string(),
            class_name: "#953800".to_string(),
            operator: "#1f2328".to_string(),
            annotation: "#116329".to_string(),
            node: "#0550ae".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#161b22".to_string(),
            text: "#e6edf3".to_string(),
            line_number: "#6e7681".to_string(),
            highlighted_line: "#3b2e00".to_string(),
            comment: "#8b949e".to_string(),
            keyword: "#ff7b72".to_string(),
            string: "#a5d6ff".to_string(),
            number: "#79c0ff".to_string(),
            function: "#d2a8ff".to_string(),
            class_name: "#ffa657".to_string(),
            operator: "#e6edf3".to_string(),
            annotation: "#7ee787".to_string(),
            node: "#79c0ff".to_string(),
        }
    }

    /// `(css variable, value)` pairs in stylesheet order.
    fn variables(&self) -> [(&'static str, &str); 13] {
        [
            ("--code-bg", self.background.as_str()),
            ("--code-text", self.text.as_str()),
            ("--code-line-number", self.line_number.as_str()),
            ("--code-hl", self.highlighted_line.as_str()),
            ("--code-comment", self.comment.as_str()),
            ("--code-keyword", self.keyword.as_str()),
            ("--code-string", self.string.as_str()),
            ("--code-number", self.number.as_str()),
            ("--code-function", self.function.as_str()),
            ("--code-class-name", self.class_name.as_str()),
            ("--code-operator", self.operator.as_str()),
            ("--code-annotation", self.annotation.as_str()),
            ("--code-node", self.node.as_str()),
        ]
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# gdblocks Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the content root. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Code blocks
# ---------------------------------------------------------------------------
[highlight]
# Number every line and honour {data-highlight="..."} on fences.
line_numbers = true

# Language assumed for fences that don't declare one.
# "" (or "none") leaves them unhighlighted and unnumbered.
default_language = ""

# ---------------------------------------------------------------------------
# Class reference links ("method Node._ready" -> docs page)
# ---------------------------------------------------------------------------
[links]
# Directory holding class_<name>.html pages.
base_url = "https://docs.godotengine.org/en/stable/classes"

# CSS class on generated links.
class = "gd-link"

# Open links in a new tab.
new_tab = true

# ---------------------------------------------------------------------------
# Page dates
# ---------------------------------------------------------------------------
[dates]
# Ask git history first. When false, filesystem creation time is used,
# falling back to the build time.
use_git = true

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#fafafa"
text = "#1f2328"
line_number = "#8c959f"
highlighted_line = "#fff8c5"
comment = "#6e7781"
keyword = "#cf222e"
string = "#0a3069"
number = "#0550ae"
function = "#8250df"
class_name = "#953800"
operator = "#1f2328"
annotation = "#116329"
node = "#0550ae"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#161b22"
text = "#e6edf3"
line_number = "#6e7681"
highlighted_line = "#3b2e00"
comment = "#8b949e"
keyword = "#ff7b72"
string = "#a5d6ff"
number = "#79c0ff"
function = "#d2a8ff"
class_name = "#ffa657"
operator = "#e6edf3"
annotation = "#7ee787"
node = "#79c0ff"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum pages processed in parallel.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

const CSS_STATIC: &str = include_str!("../static/code.css");

/// Generate CSS custom properties from colour config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    let block = |scheme: &ColorScheme, indent: &str| {
        scheme
            .variables()
            .iter()
            .map(|(name, value)| format!("{indent}{name}: {value};"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        ":root {{\n{light}\n}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{dark}\n    }}\n}}",
        light = block(&colors.light, "    "),
        dark = block(&colors.dark, "        "),
    )
}

/// The full stylesheet: colour variables followed by the static code rules.
pub fn generate_stylesheet(colors: &ColorConfig) -> String {
    format!("{}\n\n{}", generate_color_css(colors), CSS_STATIC)
}
