use clap::{Parser, Subcommand};
use gdblocks::fence::FenceInfo;
use gdblocks::types::{DateMode, LanguageTag};
use gdblocks::{block, config, dates, output, reference, scan};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gdblocks")]
#[command(about = "Code block rendering for GDScript documentation sites")]
#[command(long_about = "\
Code block rendering for GDScript documentation sites

Fenced blocks in Markdown are highlighted, line-numbered and captioned:

  ```gdscript:player.gd {data-start=10 data-highlight=\"10-11 15\"}
  func _ready():
      pass
  ```

  gdscript            language (gdscript/gd, gdshader; empty or 'none' = plain)
  :player.gd          filename caption shown above the code
  data-start=10       number of the first line
  data-highlight=...  lines to emphasise: single numbers and A-B ranges

Class references like 'method Node._ready' render as links into the
engine's class reference. Page dates come from git history, falling back
to filesystem birth time, then the current time.

Run 'gdblocks gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory (also where config.toml is read from)
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one source file as a highlighted, numbered code block
    Highlight {
        file: PathBuf,
        /// Language tag (default: from the file extension)
        #[arg(long)]
        lang: Option<String>,
        /// Number of the first line
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        start: Option<u32>,
        /// Lines to highlight, e.g. "3 5-7"
        #[arg(long)]
        lines: Option<String>,
        /// Filename caption
        #[arg(long)]
        filename: Option<String>,
    },
    /// Render a class reference link, e.g. "method Node._ready"
    Link { reference: String },
    /// Resolve a file's creation or modification date
    Date {
        file: PathBuf,
        #[arg(long, value_enum, default_value = "created")]
        mode: DateMode,
    },
    /// Scan the content directory and list every page and block
    Scan {
        /// Print the manifest as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate every code block; exits non-zero if any block fails
    Check,
    /// Render every code block of one Markdown file
    Render { file: PathBuf },
    /// Print the generated code block stylesheet
    Css,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Highlight {
            file,
            lang,
            start,
            lines,
            filename,
        } => {
            let site_config = config::load_config(&cli.source)?;
            let code = std::fs::read_to_string(&file)?;
            let language = match lang {
                Some(tag) => LanguageTag::parse(&tag),
                None => language_for(&file, &site_config.highlight.default_language),
            };
            let info = FenceInfo {
                language,
                filename,
                start_line: start,
                highlight: lines,
            };
            let rendered = block::render_block(&code, &info, site_config.highlight.line_numbers)?;
            println!("{}", rendered.html);
        }
        Command::Link { reference: token } => {
            let site_config = config::load_config(&cli.source)?;
            let link = reference::render_reference(&token, &site_config.links)?;
            println!("{}", link.into_string());
        }
        Command::Date { file, mode } => {
            let site_config = config::load_config(&cli.source)?;
            let resolved = if site_config.dates.use_git {
                dates::resolve_date(&file, mode, &dates::GitHistory)
            } else {
                dates::resolve_date(&file, mode, &dates::NoHistory)
            };
            output::print_date_output(&file, mode, &resolved);
        }
        Command::Scan { json } => {
            let manifest = load_and_scan(&cli.source, !json)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&manifest)?);
            } else {
                output::print_scan_output(&manifest, &cli.source);
            }
        }
        Command::Check => {
            let manifest = load_and_scan(&cli.source, true)?;
            output::print_check_output(&manifest);
            if manifest.error_count() > 0 {
                std::process::exit(1);
            }
            println!("==> Content is valid");
        }
        Command::Render { file } => {
            let site_config = config::load_config(&cli.source)?;
            let markdown = std::fs::read_to_string(&file)?;
            let results = scan::render_markdown(&markdown, &site_config.highlight);
            output::print_render_output(&results);
        }
        Command::Css => {
            let site_config = config::load_config(&cli.source)?;
            print!("{}", config::generate_stylesheet(&site_config.colors));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load config, size the thread pool from it, and scan.
fn load_and_scan(source: &Path, progress: bool) -> Result<scan::Manifest, Box<dyn std::error::Error>> {
    let site_config = config::load_config(source)?;
    init_thread_pool(&site_config.processing);
    if progress {
        println!("==> Scanning {}", source.display());
    }
    Ok(scan::scan_with_config(source, site_config)?)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Guess a language from a source file's extension.
fn language_for(file: &Path, default_language: &str) -> LanguageTag {
    let ext = file
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "gd" => LanguageTag::parse("gdscript"),
        "gdshader" | "gdshaderinc" => LanguageTag::parse("gdshader"),
        _ => LanguageTag::parse(default_language),
    }
}
