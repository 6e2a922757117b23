//! # gdblocks
//!
//! Code block rendering for GDScript documentation sites. Fenced blocks in
//! Markdown come out highlighted, line-numbered and captioned; class
//! references become links into the engine's class reference; pages get
//! creation and modification dates from git history.
//!
//! # Pipeline
//!
//! One fenced block goes through four steps:
//!
//! ```text
//! 1. Fence      ```gdscript:player.gd {data-start=10}  →  FenceInfo + code
//! 2. Highlight  code + grammar table                   →  <span class="token …"> markup
//! 3. Annotate   markup + start + data-highlight        →  per-line markers, counter reset
//! 4. Container  markup + caption                       →  <pre> with caption first
//! ```
//!
//! Steps 2 and 3 are independent: the annotator never looks inside the
//! highlighter's spans, it only splits on newlines. A bad `data-highlight`
//! fails that one block and nothing else.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`fence`] | Pulls fenced blocks out of Markdown and parses their info strings |
//! | [`grammar`] | Ordered token rule tables for GDScript and the shading language |
//! | [`highlight`] | Tokenizer that runs a grammar table and emits token spans |
//! | [`lines`] | Line annotator: splits markup into lines, numbers and highlights them |
//! | [`block`] | The `<pre>` container model and caption reordering |
//! | [`reference`] | `method Node._ready` style class reference links |
//! | [`dates`] | Page dates from git, then filesystem, then the clock |
//! | [`scan`] | Walks a content tree, renders every block, produces the manifest |
//! | [`config`] | `config.toml` loading, validation, merging and stylesheet generation |
//! | [`types`] | Shared value types (`LanguageTag`, `DateMode`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Grammars as Data
//!
//! A grammar is a `&'static [Rule]`: category, pattern and flags, in priority
//! order. Tables are compiled once on first use. Adding a language means
//! adding a table and an alias in [`grammar::lookup`], nothing else.
//!
//! ## Line Markers, Not Line Wrappers
//!
//! Each line gets an empty `<span class="line">` in front of it instead of a
//! wrapping element. Highlighted tokens that span lines (block strings,
//! doc comments) stay intact, and the gutter numbers come from a CSS counter
//! reset to `start - 1` on the container.
//!
//! ## Maud for Every Element
//!
//! Containers, captions and links are built with [Maud](https://maud.lambda.xyz/),
//! so all interpolated text is escaped. Highlighted markup is the only thing
//! embedded pre-escaped.

pub mod block;
pub mod config;
pub mod dates;
pub mod fence;
pub mod grammar;
pub mod highlight;
pub mod lines;
pub mod output;
pub mod reference;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
