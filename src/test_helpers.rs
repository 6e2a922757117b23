//! Shared test utilities for the gdblocks test suite.
//!
//! Builds throwaway content directories and looks things up in a scanned
//! [`Manifest`] with panics that list what *was* there.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_content(&[("guides/player.md", "```gd\npass\n```\n")]);
//! let manifest = scan(tmp.path()).unwrap();
//!
//! let page = find_page(&manifest, "guides/player");
//! assert_eq!(block_languages(page), vec!["gd"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::scan::{Manifest, Page};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

/// Write `(relative path, contents)` pairs into a fresh temp directory.
pub fn setup_content(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (rel, contents) in files {
        let path = tmp.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
    }
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Manifest lookups
// =========================================================================

/// Find a page by slug. Panics if not found.
pub fn find_page<'a>(manifest: &'a Manifest, slug: &str) -> &'a Page {
    manifest
        .pages
        .iter()
        .find(|p| p.slug == slug)
        .unwrap_or_else(|| {
            let slugs = page_slugs(manifest);
            panic!("page '{slug}' not found. Available: {slugs:?}")
        })
}

/// All page slugs in manifest order.
pub fn page_slugs(manifest: &Manifest) -> Vec<&str> {
    manifest.pages.iter().map(|p| p.slug.as_str()).collect()
}

/// Language of each block on a page, in order.
pub fn block_languages(page: &Page) -> Vec<&str> {
    page.blocks.iter().map(|b| b.language.as_str()).collect()
}
