//! Page creation and modification dates.
//!
//! Dates come from the first source that has one:
//!
//! 1. **Git**: commit time of the commit that added the file (`created`) or
//!    last touched it (`modified`).
//! 2. **Filesystem**: the file's birth time. Used for both modes, so a file
//!    that was never committed reports the same date either way.
//! 3. **Now**: the time of the call.
//!
//! Every failure along the way (not a repository, git missing, untracked
//! file, no birth time on this platform) just falls through to the next tier.

use crate::types::DateMode;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A source of commit timestamps.
pub trait History: Sync {
    /// Commit time for `path`, or `None` if there is no usable history.
    fn commit_time(&self, path: &Path, mode: DateMode) -> Option<SystemTime>;
}

/// Reads commit times by running `git log` next to the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHistory;

impl History for GitHistory {
    fn commit_time(&self, path: &Path, mode: DateMode) -> Option<SystemTime> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file = path.file_name()?;

        let mut cmd = Command::new("git");
        cmd.arg("log");
        if mode == DateMode::Created {
            cmd.args(["--diff-filter=A", "--follow"]);
        }
        let output = cmd
            .args(["--format=%at", "-1", "--"])
            .arg(file)
            .current_dir(dir)
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }

        let seconds: u64 = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()?
            .trim()
            .parse()
            .ok()?;
        Some(UNIX_EPOCH + Duration::from_secs(seconds))
    }
}

/// History that never has anything. Used when `[dates] use_git = false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl History for NoHistory {
    fn commit_time(&self, _path: &Path, _mode: DateMode) -> Option<SystemTime> {
        None
    }
}

/// Which tier produced a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateSource {
    Git,
    Filesystem,
    Now,
}

impl std::fmt::Display for DateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DateSource::Git => "git",
            DateSource::Filesystem => "filesystem",
            DateSource::Now => "now",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDate {
    pub time: SystemTime,
    pub source: DateSource,
}

impl ResolvedDate {
    /// Seconds since the Unix epoch; pre-epoch times clamp to 0.
    pub fn unix_seconds(&self) -> u64 {
        self.time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

pub fn resolve_date(path: &Path, mode: DateMode, history: &dyn History) -> ResolvedDate {
    resolve_date_at(path, mode, history, SystemTime::now())
}

/// [`resolve_date`] with the fallback clock supplied by the caller.
pub fn resolve_date_at(
    path: &Path,
    mode: DateMode,
    history: &dyn History,
    now: SystemTime,
) -> ResolvedDate {
    if let Some(time) = history.commit_time(path, mode) {
        return ResolvedDate {
            time,
            source: DateSource::Git,
        };
    }
    if let Some(time) = fs::metadata(path).and_then(|m| m.created()).ok() {
        return ResolvedDate {
            time,
            source: DateSource::Filesystem,
        };
    }
    ResolvedDate {
        time: now,
        source: DateSource::Now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// History that answers from fixed values.
    struct FixedHistory {
        created: Option<u64>,
        modified: Option<u64>,
    }

    impl History for FixedHistory {
        fn commit_time(&self, _path: &Path, mode: DateMode) -> Option<SystemTime> {
            let secs = match mode {
                DateMode::Created => self.created,
                DateMode::Modified => self.modified,
            };
            secs.map(|s| UNIX_EPOCH + Duration::from_secs(s))
        }
    }

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn git_time_wins() {
        let history = FixedHistory {
            created: Some(1_700_000_000),
            modified: Some(1_710_000_000),
        };
        let path = PathBuf::from("does/not/matter.md");

        let created = resolve_date_at(&path, DateMode::Created, &history, at(5));
        assert_eq!(created.source, DateSource::Git);
        assert_eq!(created.unix_seconds(), 1_700_000_000);

        let modified = resolve_date_at(&path, DateMode::Modified, &history, at(5));
        assert_eq!(modified.unix_seconds(), 1_710_000_000);
    }

    #[test]
    fn missing_file_without_history_is_now() {
        let path = PathBuf::from("/definitely/not/here.md");
        let resolved = resolve_date_at(&path, DateMode::Created, &NoHistory, at(42));
        assert_eq!(resolved.source, DateSource::Now);
        assert_eq!(resolved.unix_seconds(), 42);
    }

    #[test]
    fn existing_file_without_history_is_not_git() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("page.md");
        fs::write(&path, "# Page").unwrap();

        // Birth time is platform dependent: filesystem where supported, now otherwise.
        let resolved = resolve_date_at(&path, DateMode::Modified, &NoHistory, at(42));
        assert_ne!(resolved.source, DateSource::Git);
        if resolved.source == DateSource::Now {
            assert_eq!(resolved.unix_seconds(), 42);
        }
    }

    #[test]
    fn filesystem_tier_ignores_mode() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("page.md");
        fs::write(&path, "# Page").unwrap();

        let created = resolve_date_at(&path, DateMode::Created, &NoHistory, at(1));
        let modified = resolve_date_at(&path, DateMode::Modified, &NoHistory, at(1));
        assert_eq!(created, modified);
    }

    #[test]
    fn partial_history_falls_through_per_mode() {
        let history = FixedHistory {
            created: Some(100),
            modified: None,
        };
        let path = PathBuf::from("/definitely/not/here.md");
        assert_eq!(
            resolve_date_at(&path, DateMode::Created, &history, at(7)).source,
            DateSource::Git
        );
        assert_eq!(
            resolve_date_at(&path, DateMode::Modified, &history, at(7)).source,
            DateSource::Now
        );
    }

    #[test]
    fn git_history_outside_repository_is_none() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("untracked.md");
        fs::write(&path, "x").unwrap();
        assert_eq!(GitHistory.commit_time(&path, DateMode::Created), None);
        assert_eq!(GitHistory.commit_time(&path, DateMode::Modified), None);
    }

    /// Runs git in `dir` with a pinned identity and commit date.
    fn git(dir: &Path, args: &[&str]) {
        let output = Command::new("git")
            .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .current_dir(dir)
            .env("GIT_AUTHOR_DATE", "@1700000000 +0000")
            .env("GIT_COMMITTER_DATE", "@1700000000 +0000")
            .output()
            .unwrap();
        assert!(output.status.success(), "git {args:?} failed");
    }

    #[test]
    fn git_history_reads_commit_time() {
        if Command::new("git").arg("--version").output().is_err() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        git(tmp.path(), &["init", "-q"]);
        let tracked = tmp.path().join("tracked.md");
        fs::write(&tracked, "# Tracked").unwrap();
        git(tmp.path(), &["add", "tracked.md"]);
        git(tmp.path(), &["commit", "-q", "-m", "init"]);

        assert_eq!(GitHistory.commit_time(&tracked, DateMode::Created), Some(at(1_700_000_000)));
        assert_eq!(GitHistory.commit_time(&tracked, DateMode::Modified), Some(at(1_700_000_000)));
        let resolved = resolve_date(&tracked, DateMode::Created, &GitHistory);
        assert_eq!(resolved.source, DateSource::Git);
        assert_eq!(resolved.unix_seconds(), 1_700_000_000);

        let untracked = tmp.path().join("untracked.md");
        fs::write(&untracked, "# Untracked").unwrap();
        assert_eq!(GitHistory.commit_time(&untracked, DateMode::Created), None);
        assert_eq!(GitHistory.commit_time(&untracked, DateMode::Modified), None);
        assert_ne!(
            resolve_date(&untracked, DateMode::Created, &GitHistory).source,
            DateSource::Git
        );
    }

    #[test]
    fn pre_epoch_clamps_to_zero() {
        let resolved = ResolvedDate {
            time: UNIX_EPOCH - Duration::from_secs(10),
            source: DateSource::Now,
        };
        assert_eq!(resolved.unix_seconds(), 0);
    }

    #[test]
    fn source_display() {
        assert_eq!(DateSource::Git.to_string(), "git");
        assert_eq!(DateSource::Filesystem.to_string(), "filesystem");
        assert_eq!(DateSource::Now.to_string(), "now");
    }
}
