//! Timestamped run directories and alias management.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;

use super::OutputError;

/// Name of the alias pointing at the most recent run.
pub const LATEST_LINK_NAME: &str = "latest";

/// Handle to one run's output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirectory {
    id: String,
    path: PathBuf,
}

impl RunDirectory {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Creates run directories under an output root and maintains the
/// `latest` and per-voice legacy aliases.
pub struct RunDirectoryManager {
    root: PathBuf,
}

impl RunDirectoryManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a fresh run directory named from the current UTC time at
    /// one-second resolution.
    ///
    /// Runs started within the same second get a numeric suffix, so ids
    /// stay distinct and sort in creation order. The `latest` alias is
    /// updated best-effort; a failed update is logged, never fatal.
    pub fn create_run(&self) -> Result<RunDirectory, OutputError> {
        fs::create_dir_all(&self.root)?;

        let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let (id, path) = self.claim_run_id(&stamp)?;

        if let Err(e) = replace_link(&self.root.join(LATEST_LINK_NAME), &path) {
            log::warn!("could not update latest alias: {e}");
        }

        Ok(RunDirectory { id, path })
    }

    fn claim_run_id(&self, stamp: &str) -> Result<(String, PathBuf), OutputError> {
        let mut attempt = 1usize;
        loop {
            let id = if attempt == 1 {
                stamp.to_string()
            } else {
                format!("{stamp}_{attempt}")
            };
            let path = self.root.join(format!("run_{id}"));

            match fs::create_dir(&path) {
                Ok(()) => return Ok((id, path)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Create the per-voice subdirectory for a run and point the legacy
    /// top-level path at it, for consumers of the older flat layout.
    pub fn sample_dir(&self, run: &RunDirectory, name: &str) -> Result<PathBuf, OutputError> {
        let target = run.path().join(name);
        fs::create_dir_all(&target)?;

        let legacy = self.root.join(name);
        if let Err(e) = establish_legacy_alias(&legacy, &target, run.id()) {
            log::warn!("could not set legacy alias for {name}: {e}");
        }

        Ok(target)
    }

    /// Resolve the `latest` alias, if present.
    pub fn latest(&self) -> Option<PathBuf> {
        fs::read_link(self.root.join(LATEST_LINK_NAME)).ok()
    }
}

/// Observed state of a legacy alias path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyAlias {
    /// Nothing at the path.
    Missing,
    /// A link already pointing at the current target.
    Valid,
    /// A link pointing at an earlier run.
    Stale(PathBuf),
    /// A real directory occupies the path.
    Shadowed,
}

impl LegacyAlias {
    /// Inspect the path without modifying anything.
    pub fn assess(link: &Path, target: &Path) -> Self {
        let Ok(meta) = fs::symlink_metadata(link) else {
            return Self::Missing;
        };

        if !meta.file_type().is_symlink() {
            return Self::Shadowed;
        }

        match fs::read_link(link) {
            Ok(dest) if dest == target => Self::Valid,
            Ok(dest) => Self::Stale(dest),
            Err(_) => Self::Stale(PathBuf::new()),
        }
    }
}

/// Drive a legacy alias to the valid state.
///
/// Missing: create the link. Stale: replace it. Shadowed: rename the real
/// directory aside with a `_prev_<run_id>` suffix first, so nothing is
/// overwritten.
fn establish_legacy_alias(link: &Path, target: &Path, run_id: &str) -> io::Result<()> {
    match LegacyAlias::assess(link, target) {
        LegacyAlias::Valid => return Ok(()),
        LegacyAlias::Missing => {}
        LegacyAlias::Stale(_) => fs::remove_file(link)?,
        LegacyAlias::Shadowed => {
            let name = link
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("legacy");
            let parked = link.with_file_name(format!("{name}_prev_{run_id}"));
            fs::rename(link, parked)?;
        }
    }

    symlink_dir(target, link)
}

/// Point `link` at `target`, replacing an existing link.
fn replace_link(link: &Path, target: &Path) -> io::Result<()> {
    match fs::symlink_metadata(link) {
        Ok(_) => fs::remove_file(link)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    symlink_dir(target, link)
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
