//! Locate or create the obfuscated output directories.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rand::seq::SliceRandom;

const SUFFIX_LEN: usize = 10;

// 10 distinct lowercase letters, so the directory name is hard to guess but
// still readable.
fn random_suffix() -> String {
    let mut letters: Vec<char> = ('a'..='z').collect();
    letters.shuffle(&mut rand::thread_rng());
    letters[..SUFFIX_LEN].iter().collect()
}

/// Find a directory under `base` whose name starts with `prefix`, creating
/// `<prefix><random suffix>` if none exists. The first match in name order
/// wins, so repeated runs reuse the same directory.
pub fn find_output_dir(base: &Path, prefix: &str) -> Result<PathBuf, anyhow::Error> {
    let mut found: Vec<PathBuf> = fs::read_dir(base)
        .with_context(|| format!("could not list {}", base.display()))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_name().to_string_lossy().starts_with(prefix) && entry.path().is_dir()
        })
        .map(|entry| entry.path())
        .collect();
    found.sort();
    if let Some(dir) = found.into_iter().next() {
        return Ok(dir);
    }

    let dir = base.join(format!("{prefix}{}", random_suffix()));
    fs::create_dir(&dir)
        .with_context(|| format!("could not create output directory {}", dir.display()))?;
    Ok(dir)
}
