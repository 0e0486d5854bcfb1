//! One-time migration from metadata tags to inline first-line markers.
//!
//! Documents authored under the older convention keep their role tags in
//! `metadata.tags`. Converting moves every cell's tag words onto a marker
//! line at the top of the cell source, so the rest of the build only ever
//! reads inline tags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::filter::normalize_trailing_whitespace;
use crate::notebook::Notebook;
use crate::tags::{marker_prefix, Role, TagMode};

/// A document needs converting when any cell's metadata roles include
/// `answer`.
pub fn needs_conversion(nb: &Notebook) -> bool {
    nb.cells
        .iter()
        .any(|cell| TagMode::Metadata.read_tags(cell).contains(&Role::Answer))
}

/// Rewrite every metadata-tagged cell (even one with an empty tag list) to
/// carry an inline marker line instead, and drop the metadata tag list.
pub fn convert_to_inline(nb: &mut Notebook) {
    for cell in nb.cells.iter_mut() {
        let Some(words) = cell.metadata_tags() else {
            continue;
        };
        let prefix = marker_prefix(cell.kind());
        let marker = if words.is_empty() {
            prefix.to_string()
        } else {
            format!("{prefix} {}", words.join(" "))
        };
        let source = format!("{marker}\n\n{}", cell.source());
        cell.set_source(normalize_trailing_whitespace(&source));
        cell.remove_metadata_tags();
    }
}

/// Back up `path` to `<path>.bak` and replace it with the converted version.
/// Returns the backup path.
pub fn convert_file(path: &Path) -> Result<PathBuf, anyhow::Error> {
    let mut nb = Notebook::read(path)?;
    let backup = backup_path(path);
    fs::rename(path, &backup).with_context(|| {
        format!(
            "could not back up {} to {}",
            path.display(),
            backup.display()
        )
    })?;
    convert_to_inline(&mut nb);
    nb.write(path)?;
    Notebook::read(path)?;
    Ok(backup)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use tempdir::TempDir;

    use super::*;

    fn notebook(cells: Value) -> Notebook {
        serde_json::from_value(json!({
            "cells": cells,
            "metadata": {},
            "nbformat": 4,
            "nbformat_minor": 5,
        }))
        .unwrap()
    }

    fn tagged_fixture() -> Notebook {
        notebook(json!([
            {
                "cell_type": "markdown",
                "metadata": {"tags": ["answer", "omit"]},
                "source": "Worked discussion.",
            },
            {
                "cell_type": "code",
                "metadata": {"tags": ["answer", "template", "custom"]},
                "source": "x = 5 ##deval",
                "outputs": [],
                "execution_count": 1,
            },
            {
                "cell_type": "code",
                "metadata": {"tags": []},
                "source": "setup()",
                "outputs": [],
                "execution_count": 2,
            },
            {
                "cell_type": "code",
                "metadata": {},
                "source": "untagged()",
                "outputs": [],
                "execution_count": 3,
            },
        ]))
    }

    #[test]
    fn test_needs_conversion() {
        assert!(needs_conversion(&tagged_fixture()));
        let untagged = notebook(json!([{
            "cell_type": "markdown",
            "metadata": {"tags": ["omit"]},
            "source": "note",
        }]));
        assert!(!needs_conversion(&untagged));
    }

    #[test]
    fn test_marker_line_format() {
        let mut nb = tagged_fixture();
        convert_to_inline(&mut nb);
        assert_eq!(
            nb.cells[0].source(),
            "%%tags answer omit\n\nWorked discussion.",
        );
        assert_eq!(
            nb.cells[1].source(),
            "##tags answer template custom\n\nx = 5 ##deval",
        );
        // empty tag list converts to a bare marker
        assert_eq!(nb.cells[2].source(), "##tags\n\nsetup()");
        // untagged cells are left alone
        assert_eq!(nb.cells[3].source(), "untagged()");
    }

    #[test]
    fn test_conversion_drops_metadata_tags() {
        let mut nb = tagged_fixture();
        convert_to_inline(&mut nb);
        for cell in &nb.cells {
            assert_eq!(cell.metadata_tags(), None);
            assert!(!TagMode::Metadata.has_tags(cell));
        }
    }

    #[test]
    fn test_conversion_roundtrips_role_sets() {
        let nb = tagged_fixture();
        let before: Vec<_> = nb
            .cells
            .iter()
            .map(|c| TagMode::Metadata.read_tags(c))
            .collect();
        let mut converted = nb.clone();
        convert_to_inline(&mut converted);
        let after: Vec<_> = converted
            .cells
            .iter()
            .map(|c| TagMode::Inline.read_tags(c))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_convert_file_backs_up_original() {
        let tmp = TempDir::new("convert").unwrap();
        let path = tmp.path().join("tut.ipynb");
        tagged_fixture().write(&path).unwrap();
        let original = std::fs::read_to_string(&path).unwrap();

        let backup = convert_file(&path).unwrap();
        assert_eq!(backup, tmp.path().join("tut.ipynb.bak"));
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), original);

        let converted = Notebook::read(&path).unwrap();
        assert!(!needs_conversion(&converted));
        assert!(TagMode::Inline.has_tags(&converted.cells[0]));
    }
}
