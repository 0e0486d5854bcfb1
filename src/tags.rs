//! Role tags and the two tagging conventions.
//!
//! A cell's roles are stored either in its `metadata.tags` list (the older
//! authoring convention) or on a marker line at the start of its source, such
//! as `##tags answer template` for code cells.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::notebook::{Cell, CellKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    /// The cell holds a worked solution.
    Answer,
    /// The solution is partially elided via in-content markers.
    Template,
    /// The cell is dropped from the question sheet entirely.
    Omit,
    /// Reserved; stripped like the others but drives no filtering.
    Clear,
}

impl TryFrom<&str> for Role {
    type Error = ();
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "answer" => Ok(Role::Answer),
            "template" => Ok(Role::Template),
            "omit" => Ok(Role::Omit),
            "clear" => Ok(Role::Clear),
            _ => Err(()),
        }
    }
}

pub type RoleSet = BTreeSet<Role>;

static CODE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^##tags(?:[ \t]+(.*))?$").unwrap());
static TEXT_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^%%tags(?:[ \t]+(.*))?$").unwrap());

/// Marker prefix for an inline tag line, by cell kind.
pub fn marker_prefix(kind: CellKind) -> &'static str {
    match kind {
        CellKind::Executable => "##tags",
        CellKind::Narrative => "%%tags",
    }
}

fn marker_pattern(kind: CellKind) -> &'static Regex {
    match kind {
        CellKind::Executable => &CODE_MARKER,
        CellKind::Narrative => &TEXT_MARKER,
    }
}

/// The marker's tag words, if the cell's first source line is a marker line.
/// A cell with no content never carries inline tags.
fn first_line_marker(cell: &Cell) -> Option<String> {
    let source = cell.source();
    let first = source.lines().next()?;
    let captures = marker_pattern(cell.kind()).captures(first)?;
    Some(
        captures
            .get(1)
            .map_or(String::new(), |words| words.as_str().to_string()),
    )
}

// Remove the marker line, plus the blank separator line the converter writes
// after it.
fn strip_marker_line(source: &str) -> &str {
    let rest = match source.find('\n') {
        Some(i) => &source[i + 1..],
        None => "",
    };
    rest.strip_prefix('\n').unwrap_or(rest)
}

/// How a cell's role tags are stored. Call sites go through this enum rather
/// than branching on the convention themselves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TagMode {
    Metadata,
    Inline,
}

impl TagMode {
    /// Whether the cell is tagged at all. Under metadata mode an explicitly
    /// empty tag list still counts as tagged.
    pub fn has_tags(&self, cell: &Cell) -> bool {
        match self {
            TagMode::Metadata => cell.metadata_tags().is_some(),
            TagMode::Inline => first_line_marker(cell).is_some(),
        }
    }

    /// The cell's role set. Words that are not role tags are ignored.
    pub fn read_tags(&self, cell: &Cell) -> RoleSet {
        let words = match self {
            TagMode::Metadata => cell.metadata_tags().unwrap_or_default(),
            TagMode::Inline => first_line_marker(cell)
                .map(|words| words.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        };
        words
            .iter()
            .filter_map(|word| Role::try_from(word.as_str()).ok())
            .collect()
    }

    /// Strip the cell's role tags. Metadata mode keeps any non-role words in
    /// the stored list; inline mode removes the marker line from the source.
    pub fn clear_tags(&self, cell: &mut Cell) {
        match self {
            TagMode::Metadata => {
                if let Some(words) = cell.metadata_tags() {
                    let kept = words
                        .into_iter()
                        .filter(|word| Role::try_from(word.as_str()).is_err())
                        .collect();
                    cell.set_metadata_tags(kept);
                }
            }
            TagMode::Inline => {
                if first_line_marker(cell).is_some() {
                    cell.set_source(strip_marker_line(&cell.source()));
                }
            }
        }
    }
}
