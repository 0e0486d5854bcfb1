//! Build the question and answer sheets from an annotated notebook.
//!
//! The question sheet strips solutions: plain `answer` cells are emptied,
//! `template` cells keep a blanked skeleton, `omit` cells are dropped. The
//! answer sheet keeps the worked solutions and only strips authoring markup.
//! Both clear every role tag and validate their output after writing it.

use std::mem;
use std::path::Path;

use crate::filter::{filter_source_a, filter_source_q, normalize_trailing_whitespace, FilterOptions};
use crate::notebook::{CellKind, Notebook};
use crate::tags::{Role, RoleSet, TagMode};

/// Non-empty stand-in for removed content, so narrative cells stay
/// structurally present.
const BLANK: &str = " ";

// Role sets are captured before any mutation: replacing a cell's content also
// destroys an inline marker line, and the omission pass still needs the tags.
fn read_all_tags(nb: &Notebook, mode: TagMode) -> Vec<RoleSet> {
    nb.cells.iter().map(|cell| mode.read_tags(cell)).collect()
}

fn persist(nb: &Notebook, path: &Path) -> Result<(), anyhow::Error> {
    nb.write(path)?;
    // re-read to make sure we produced a well-formed notebook
    Notebook::read(path)?;
    Ok(())
}

fn build_question(nb: &mut Notebook, mode: TagMode, opts: FilterOptions) {
    let tag_sets = read_all_tags(nb, mode);

    for (cell, tags) in nb.cells.iter_mut().zip(tag_sets.iter()) {
        cell.set_source(normalize_trailing_whitespace(&cell.source()));
        if !mode.has_tags(cell) {
            continue;
        }
        let is_code = cell.kind() == CellKind::Executable;
        if tags.contains(&Role::Answer) {
            if tags.contains(&Role::Omit) {
                // emptied here, removed from the sheet in the pass below
                cell.set_source(BLANK);
            } else if tags.contains(&Role::Template) {
                cell.set_source(filter_source_q(&cell.source(), opts));
            } else if is_code {
                cell.set_source("");
            } else {
                cell.set_source(BLANK);
            }
            if is_code {
                cell.clear_outputs();
            }
        }
        if is_code {
            cell.reset_execution_count();
        }
    }

    let cells = mem::take(&mut nb.cells);
    nb.cells = cells
        .into_iter()
        .zip(tag_sets)
        .filter(|(_, tags)| !tags.contains(&Role::Omit))
        .map(|(cell, _)| cell)
        .collect();

    for cell in nb.cells.iter_mut() {
        mode.clear_tags(cell);
    }
}

fn build_answer(nb: &mut Notebook, mode: TagMode, opts: FilterOptions) {
    let tag_sets = read_all_tags(nb, mode);

    for (cell, tags) in nb.cells.iter_mut().zip(tag_sets.iter()) {
        cell.set_source(normalize_trailing_whitespace(&cell.source()));
        if tags.contains(&Role::Answer) && tags.contains(&Role::Template) {
            cell.set_source(filter_source_a(&cell.source(), opts));
        }
    }

    for cell in nb.cells.iter_mut() {
        mode.clear_tags(cell);
    }
}

/// Build the learner-facing question sheet from `infile` into `outfile`.
pub fn make_question_sheet(
    infile: &Path,
    outfile: &Path,
    mode: TagMode,
    opts: FilterOptions,
) -> Result<(), anyhow::Error> {
    let mut nb = Notebook::read(infile)?;
    build_question(&mut nb, mode, opts);
    persist(&nb, outfile)
}

/// Build the instructor-facing answer sheet from `infile` into `outfile`.
pub fn make_answer_sheet(
    infile: &Path,
    outfile: &Path,
    mode: TagMode,
    opts: FilterOptions,
) -> Result<(), anyhow::Error> {
    let mut nb = Notebook::read(infile)?;
    build_answer(&mut nb, mode, opts);
    persist(&nb, outfile)
}
