use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;

use crate::convert;
use crate::filter::FilterOptions;
use crate::notebook::Notebook;
use crate::outdir::find_output_dir;
use crate::sheet::{make_answer_sheet, make_question_sheet};
use crate::tags::TagMode;

/// Build question and answer sheets from an annotated tutorial notebook.
#[derive(Parser)]
#[command(version, about)]
pub struct App {
    /// Path to the tutorial notebook.
    pub input: PathBuf,
}

impl App {
    pub fn exec(&self) -> Result<(), anyhow::Error> {
        let input = &self.input;
        let opts = FilterOptions::default();

        let nb = Notebook::read(input)?;
        if convert::needs_conversion(&nb) {
            convert::convert_file(input)?;
        }
        // after conversion (or for documents already authored that way) the
        // build reads inline markers
        let mode = TagMode::Inline;

        let base = match input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let qdir = find_output_dir(base, "questions-")?;
        let adir = find_output_dir(base, "answers-")?;

        let name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("input path {} has no file name", input.display()))?;
        let stem = Path::new(&name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());
        let ext = Path::new(&name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        make_question_sheet(
            input,
            &qdir.join(format!("{stem}-questions{ext}")),
            mode,
            opts,
        )?;
        make_answer_sheet(
            input,
            &adir.join(format!("{stem}-answers{ext}")),
            mode,
            opts,
        )?;
        Ok(())
    }
}
