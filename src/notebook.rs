//! Notebook document model: a thin serde layer over nbformat v4 JSON.
//!
//! Cells the pipeline does not touch round-trip unchanged at the JSON value
//! level, including any keys this tool knows nothing about.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellKind {
    Narrative,
    Executable,
}

/// One cell of the notebook, kept as its raw JSON object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cell {
    fields: Map<String, Value>,
}

impl Cell {
    fn cell_type(&self) -> &str {
        self.fields
            .get("cell_type")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Code cells are executable; markdown and raw cells are narrative.
    pub fn kind(&self) -> CellKind {
        if self.cell_type() == "code" {
            CellKind::Executable
        } else {
            CellKind::Narrative
        }
    }

    /// The cell source as a single string. nbformat stores either a string or
    /// a list of line strings; the list form is joined.
    pub fn source(&self) -> String {
        match self.fields.get("source") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Array(lines)) => lines.iter().filter_map(Value::as_str).collect(),
            _ => String::new(),
        }
    }

    pub fn set_source(&mut self, source: impl Into<String>) {
        self.fields
            .insert("source".to_string(), Value::String(source.into()));
    }

    fn metadata(&self) -> Option<&Map<String, Value>> {
        self.fields.get("metadata").and_then(Value::as_object)
    }

    fn metadata_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.fields.get_mut("metadata").and_then(Value::as_object_mut)
    }

    /// The raw word list under `metadata.tags`, or None when the key is
    /// absent. An empty list is Some: the cell counts as tagged.
    pub fn metadata_tags(&self) -> Option<Vec<String>> {
        let tags = self.metadata()?.get("tags")?.as_array()?;
        Some(
            tags.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn set_metadata_tags(&mut self, tags: Vec<String>) {
        let tags = Value::Array(tags.into_iter().map(Value::String).collect());
        match self.metadata_mut() {
            Some(metadata) => {
                metadata.insert("tags".to_string(), tags);
            }
            None => {
                let mut metadata = Map::new();
                metadata.insert("tags".to_string(), tags);
                self.fields
                    .insert("metadata".to_string(), Value::Object(metadata));
            }
        }
    }

    pub fn remove_metadata_tags(&mut self) {
        if let Some(metadata) = self.metadata_mut() {
            metadata.remove("tags");
        }
    }

    pub fn clear_outputs(&mut self) {
        self.fields
            .insert("outputs".to_string(), Value::Array(vec![]));
    }

    pub fn reset_execution_count(&mut self) {
        self.fields
            .insert("execution_count".to_string(), Value::Null);
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        let cell_type = match self.fields.get("cell_type").and_then(Value::as_str) {
            Some(t) => t,
            None => bail!("cell has no cell_type"),
        };
        if !matches!(cell_type, "markdown" | "code" | "raw") {
            bail!("unknown cell_type {cell_type:?}");
        }
        match self.fields.get("source") {
            Some(Value::String(_)) => {}
            Some(Value::Array(lines)) if lines.iter().all(Value::is_string) => {}
            Some(_) => bail!("cell source is neither a string nor a list of strings"),
            None => bail!("cell has no source"),
        }
        if !self.fields.get("metadata").is_some_and(Value::is_object) {
            bail!("cell metadata is missing or not an object");
        }
        if cell_type == "code" {
            if !self.fields.get("outputs").is_some_and(Value::is_array) {
                bail!("code cell has no outputs list");
            }
            match self.fields.get("execution_count") {
                Some(Value::Null) => {}
                Some(Value::Number(n)) if n.is_u64() => {}
                Some(_) => bail!("code cell execution_count is neither null nor a count"),
                None => bail!("code cell has no execution_count"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
impl Cell {
    pub fn outputs(&self) -> Option<&Value> {
        self.fields.get("outputs")
    }

    pub fn execution_count(&self) -> Option<&Value> {
        self.fields.get("execution_count")
    }
}

/// A parsed notebook: the cell list plus every other top-level key verbatim.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl Notebook {
    pub fn parse(text: &str) -> Result<Self, anyhow::Error> {
        let nb: Notebook =
            serde_json::from_str(text).context("input is not a notebook JSON document")?;
        nb.validate()?;
        Ok(nb)
    }

    /// Read and structurally validate a notebook file.
    pub fn read(path: &Path) -> Result<Self, anyhow::Error> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("could not read notebook {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid notebook {}", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<(), anyhow::Error> {
        let mut text =
            serde_json::to_string_pretty(self).context("could not serialize notebook")?;
        text.push('\n');
        fs::write(path, text)
            .with_context(|| format!("could not write notebook {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.rest.get("nbformat").and_then(Value::as_u64) {
            Some(4) => {}
            Some(v) => bail!("unsupported nbformat version {v}"),
            None => bail!("notebook nbformat is missing or not an integer"),
        }
        if !self.rest.contains_key("nbformat_minor") {
            bail!("notebook is missing nbformat_minor");
        }
        if !self.rest.get("metadata").is_some_and(Value::is_object) {
            bail!("notebook metadata is missing or not an object");
        }
        for (i, cell) in self.cells.iter().enumerate() {
            cell.validate().with_context(|| format!("cell {i} is malformed"))?;
        }
        Ok(())
    }
}
