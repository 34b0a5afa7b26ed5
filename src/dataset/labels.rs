//! The ordered input rows: seed id plus its label columns.

use std::io::Read;
use std::path::Path;

use crate::model::{NodeId, ID_ATTRIBUTE};
use crate::{Error, Result};

/// Input row list. Column 0 is the seed id; the rest are carried verbatim
/// into the label files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl LabelTable {
    /// Fails unless the first header column is `id` and every row has an id.
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if header.first().map(String::as_str) != Some(ID_ATTRIBUTE) {
            return Err(Error::InvalidInput("first column is not the id".into()));
        }
        if let Some(pos) = rows.iter().position(Vec::is_empty) {
            return Err(Error::InvalidInput(format!("row {pos} has no id")));
        }
        Ok(Self { header, rows })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let header = csv.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in csv.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Self::new(header, rows)
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Positional header: `id`, then `c1`, `c2`, …
    pub fn short_header(&self) -> Vec<String> {
        (0..self.header.len())
            .map(|i| if i == 0 { ID_ATTRIBUTE.to_string() } else { format!("c{i}") })
            .collect()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Seed ids in input order (duplicates kept).
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.rows.iter().filter_map(|r| r.first()).map(|id| NodeId(id.clone()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
