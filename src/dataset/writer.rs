//! Batched CSV output for encoded datasets.
//!
//! Layout per configuration key:
//!
//! ```text
//! <output_dir>/<dataset_name>_<key>/
//!     headerX.csv              walk string ↔ walk_<id>
//!     headerY.csv              label column ↔ c<i>
//!     dataset/datasetX_<b>.csv id, token ids…
//!     dataset/datasetY_<b>.csv label row
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::model::NodeId;
use crate::Result;
use super::{EncodedDataset, LabelTable};

/// Outcome of one configuration's output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub key: String,
    pub folder: PathBuf,
    pub rows: usize,
    pub batches: usize,
    pub tokens: usize,
}

/// What pass 3 wrote and which streams were abandoned.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssemblyReport {
    pub written: Vec<DatasetSummary>,
    /// (configuration key, error message)
    pub failed: Vec<(String, String)>,
}

impl AssemblyReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes datasets under one output directory.
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    output_dir: PathBuf,
    dataset_name: String,
    batch_size: usize,
}

impl DatasetWriter {
    pub fn new(output_dir: impl Into<PathBuf>, dataset_name: impl Into<String>, batch_size: usize) -> Self {
        Self {
            output_dir: output_dir.into(),
            dataset_name: dataset_name.into(),
            batch_size: batch_size.max(1),
        }
    }

    pub fn folder(&self, key: &str) -> PathBuf {
        self.output_dir.join(format!("{}_{}", self.dataset_name, key))
    }

    /// Write every dataset. Failing to create the output directory is fatal;
    /// a failure inside one configuration abandons that stream only.
    pub fn write(
        &self,
        labels: &LabelTable,
        datasets: &BTreeMap<String, EncodedDataset>,
    ) -> Result<AssemblyReport> {
        fs::create_dir_all(&self.output_dir)?;
        let mut report = AssemblyReport::default();

        for (key, dataset) in datasets {
            match self.write_one(key, labels, dataset) {
                Ok(summary) => {
                    tracing::info!(
                        key = %key,
                        rows = summary.rows,
                        batches = summary.batches,
                        tokens = summary.tokens,
                        "dataset written"
                    );
                    report.written.push(summary);
                }
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "cannot write dataset");
                    report.failed.push((key.clone(), e.to_string()));
                }
            }
        }
        Ok(report)
    }

    fn write_one(&self, key: &str, labels: &LabelTable, dataset: &EncodedDataset) -> Result<DatasetSummary> {
        let folder = self.folder(key);
        fs::create_dir_all(&folder)?;

        let short_y = labels.short_header();
        let mut header_y = csv::Writer::from_path(folder.join("headerY.csv"))?;
        header_y.write_record(["header", "short"])?;
        for (full, short) in labels.header().iter().zip(&short_y) {
            header_y.write_record([full.as_str(), short.as_str()])?;
        }
        header_y.flush()?;

        let mut short_x = vec!["id".to_string()];
        let mut header_x = csv::Writer::from_path(folder.join("headerX.csv"))?;
        header_x.write_record(["header", "short"])?;
        header_x.write_record(["id", "id"])?;
        for (id, walk) in dataset.index.iter() {
            let short = id.short_name();
            header_x.write_record([walk, short.as_str()])?;
            short_x.push(short);
        }
        header_x.flush()?;

        let data_dir = folder.join("dataset");
        fs::create_dir_all(&data_dir)?;

        let mut batch = 0;
        let mut rows = 0;
        let mut open: Option<BatchFiles> = None;

        for (i, row) in labels.rows().iter().enumerate() {
            if i % self.batch_size == 0 {
                if let Some(files) = open.take() {
                    files.finish()?;
                }
                batch += 1;
                open = Some(BatchFiles::create(&data_dir, batch, &short_x, &short_y)?);
            }
            let Some(files) = open.as_mut() else { continue };
            let Some(id) = row.first() else { continue };
            let Some(sparse) = dataset.row(&NodeId(id.clone())) else { continue };

            let mut record = Vec::with_capacity(sparse.len() + 1);
            record.push(id.clone());
            record.extend(sparse.token_ids().into_iter().map(|t| t.to_string()));
            files.x.write_record(&record)?;
            files.y.write_record(row)?;
            rows += 1;

            if rows % 10_000 == 0 {
                tracing::info!(key = %key, rows, "rows written");
            }
        }
        if let Some(files) = open {
            files.finish()?;
        }

        Ok(DatasetSummary {
            key: key.to_string(),
            folder,
            rows,
            batches: batch,
            tokens: dataset.index.len(),
        })
    }
}

struct BatchFiles {
    x: csv::Writer<File>,
    y: csv::Writer<File>,
}

impl BatchFiles {
    fn create(dir: &Path, batch: usize, header_x: &[String], header_y: &[String]) -> Result<Self> {
        let mut x = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(dir.join(format!("datasetX_{batch}.csv")))?;
        x.write_record(header_x)?;
        let mut y = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(dir.join(format!("datasetY_{batch}.csv")))?;
        y.write_record(header_y)?;
        Ok(Self { x, y })
    }

    fn finish(mut self) -> Result<()> {
        self.x.flush()?;
        self.y.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetAssembler;
    use crate::walk::sampler::WalkSets;
    use std::collections::BTreeSet;
    use pretty_assertions::assert_eq;

    fn walk_sets(walks: &[&str]) -> WalkSets {
        let set: BTreeSet<String> = walks.iter().map(|w| w.to_string()).collect();
        [("1x1".to_string(), set)].into()
    }

    fn labels(ids: &[&str]) -> LabelTable {
        LabelTable::new(
            vec!["id".into(), "City".into()],
            ids.iter().map(|id| vec![id.to_string(), "true".into()]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_rows_skip_seeds_without_walks() {
        let dir = tempfile::tempdir().unwrap();
        let mut assembler = DatasetAssembler::new();
        assembler.encode(&"a".into(), &walk_sets(&["has_x", "has_y"]));
        assembler.encode(&"b".into(), &walk_sets(&[]));
        assembler.encode(&"c".into(), &walk_sets(&["has_x", "has_z", "has_x,capitalOf->id=G"]));

        let writer = DatasetWriter::new(dir.path(), "test", 100);
        let report = writer.write(&labels(&["a", "b", "c"]), &assembler.into_datasets()).unwrap();
        assert!(report.is_complete());
        assert_eq!(report.written[0].rows, 2);
        assert_eq!(report.written[0].batches, 1);

        let x = fs::read_to_string(dir.path().join("test_1x1/dataset/datasetX_1.csv")).unwrap();
        assert_eq!(x, "id,walk_1,walk_2,walk_3,walk_4\na,1,2\nc,1,3,4\n");

        let y = fs::read_to_string(dir.path().join("test_1x1/dataset/datasetY_1.csv")).unwrap();
        assert_eq!(y, "id,c1\na,true\nc,true\n");

        let hx = fs::read_to_string(dir.path().join("test_1x1/headerX.csv")).unwrap();
        assert_eq!(hx, "header,short\nid,id\nhas_x,walk_1\nhas_y,walk_2\n\"has_x,capitalOf->id=G\",walk_3\nhas_z,walk_4\n");

        let hy = fs::read_to_string(dir.path().join("test_1x1/headerY.csv")).unwrap();
        assert_eq!(hy, "header,short\nid,id\nCity,c1\n");
    }

    #[test]
    fn test_failed_configuration_does_not_stop_others() {
        let dir = tempfile::tempdir().unwrap();
        // a plain file where the 1x1 folder should go
        fs::write(dir.path().join("test_1x1"), "taken").unwrap();

        let set: BTreeSet<String> = ["has_x".to_string()].into();
        let sets: WalkSets = [("1x1".to_string(), set.clone()), ("1x2".to_string(), set)].into();
        let mut assembler = DatasetAssembler::new();
        assembler.encode(&"a".into(), &sets);

        let writer = DatasetWriter::new(dir.path(), "test", 100);
        let report = writer.write(&labels(&["a"]), &assembler.into_datasets()).unwrap();

        assert!(!report.is_complete());
        let written: Vec<&str> = report.written.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(written, vec!["1x2"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "1x1");

        let x = fs::read_to_string(dir.path().join("test_1x2/dataset/datasetX_1.csv")).unwrap();
        assert_eq!(x, "id,walk_1\na,1\n");
    }

    #[test]
    fn test_batches_roll_over_by_input_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut assembler = DatasetAssembler::new();
        for id in ["a", "b", "c", "d", "e"] {
            assembler.encode(&id.into(), &walk_sets(&["has_x"]));
        }

        let writer = DatasetWriter::new(dir.path(), "test", 2);
        let report = writer
            .write(&labels(&["a", "b", "c", "d", "e"]), &assembler.into_datasets())
            .unwrap();
        assert_eq!(report.written[0].batches, 3);

        let data = dir.path().join("test_1x1/dataset");
        let last = fs::read_to_string(data.join("datasetX_3.csv")).unwrap();
        assert_eq!(last, "id,walk_1\ne,1\n");
        assert!(!data.join("datasetX_4.csv").exists());
    }
}
