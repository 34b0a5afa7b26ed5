//! Discretizer artefacts: the fitted bins as CSV files.
//!
//! ```text
//! <dir>/attributes/bins.csv         attribute, edge0, edge1, …
//! <dir>/attributes/<attribute>.csv  observed value, resolved bin
//! <dir>/relationship.csv            type, load, uniqueTargetCount
//! ```
//!
//! Downstream learners read these to map `bin_<k>` tokens back to ranges.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::binning::{AttributeBins, FeatureBins, Observations, RelationshipBins};
use crate::Result;

/// Write all discretizer artefacts under `dir`. Takes the raw observations
/// by value: they are dropped once the per-attribute files are written.
pub fn export_discretizer(dir: &Path, bins: &FeatureBins, observations: Observations) -> Result<()> {
    let attributes_dir = dir.join("attributes");
    fs::create_dir_all(&attributes_dir)?;

    write_bins(fs::File::create(attributes_dir.join("bins.csv"))?, &bins.attributes)?;

    for attribute in observations.attributes() {
        if !bins.attributes.is_binned(attribute) {
            continue;
        }
        let path = attributes_dir.join(format!("{}.csv", file_stem(attribute)));
        write_attribute_values(fs::File::create(path)?, attribute, &observations, &bins.attributes)?;
    }
    drop(observations);
    tracing::info!(dir = %dir.display(), "released attribute observations");

    write_relationship_loads(fs::File::create(dir.join("relationship.csv"))?, &bins.relationships)?;
    Ok(())
}

/// `bins.csv`: one row per numerically binned attribute.
pub fn write_bins<W: Write>(writer: W, bins: &AttributeBins) -> Result<()> {
    let mut csv = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    csv.write_record(["attribute", "bins"])?;
    for (attribute, edges) in bins.numeric() {
        let mut record = Vec::with_capacity(edges.len() + 1);
        record.push(attribute.to_string());
        record.extend(edges.iter().map(f64::to_string));
        csv.write_record(&record)?;
    }
    csv.flush()?;
    Ok(())
}

/// `<attribute>.csv`: every observed distinct value with its bin.
pub fn write_attribute_values<W: Write>(
    writer: W,
    attribute: &str,
    observations: &Observations,
    bins: &AttributeBins,
) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([attribute, "bin"])?;
    for value in observations.values(attribute) {
        let bin = bins
            .get_bin(attribute, &value.to_value())
            .map(|b| b.token())
            .unwrap_or_default();
        csv.write_record([value.to_string(), bin])?;
    }
    csv.flush()?;
    Ok(())
}

/// `relationship.csv`: load and unique target count per relationship type.
pub fn write_relationship_loads<W: Write>(writer: W, relationships: &RelationshipBins) -> Result<()> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    for (rel_type, load) in relationships.loads() {
        csv.write_record([rel_type.to_string(), load.load.to_string(), load.unique_targets.to_string()])?;
    }
    csv.flush()?;
    Ok(())
}

/// Attribute name usable as a file name.
fn file_stem(attribute: &str) -> String {
    attribute
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '\0') { '_' } else { c })
        .collect()
}
