use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::{ReportError, Result};
use crate::output;
use crate::pipeline;
use crate::taxonomy::CodeTaxonomy;

const OUTPUT_PREFIX: &str = "response_counts_";

/// One file that could not be processed. The batch keeps going; these are
/// collected and surfaced at the end of the run.
#[derive(Debug)]
pub struct FileFailure {
    pub file: PathBuf,
    pub error: ReportError,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Output files written, one per successfully processed input.
    pub written: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

/// Deterministic output name: `response_counts_<suffix>.csv`, where the
/// suffix is the last 8 characters of the input file stem (the date-like
/// tail of export names such as `activity_20240301.csv`).
fn output_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let start = stem
        .char_indices()
        .rev()
        .nth(7)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    format!("{}{}.csv", OUTPUT_PREFIX, &stem[start..])
}

/// Discover the batch's input files: every `.csv` directly under the
/// source directory, except summaries from a previous run when the output
/// directory is the input directory. Sorted for a stable processing order.
fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let is_own_output = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(OUTPUT_PREFIX));
        if path.is_file() && is_csv && !is_own_output {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

fn process_file(
    input: &Path,
    output_path: &Path,
    taxonomy: &CodeTaxonomy,
    as_of: NaiveDate,
) -> Result<()> {
    let rows = pipeline::summarize_file(input, taxonomy, as_of)?;
    output::write_summary(output_path, &rows, taxonomy)?;
    info!(
        input = %input.display(),
        output = %output_path.display(),
        leads = rows.len(),
        "file summarized"
    );
    Ok(())
}

/// Process every CSV in `input_dir`, writing one summary per file into
/// `output_dir`. Failures are isolated per file: a schema or I/O error on
/// one input is recorded and the batch moves on to the next.
pub fn run_batch(
    input_dir: &Path,
    output_dir: &Path,
    taxonomy: &CodeTaxonomy,
    as_of: NaiveDate,
) -> Result<BatchSummary> {
    let inputs = discover_inputs(input_dir)?;
    info!(dir = %input_dir.display(), files = inputs.len(), %as_of, "starting batch");

    let mut summary = BatchSummary::default();
    for input in inputs {
        let span = tracing::info_span!("file", file = %input.display());
        let _enter = span.enter();

        let output_path = output_dir.join(output_name(&input));
        match process_file(&input, &output_path, taxonomy, as_of) {
            Ok(()) => summary.written.push(output_path),
            Err(error) => {
                warn!(%error, "file failed; continuing with the rest of the batch");
                summary.failures.push(FileFailure {
                    file: input,
                    error,
                });
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_takes_last_eight_stem_chars() {
        assert_eq!(
            output_name(Path::new("/data/activity_20240301.csv")),
            "response_counts_20240301.csv"
        );
        assert_eq!(output_name(Path::new("short.csv")), "response_counts_short.csv");
    }

    #[test]
    fn discover_skips_non_csv_and_own_outputs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a_20240301.csv"), "x").unwrap();
        fs::write(dir.path().join("b_20240302.CSV"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("response_counts_20240301.csv"), "x").unwrap();

        let inputs = discover_inputs(dir.path()).unwrap();
        let names: Vec<String> = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_20240301.csv", "b_20240302.CSV"]);
    }
}
