//! Sample CSV read/write.
//!
//! The dataset format is deliberately tiny: a `cm, V` header line followed by
//! one `%.2f, %.2f` row per averaged observation. The writer appends and
//! flushes one row at a time so that an aborted acquisition run still leaves a
//! valid, parseable file behind (no rollback).

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::domain::Sample;
use crate::error::AppError;

/// Header line written before the first sample.
pub const SAMPLE_HEADER: &str = "cm, V";

/// Streaming writer for sample CSV files.
pub struct SampleWriter<W: Write> {
    inner: W,
}

impl<W: Write> SampleWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_header(&mut self) -> Result<(), AppError> {
        writeln!(self.inner, "{SAMPLE_HEADER}")
            .map_err(|e| AppError::new(2, format!("Failed to write CSV header: {e}")))?;
        self.flush()
    }

    /// Append one sample row in `%.2f, %.2f` format and flush it to the sink.
    pub fn append(&mut self, sample: Sample) -> Result<(), AppError> {
        writeln!(self.inner, "{:.2}, {:.2}", sample.distance_cm, sample.volts)
            .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))?;
        self.flush()
    }

    fn flush(&mut self) -> Result<(), AppError> {
        self.inner
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to flush CSV output: {e}")))
    }
}

/// Create (or overwrite) the dataset file and return a writer for it.
pub fn create_sample_file(path: &Path) -> Result<SampleWriter<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))?;
    Ok(SampleWriter::new(file))
}

/// Load samples from a dataset file.
pub fn read_samples(path: &Path) -> Result<Vec<Sample>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open '{}': {e}", path.display())))?;
    parse_samples(file)
}

/// Parse samples from any reader.
///
/// The header line is discarded; every remaining line must contain exactly two
/// numeric fields. The first malformed line fails the whole parse with its
/// line number (no partial results).
pub fn parse_samples<R: Read>(reader: R) -> Result<Vec<Sample>, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    for (i, record) in csv_reader.records().enumerate() {
        // Header occupies line 1; data starts on line 2.
        let line = i + 2;
        let record =
            record.map_err(|e| AppError::new(3, format!("Line {line}: invalid CSV row: {e}")))?;

        if record.len() != 2 {
            return Err(AppError::new(
                3,
                format!("Line {line}: expected 2 fields (cm, V), got {}.", record.len()),
            ));
        }

        let distance_cm = parse_field(&record[0], "distance", line)?;
        let volts = parse_field(&record[1], "voltage", line)?;
        samples.push(Sample { distance_cm, volts });
    }

    Ok(samples)
}

fn parse_field(raw: &str, what: &str, line: usize) -> Result<f64, AppError> {
    raw.parse::<f64>()
        .map_err(|_| AppError::new(3, format!("Line {line}: invalid {what} value '{raw}'.")))
}
