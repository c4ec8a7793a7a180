use crate::alignment::Alignment;
use crate::error::{MsaError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads sequences from an aligned FASTA file and converts them into a Polars DataFrame.
///
/// # Arguments
/// * `filename` - Path to the FASTA file to read
///
/// # Returns
/// * `Result<DataFrame>` - A DataFrame with two columns:
///   - "label": The sequence identifiers (without '>' prefix)
///   - "sequence": The corresponding aligned sequences in uppercase, gaps kept as '-'
///
/// # Errors
/// * Returns `MsaError::InvalidFileFormat` if no sequences are found, or if
///   sequence data appears before the first header line
/// * Returns `MsaError::DataError` if DataFrame creation fails
/// * Returns `MsaError::Io` for file reading issues
pub fn read_fasta(filename: impl AsRef<Path>) -> Result<DataFrame> {
    let mut sequences: Vec<(String, String)> = Vec::new();
    let file = File::open(filename)?;
    let reader = BufReader::new(file);

    let mut current_header: Option<String> = None;
    let mut current_sequence = String::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if let Some(header) = line.strip_prefix('>') {
            if let Some(previous) = current_header.take() {
                sequences.push((previous, current_sequence.to_uppercase()));
                current_sequence.clear();
            }
            current_header = Some(header.trim().to_string());
        } else if !line.is_empty() {
            if current_header.is_none() {
                return Err(MsaError::InvalidFileFormat(format!(
                    "sequence data before first header at line {}",
                    line_no + 1
                )));
            }
            current_sequence.push_str(line);
        }
    }

    if let Some(header) = current_header {
        sequences.push((header, current_sequence.to_uppercase()));
    }

    if sequences.is_empty() {
        return Err(MsaError::InvalidFileFormat("No sequences found".into()));
    }

    let (labels, sequences): (Vec<String>, Vec<String>) = sequences.into_iter().unzip();
    let df = DataFrame::new(vec![
        Column::new("label".into(), labels),
        Column::new("sequence".into(), sequences),
    ])
    .map_err(|_| MsaError::DataError("Failed to create DataFrame".into()))?;

    Ok(df)
}

/// Reads an aligned FASTA file straight into a validated [`Alignment`].
///
/// # Errors
/// * Everything [`read_fasta`] reports
/// * `MsaError::InvalidSequence` if the records do not share one aligned width
/// * `MsaError::InvalidInput` if two records share an identifier
pub fn read_alignment(filename: impl AsRef<Path>) -> Result<Alignment> {
    let df = read_fasta(filename)?;
    Alignment::from_frame(&df)
}
