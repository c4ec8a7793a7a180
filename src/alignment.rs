use crate::error::{MsaError, Result};
use crate::types::{ResidueMatrix, GAP};
use ndarray::{Array2, ArrayView1};
use polars::prelude::*;
use std::collections::HashSet;

/// A multiple sequence alignment: `N` named sequences of identical width `W`.
///
/// Residues are stored upper-case in an `N x W` byte matrix, so rows give
/// sequences and columns give alignment positions. Lower-case letters are
/// reserved for degenerate primer output.
#[derive(Debug, Clone)]
pub struct Alignment {
    names: Vec<String>,
    residues: ResidueMatrix,
    ungapped: Vec<usize>,
}

impl Alignment {
    /// Builds an alignment from index-aligned identifiers and sequences.
    ///
    /// An empty collection is accepted and yields a zero-row alignment.
    ///
    /// # Errors
    /// * `MsaError::InvalidInput` if the two collections differ in length or an
    ///   identifier is repeated
    /// * `MsaError::InvalidSequence` if a sequence width differs from the first one
    pub fn new<S: AsRef<str>>(names: Vec<String>, sequences: &[S]) -> Result<Self> {
        if names.len() != sequences.len() {
            return Err(MsaError::InvalidInput(format!(
                "{} identifiers for {} sequences",
                names.len(),
                sequences.len()
            )));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(MsaError::InvalidInput(format!(
                    "duplicate sequence identifier '{}'",
                    name
                )));
            }
        }

        let width = sequences.first().map(|s| s.as_ref().len()).unwrap_or(0);
        let mut flat = Vec::with_capacity(width * sequences.len());
        for (idx, seq) in sequences.iter().enumerate() {
            let seq = seq.as_ref();
            if seq.len() != width {
                return Err(MsaError::invalid_sequence(
                    idx,
                    format!(
                        "'{}' has aligned length {}, expected {}",
                        names[idx],
                        seq.len(),
                        width
                    ),
                ));
            }
            flat.extend(seq.bytes().map(|b| b.to_ascii_uppercase()));
        }

        let residues = Array2::from_shape_vec((sequences.len(), width), flat)
            .map_err(|e| MsaError::DataError(e.to_string()))?;
        let ungapped = residues
            .rows()
            .into_iter()
            .map(|row| row.iter().filter(|&&b| b != GAP).count())
            .collect();

        Ok(Self {
            names,
            residues,
            ungapped,
        })
    }

    /// Builds an alignment from a DataFrame with "label" and "sequence" columns,
    /// as produced by [`crate::fasta::read_fasta`].
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let labels = df
            .column("label")
            .map_err(|e| MsaError::DataError(e.to_string()))?
            .str()
            .map_err(|e| MsaError::DataError(e.to_string()))?;
        let sequences = df
            .column("sequence")
            .map_err(|e| MsaError::DataError(e.to_string()))?
            .str()
            .map_err(|e| MsaError::DataError(e.to_string()))?;

        let names = labels
            .into_iter()
            .enumerate()
            .map(|(idx, label)| {
                label
                    .map(str::to_string)
                    .ok_or_else(|| MsaError::invalid_sequence(idx, "missing label"))
            })
            .collect::<Result<Vec<_>>>()?;
        let sequences = sequences
            .into_iter()
            .enumerate()
            .map(|(idx, seq)| seq.ok_or_else(|| MsaError::invalid_sequence(idx, "missing sequence")))
            .collect::<Result<Vec<_>>>()?;

        Self::new(names, &sequences)
    }

    /// Number of sequences.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Aligned width shared by every sequence.
    pub fn width(&self) -> usize {
        self.residues.ncols()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Identifier of sequence `idx`.
    ///
    /// # Panics
    /// * Panics if `idx >= self.len()`
    pub fn name(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    /// Residues of sequence `idx`.
    ///
    /// # Panics
    /// * Panics if `idx >= self.len()`
    pub fn row(&self, idx: usize) -> ArrayView1<'_, u8> {
        self.residues.row(idx)
    }

    /// Residues of every sequence at alignment column `idx`.
    ///
    /// # Panics
    /// * Panics if `idx >= self.width()`
    pub fn column(&self, idx: usize) -> ArrayView1<'_, u8> {
        self.residues.column(idx)
    }

    /// Count of non-gap characters in sequence `idx`.
    ///
    /// # Panics
    /// * Panics if `idx >= self.len()`
    pub fn ungapped_len(&self, idx: usize) -> usize {
        self.ungapped[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("seq{}", i)).collect()
    }

    #[test]
    fn unequal_widths_are_rejected() {
        let err = Alignment::new(names(2), &["ACGT", "ACG"]).unwrap_err();
        match err {
            MsaError::InvalidSequence { position, .. } => assert_eq!(position, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = Alignment::new(vec!["a".into(), "a".into()], &["AC", "AC"]).unwrap_err();
        assert!(matches!(err, MsaError::InvalidInput(_)));
    }

    #[test]
    fn residues_are_uppercased_and_gaps_counted() {
        let aln = Alignment::new(names(2), &["ac-t", "--GT"]).unwrap();
        assert_eq!(aln.width(), 4);
        assert_eq!(aln.row(0).to_vec(), b"AC-T".to_vec());
        assert_eq!(aln.column(2).to_vec(), b"-G".to_vec());
        assert_eq!(aln.ungapped_len(0), 3);
        assert_eq!(aln.ungapped_len(1), 2);
    }

    #[test]
    fn empty_alignment_has_no_rows() {
        let aln = Alignment::new(Vec::new(), &[] as &[&str]).unwrap();
        assert!(aln.is_empty());
        assert_eq!(aln.width(), 0);
    }

    #[test]
    #[should_panic]
    fn out_of_range_row_panics() {
        let aln = Alignment::new(names(2), &["ACGT", "ACGA"]).unwrap();
        aln.ungapped_len(2);
    }
}
