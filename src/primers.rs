use crate::alignment::Alignment;
use crate::error::{MsaError, Result};
use crate::iupac::{ambiguity_code, is_degenerate};
use crate::types::{format_decimal, round3, DELIMITER, GAP};
use ndarray::ArrayView1;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DEFAULT_PRIMER_SIZE: usize = 21;
const DEFAULT_OCCURRENCE: f64 = 0.8;
const DEFAULT_DEGEN_PERCENT: f64 = 20.0;

/// Tunable thresholds for degenerate primer design.
///
/// * `primer_size` - window width in alignment columns (default 21)
/// * `occurrence` - a base whose column frequency reaches this value is taken
///   as-is, otherwise the column becomes an ambiguity code (default 0.8)
/// * `degen_nucleo_percent` - primers whose share of degenerate positions, in
///   percent, reaches this value are dropped (default 20)
///
/// Parameters can also be loaded from a JSON object; missing fields take
/// their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrimerParams {
    pub primer_size: usize,
    pub occurrence: f64,
    pub degen_nucleo_percent: f64,
}

impl Default for PrimerParams {
    fn default() -> Self {
        Self {
            primer_size: DEFAULT_PRIMER_SIZE,
            occurrence: DEFAULT_OCCURRENCE,
            degen_nucleo_percent: DEFAULT_DEGEN_PERCENT,
        }
    }
}

impl PrimerParams {
    /// Checks every parameter range.
    ///
    /// # Errors
    /// * `MsaError::InvalidParameter` naming the first offending parameter
    pub fn validate(&self) -> Result<()> {
        if self.primer_size == 0 {
            return Err(MsaError::invalid_parameter(
                "primer_size",
                self.primer_size,
                "must be a positive integer",
            ));
        }
        if !(self.occurrence > 0.0 && self.occurrence <= 1.0) {
            return Err(MsaError::invalid_parameter(
                "occurrence",
                self.occurrence,
                "must lie in (0, 1]",
            ));
        }
        if !(0.0..=100.0).contains(&self.degen_nucleo_percent) {
            return Err(MsaError::invalid_parameter(
                "degen_nucleo_percent",
                self.degen_nucleo_percent,
                "must lie in [0, 100]",
            ));
        }
        Ok(())
    }

    /// Reads parameters from JSON and validates them.
    ///
    /// # Errors
    /// * `MsaError::Config` for malformed JSON or unknown fields
    /// * `MsaError::InvalidParameter` for out-of-range values
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let params: Self = serde_json::from_reader(reader)?;
        params.validate()?;
        Ok(params)
    }

    /// Reads parameters from a JSON file; see [`PrimerParams::from_json_reader`].
    pub fn from_json_file(filename: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(filename)?;
        Self::from_json_reader(BufReader::new(file))
    }
}

/// Frequency of every character observed in one alignment column, gaps
/// included. Frequencies are count / N rounded to three decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    frequencies: BTreeMap<u8, f64>,
}

impl ColumnProfile {
    pub fn from_column(column: ArrayView1<'_, u8>) -> Self {
        let total = column.len() as f64;
        let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
        for &residue in column.iter() {
            *counts.entry(residue).or_insert(0) += 1;
        }
        let frequencies = counts
            .into_iter()
            .map(|(residue, count)| (residue, round3(count as f64 / total)))
            .collect();
        Self { frequencies }
    }

    pub fn frequency(&self, residue: u8) -> f64 {
        self.frequencies.get(&residue).copied().unwrap_or(0.0)
    }

    /// Most frequent character and its frequency. Ties go to the lowest
    /// byte value, so `-` beats any base and `A` beats `T`.
    pub fn dominant(&self) -> Option<(u8, f64)> {
        let mut best: Option<(u8, f64)> = None;
        for (&residue, &freq) in &self.frequencies {
            match best {
                Some((_, best_freq)) if freq <= best_freq => {}
                _ => best = Some((residue, freq)),
            }
        }
        best
    }

    /// Observed non-gap characters in ascending order.
    pub fn observed_bases(&self) -> Vec<u8> {
        self.frequencies
            .keys()
            .copied()
            .filter(|&residue| residue != GAP)
            .collect()
    }
}

/// Consensus character chosen for one column, with the column's maximum frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ColumnCall {
    symbol: char,
    frequency: f64,
}

fn call_column(profile: &ColumnProfile, column: usize, occurrence: f64) -> Result<ColumnCall> {
    let (residue, frequency) = profile.dominant().ok_or_else(|| {
        MsaError::InvalidInput(format!("alignment column {} is empty", column))
    })?;

    if frequency >= occurrence {
        return Ok(ColumnCall {
            symbol: residue as char,
            frequency,
        });
    }

    let bases = profile.observed_bases();
    let symbol = ambiguity_code(&bases).ok_or_else(|| MsaError::AmbiguityLookup {
        column,
        bases: String::from_utf8_lossy(&bases).into_owned(),
    })?;
    Ok(ColumnCall { symbol, frequency })
}

/// A primer candidate covering alignment columns `[start, stop)`.
///
/// `score` is the sum of each column's maximum frequency, rounded to three
/// decimals: `primer_size` for a fully conserved window, approaching 0 as
/// variation grows.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimerCandidate {
    pub sequence: String,
    pub start: usize,
    pub stop: usize,
    pub score: f64,
}

impl PrimerCandidate {
    /// Number of lower-case (ambiguous) positions.
    pub fn degenerate_count(&self) -> usize {
        self.sequence.chars().filter(|&c| is_degenerate(c)).count()
    }

    pub fn degenerate_percent(&self) -> f64 {
        let len = self.sequence.chars().count();
        if len == 0 {
            return 0.0;
        }
        (self.degenerate_count() * 100) as f64 / len as f64
    }
}

impl fmt::Display for PrimerCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{d}{}{d}{}{d}{}",
            self.sequence,
            self.start,
            self.stop,
            format_decimal(self.score),
            d = DELIMITER
        )
    }
}

/// Sliding-window scan yielding accepted primer candidates in increasing
/// start order.
///
/// Column calls are made once for the whole alignment when the scan is built,
/// so every window shares them and any lookup failure surfaces before the
/// first candidate.
#[derive(Debug, Clone)]
pub struct PrimerScan {
    calls: Vec<ColumnCall>,
    params: PrimerParams,
    next_start: usize,
}

impl PrimerScan {
    /// Validates `params` and prepares the scan.
    ///
    /// # Errors
    /// * `MsaError::InvalidParameter` for out-of-range parameters
    /// * `MsaError::AmbiguityLookup` if a column holds characters outside A, C, G, T
    pub fn new(alignment: &Alignment, params: PrimerParams) -> Result<Self> {
        params.validate()?;

        let calls = if alignment.is_empty() || params.primer_size > alignment.width() {
            Vec::new()
        } else {
            (0..alignment.width())
                .map(|column| {
                    let profile = ColumnProfile::from_column(alignment.column(column));
                    call_column(&profile, column, params.occurrence)
                })
                .collect::<Result<Vec<_>>>()?
        };

        Ok(Self {
            calls,
            params,
            next_start: 0,
        })
    }

    /// Number of full-width windows in the alignment.
    pub fn window_count(&self) -> usize {
        (self.calls.len() + 1).saturating_sub(self.params.primer_size)
    }

    fn evaluate(&self, start: usize) -> Option<PrimerCandidate> {
        let stop = start + self.params.primer_size;
        let window = &self.calls[start..stop];

        let sequence: String = window.iter().map(|call| call.symbol).collect();
        if sequence.contains("--") {
            debug!(start, "window rejected: consecutive gaps");
            return None;
        }

        let score = round3(window.iter().map(|call| call.frequency).sum());
        let candidate = PrimerCandidate {
            sequence,
            start,
            stop,
            score,
        };

        if candidate.degenerate_percent() >= self.params.degen_nucleo_percent {
            debug!(
                start,
                degenerate = candidate.degenerate_count(),
                "window rejected: too many degenerate bases"
            );
            return None;
        }
        Some(candidate)
    }
}

impl Iterator for PrimerScan {
    type Item = PrimerCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_start < self.window_count() {
            let start = self.next_start;
            self.next_start += 1;
            if let Some(candidate) = self.evaluate(start) {
                return Some(candidate);
            }
        }
        None
    }
}

/// Collects every accepted primer candidate.
///
/// # Example
/// ```ignore
/// use msa_primers::{fasta, primers, PrimerParams};
///
/// let alignment = fasta::read_alignment("path/to/aligned.fasta").unwrap();
/// for primer in primers::design_primers(&alignment, PrimerParams::default()).unwrap() {
///     println!("{}", primer);
/// }
/// ```
pub fn design_primers(alignment: &Alignment, params: PrimerParams) -> Result<Vec<PrimerCandidate>> {
    Ok(PrimerScan::new(alignment, params)?.collect())
}

/// Writes accepted candidates as `primer;start;stop;score` lines as they are
/// found, returning how many were written.
pub fn write_primers<W: Write>(alignment: &Alignment, params: PrimerParams, out: &mut W) -> Result<usize> {
    let scan = PrimerScan::new(alignment, params)?;
    info!(
        windows = scan.window_count(),
        primer_size = params.primer_size,
        occurrence = params.occurrence,
        degen_nucleo_percent = params.degen_nucleo_percent,
        "scanning for degenerate primers"
    );

    let mut written = 0;
    for candidate in scan {
        writeln!(out, "{}", candidate)?;
        written += 1;
    }
    out.flush()?;

    info!("{} primer candidates written", written);
    Ok(written)
}

/// Default primer table location: `<stem>_primer.txt` beside the alignment.
pub fn default_primer_output(input: impl AsRef<Path>) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "alignment".to_string());
    input.with_file_name(format!("{}_primer.txt", stem))
}
