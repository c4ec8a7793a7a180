use crate::alignment::Alignment;
use crate::error::{MsaError, Result};
use crate::types::{format_decimal, PidMatrix, DELIMITER, GAP};
use std::io::Write;
use tracing::info;

/// Percentage identity between sequences `i` and `j` of an alignment.
///
/// PID = identical * 100 / (ungapped_i + ungapped_j - identical), where
/// `identical` counts columns holding the same non-gap character in both rows.
/// The denominator is the size of the union of ungapped positions rather than
/// the usual aligned-pair count; values are kept compatible with existing PID
/// tables built this way.
///
/// # Errors
/// * `MsaError::DegenerateSequence` when both sequences are entirely gaps
///
/// # Panics
/// * Panics if `i` or `j` is not a row of `alignment`
pub fn pairwise_identity(alignment: &Alignment, i: usize, j: usize) -> Result<f64> {
    let identical = alignment
        .row(i)
        .iter()
        .zip(alignment.row(j).iter())
        .filter(|(a, b)| a == b && **a != GAP)
        .count();

    let denominator = alignment.ungapped_len(i) + alignment.ungapped_len(j) - identical;
    if denominator == 0 {
        return Err(MsaError::DegenerateSequence {
            first: alignment.name(i).to_string(),
            second: alignment.name(j).to_string(),
        });
    }

    Ok(identical as f64 / denominator as f64 * 100.0)
}

/// Builds the full `N x N` PID matrix in memory.
///
/// Only the upper triangle is computed; the lower triangle is mirrored from it.
pub fn pid_matrix(alignment: &Alignment) -> Result<PidMatrix> {
    let n = alignment.len();
    let mut matrix = PidMatrix::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let pid = pairwise_identity(alignment, i, j)?;
            matrix[[i, j]] = pid;
            matrix[[j, i]] = pid;
        }
    }
    Ok(matrix)
}

/// Writes one PID row per sequence: the identifier followed by its identity
/// to every sequence in alignment order, joined with `;`.
///
/// Rows are computed and written one at a time. `on_row(done, total)` is
/// called after each row is written.
///
/// # Errors
/// * `MsaError::DegenerateSequence` for an all-gap pair; rows already written
///   stay in `out`
/// * `MsaError::Io` if writing fails
pub fn write_pid_matrix<W, F>(alignment: &Alignment, out: &mut W, mut on_row: F) -> Result<()>
where
    W: Write,
    F: FnMut(usize, usize),
{
    let n = alignment.len();
    info!("building PID matrix for {} sequences of width {}", n, alignment.width());

    for i in 0..n {
        let mut line = alignment.name(i).to_string();
        for j in 0..n {
            line.push(DELIMITER);
            line.push_str(&format_decimal(pairwise_identity(alignment, i, j)?));
        }
        writeln!(out, "{}", line)?;
        on_row(i + 1, n);
    }

    out.flush()?;
    info!("PID matrix complete");
    Ok(())
}
