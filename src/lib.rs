//! Percentage identity matrices and degenerate PCR primer design from multiple sequence alignments

pub mod alignment;
pub mod error;
pub mod fasta;
pub mod iupac;
pub mod pid;
pub mod primers;
pub mod types;

pub use alignment::Alignment;
pub use error::{MsaError, Result};
pub use primers::{PrimerCandidate, PrimerParams};
