use clap::{Parser, Subcommand};
use msa_primers::fasta::read_alignment;
use msa_primers::pid::write_pid_matrix;
use msa_primers::primers::{default_primer_output, write_primers};
use msa_primers::{MsaError, PrimerParams};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(thiserror::Error, Debug)]
pub enum ScannerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Analysis(#[from] MsaError),

    #[error("Could not finalize output {path}: {source}")]
    Persist { path: PathBuf, source: io::Error },
}

#[derive(Parser)]
#[command(
    name = "primer-scanner",
    about = "Computes percentage identity matrices and degenerate PCR primers from aligned FASTA files",
    long_about = "A tool for analyzing multiple sequence alignments. The `pid` command writes a \
                  matrix of pairwise percentage identities; the `primers` command slides a window \
                  across the alignment and reports degenerate primer candidates with their \
                  coordinates and conservation score.",
    version,
    after_help = "Example usage:\n    \
                  primer-scanner pid aligned.fasta pid_matrix.txt\n    \
                  primer-scanner primers aligned.fasta --primer-size 20 --occurrence 0.9\n    \
                  primer-scanner primers aligned.fasta --config primers.json",
    color = clap::ColorChoice::Always
)]
#[derive(Debug)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the pairwise percentage identity matrix
    Pid {
        /// Path to aligned FASTA file (all sequences padded to equal width with '-')
        #[arg(value_name = "ALIGNMENT")]
        alignment: PathBuf,

        /// Path for the ';'-delimited matrix, one row per sequence
        #[arg(value_name = "OUTPUT_FILE")]
        output_file: PathBuf,
    },

    /// Write degenerate primer candidates
    Primers {
        /// Path to aligned FASTA file (all sequences padded to equal width with '-')
        #[arg(value_name = "ALIGNMENT")]
        alignment: PathBuf,

        /// Path for the ';'-delimited primer table
        /// Defaults to <ALIGNMENT stem>_primer.txt next to the input
        #[arg(value_name = "OUTPUT_FILE")]
        output_file: Option<PathBuf>,

        /// JSON file with any of primer_size, occurrence, degen_nucleo_percent
        /// Flags given on the command line take precedence
        #[arg(long, value_name = "CONFIG_FILE")]
        config: Option<PathBuf>,

        /// Primer length in alignment columns [default: 21]
        #[arg(long)]
        primer_size: Option<usize>,

        /// Frequency at which a base is taken as-is instead of an ambiguity code [default: 0.8]
        #[arg(long)]
        occurrence: Option<f64>,

        /// Primers with at least this percentage of degenerate bases are dropped [default: 20]
        #[arg(long = "degen-percent")]
        degen_nucleo_percent: Option<f64>,
    },
}

/// Runs `body` against a temporary file beside `path` and moves it into place
/// only once `body` succeeds.
fn write_atomically<F>(path: &Path, body: F) -> Result<(), ScannerError>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> Result<(), ScannerError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(&mut tmp);
        body(&mut writer)?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| ScannerError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// Starts from the config file (or defaults) and applies command line overrides.
fn resolve_params(
    config: Option<&Path>,
    primer_size: Option<usize>,
    occurrence: Option<f64>,
    degen_nucleo_percent: Option<f64>,
) -> Result<PrimerParams, ScannerError> {
    let mut params = match config {
        Some(path) => PrimerParams::from_json_file(path)?,
        None => PrimerParams::default(),
    };
    if let Some(primer_size) = primer_size {
        params.primer_size = primer_size;
    }
    if let Some(occurrence) = occurrence {
        params.occurrence = occurrence;
    }
    if let Some(degen_nucleo_percent) = degen_nucleo_percent {
        params.degen_nucleo_percent = degen_nucleo_percent;
    }
    params.validate()?;
    Ok(params)
}

fn run_pid(alignment: &Path, output_file: &Path) -> Result<(), ScannerError> {
    let alignment = read_alignment(alignment)?;
    info!("{} sequences to compare", alignment.len());

    write_atomically(output_file, |out| {
        write_pid_matrix(&alignment, out, |done, total| {
            eprint!("\rProgress: {:.1}%", done as f64 * 100.0 / total as f64);
        })?;
        eprintln!();
        Ok(())
    })?;

    info!("PID matrix written to {}", output_file.display());
    Ok(())
}

fn run_primers(
    alignment: &Path,
    output_file: Option<PathBuf>,
    params: PrimerParams,
) -> Result<(), ScannerError> {
    let output_file = output_file.unwrap_or_else(|| default_primer_output(alignment));
    let alignment = read_alignment(alignment)?;
    info!(
        "{} sequences, alignment width {}",
        alignment.len(),
        alignment.width()
    );

    write_atomically(&output_file, |out| {
        write_primers(&alignment, params, out)?;
        Ok(())
    })?;

    info!("primer candidates written to {}", output_file.display());
    Ok(())
}

fn main() -> Result<(), ScannerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let start_time = std::time::Instant::now();

    let args = Args::parse();
    match args.command {
        Command::Pid {
            alignment,
            output_file,
        } => run_pid(&alignment, &output_file)?,
        Command::Primers {
            alignment,
            output_file,
            config,
            primer_size,
            occurrence,
            degen_nucleo_percent,
        } => {
            let params = resolve_params(
                config.as_deref(),
                primer_size,
                occurrence,
                degen_nucleo_percent,
            )?;
            run_primers(&alignment, output_file, params)?
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        "Total execution time: {:.4} minutes",
        elapsed.as_secs_f64() / 60.0
    );

    Ok(())
}
