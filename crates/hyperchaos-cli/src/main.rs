//! Hyperchaos command-line tool.
//!
//! Operates on raw byte files: image decoding and encoding happen elsewhere.
//!
//! # Usage
//!
//! ```bash
//! # Encrypt a flattened 512x512 RGB image with 3 rounds
//! hyperchaos --seed my-seed encrypt --input image.raw --output image.enc --rounds 3
//!
//! # Decrypt, checking the byte count against the original shape
//! hyperchaos --seed my-seed decrypt --input image.enc --output image.raw --rounds 3 --shape 512x512x3
//!
//! # Describe the systems and verify they are hyperchaotic
//! hyperchaos info --json
//! hyperchaos lyapunov --iterations 50000 --dt 0.01
//!
//! # Dump every 100th sample of the Chen trajectory as CSV
//! hyperchaos trajectory --system 1 --stride 100 > chen.csv
//! ```

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use hyperchaos_core::{
    BufferShape, CipherSession, DEFAULT_WARMUP, InitialConditions, SeedMode, SessionConfig,
};
use hyperchaos_dynamics::State;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Hyperchaotic image encryption
#[derive(Parser, Debug)]
#[command(name = "hyperchaos")]
#[command(about = "Encrypt byte buffers with keys derived from hyperchaotic systems")]
#[command(version)]
struct Args {
    /// Seed string the session is built from
    #[arg(long, default_value = "hyperchaos")]
    seed: String,

    /// Session configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Offset initial conditions by seed-derived amounts of at most this size
    #[arg(long)]
    perturb: Option<f64>,

    /// Time units a perturbed system runs before its keyed trajectory starts
    #[arg(long, default_value_t = DEFAULT_WARMUP, requires = "perturb")]
    warmup: f64,

    /// Initial condition for system 0 as x,y,z,w
    #[arg(long, value_parser = parse_state, allow_hyphen_values = true)]
    ic0: Option<State>,

    /// Initial condition for system 1 as x,y,z,w
    #[arg(long, value_parser = parse_state, allow_hyphen_values = true)]
    ic1: Option<State>,

    /// Initial condition for system 2 as x,y,z,w
    #[arg(long, value_parser = parse_state, allow_hyphen_values = true)]
    ic2: Option<State>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypt a file
    Encrypt {
        /// Plaintext file
        #[arg(short, long)]
        input: PathBuf,
        /// Ciphertext destination
        #[arg(short, long)]
        output: PathBuf,
        /// Number of rounds
        #[arg(short, long, default_value = "3")]
        rounds: u32,
    },

    /// Decrypt a file
    Decrypt {
        /// Ciphertext file
        #[arg(short, long)]
        input: PathBuf,
        /// Plaintext destination
        #[arg(short, long)]
        output: PathBuf,
        /// Number of rounds used for encryption
        #[arg(short, long, default_value = "3")]
        rounds: u32,
        /// Expected shape of the plaintext, e.g. 512x512x3
        #[arg(long)]
        shape: Option<BufferShape>,
    },

    /// Describe every system of the session
    Info {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Compute Lyapunov spectra
    Lyapunov {
        /// Only this system (default: all)
        #[arg(long)]
        system: Option<usize>,
        /// QR iterations
        #[arg(long, default_value = "50000")]
        iterations: usize,
        /// Integration step
        #[arg(long, default_value = "0.01")]
        dt: f64,
    },

    /// Write a system's retained trajectory as CSV
    Trajectory {
        /// System index
        #[arg(long)]
        system: usize,
        /// Emit every n-th sample
        #[arg(long, default_value = "1")]
        stride: usize,
        /// Destination file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid config {path}: {source}")]
    Config { path: PathBuf, source: serde_json::Error },

    #[error("stride must be at least 1")]
    ZeroStride,
}

fn parse_state(s: &str) -> Result<State, String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|e| format!("{part:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    <State>::try_from(values.as_slice())
        .map_err(|_| format!("expected 4 comma-separated values, got {}", values.len()))
}

fn load_config(args: &Args) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|source| CliError::Read { path: path.clone(), source })?;
            serde_json::from_str(&text)
                .map_err(|source| CliError::Config { path: path.clone(), source })?
        },
        None => SessionConfig::default(),
    };

    if let Some(magnitude) = args.perturb {
        config = config.with_seed_mode(SeedMode::Perturb { magnitude, warmup: args.warmup });
    }

    let mut overrides = InitialConditions::new();
    for (index, ic) in [args.ic0, args.ic1, args.ic2].into_iter().enumerate() {
        if let Some(ic) = ic {
            overrides = overrides.with(index, ic);
        }
    }
    Ok(config.with_initial_conditions(&overrides)?)
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::Read { path: path.to_path_buf(), source })
}

fn write(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    fs::write(path, bytes).map_err(|source| CliError::Write { path: path.to_path_buf(), source })
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args)?;
    let session = CipherSession::with_config(args.seed.as_bytes(), &config)?;

    for (index, round_key) in session.round_keys().iter().enumerate() {
        tracing::info!(
            system = index,
            fingerprint = %hex::encode(round_key.key().fingerprint()),
            "round key ready"
        );
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Encrypt { input, output, rounds } => {
            let plaintext = read(&input)?;
            let ciphertext = session.encrypt(&plaintext, rounds);
            write(&output, &ciphertext)?;
            tracing::info!(bytes = ciphertext.len(), rounds, output = %output.display(), "encrypted");
        },
        Command::Decrypt { input, output, rounds, shape } => {
            let ciphertext = read(&input)?;
            let plaintext = match &shape {
                Some(shape) => session.decrypt_shaped(&ciphertext, shape, rounds)?,
                None => session.decrypt(&ciphertext, rounds),
            };
            write(&output, &plaintext)?;
            tracing::info!(bytes = plaintext.len(), rounds, output = %output.display(), "decrypted");
        },
        Command::Info { json } => {
            let info = session.system_info();
            if json {
                serde_json::to_writer_pretty(&mut out, &info)?;
                writeln!(out)?;
            } else {
                for (system, stats) in info.iter().zip(session.bitstream_stats()) {
                    writeln!(out, "{system}")?;
                    writeln!(
                        out,
                        "    bitstream: {} bits, ones ratio {:.4}",
                        stats.len,
                        stats.ones_ratio()
                    )?;
                    writeln!(out, "    first bits: {}", system.bitstream_preview)?;
                }
            }
        },
        Command::Lyapunov { system, iterations, dt } => {
            let spectra = match system {
                Some(index) => vec![(index, session.lyapunov_spectrum(index, iterations, dt)?)],
                None => session.lyapunov_spectra(iterations, dt)?.into_iter().enumerate().collect(),
            };
            let info = session.system_info();
            for (index, spectrum) in spectra {
                let [l1, l2, l3, l4] = spectrum.exponents();
                writeln!(
                    out,
                    "[{index}] {}: λ = [{l1:.4}, {l2:.4}, {l3:.4}, {l4:.4}] sum {:.4} hyperchaotic={}",
                    info[index].name,
                    spectrum.sum(),
                    spectrum.is_hyperchaotic()
                )?;
            }
        },
        Command::Trajectory { system, stride, output } => {
            if stride == 0 {
                return Err(CliError::ZeroStride.into());
            }
            let trajectory = session.raw_trajectory(system)?;
            let mut csv = String::from("t,x,y,z,w\n");
            for (i, [x, y, z, w]) in trajectory.points().iter().enumerate().step_by(stride) {
                csv.push_str(&format!("{},{x},{y},{z},{w}\n", trajectory.time_at(i)));
            }
            match output {
                Some(path) => write(&path, csv.as_bytes())?,
                None => out.write_all(csv.as_bytes())?,
            }
        },
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    run(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_state_accepts_four_values() {
        assert_eq!(parse_state("1, -2.5,0,1e3").unwrap(), [1.0, -2.5, 0.0, 1000.0]);
    }

    #[test]
    fn parse_state_rejects_wrong_arity() {
        assert!(parse_state("1,2,3").is_err());
        assert!(parse_state("1,2,3,x").is_err());
    }

    #[test]
    fn cli_parses_decrypt_with_shape() {
        let args = Args::try_parse_from([
            "hyperchaos",
            "--seed",
            "s",
            "--ic0",
            "-10,-6,0,10",
            "decrypt",
            "-i",
            "in.bin",
            "-o",
            "out.bin",
            "--shape",
            "4x4x3",
        ])
        .unwrap();
        assert_eq!(args.ic0, Some([-10.0, -6.0, 0.0, 10.0]));
        let Command::Decrypt { shape, rounds, .. } = args.command else {
            panic!("expected decrypt");
        };
        assert_eq!(rounds, 3);
        assert_eq!(shape.unwrap().byte_len(), Some(48));
    }

    #[test]
    fn config_flags_become_overrides() {
        let args = Args::try_parse_from([
            "hyperchaos",
            "--perturb",
            "0.05",
            "--ic2",
            "2,2,2,2",
            "info",
        ])
        .unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(
            config.seed_mode,
            SeedMode::Perturb { magnitude: 0.05, warmup: DEFAULT_WARMUP }
        );
        assert_eq!(config.systems[2].initial_condition(), &[2.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn warmup_flag_sets_perturb_warmup() {
        let args = Args::try_parse_from([
            "hyperchaos",
            "--perturb",
            "0.1",
            "--warmup",
            "20",
            "info",
        ])
        .unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.seed_mode, SeedMode::Perturb { magnitude: 0.1, warmup: 20.0 });
    }
}
