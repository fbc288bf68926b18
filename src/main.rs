//! CSCoin Solver CLI
//!
//! Command-line front end for the CSCoin challenge solver.
//!
//! # Commands
//!
//! - `solve` - Search for a nonce solving a challenge
//! - `verify` - Check a nonce against a challenge
//! - `mt64` - Print the MT64 sequence for a seed
//! - `benchmark` - Measure candidate throughput

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{info, warn};

use cscoin::algorithm::{candidate_digest, verify_nonce, Mt64};
use cscoin::challenge::{ChallengeDescription, ChallengeParams, SolutionReport};
use cscoin::config::{build_solver_config, ConfigOverrides, SolverConfig};
use cscoin::logging::init_logging;
use cscoin::{CancelFlag, ChallengeRequest, Solution};

#[derive(Parser)]
#[command(name = "cscoin")]
#[command(version)]
#[command(about = "CSCoin challenge solver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Solver configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" (default: RUST_LOG or info)
    #[arg(long, global = true)]
    log: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a nonce solving a challenge
    Solve {
        #[command(flatten)]
        challenge: ChallengeArgs,

        /// Number of worker threads (default: number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,

        /// First nonce to try
        #[arg(long)]
        nonce_start: Option<u64>,

        /// One past the last nonce to try
        #[arg(long)]
        nonce_end: Option<u64>,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a nonce against a challenge
    Verify {
        #[command(flatten)]
        challenge: ChallengeArgs,

        /// The nonce to check
        #[arg(long)]
        nonce: String,
    },

    /// Print the MT64 sequence for a seed
    Mt64 {
        /// Generator seed
        #[arg(long)]
        seed: u64,

        /// Number of values to print
        #[arg(short, long, default_value = "10")]
        count: usize,
    },

    /// Measure candidate throughput on one thread
    Benchmark {
        #[command(flatten)]
        challenge: ChallengeArgs,

        /// Number of nonces to hash
        #[arg(short, long, default_value = "10000")]
        count: u32,
    },
}

/// Challenge given as a JSON file or as individual flags
#[derive(Args)]
struct ChallengeArgs {
    /// Challenge description file (JSON), overrides the flags below
    #[arg(long = "challenge", value_name = "FILE")]
    challenge_file: Option<PathBuf>,

    /// Challenge identifier
    #[arg(long, default_value = "0")]
    challenge_id: u64,

    /// sorted_list, reverse_sorted_list or shortest_path
    #[arg(long, default_value = "sorted_list")]
    challenge_type: String,

    /// Hash of the previous solution (64 hex characters)
    #[arg(long, default_value_t = "0".repeat(64))]
    last_solution_hash: String,

    /// Target hash prefix (hex)
    #[arg(long, default_value = "0000")]
    hash_prefix: String,

    /// Element count for list challenges
    #[arg(long)]
    nb_elements: Option<usize>,

    /// Grid edge for shortest path challenges
    #[arg(long)]
    grid_size: Option<usize>,

    /// Blocker count for shortest path challenges
    #[arg(long)]
    nb_blockers: Option<usize>,
}

impl ChallengeArgs {
    fn to_request(&self) -> anyhow::Result<ChallengeRequest> {
        let description = match &self.challenge_file {
            Some(path) => ChallengeDescription::from_file(path)?,
            None => ChallengeDescription {
                challenge_id: self.challenge_id,
                challenge_name: self.challenge_type.clone(),
                last_solution_hash: self.last_solution_hash.clone(),
                hash_prefix: self.hash_prefix.clone(),
                parameters: ChallengeParams {
                    nb_elements: self.nb_elements,
                    grid_size: self.grid_size,
                    nb_blockers: self.nb_blockers,
                },
            },
        };
        Ok(description.to_request()?)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref());

    let result = match cli.command {
        Commands::Solve {
            challenge,
            threads,
            nonce_start,
            nonce_end,
            timeout,
            json,
        } => {
            let overrides = ConfigOverrides {
                threads,
                nonce_start,
                nonce_end,
                timeout_secs: timeout,
            };
            build_solver_config(cli.config.as_deref(), &overrides)
                .and_then(|config| cmd_solve(&challenge, &config, json))
        }
        Commands::Verify { challenge, nonce } => cmd_verify(&challenge, &nonce),
        Commands::Mt64 { seed, count } => cmd_mt64(seed, count),
        Commands::Benchmark { challenge, count } => cmd_benchmark(&challenge, count),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn cmd_solve(challenge: &ChallengeArgs, config: &SolverConfig, json: bool) -> anyhow::Result<()> {
    let request = challenge.to_request()?;

    info!(
        challenge_id = request.challenge_id,
        kind = %request.kind(),
        prefix = %request.hash_prefix,
        threads = config.threads,
        "solving challenge"
    );

    let progress = Arc::new(AtomicU64::new(0));
    let cancel = CancelFlag::new();
    let done = Arc::new(AtomicBool::new(false));
    let solver = config.solver().with_progress(Arc::clone(&progress));

    let start = Instant::now();
    let monitor = spawn_monitor(config, &progress, &cancel, &done, start);

    let solution = solver.solve(&request, &cancel);
    done.store(true, Ordering::SeqCst);
    if monitor.join().is_err() {
        warn!("progress monitor panicked");
    }
    let solution = solution?;

    let hashes = progress.load(Ordering::Relaxed);
    let elapsed = start.elapsed().as_secs_f64();
    info!(
        hashes,
        elapsed_secs = format!("{:.2}", elapsed),
        hashrate = format!("{:.0}", hashes as f64 / elapsed.max(f64::EPSILON)),
        "search finished"
    );

    if json {
        let report = SolutionReport::new(request.challenge_id, &solution);
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    match solution {
        Solution::Found(nonce) => {
            println!("{}", nonce);
            Ok(())
        }
        Solution::NotFound => anyhow::bail!(
            "no nonce in {}..{} matches prefix {}",
            config.nonce_start,
            config.nonce_end,
            request.hash_prefix
        ),
        Solution::Cancelled => anyhow::bail!("search cancelled"),
    }
}

/// Report hash rate and enforce the timeout while the search runs
fn spawn_monitor(
    config: &SolverConfig,
    progress: &Arc<AtomicU64>,
    cancel: &CancelFlag,
    done: &Arc<AtomicBool>,
    start: Instant,
) -> std::thread::JoinHandle<()> {
    let interval = config.progress_interval();
    let timeout = config.timeout();
    let progress = Arc::clone(progress);
    let cancel = cancel.clone();
    let done = Arc::clone(done);

    std::thread::spawn(move || {
        let mut last_report = Instant::now();

        while !done.load(Ordering::Relaxed) {
            std::thread::sleep(Duration::from_millis(100));

            if let Some(timeout) = timeout {
                if start.elapsed() >= timeout && !cancel.is_cancelled() {
                    warn!(timeout_secs = timeout.as_secs(), "timeout reached, cancelling");
                    cancel.cancel();
                }
            }

            if last_report.elapsed() >= interval {
                let hashes = progress.load(Ordering::Relaxed);
                let elapsed = start.elapsed().as_secs_f64();
                info!(
                    hashes,
                    hashrate = format!("{:.0}", hashes as f64 / elapsed),
                    "searching"
                );
                last_report = Instant::now();
            }
        }
    })
}

fn cmd_verify(challenge: &ChallengeArgs, nonce: &str) -> anyhow::Result<()> {
    let request = challenge.to_request()?;
    let valid = verify_nonce(&request, nonce);

    let value: u32 = nonce.parse().context("nonce must be a 32-bit decimal integer")?;
    match candidate_digest(&request, value) {
        Some(digest) => println!("Digest: {}", hex::encode(digest)),
        None => println!("Digest: none (challenge has no payload for this nonce)"),
    }

    if valid {
        println!("Valid: nonce {} matches prefix {}", nonce, request.hash_prefix);
        Ok(())
    } else {
        anyhow::bail!("nonce {} does not match prefix {}", nonce, request.hash_prefix)
    }
}

fn cmd_mt64(seed: u64, count: usize) -> anyhow::Result<()> {
    for value in Mt64::with_seed(seed).take(count) {
        println!("{}", value);
    }
    Ok(())
}

fn cmd_benchmark(challenge: &ChallengeArgs, count: u32) -> anyhow::Result<()> {
    let request = challenge.to_request()?;
    println!(
        "Running benchmark with {} nonces ({})...",
        count,
        request.kind()
    );

    let start = Instant::now();
    let mut solvable = 0u32;
    for nonce in 0..count {
        if candidate_digest(&request, nonce).is_some() {
            solvable += 1;
        }
    }

    let elapsed = start.elapsed();
    let hashrate = count as f64 / elapsed.as_secs_f64();

    println!("\nResults:");
    println!("  Nonces tried: {}", count);
    println!("  With payload: {}", solvable);
    println!("  Time elapsed: {:.2}s", elapsed.as_secs_f64());
    println!("  Hashrate: {:.2} nonces/s", hashrate);

    Ok(())
}
