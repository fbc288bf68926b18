//! Solver configuration
//!
//! Defaults, optionally overlaid by a JSON file, then by command-line flags.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::algorithm::{Solver, MAX_WORKERS, NONCE_SPACE_END};

/// Default interval between hash-rate reports
pub const DEFAULT_PROGRESS_INTERVAL_SECS: u64 = 5;

/// Solver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Worker threads, one nonce partition each
    pub threads: usize,
    /// First nonce to try
    pub nonce_start: u64,
    /// One past the last nonce to try
    pub nonce_end: u64,
    /// Seconds between hash-rate reports
    pub progress_interval_secs: u64,
    /// Cancel the search after this many seconds
    pub timeout_secs: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get().min(MAX_WORKERS),
            nonce_start: 0,
            nonce_end: NONCE_SPACE_END,
            progress_interval_secs: DEFAULT_PROGRESS_INTERVAL_SECS,
            timeout_secs: None,
        }
    }
}

impl SolverConfig {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs.max(1))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Core solver for this configuration
    pub fn solver(&self) -> Solver {
        Solver::new()
            .with_workers(self.threads)
            .with_nonce_range(self.nonce_start..self.nonce_end)
    }
}

/// Command-line overrides; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub threads: Option<usize>,
    pub nonce_start: Option<u64>,
    pub nonce_end: Option<u64>,
    pub timeout_secs: Option<u64>,
}

/// Build the configuration from an optional file and CLI overrides
pub fn build_solver_config(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<SolverConfig> {
    let mut config = match config_path {
        Some(path) => SolverConfig::load(path)?,
        None => SolverConfig::default(),
    };

    if let Some(threads) = overrides.threads {
        config.threads = threads;
    }
    if let Some(start) = overrides.nonce_start {
        config.nonce_start = start;
    }
    if let Some(end) = overrides.nonce_end {
        config.nonce_end = end;
    }
    if let Some(timeout) = overrides.timeout_secs {
        config.timeout_secs = Some(timeout);
    }

    if config.threads == 0 || config.threads > MAX_WORKERS {
        anyhow::bail!("threads must be in 1..={}, got {}", MAX_WORKERS, config.threads);
    }
    if config.nonce_start >= config.nonce_end || config.nonce_end > NONCE_SPACE_END {
        anyhow::bail!(
            "nonce range {}..{} must be non-empty and within 0..{}",
            config.nonce_start,
            config.nonce_end,
            NONCE_SPACE_END
        );
    }

    Ok(config)
}
