//! Solver entry point
//!
//! Validates a challenge, then hands it to the [`SearchEngine`]. All input
//! errors surface here, before any worker thread exists.

use core::fmt;
use core::ops::Range;
use core::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use tracing::info;

use crate::challenge::{ChallengeKind, ChallengeParameters};
use crate::error::{SolverError, SolverResult};
use crate::oracle::{Digest, Sha256Checksum, digest_prefix};
use crate::params::*;
use crate::search::{Candidate, CancelFlag, SearchEngine, SearchJob, Solution};

/// Target hash prefix
///
/// Written as up to 4 hex digits, read big-endian: `"0a1b"` matches digests
/// starting with the bytes `0a 1b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashPrefix {
    value: u16,
}

impl HashPrefix {
    /// Prefix as written, big-endian
    pub fn value(&self) -> u16 {
        self.value
    }

    /// Value compared with the little-endian view of the digest
    #[inline]
    pub fn target(&self) -> u16 {
        u16::from_le_bytes(self.value.to_be_bytes())
    }

    /// Whether `digest` starts with this prefix
    #[inline]
    pub fn matches(&self, digest: &Digest) -> bool {
        digest_prefix(digest) == self.target()
    }
}

impl FromStr for HashPrefix {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = !s.is_empty()
            && s.len() <= HASH_PREFIX_MAX_DIGITS
            && s.bytes().all(|b| b.is_ascii_hexdigit());
        if !well_formed {
            return Err(SolverError::InvalidHashPrefix(s.to_string()));
        }

        u16::from_str_radix(s, 16)
            .map(|value| Self { value })
            .map_err(|_| SolverError::InvalidHashPrefix(s.to_string()))
    }
}

impl fmt::Display for HashPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.value)
    }
}

/// Previous solution hash, kept as the 64 hex characters it arrived as
///
/// The text itself is hashed, not the decoded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LastSolutionHash(String);

impl LastSolutionHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for LastSolutionHash {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != LAST_SOLUTION_HASH_LEN {
            return Err(SolverError::InvalidLastSolutionHash(format!(
                "expected {LAST_SOLUTION_HASH_LEN} characters, got {}",
                s.len()
            )));
        }
        hex::decode(s).map_err(|e| SolverError::InvalidLastSolutionHash(e.to_string()))?;
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for LastSolutionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeRequest {
    /// Opaque identifier, only used for logging
    pub challenge_id: u64,
    pub last_solution_hash: LastSolutionHash,
    pub hash_prefix: HashPrefix,
    pub parameters: ChallengeParameters,
}

impl ChallengeRequest {
    /// Parse and validate every field
    pub fn new(
        challenge_id: u64,
        last_solution_hash: &str,
        hash_prefix: &str,
        parameters: ChallengeParameters,
    ) -> SolverResult<Self> {
        parameters.validate()?;
        Ok(Self {
            challenge_id,
            last_solution_hash: last_solution_hash.parse()?,
            hash_prefix: hash_prefix.parse()?,
            parameters,
        })
    }

    pub fn kind(&self) -> ChallengeKind {
        self.parameters.kind()
    }

    /// Borrowed view handed to the engine
    pub fn job(&self) -> SearchJob<'_> {
        SearchJob {
            last_solution_hash: self.last_solution_hash.as_bytes(),
            parameters: self.parameters,
            target: self.hash_prefix.target(),
        }
    }
}

/// Solver configuration
#[derive(Debug, Clone)]
pub struct Solver {
    workers: usize,
    nonce_range: Range<u64>,
    progress: Option<Arc<AtomicU64>>,
}

impl Solver {
    /// Full nonce space, one worker per available thread
    pub fn new() -> Self {
        Self {
            workers: default_workers(),
            nonce_range: 0..NONCE_SPACE_END,
            progress: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Restrict the search to a sub-range of the nonce space
    pub fn with_nonce_range(mut self, nonce_range: Range<u64>) -> Self {
        self.nonce_range = nonce_range;
        self
    }

    /// Count scanned nonces into `progress`
    pub fn with_progress(mut self, progress: Arc<AtomicU64>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn nonce_range(&self) -> Range<u64> {
        self.nonce_range.clone()
    }

    /// Search for a nonce solving `request`
    pub fn solve(
        &self,
        request: &ChallengeRequest,
        cancel: &CancelFlag,
    ) -> SolverResult<Solution> {
        let span = tracing::info_span!(
            "solve",
            challenge_id = request.challenge_id,
            kind = %request.kind(),
        );
        let _enter = span.enter();

        request.parameters.validate()?;
        let mut engine = SearchEngine::new(self.workers, self.nonce_range.clone())?;
        if let Some(progress) = &self.progress {
            engine = engine.with_progress(Arc::clone(progress));
        }

        info!(
            workers = self.workers,
            prefix = %request.hash_prefix,
            start = self.nonce_range.start,
            end = self.nonce_range.end,
            "search started"
        );
        engine.search(&request.job(), cancel)
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "parallel")]
fn default_workers() -> usize {
    rayon::current_num_threads().min(MAX_WORKERS)
}

#[cfg(not(feature = "parallel"))]
fn default_workers() -> usize {
    1
}

/// Solve a challenge described by its raw fields with default settings
///
/// `challenge_type` must name the same kind as `parameters`.
pub fn solve_challenge(
    challenge_id: u64,
    challenge_type: &str,
    last_solution_hash: &str,
    hash_prefix: &str,
    parameters: ChallengeParameters,
    cancel: &CancelFlag,
) -> SolverResult<Solution> {
    let kind: ChallengeKind = challenge_type.parse()?;
    if kind != parameters.kind() {
        return Err(SolverError::InvalidParameters(format!(
            "{} parameters given for a {kind} challenge",
            parameters.kind()
        )));
    }

    let request = ChallengeRequest::new(challenge_id, last_solution_hash, hash_prefix, parameters)?;
    Solver::new().solve(&request, cancel)
}

/// Second-stage digest for `nonce`, `None` if the challenge has no payload
pub fn candidate_digest(request: &ChallengeRequest, nonce: u32) -> Option<Digest> {
    Candidate::new(&request.parameters).digest::<Sha256Checksum>(&request.job(), nonce)
}

/// Re-run the pipeline for a reported nonce
///
/// Only the canonical decimal form is accepted.
pub fn verify_nonce(request: &ChallengeRequest, nonce: &str) -> bool {
    let Ok(value) = nonce.parse::<u32>() else {
        return false;
    };
    if value.to_string() != nonce {
        return false;
    }

    candidate_digest(request, value).is_some_and(|digest| request.hash_prefix.matches(&digest))
}
