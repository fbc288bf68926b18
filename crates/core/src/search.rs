//! Parallel nonce search
//!
//! The nonce range is cut into contiguous partitions, one per worker, each
//! scanned in ascending order. For every nonce:
//!
//! ```text
//! text    = decimal(nonce)
//! digest1 = SHA256(last_solution_hash_text || text)
//! seed    = u64_le(digest1[0..8])
//! digest2 = SHA256(challenge payload generated from MT64(seed))
//! match   = u16_le(digest2[0..2]) == target
//! ```
//!
//! Workers share a single search state. The first worker to move it from
//! running to found owns the result slot; moving it to cancelled closes the
//! slot for good, so a search reports exactly one outcome.

use core::fmt::Write as _;
use core::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{Span, debug, info};

use crate::challenge::{ChallengeParameters, Workspace};
use crate::error::{SolverError, SolverResult};
use crate::mt64::Mt64;
use crate::oracle::{Checksum, Digest, Sha256Checksum, digest_prefix, digest_seed};
use crate::params::*;

/// Outcome of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Solution {
    /// Winning nonce, exactly as it was hashed
    Found(String),
    /// Whole range scanned without a match
    NotFound,
    /// Stopped by the caller
    Cancelled,
}

impl Solution {
    /// Winning nonce text, if any
    pub fn nonce(&self) -> Option<&str> {
        match self {
            Solution::Found(nonce) => Some(nonce),
            _ => None,
        }
    }
}

/// Caller-owned cancellation handle
///
/// Clones share the same flag. Once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every search watching this flag to stop
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Immutable inputs of one search, shared by all workers
#[derive(Debug, Clone, Copy)]
pub struct SearchJob<'a> {
    /// Previous solution hash as text bytes
    pub last_solution_hash: &'a [u8],
    pub parameters: ChallengeParameters,
    /// Expected little-endian value of the first two digest bytes
    pub target: u16,
}

/// Per-worker pipeline state, reused across nonces
pub struct Candidate {
    mt: Mt64,
    workspace: Workspace,
    nonce_text: String,
}

impl Candidate {
    pub fn new(parameters: &ChallengeParameters) -> Self {
        Self {
            mt: Mt64::new(),
            workspace: Workspace::new(parameters),
            nonce_text: String::with_capacity(10),
        }
    }

    /// Run the two-stage pipeline for `nonce`
    ///
    /// `None` when the challenge has no payload for this nonce.
    pub fn digest<C: Checksum>(&mut self, job: &SearchJob<'_>, nonce: u32) -> Option<Digest> {
        self.nonce_text.clear();
        // Writing into a String cannot fail
        let _ = write!(self.nonce_text, "{nonce}");

        let mut checksum = C::default();
        checksum.update(job.last_solution_hash);
        checksum.update(self.nonce_text.as_bytes());
        self.mt.set_seed(digest_seed(&checksum.finalize()));

        let mut checksum = C::default();
        job.parameters
            .feed(&mut self.mt, &mut checksum, &mut self.workspace)
            .then(|| checksum.finalize())
    }

    /// Whether `nonce` solves the job
    #[inline]
    pub fn matches<C: Checksum>(&mut self, job: &SearchJob<'_>, nonce: u32) -> bool {
        self.digest::<C>(job, nonce)
            .is_some_and(|digest| digest_prefix(&digest) == job.target)
    }

    /// Decimal text of the last nonce tried
    pub fn nonce_text(&self) -> &str {
        &self.nonce_text
    }

    /// Scratch buffers of the last nonce tried
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }
}

/// Split `range` into `workers` contiguous partitions
///
/// `workers` must be in `1..=MAX_WORKERS`.
///
/// Every partition gets `len / workers` nonces and the last one also takes
/// the remainder, so the union is exactly `range`. Ranges shorter than the
/// worker count produce one single-nonce partition per nonce.
pub fn partition(range: Range<u64>, workers: usize) -> SolverResult<Vec<Range<u64>>> {
    if workers == 0 || workers > MAX_WORKERS {
        return Err(SolverError::InvalidWorkerCount);
    }
    if range.start >= range.end {
        return Err(SolverError::InvalidNonceRange {
            start: range.start,
            end: range.end,
        });
    }

    let len = range.end - range.start;
    let count = (workers as u64).min(len);
    let size = len / count;

    Ok((0..count)
        .map(|i| {
            let start = range.start + i * size;
            let end = if i + 1 == count { range.end } else { start + size };
            start..end
        })
        .collect())
}

const RUNNING: u8 = 0;
const FOUND: u8 = 1;
const CANCELLED: u8 = 2;

/// Shared search state and result slot
struct SearchState {
    state: AtomicU8,
    winner: OnceLock<String>,
}

impl SearchState {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(RUNNING),
            winner: OnceLock::new(),
        }
    }

    #[inline(always)]
    fn is_settled(&self) -> bool {
        self.state.load(Ordering::Acquire) != RUNNING
    }

    /// Claim the result slot; only the first claim succeeds
    fn claim(&self, nonce: &str) -> bool {
        if self
            .state
            .compare_exchange(RUNNING, FOUND, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let _ = self.winner.set(nonce.to_owned());
            true
        } else {
            false
        }
    }

    /// Close the search; no-op if a winner already exists
    fn cancel(&self) -> bool {
        self.state
            .compare_exchange(RUNNING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn into_solution(self) -> Solution {
        match (self.state.into_inner(), self.winner.into_inner()) {
            (FOUND, Some(nonce)) => Solution::Found(nonce),
            (CANCELLED, _) => Solution::Cancelled,
            _ => Solution::NotFound,
        }
    }
}

/// Nonce search engine
#[derive(Debug, Clone)]
pub struct SearchEngine {
    workers: usize,
    nonce_range: Range<u64>,
    progress: Option<Arc<AtomicU64>>,
}

impl SearchEngine {
    /// Engine over `nonce_range` with `workers` partitions
    pub fn new(workers: usize, nonce_range: Range<u64>) -> SolverResult<Self> {
        if nonce_range.end > NONCE_SPACE_END {
            return Err(SolverError::InvalidNonceRange {
                start: nonce_range.start,
                end: nonce_range.end,
            });
        }
        // Validates both arguments
        partition(nonce_range.clone(), workers)?;

        Ok(Self {
            workers,
            nonce_range,
            progress: None,
        })
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

    /// Search with the protocol hash oracle
    pub fn search(&self, job: &SearchJob<'_>, cancel: &CancelFlag) -> SolverResult<Solution> {
        self.search_with::<Sha256Checksum>(job, cancel)
    }

    /// Search with a custom hash oracle
    pub fn search_with<C: Checksum>(
        &self,
        job: &SearchJob<'_>,
        cancel: &CancelFlag,
    ) -> SolverResult<Solution> {
        job.parameters.validate()?;
        let partitions = partition(self.nonce_range.clone(), self.workers)?;

        if cancel.is_cancelled() {
            debug!("cancelled before start");
            return Ok(Solution::Cancelled);
        }

        let state = SearchState::new();
        self.run::<C>(&partitions, job, &state, cancel)?;

        let solution = state.into_solution();
        debug!(?solution, "search finished");
        Ok(solution)
    }

    /// One dedicated thread per partition
    #[cfg(feature = "parallel")]
    fn run<C: Checksum>(
        &self,
        partitions: &[Range<u64>],
        job: &SearchJob<'_>,
        state: &SearchState,
        cancel: &CancelFlag,
    ) -> SolverResult<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(partitions.len())
            .thread_name(|i| format!("cscoin-worker-{i}"))
            .build()
            .map_err(|e| SolverError::WorkerPool(e.to_string()))?;

        let span = Span::current();
        let progress = self.progress.as_deref();

        pool.install(|| {
            partitions
                .par_iter()
                .enumerate()
                .for_each(|(worker, range)| {
                    let _guard = span.enter();
                    scan::<C>(worker, range.clone(), job, state, cancel, progress);
                });
        });
        Ok(())
    }

    /// Partitions scanned one after another
    #[cfg(not(feature = "parallel"))]
    fn run<C: Checksum>(
        &self,
        partitions: &[Range<u64>],
        job: &SearchJob<'_>,
        state: &SearchState,
        cancel: &CancelFlag,
    ) -> SolverResult<()> {
        let _guard = Span::current().entered();
        let progress = self.progress.as_deref();

        for (worker, range) in partitions.iter().enumerate() {
            if state.is_settled() {
                break;
            }
            scan::<C>(worker, range.clone(), job, state, cancel, progress);
        }
        Ok(())
    }
}

/// Scan one partition until it is exhausted or the search settles
fn scan<C: Checksum>(
    worker: usize,
    range: Range<u64>,
    job: &SearchJob<'_>,
    state: &SearchState,
    cancel: &CancelFlag,
    progress: Option<&AtomicU64>,
) {
    debug!(worker, start = range.start, end = range.end, "scanning partition");

    let mut candidate = Candidate::new(&job.parameters);
    let mut pending = 0u64;

    for nonce in range {
        if state.is_settled() {
            break;
        }
        if cancel.is_cancelled() {
            if state.cancel() {
                debug!(worker, nonce, "search cancelled");
            }
            break;
        }

        // Range is bounded by NONCE_SPACE_END
        let found = candidate.matches::<C>(job, nonce as u32);

        pending += 1;
        if pending == PROGRESS_BATCH {
            if let Some(progress) = progress {
                progress.fetch_add(pending, Ordering::Relaxed);
            }
            pending = 0;
        }

        if found {
            if state.claim(candidate.nonce_text()) {
                info!(worker, nonce = candidate.nonce_text(), "nonce found");
            }
            break;
        }
    }

    if let Some(progress) = progress {
        progress.fetch_add(pending, Ordering::Relaxed);
    }
    debug!(worker, "partition done");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(range: Range<u64>, workers: usize) {
        let parts = partition(range.clone(), workers).unwrap();
        assert!(!parts.is_empty());
        assert_eq!(parts.first().unwrap().start, range.start);
        assert_eq!(parts.last().unwrap().end, range.end);
        for pair in parts.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "gap or overlap between partitions");
        }
        assert!(parts.iter().all(|p| p.start < p.end));
    }

    #[test]
    fn test_partition_full_space_uneven_workers() {
        // 2^32 is not divisible by any of these
        for workers in [3, 5, 6, 7, 12, 24, 1000] {
            assert_ne!(NONCE_SPACE_END % workers as u64, 0);
            assert_covers(0..NONCE_SPACE_END, workers);
        }
    }

    #[test]
    fn test_partition_last_takes_remainder() {
        let parts = partition(0..NONCE_SPACE_END, 3).unwrap();
        let size = NONCE_SPACE_END / 3;
        assert_eq!(parts[0], 0..size);
        assert_eq!(parts[1], size..2 * size);
        assert_eq!(parts[2], 2 * size..NONCE_SPACE_END);
    }

    #[test]
    fn test_partition_short_range() {
        let parts = partition(10..13, 8).unwrap();
        assert_eq!(parts, vec![10..11, 11..12, 12..13]);
        assert_covers(10..13, 8);
    }

    #[test]
    fn test_partition_rejects_bad_input() {
        assert_eq!(partition(0..10, 0), Err(SolverError::InvalidWorkerCount));
        assert_eq!(
            partition(0..NONCE_SPACE_END, MAX_WORKERS + 1),
            Err(SolverError::InvalidWorkerCount)
        );
        assert_covers(0..NONCE_SPACE_END, MAX_WORKERS);
        assert!(matches!(
            partition(5..5, 2),
            Err(SolverError::InvalidNonceRange { start: 5, end: 5 })
        ));
    }

    #[test]
    fn test_engine_rejects_range_past_nonce_space() {
        assert!(SearchEngine::new(2, 0..NONCE_SPACE_END + 1).is_err());
        assert!(SearchEngine::new(2, 0..NONCE_SPACE_END).is_ok());
    }

    #[test]
    fn test_engine_rejects_oversized_pool() {
        assert_eq!(
            SearchEngine::new(100_000, 0..NONCE_SPACE_END).unwrap_err(),
            SolverError::InvalidWorkerCount
        );
    }

    #[test]
    fn test_state_single_winner() {
        let state = SearchState::new();
        assert!(state.claim("7"));
        assert!(!state.claim("8"));
        assert!(!state.cancel());
        assert_eq!(state.into_solution(), Solution::Found("7".into()));
    }

    #[test]
    fn test_state_cancel_blocks_claim() {
        let state = SearchState::new();
        assert!(state.cancel());
        assert!(!state.claim("7"));
        assert_eq!(state.into_solution(), Solution::Cancelled);
    }

    #[test]
    fn test_cancel_flag_shared_between_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }
}
