//! # CSCoin Core
//!
//! Solver for CSCoin challenges: find a nonce whose challenge payload hashes
//! to a digest starting with a target prefix.
//!
//! ## Pipeline
//!
//! ```text
//! digest1 = SHA256(last_solution_hash_text || decimal(nonce))
//! mt      = MT19937-64 seeded with u64_le(digest1[0..8])
//! digest2 = SHA256(canonical payload of the challenge drawn from mt)
//! solved  = digest2[0..2] == hash_prefix (big-endian hex)
//! ```
//!
//! Every miner must derive the same payload from the same seed, so the
//! generator and the decimal serialization are bit-exact.
//!
//! ## Challenges
//!
//! - `sorted_list` - `nb_elements` draws, ascending
//! - `reverse_sorted_list` - `nb_elements` draws, descending
//! - `shortest_path` - BFS path through a `grid_size` grid with `nb_blockers`
//!
//! ## Example
//!
//! ```rust
//! use cscoin_core::{CancelFlag, ChallengeParameters, ChallengeRequest, Solution, Solver, verify_nonce};
//!
//! let request = ChallengeRequest::new(
//!     1,
//!     &"0".repeat(64),
//!     "00",
//!     ChallengeParameters::sorted_list(3).unwrap(),
//! )
//! .unwrap();
//!
//! let solution = Solver::new()
//!     .with_workers(2)
//!     .solve(&request, &CancelFlag::new())
//!     .unwrap();
//!
//! if let Solution::Found(nonce) = solution {
//!     assert!(verify_nonce(&request, &nonce));
//! }
//! ```

mod challenge;
mod error;
mod mt64;
mod oracle;
mod params;
mod search;
mod solver;

pub mod ffi;

pub use challenge::{
    Cell, ChallengeKind, ChallengeParameters, Grid, Tile, Workspace, feed_reverse_sorted_list,
    feed_shortest_path, feed_sorted_list,
};
pub use error::{SolverError, SolverResult};
pub use mt64::Mt64;
pub use oracle::{Checksum, Digest, Sha256Checksum, digest_prefix, digest_seed};
pub use params::*;
pub use search::{Candidate, CancelFlag, SearchEngine, SearchJob, Solution, partition};
pub use solver::{
    ChallengeRequest, HashPrefix, LastSolutionHash, Solver, candidate_digest, solve_challenge,
    verify_nonce,
};
