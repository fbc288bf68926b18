//! CSCoin Solver Library
//!
//! Finds nonces for CSCoin challenges.
//!
//! # Overview
//!
//! A challenge names a payload generator (`sorted_list`,
//! `reverse_sorted_list` or `shortest_path`), the hash of the previously
//! accepted solution and a 16-bit hash prefix. The solver searches the
//! 32-bit nonce space in parallel for a nonce whose payload digest starts
//! with that prefix.
//!
//! # Example
//!
//! ```rust
//! use cscoin::challenge::ChallengeDescription;
//! use cscoin::algorithm::{verify_nonce, CancelFlag, Solver};
//!
//! let json = format!(
//!     r#"{{"challenge_id": 1, "challenge_name": "sorted_list",
//!         "last_solution_hash": "{}", "hash_prefix": "00",
//!         "parameters": {{"nb_elements": 3}}}}"#,
//!     "0".repeat(64)
//! );
//! let request = ChallengeDescription::from_json(&json)
//!     .unwrap()
//!     .to_request()
//!     .unwrap();
//!
//! let solution = Solver::new().solve(&request, &CancelFlag::new()).unwrap();
//! if let Some(nonce) = solution.nonce() {
//!     assert!(verify_nonce(&request, nonce));
//! }
//! ```

// Re-export the core algorithm
pub use cscoin_core as algorithm;

pub mod challenge;
pub mod config;

#[cfg(feature = "cli")]
pub mod logging;

// Convenience re-exports
pub use algorithm::{CancelFlag, ChallengeRequest, Solution, Solver};
