//! Challenge descriptions
//!
//! Challenges arrive from the coin authority as JSON documents:
//!
//! ```json
//! {
//!   "challenge_id": 4,
//!   "challenge_name": "sorted_list",
//!   "last_solution_hash": "<64 hex chars>",
//!   "hash_prefix": "8f1a",
//!   "parameters": { "nb_elements": 20 }
//! }
//! ```
//!
//! Shortest path challenges carry `grid_size` and `nb_blockers` instead.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::{ChallengeKind, ChallengeParameters, ChallengeRequest, Solution, SolverError};

/// Errors turning a description into a solvable request
#[derive(Debug, Error)]
pub enum ChallengeError {
    #[error("failed to read challenge file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed challenge description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{kind} challenge is missing parameter `{name}`")]
    MissingParameter {
        kind: ChallengeKind,
        name: &'static str,
    },

    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Challenge-specific parameters, all optional on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb_elements: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb_blockers: Option<usize>,
}

/// Challenge as published by the coin authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeDescription {
    pub challenge_id: u64,
    pub challenge_name: String,
    pub last_solution_hash: String,
    pub hash_prefix: String,
    #[serde(default)]
    pub parameters: ChallengeParams,
}

impl ChallengeDescription {
    /// Parse a JSON description
    pub fn from_json(json: &str) -> Result<Self, ChallengeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON description from disk
    pub fn from_file(path: &Path) -> Result<Self, ChallengeError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Validate into a core request
    ///
    /// Unknown challenge names and missing parameters are rejected here, so
    /// a search never starts on a challenge it cannot compute.
    pub fn to_request(&self) -> Result<ChallengeRequest, ChallengeError> {
        let kind: ChallengeKind = self.challenge_name.parse()?;
        let params = &self.parameters;
        let require = |value: Option<usize>, name: &'static str| {
            value.ok_or(ChallengeError::MissingParameter { kind, name })
        };

        let parameters = match kind {
            ChallengeKind::SortedList => {
                ChallengeParameters::sorted_list(require(params.nb_elements, "nb_elements")?)?
            }
            ChallengeKind::ReverseSortedList => ChallengeParameters::reverse_sorted_list(
                require(params.nb_elements, "nb_elements")?,
            )?,
            ChallengeKind::ShortestPath => ChallengeParameters::shortest_path(
                require(params.grid_size, "grid_size")?,
                require(params.nb_blockers, "nb_blockers")?,
            )?,
        };

        Ok(ChallengeRequest::new(
            self.challenge_id,
            &self.last_solution_hash,
            &self.hash_prefix,
            parameters,
        )?)
    }
}

/// Machine-readable search outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SolutionReport {
    Found { challenge_id: u64, nonce: String },
    NotFound { challenge_id: u64 },
    Cancelled { challenge_id: u64 },
}

impl SolutionReport {
    pub fn new(challenge_id: u64, solution: &Solution) -> Self {
        match solution {
            Solution::Found(nonce) => SolutionReport::Found {
                challenge_id,
                nonce: nonce.clone(),
            },
            Solution::NotFound => SolutionReport::NotFound { challenge_id },
            Solution::Cancelled => SolutionReport::Cancelled { challenge_id },
        }
    }
}
