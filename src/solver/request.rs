//! The `/solve` request body.

use serde::Deserialize;
use serde_json::Value;

use super::contract::MaxSolveTime;

/// A client's request to solve one SBC.
///
/// `sbc_data` and `club_players` belong to the solver and are carried through
/// untouched, and so is `max_solve_time`. All three fields are required;
/// anything beyond presence is the solver's problem.
///
/// ```json
/// {"sbcData": {...}, "clubPlayers": [...], "maxSolveTime": 60}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    /// The challenge configuration.
    pub sbc_data: Value,

    /// The roster the solver may pick from.
    pub club_players: Value,

    /// Time budget handed to the solver.
    pub max_solve_time: MaxSolveTime,
}

impl SolveRequest {
    /// Parses a request from a raw JSON body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}
