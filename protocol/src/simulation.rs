//! Simulation service responses
//!
//! The service answers with one of two JSON shapes: a completed run with
//! aggregate statistics, or a rejection carrying a reason for either team.
//! [`SimulationResponse`] decodes the body once into a tagged union so
//! callers never inspect individual fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ParseError;

/// Aggregate statistics of a completed simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    #[serde(default)]
    pub message: String,
    pub average_duration_ms: f64,
    pub draws: u32,
    pub player1_wins: u32,
    pub player2_wins: u32,
    pub win_rates: WinRates,
}

impl SimulationSummary {
    /// Total number of battles the run reported on
    pub fn battles(&self) -> u32 {
        self.player1_wins
            .saturating_add(self.player2_wins)
            .saturating_add(self.draws)
    }
}

/// Win-rate fractions in `[0, 1]` per player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinRates {
    pub player1: f64,
    pub player2: f64,
}

/// Per-team rejection reasons; either side may be absent independently
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamErrors {
    #[serde(rename = "errorTeam1", default, skip_serializing_if = "Option::is_none")]
    pub team1: Option<String>,
    #[serde(rename = "errorTeam2", default, skip_serializing_if = "Option::is_none")]
    pub team2: Option<String>,
}

impl TeamErrors {
    pub fn is_empty(&self) -> bool {
        self.team1.is_none() && self.team2.is_none()
    }
}

/// A decoded simulation response
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawResponse")]
pub enum SimulationResponse {
    Completed(SimulationSummary),
    Rejected(TeamErrors),
}

impl SimulationResponse {
    /// Parse a response body.
    ///
    /// A body that is not a JSON object is `InvalidFormat`; a success body
    /// lacking one of its statistics is `MissingField`.
    pub fn parse(body: &str) -> Result<Self, ParseError> {
        let raw: RawResponse =
            serde_json::from_str(body).map_err(|e| ParseError::InvalidFormat(e.to_string()))?;
        raw.try_into()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResponse {
    #[serde(default)]
    error_team1: Option<String>,
    #[serde(default)]
    error_team2: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl TryFrom<RawResponse> for SimulationResponse {
    type Error = ParseError;

    fn try_from(raw: RawResponse) -> Result<Self, Self::Error> {
        // Empty reasons carry no information and do not count as a rejection
        let errors = TeamErrors {
            team1: raw.error_team1.filter(|e| !e.is_empty()),
            team2: raw.error_team2.filter(|e| !e.is_empty()),
        };

        if !errors.is_empty() {
            return Ok(SimulationResponse::Rejected(errors));
        }

        for field in ["averageDurationMs", "draws", "player1Wins", "player2Wins", "winRates"] {
            if !raw.rest.contains_key(field) {
                return Err(ParseError::MissingField(field.to_string()));
            }
        }

        serde_json::from_value(Value::Object(raw.rest))
            .map(SimulationResponse::Completed)
            .map_err(|e| ParseError::InvalidFormat(e.to_string()))
    }
}
