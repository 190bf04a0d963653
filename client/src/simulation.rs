//! Outbound simulation requests and the transport that carries them

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use winrate_protocol::{Format, SimulationResponse};
use winrate_team::{PokemonSet, Roster};

pub const DEFAULT_SIMULATOR_URL: &str = "http://localhost:3000/simulate";

/// Both teams plus run settings, as sent to the simulator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRequest {
    pub team1: Vec<PokemonSet>,
    pub team2: Vec<PokemonSet>,
    pub format: Format,
    pub trials: u32,
}

impl SimulationRequest {
    pub fn new(team1: &Roster, team2: &Roster, format: Format, trials: u32) -> Self {
        Self {
            team1: team1.to_sets(),
            team2: team2.to_sets(),
            format,
            trials,
        }
    }
}

/// The request never produced a usable response
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Simulator request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Simulator answered HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Simulator response could not be decoded: {0}")]
    Decode(#[from] winrate_protocol::ParseError),
}

/// Carries a [`SimulationRequest`] to the simulator
#[async_trait]
pub trait SimulationTransport: Send + Sync {
    async fn submit(&self, request: &SimulationRequest) -> Result<SimulationResponse, TransportError>;
}

/// [`SimulationTransport`] posting JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpSimulator {
    http: reqwest::Client,
    url: String,
}

impl HttpSimulator {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SimulationTransport for HttpSimulator {
    async fn submit(&self, request: &SimulationRequest) -> Result<SimulationResponse, TransportError> {
        let response = self.http.post(&self.url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Team rejections may come back with an error status, so the body is
        // decoded first and the status only matters when that fails
        match SimulationResponse::parse(&body) {
            Ok(decoded) => Ok(decoded),
            Err(_) if !status.is_success() => Err(TransportError::Status {
                status: status.as_u16(),
                body,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CannedServer, closed_url};
    use serde_json::json;
    use winrate_protocol::TeamErrors;
    use winrate_team::EvSpread;

    #[test]
    fn test_request_wire_shape() {
        let mut team1 = Roster::new();
        let mut articuno = PokemonSet::new("Articuno");
        articuno.item = Some("Leftovers".into());
        articuno.evs = EvSpread {
            hp: 252,
            atk: 0,
            def: 0,
            spa: 252,
            spd: 4,
            spe: 0,
        };
        articuno.moves = vec!["Ice Beam".into(), "Roost".into()];
        team1.add(articuno).unwrap();

        let mut team2 = Roster::new();
        team2.add(PokemonSet::new("Ludicolo")).unwrap();

        let request = SimulationRequest::new(&team1, &team2, Format::Gen9Ou, 100);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "team1": [{
                    "species": "Articuno",
                    "item": "Leftovers",
                    "evs": { "hp": 252, "atk": 0, "def": 0, "spa": 252, "spd": 4, "spe": 0 },
                    "moves": ["Ice Beam", "Roost"]
                }],
                "team2": [{
                    "species": "Ludicolo",
                    "evs": { "hp": 0, "atk": 0, "def": 0, "spa": 0, "spd": 0, "spe": 0 },
                    "moves": []
                }],
                "format": "gen9ou",
                "trials": 100
            })
        );
    }

    fn request() -> SimulationRequest {
        let mut team1 = Roster::new();
        team1.add(PokemonSet::new("Articuno")).unwrap();
        let mut team2 = Roster::new();
        team2.add(PokemonSet::new("Ludicolo")).unwrap();
        SimulationRequest::new(&team1, &team2, Format::Gen9Ou, 50)
    }

    #[tokio::test]
    async fn test_http_completed_run() {
        let body = json!({
            "message": "Simulation complete",
            "averageDurationMs": 30.0,
            "draws": 0,
            "player1Wins": 30,
            "player2Wins": 20,
            "winRates": { "player1": 0.6, "player2": 0.4 }
        })
        .to_string();
        let server = CannedServer::start(200, &body).await;
        let simulator = HttpSimulator::new(format!("{}/simulate", server.base_url));

        let response = simulator.submit(&request()).await.unwrap();
        assert!(matches!(response, SimulationResponse::Completed(s) if s.player1_wins == 30));
        assert_eq!(server.requests(), vec!["POST /simulate HTTP/1.1"]);
    }

    #[tokio::test]
    async fn test_http_rejection_with_error_status_is_decoded() {
        let body = json!({ "errorTeam1": "Articuno has more than 4 moves" }).to_string();
        let server = CannedServer::start(400, &body).await;
        let simulator = HttpSimulator::new(&server.base_url);

        let response = simulator.submit(&request()).await.unwrap();
        assert_eq!(
            response,
            SimulationResponse::Rejected(TeamErrors {
                team1: Some("Articuno has more than 4 moves".into()),
                team2: None,
            })
        );
    }

    #[tokio::test]
    async fn test_http_error_page_is_status_failure() {
        let server = CannedServer::start(502, "<html>Bad Gateway</html>").await;
        let simulator = HttpSimulator::new(&server.base_url);

        let err = simulator.submit(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Status { status: 502, ref body } if body.contains("Bad Gateway")
        ));
    }

    #[tokio::test]
    async fn test_http_undecodable_success_is_decode_failure() {
        let server = CannedServer::start(200, r#"{"message":"ok"}"#).await;
        let simulator = HttpSimulator::new(&server.base_url);

        let err = simulator.submit(&request()).await.unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[tokio::test]
    async fn test_http_unreachable_simulator() {
        let simulator = HttpSimulator::new(closed_url().await);

        let err = simulator.submit(&request()).await.unwrap_err();
        assert!(matches!(err, TransportError::Http(_)));
    }
}
