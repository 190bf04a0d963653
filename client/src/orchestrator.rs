//! Simulation runs for a pair of rosters
//!
//! ```text
//! Idle ──run──> Submitting ──> Succeeded(summary)
//!   ▲                     └──> Failed(rejected | transport)
//!   └──────────── reset ◄──────────┘
//! ```

use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use winrate_protocol::{Format, SimulationResponse, SimulationSummary, TeamErrors};
use winrate_team::Roster;

use crate::simulation::{SimulationRequest, SimulationTransport};

/// Why a run ended without a summary
#[derive(Debug, Clone, PartialEq)]
pub enum BattleFailure {
    /// The simulator refused one or both teams
    Rejected(TeamErrors),
    /// The request never completed; safe to retry
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Submitting,
    Succeeded(SimulationSummary),
    Failed(BattleFailure),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunError {
    #[error("A simulation is already running")]
    Busy,

    #[error("Trial count must be at least 1, got {0}")]
    InvalidTrials(u32),

    #[error("Simulator rejected the teams: {}", describe(.0))]
    Rejected(TeamErrors),

    #[error("Simulator unreachable: {0}")]
    Transport(String),
}

impl RunError {
    /// Whether the same run may succeed if simply tried again
    pub fn is_retryable(&self) -> bool {
        matches!(self, RunError::Transport(_) | RunError::Busy)
    }
}

fn describe(errors: &TeamErrors) -> String {
    let sides = [("team 1", &errors.team1), ("team 2", &errors.team2)];
    sides
        .iter()
        .filter_map(|(side, error)| error.as_ref().map(|e| format!("{side}: {e}")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Submits rosters to the simulator, one run at a time.
///
/// A second [`run`](Self::run) while one is submitting is refused with
/// [`RunError::Busy`]. Dropping an in-flight run releases the lock.
pub struct BattleOrchestrator<T> {
    transport: T,
    state: Mutex<RunState>,
}

impl<T: SimulationTransport> BattleOrchestrator<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: Mutex::new(RunState::Idle),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> RunState {
        self.lock().clone()
    }

    pub fn is_submitting(&self) -> bool {
        *self.lock() == RunState::Submitting
    }

    /// Clear a finished run's result or error. No-op while submitting.
    pub fn reset(&self) {
        let mut state = self.lock();
        if *state != RunState::Submitting {
            *state = RunState::Idle;
        }
    }

    pub async fn run(
        &self,
        team1: &Roster,
        team2: &Roster,
        format: Format,
        trials: u32,
    ) -> Result<SimulationSummary, RunError> {
        if trials == 0 {
            return Err(RunError::InvalidTrials(trials));
        }

        let guard = self.begin()?;
        let request = SimulationRequest::new(team1, team2, format, trials);

        tracing::info!(
            format = %format,
            trials,
            team1 = request.team1.len(),
            team2 = request.team2.len(),
            "Submitting simulation"
        );

        let (next, outcome) = match self.transport.submit(&request).await {
            Ok(SimulationResponse::Completed(summary)) => {
                tracing::info!(
                    player1_wins = summary.player1_wins,
                    player2_wins = summary.player2_wins,
                    draws = summary.draws,
                    "Simulation complete"
                );
                (RunState::Succeeded(summary.clone()), Ok(summary))
            }
            Ok(SimulationResponse::Rejected(errors)) => {
                tracing::info!(
                    team1 = ?errors.team1,
                    team2 = ?errors.team2,
                    "Simulator rejected teams"
                );
                (
                    RunState::Failed(BattleFailure::Rejected(errors.clone())),
                    Err(RunError::Rejected(errors)),
                )
            }
            Err(e) => {
                tracing::warn!(error = %e, "Simulation request failed");
                let message = e.to_string();
                (
                    RunState::Failed(BattleFailure::Transport(message.clone())),
                    Err(RunError::Transport(message)),
                )
            }
        };

        guard.finish(next);
        outcome
    }

    fn begin(&self) -> Result<SubmitGuard<'_>, RunError> {
        let mut state = self.lock();
        if *state == RunState::Submitting {
            return Err(RunError::Busy);
        }
        *state = RunState::Submitting;

        Ok(SubmitGuard {
            state: &self.state,
            done: false,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the Submitting state; resets to Idle if the run is abandoned
struct SubmitGuard<'a> {
    state: &'a Mutex<RunState>,
    done: bool,
}

impl SubmitGuard<'_> {
    fn finish(mut self, next: RunState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
        self.done = true;
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if !self.done {
            *self.state.lock().unwrap_or_else(PoisonError::into_inner) = RunState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{HttpSimulator, TransportError};
    use crate::test_support::{CannedServer, closed_url};
    use async_trait::async_trait;
    use futures_util::poll;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;
    use winrate_protocol::WinRates;
    use winrate_team::PokemonSet;

    enum Reply {
        Completed,
        Rejected(TeamErrors),
        Offline,
    }

    struct FakeSimulator {
        reply: Mutex<Reply>,
        calls: AtomicUsize,
        gate: Option<Semaphore>,
    }

    impl FakeSimulator {
        fn replying(reply: Reply) -> Self {
            Self {
                reply: Mutex::new(reply),
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        fn gated(reply: Reply) -> Self {
            Self {
                gate: Some(Semaphore::new(0)),
                ..Self::replying(reply)
            }
        }

        fn set_reply(&self, reply: Reply) {
            *self.reply.lock().unwrap() = reply;
        }
    }

    fn summary() -> SimulationSummary {
        SimulationSummary {
            message: "done".into(),
            average_duration_ms: 12.5,
            draws: 1,
            player1_wins: 55,
            player2_wins: 44,
            win_rates: WinRates {
                player1: 0.55,
                player2: 0.44,
            },
        }
    }

    #[async_trait]
    impl SimulationTransport for FakeSimulator {
        async fn submit(
            &self,
            request: &SimulationRequest,
        ) -> Result<SimulationResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(request.trials > 0);

            if let Some(gate) = &self.gate {
                let _permit = gate.acquire().await.unwrap();
            }

            match &*self.reply.lock().unwrap() {
                Reply::Completed => Ok(SimulationResponse::Completed(summary())),
                Reply::Rejected(errors) => Ok(SimulationResponse::Rejected(errors.clone())),
                Reply::Offline => Err(TransportError::Status {
                    status: 502,
                    body: "Bad Gateway".into(),
                }),
            }
        }
    }

    fn rosters() -> (Roster, Roster) {
        let mut team1 = Roster::new();
        team1.add(PokemonSet::new("Articuno")).unwrap();
        let mut team2 = Roster::new();
        team2.add(PokemonSet::new("Ludicolo")).unwrap();
        (team1, team2)
    }

    #[tokio::test]
    async fn test_success() {
        let orchestrator = BattleOrchestrator::new(FakeSimulator::replying(Reply::Completed));
        let (team1, team2) = rosters();

        let result = orchestrator
            .run(&team1, &team2, Format::Gen9Ou, 100)
            .await
            .unwrap();

        assert_eq!(result, summary());
        assert_eq!(orchestrator.state(), RunState::Succeeded(summary()));
    }

    #[tokio::test]
    async fn test_team1_rejection_leaves_team2_clear() {
        let errors = TeamErrors {
            team1: Some("duplicate species".into()),
            team2: None,
        };
        let orchestrator =
            BattleOrchestrator::new(FakeSimulator::replying(Reply::Rejected(errors.clone())));
        let (team1, team2) = rosters();

        let err = orchestrator
            .run(&team1, &team2, Format::Gen9Ou, 100)
            .await
            .unwrap_err();

        assert_eq!(err, RunError::Rejected(errors.clone()));
        assert_eq!(err.to_string(), "Simulator rejected the teams: team 1: duplicate species");
        assert_eq!(
            orchestrator.state(),
            RunState::Failed(BattleFailure::Rejected(errors))
        );
        assert!(!orchestrator.is_submitting());
    }

    #[tokio::test]
    async fn test_transport_failure_is_its_own_state() {
        let simulator = FakeSimulator::replying(Reply::Offline);
        let orchestrator = BattleOrchestrator::new(simulator);
        let (team1, team2) = rosters();

        let err = orchestrator
            .run(&team1, &team2, Format::Gen9Ou, 10)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(
            orchestrator.state(),
            RunState::Failed(BattleFailure::Transport(_))
        ));

        // lock released, a retry goes through
        orchestrator.transport().set_reply(Reply::Completed);
        assert!(orchestrator.run(&team1, &team2, Format::Gen9Ou, 10).await.is_ok());
        assert_eq!(orchestrator.transport().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reentrant_run_is_refused() {
        let orchestrator = BattleOrchestrator::new(FakeSimulator::gated(Reply::Completed));
        let (team1, team2) = rosters();

        let (first, second) = tokio::join!(
            orchestrator.run(&team1, &team2, Format::Gen9Ou, 100),
            async {
                tokio::task::yield_now().await;
                let second = orchestrator.run(&team1, &team2, Format::Gen9Ou, 100).await;
                orchestrator.transport().gate.as_ref().unwrap().add_permits(1);
                second
            }
        );

        assert!(first.is_ok());
        assert_eq!(second, Err(RunError::Busy));
        assert_eq!(orchestrator.transport().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_run_releases_lock() {
        let orchestrator = BattleOrchestrator::new(FakeSimulator::gated(Reply::Completed));
        let (team1, team2) = rosters();

        let mut pending = Box::pin(orchestrator.run(&team1, &team2, Format::Gen9Ou, 100));
        assert!(poll!(pending.as_mut()).is_pending());
        assert!(orchestrator.is_submitting());

        drop(pending);
        assert_eq!(orchestrator.state(), RunState::Idle);
    }

    #[tokio::test]
    async fn test_zero_trials_rejected_locally() {
        let orchestrator = BattleOrchestrator::new(FakeSimulator::replying(Reply::Completed));
        let (team1, team2) = rosters();

        assert_eq!(
            orchestrator.run(&team1, &team2, Format::Gen9Ou, 0).await,
            Err(RunError::InvalidTrials(0))
        );
        assert_eq!(orchestrator.state(), RunState::Idle);
        assert_eq!(orchestrator.transport().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reset_clears_finished_run() {
        let errors = TeamErrors {
            team1: Some("bad".into()),
            team2: Some("worse".into()),
        };
        let orchestrator =
            BattleOrchestrator::new(FakeSimulator::replying(Reply::Rejected(errors)));
        let (team1, team2) = rosters();

        let err = orchestrator
            .run(&team1, &team2, Format::Gen9Ou, 100)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Simulator rejected the teams: team 1: bad; team 2: worse"
        );

        orchestrator.reset();
        assert_eq!(orchestrator.state(), RunState::Idle);
    }

    #[tokio::test]
    async fn test_http_rejection_is_not_transport_failure() {
        let server = CannedServer::start(400, r#"{"errorTeam2":"Ludicolo is banned"}"#).await;
        let orchestrator = BattleOrchestrator::new(HttpSimulator::new(&server.base_url));
        let (team1, team2) = rosters();

        let err = orchestrator
            .run(&team1, &team2, Format::Gen9Ou, 100)
            .await
            .unwrap_err();

        let errors = TeamErrors {
            team1: None,
            team2: Some("Ludicolo is banned".into()),
        };
        assert_eq!(err, RunError::Rejected(errors.clone()));
        assert!(!err.is_retryable());
        assert_eq!(
            orchestrator.state(),
            RunState::Failed(BattleFailure::Rejected(errors))
        );
    }

    #[tokio::test]
    async fn test_unreachable_simulator_is_transport_failure() {
        let orchestrator = BattleOrchestrator::new(HttpSimulator::new(closed_url().await));
        let (team1, team2) = rosters();

        let err = orchestrator
            .run(&team1, &team2, Format::Gen9Ou, 100)
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Transport(_)));
        assert!(matches!(
            orchestrator.state(),
            RunState::Failed(BattleFailure::Transport(_))
        ));
        assert!(!orchestrator.is_submitting());
    }
}
