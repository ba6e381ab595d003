use std::sync::Arc;

use services::{
    LeaderboardService, QuizEngine, QuizServices, RegistrationService, ScoreCommitter,
    SessionRegistry,
};

use crate::session::cookie_max_age;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub engine: Arc<QuizEngine>,
    pub committer: Arc<ScoreCommitter>,
    pub registration: Arc<RegistrationService>,
    pub leaderboard: Arc<LeaderboardService>,
    pub cookie_max_age: time::Duration,
}

impl AppState {
    #[must_use]
    pub fn new(services: &QuizServices) -> Self {
        Self {
            registry: services.registry(),
            engine: services.engine(),
            committer: services.committer(),
            registration: services.registration(),
            leaderboard: services.leaderboard(),
            cookie_max_age: cookie_max_age(services.settings().session_idle_timeout()),
        }
    }
}
