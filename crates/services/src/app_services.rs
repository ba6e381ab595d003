use std::sync::Arc;

use quiz_core::model::QuizSettings;
use quiz_core::{DrawOrder, QuestionBank};
use storage::repository::Storage;

use crate::accounts::RegistrationService;
use crate::error::{QuizError, ServicesError};
use crate::leaderboard::LeaderboardService;
use crate::quiz::{QuizEngine, ScoreCommitter, SessionRegistry};
use crate::Clock;

/// Assembles the quiz services around one shared session registry.
#[derive(Clone)]
pub struct QuizServices {
    settings: QuizSettings,
    registry: Arc<SessionRegistry>,
    engine: Arc<QuizEngine>,
    committer: Arc<ScoreCommitter>,
    registration: Arc<RegistrationService>,
    leaderboard: Arc<LeaderboardService>,
}

impl QuizServices {
    /// Wire services over an existing storage backend.
    ///
    /// # Errors
    ///
    /// Returns `ServicesError::BankTooSmall` if the bank cannot fill one quiz.
    pub fn new(
        storage: &Storage,
        bank: QuestionBank,
        settings: QuizSettings,
        clock: Clock,
        draw_order: DrawOrder,
    ) -> Result<Self, ServicesError> {
        let required = usize::try_from(settings.questions_per_quiz()).unwrap_or(usize::MAX);
        if bank.len() < required {
            return Err(ServicesError::BankTooSmall {
                required,
                available: bank.len(),
            });
        }

        let registry = Arc::new(SessionRegistry::new(clock));
        let engine = Arc::new(
            QuizEngine::new(
                clock,
                Arc::clone(&registry),
                Arc::new(bank),
                Arc::clone(&storage.accounts),
                &settings,
            )
            .with_draw_order(draw_order),
        );
        let committer = Arc::new(ScoreCommitter::new(
            clock,
            Arc::clone(&registry),
            Arc::clone(&storage.scores),
        ));
        let registration = Arc::new(RegistrationService::new(
            clock,
            Arc::clone(&storage.accounts),
        ));
        let leaderboard = Arc::new(LeaderboardService::new(
            Arc::clone(&storage.scores),
            settings.leaderboard_size(),
        ));

        Ok(Self {
            settings,
            registry,
            engine,
            committer,
            registration,
            leaderboard,
        })
    }

    /// Build services backed by in-memory storage.
    ///
    /// # Errors
    ///
    /// Returns `ServicesError::BankTooSmall` if the bank cannot fill one quiz.
    pub fn in_memory(
        bank: QuestionBank,
        settings: QuizSettings,
        clock: Clock,
        draw_order: DrawOrder,
    ) -> Result<Self, ServicesError> {
        Self::new(&Storage::in_memory(), bank, settings, clock, draw_order)
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `ServicesError` if storage initialization fails or the bank is too small.
    pub async fn new_sqlite(
        db_url: &str,
        bank: QuestionBank,
        settings: QuizSettings,
        clock: Clock,
    ) -> Result<Self, ServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::new(&storage, bank, settings, clock, DrawOrder::Shuffled)
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    #[must_use]
    pub fn engine(&self) -> Arc<QuizEngine> {
        Arc::clone(&self.engine)
    }

    #[must_use]
    pub fn committer(&self) -> Arc<ScoreCommitter> {
        Arc::clone(&self.committer)
    }

    #[must_use]
    pub fn registration(&self) -> Arc<RegistrationService> {
        Arc::clone(&self.registration)
    }

    #[must_use]
    pub fn leaderboard(&self) -> Arc<LeaderboardService> {
        Arc::clone(&self.leaderboard)
    }

    /// Drop sessions idle past the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::RegistryPoisoned` if the registry lock is poisoned.
    pub fn evict_idle(&self) -> Result<usize, QuizError> {
        self.registry.evict_idle(self.settings.session_idle_timeout())
    }
}
