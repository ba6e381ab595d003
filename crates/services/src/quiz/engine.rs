use std::sync::Arc;
use tracing::{debug, info, warn};

use quiz_core::model::{DisplayName, Player, QuestionView, QuizSettings, SessionId};
use quiz_core::{BankError, DrawOrder, QuestionBank};
use storage::repository::{AccountService, VerifiedAccount};

use crate::error::QuizError;
use crate::quiz::registry::SessionRegistry;
use crate::quiz::session::{AnswerOutcome, SessionSnapshot};
use crate::Clock;

/// Runs the quiz state machine on top of the session registry.
///
/// Every operation looks its session up afresh and holds that session's lock
/// until it returns.
#[derive(Clone)]
pub struct QuizEngine {
    clock: Clock,
    registry: Arc<SessionRegistry>,
    bank: Arc<QuestionBank>,
    accounts: Arc<dyn AccountService>,
    questions_per_quiz: usize,
    draw_order: DrawOrder,
}

impl QuizEngine {
    #[must_use]
    pub fn new(
        clock: Clock,
        registry: Arc<SessionRegistry>,
        bank: Arc<QuestionBank>,
        accounts: Arc<dyn AccountService>,
        settings: &QuizSettings,
    ) -> Self {
        Self {
            clock,
            registry,
            bank,
            accounts,
            questions_per_quiz: usize::try_from(settings.questions_per_quiz())
                .unwrap_or(usize::MAX),
            draw_order: DrawOrder::default(),
        }
    }

    /// Choose how questions are drawn from the bank.
    #[must_use]
    pub fn with_draw_order(mut self, order: DrawOrder) -> Self {
        self.draw_order = order;
        self
    }

    #[must_use]
    pub fn questions_per_quiz(&self) -> usize {
        self.questions_per_quiz
    }

    /// Begin a quiz for a visitor without an account.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidDisplayName` for a blank or overlong name and
    /// `QuizError::DuplicateSession` if `id` already has a session.
    pub async fn start_anonymous(
        &self,
        id: SessionId,
        display_name: &str,
    ) -> Result<SessionSnapshot, QuizError> {
        let name = DisplayName::parse(display_name).map_err(QuizError::InvalidDisplayName)?;
        self.start(id, Player::anonymous(name)).await
    }

    /// Begin a quiz for an account whose credentials were already checked.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::DuplicateSession` if `id` already has a session.
    pub async fn start_authenticated(
        &self,
        id: SessionId,
        account: VerifiedAccount,
    ) -> Result<SessionSnapshot, QuizError> {
        self.start(id, Player::authenticated(account.account, account.username))
            .await
    }

    /// Check a username/password pair against the account service.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AuthenticationFailed` for unknown users or wrong
    /// passwords and `QuizError::Storage` if the account lookup fails.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<VerifiedAccount, QuizError> {
        match self.accounts.verify_credentials(username, password).await? {
            Some(account) => Ok(account),
            None => {
                warn!(username, "login rejected");
                Err(QuizError::AuthenticationFailed)
            }
        }
    }

    /// Check credentials, then begin a quiz for that account.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::authenticate`], or with `QuizError::DuplicateSession`
    /// if `id` already has a session.
    pub async fn login(
        &self,
        id: SessionId,
        username: &str,
        password: &str,
    ) -> Result<SessionSnapshot, QuizError> {
        let account = self.authenticate(username, password).await?;
        self.start_authenticated(id, account).await
    }

    async fn start(&self, id: SessionId, player: Player) -> Result<SessionSnapshot, QuizError> {
        let slot = self.registry.create(id, player)?;
        let session = slot.lock().await?;
        info!(
            session = %session.id(),
            player = session.player().name(),
            anonymous = session.player().is_anonymous(),
            "quiz started"
        );
        Ok(session.snapshot())
    }

    /// Draw this session's questions and return what the player may see of them.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::SessionNotFound`, `QuizError::AlreadyAssigned` on a
    /// second call, or `QuizError::InsufficientQuestions` if the bank is too small.
    pub async fn assign_questions(&self, id: &SessionId) -> Result<Vec<QuestionView>, QuizError> {
        let slot = self.registry.get(id)?;
        let mut session = slot.lock().await?;
        if session.has_questions() {
            return Err(QuizError::AlreadyAssigned);
        }

        let questions = self
            .bank
            .draw(self.questions_per_quiz, self.draw_order)
            .map_err(|e| match e {
                BankError::InsufficientQuestions {
                    requested,
                    available,
                } => QuizError::InsufficientQuestions {
                    requested,
                    available,
                },
                _ => QuizError::InsufficientQuestions {
                    requested: self.questions_per_quiz,
                    available: self.bank.len(),
                },
            })?;
        session.assign(questions)?;

        debug!(session = %id, count = session.total(), "questions assigned");
        Ok(session.question_views())
    }

    /// Grade one answer.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::SessionNotFound`, `QuizError::QuestionsNotAssigned`,
    /// `QuizError::QuestionIndexOutOfRange`, or `QuizError::DuplicateAnswer`.
    pub async fn validate_answer(
        &self,
        id: &SessionId,
        question_number: usize,
        chosen_index: usize,
    ) -> Result<AnswerOutcome, QuizError> {
        let slot = self.registry.get(id)?;
        let mut session = slot.lock().await?;
        let outcome = session.record_answer(question_number, chosen_index, self.clock.now())?;

        debug!(
            session = %id,
            question = question_number,
            correct = outcome.correct,
            score = outcome.current_score,
            "answer graded"
        );
        if outcome.complete {
            info!(
                session = %id,
                score = outcome.current_score,
                total = outcome.total,
                "quiz completed"
            );
        }
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Returns `QuizError::SessionNotFound` if there is no session for `id`.
    pub async fn snapshot(&self, id: &SessionId) -> Result<SessionSnapshot, QuizError> {
        let slot = self.registry.get(id)?;
        let session = slot.lock().await?;
        Ok(session.snapshot())
    }
}
