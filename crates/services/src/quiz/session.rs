use chrono::{DateTime, Utc};
use serde::Serialize;

use quiz_core::model::{Player, Question, QuestionView, SessionId};

use crate::error::QuizError;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Where a live session is in the quiz lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
    /// Player identified, no questions yet.
    Started,
    /// Questions assigned and at least one still open.
    Answering,
    /// Every assigned question has been answered.
    Completed,
}

//
// ─── ANSWER OUTCOME ────────────────────────────────────────────────────────────
//

/// Result of grading one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub question_number: usize,
    pub correct: bool,
    pub current_score: u32,
    pub answered: usize,
    pub total: usize,
    pub complete: bool,
}

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

/// Read-only copy of a session's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub player: Player,
    pub phase: QuizPhase,
    pub score: u32,
    pub answered: usize,
    pub total: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

//
// ─── PLAYER SESSION ────────────────────────────────────────────────────────────
//

/// Per-visitor quiz state. Owned by the registry; callers reach it through a
/// locked slot.
#[derive(Debug)]
pub struct PlayerSession {
    id: SessionId,
    player: Player,
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    answered: usize,
    score: u32,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl PlayerSession {
    pub(crate) fn new(id: SessionId, player: Player, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            player,
            questions: Vec::new(),
            answers: Vec::new(),
            answered: 0,
            score: 0,
            started_at,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.answered
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn has_questions(&self) -> bool {
        !self.questions.is_empty()
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        if self.questions.is_empty() {
            QuizPhase::Started
        } else if self.answered == self.questions.len() {
            QuizPhase::Completed
        } else {
            QuizPhase::Answering
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase() == QuizPhase::Completed
    }

    /// Client-facing views of the assigned questions, numbered from zero.
    #[must_use]
    pub fn question_views(&self) -> Vec<QuestionView> {
        self.questions
            .iter()
            .enumerate()
            .map(|(number, q)| q.view(number))
            .collect()
    }

    /// Attach the quiz's questions. Only valid once, with at least one question.
    pub(crate) fn assign(&mut self, questions: Vec<Question>) -> Result<(), QuizError> {
        if self.has_questions() {
            return Err(QuizError::AlreadyAssigned);
        }
        if questions.is_empty() {
            return Err(QuizError::InsufficientQuestions {
                requested: 0,
                available: 0,
            });
        }
        self.answers = vec![None; questions.len()];
        self.questions = questions;
        Ok(())
    }

    /// Grade `chosen` for question `number`.
    ///
    /// A `chosen` index past the question's options is graded as wrong, not rejected.
    pub(crate) fn record_answer(
        &mut self,
        number: usize,
        chosen: usize,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, QuizError> {
        if !self.has_questions() {
            return Err(QuizError::QuestionsNotAssigned);
        }
        let total = self.questions.len();
        let Some(question) = self.questions.get(number) else {
            return Err(QuizError::QuestionIndexOutOfRange { number, total });
        };
        let correct = question.is_correct(chosen);

        let slot = &mut self.answers[number];
        if slot.is_some() {
            return Err(QuizError::DuplicateAnswer { number });
        }
        *slot = Some(chosen);

        self.answered += 1;
        if correct {
            self.score += 1;
        }
        if self.answered == total {
            self.completed_at = Some(now);
        }

        Ok(AnswerOutcome {
            question_number: number,
            correct,
            current_score: self.score,
            answered: self.answered,
            total,
            complete: self.is_complete(),
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            player: self.player.clone(),
            phase: self.phase(),
            score: self.score,
            answered: self.answered,
            total: self.total(),
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }
}
