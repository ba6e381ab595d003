//! Question bank: the fixed pool quizzes are drawn from.

use rand::Rng;
use thiserror::Error;

use crate::model::{Question, QuestionDraft, QuestionError};

const BUILTIN_QUESTIONS: &str = include_str!("../data/questions.json");

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankError {
    #[error("question bank is not valid JSON: {0}")]
    Parse(String),

    #[error("question {index} is invalid: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },

    #[error("question bank is empty")]
    Empty,

    #[error("requested {requested} questions but the bank holds {available}")]
    InsufficientQuestions { requested: usize, available: usize },
}

/// How a draw orders the questions it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawOrder {
    /// Random distinct questions in random order.
    #[default]
    Shuffled,
    /// The first `count` questions in bank order.
    Sequential,
}

//
// ─── BANK ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Parse a JSON array of `{prompt, options, correct_index}` objects.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Parse` for malformed JSON, `BankError::InvalidQuestion`
    /// naming the first bad entry, or `BankError::Empty` for an empty array.
    pub fn from_json(text: &str) -> Result<Self, BankError> {
        let drafts: Vec<QuestionDraft> =
            serde_json::from_str(text).map_err(|e| BankError::Parse(e.to_string()))?;
        if drafts.is_empty() {
            return Err(BankError::Empty);
        }
        let questions = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                draft
                    .validate()
                    .map_err(|source| BankError::InvalidQuestion { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { questions })
    }

    /// The general-knowledge set shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns `BankError` if the bundled file fails validation.
    pub fn builtin() -> Result<Self, BankError> {
        Self::from_json(BUILTIN_QUESTIONS)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Draw `count` distinct questions using the thread-local RNG.
    ///
    /// # Errors
    ///
    /// Returns `BankError::InsufficientQuestions` if the bank is too small.
    pub fn draw(&self, count: usize, order: DrawOrder) -> Result<Vec<Question>, BankError> {
        self.draw_with(count, order, &mut rand::rng())
    }

    /// Draw `count` distinct questions with a caller-supplied RNG.
    ///
    /// Each call is independent: nothing about earlier draws is remembered.
    ///
    /// # Errors
    ///
    /// Returns `BankError::InsufficientQuestions` if the bank is too small.
    pub fn draw_with<R: Rng + ?Sized>(
        &self,
        count: usize,
        order: DrawOrder,
        rng: &mut R,
    ) -> Result<Vec<Question>, BankError> {
        if count > self.questions.len() {
            return Err(BankError::InsufficientQuestions {
                requested: count,
                available: self.questions.len(),
            });
        }

        let drawn = match order {
            DrawOrder::Sequential => self.questions[..count].to_vec(),
            DrawOrder::Shuffled => rand::seq::index::sample(rng, self.questions.len(), count)
                .into_iter()
                .map(|i| self.questions[i].clone())
                .collect(),
        };
        Ok(drawn)
    }
}
