use thiserror::Error;

use crate::bank::BankError;
use crate::model::{AccountError, PlayerError, QuestionError, ScoreError, SettingsError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Player(#[from] PlayerError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
