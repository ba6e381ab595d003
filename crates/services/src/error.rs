//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{AccountError, PlayerError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the quiz lifecycle: registry, engine and committer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no quiz session for this visitor")]
    SessionNotFound,
    #[error("a quiz session already exists for this visitor")]
    DuplicateSession,
    #[error("questions were already assigned to this session")]
    AlreadyAssigned,
    #[error("no questions have been assigned to this session")]
    QuestionsNotAssigned,
    #[error("question {number} is out of range (quiz has {total} questions)")]
    QuestionIndexOutOfRange { number: usize, total: usize },
    #[error("question {number} was already answered")]
    DuplicateAnswer { number: usize },
    #[error("requested {requested} questions but only {available} are available")]
    InsufficientQuestions { requested: usize, available: usize },
    #[error("invalid display name: {0}")]
    InvalidDisplayName(#[source] PlayerError),
    #[error("invalid username or password")]
    AuthenticationFailed,
    #[error("quiz result could not be stored: {0}")]
    PersistenceFailed(#[source] StorageError),
    #[error("session registry lock poisoned")]
    RegistryPoisoned,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `RegistrationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistrationError {
    #[error("invalid username: {0}")]
    InvalidUsername(#[source] AccountError),
    #[error("username is already taken")]
    UsernameTaken,
    #[error("invalid password: {0}")]
    InvalidPassword(#[source] AccountError),
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping quiz services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error("question bank holds {available} questions but each quiz needs {required}")]
    BankTooSmall { required: usize, available: usize },
}
