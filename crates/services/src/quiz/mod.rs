mod committer;
mod engine;
mod registry;
mod session;

pub use committer::{CommitResult, ScoreCommitter};
pub use engine::QuizEngine;
pub use registry::{SessionRegistry, SessionSlot};
pub use session::{AnswerOutcome, PlayerSession, QuizPhase, SessionSnapshot};
