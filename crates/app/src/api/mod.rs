//! HTTP handlers.

pub mod accounts;
pub mod leaderboard;
pub mod quiz;
