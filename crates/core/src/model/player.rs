use serde::Serialize;
use thiserror::Error;

use crate::model::account::Username;
use crate::model::ids::AccountRef;

/// Longest display name an anonymous player may choose.
pub const MAX_DISPLAY_NAME_LEN: usize = 32;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlayerError {
    #[error("display name cannot be empty")]
    EmptyDisplayName,

    #[error("display name exceeds {max} characters")]
    DisplayNameTooLong { max: usize },
}

//
// ─── DISPLAY NAME ──────────────────────────────────────────────────────────────
//

/// Name shown for a player who plays without an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    /// Trims surrounding whitespace and validates length.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::EmptyDisplayName` for blank input and
    /// `PlayerError::DisplayNameTooLong` past [`MAX_DISPLAY_NAME_LEN`] characters.
    pub fn parse(raw: &str) -> Result<Self, PlayerError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PlayerError::EmptyDisplayName);
        }
        if trimmed.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(PlayerError::DisplayNameTooLong {
                max: MAX_DISPLAY_NAME_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//
// ─── PLAYER ────────────────────────────────────────────────────────────────────
//

/// Identity of whoever is taking a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Player {
    Anonymous {
        display_name: DisplayName,
    },
    Authenticated {
        account: AccountRef,
        username: Username,
    },
}

impl Player {
    #[must_use]
    pub fn anonymous(display_name: DisplayName) -> Self {
        Self::Anonymous { display_name }
    }

    #[must_use]
    pub fn authenticated(account: AccountRef, username: Username) -> Self {
        Self::Authenticated { account, username }
    }

    /// Name to show on the leaderboard.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Player::Anonymous { display_name } => display_name.as_str(),
            Player::Authenticated { username, .. } => username.as_str(),
        }
    }

    #[must_use]
    pub fn account(&self) -> Option<AccountRef> {
        match self {
            Player::Anonymous { .. } => None,
            Player::Authenticated { account, .. } => Some(*account),
        }
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Player::Anonymous { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_is_trimmed() {
        let name = DisplayName::parse("  alice ").unwrap();
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn blank_display_name_is_rejected() {
        assert_eq!(
            DisplayName::parse("   ").unwrap_err(),
            PlayerError::EmptyDisplayName
        );
    }

    #[test]
    fn long_display_name_is_rejected() {
        let raw = "a".repeat(MAX_DISPLAY_NAME_LEN + 1);
        assert!(matches!(
            DisplayName::parse(&raw),
            Err(PlayerError::DisplayNameTooLong { .. })
        ));
    }

    #[test]
    fn player_serializes_with_kind_tag() {
        let player = Player::anonymous(DisplayName::parse("alice").unwrap());
        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["kind"], "anonymous");
        assert_eq!(json["displayName"], "alice");
        assert!(player.account().is_none());

        let authed = Player::authenticated(AccountRef::new(7), Username::parse("bob_7").unwrap());
        let json = serde_json::to_value(&authed).unwrap();
        assert_eq!(json["kind"], "authenticated");
        assert_eq!(json["account"], 7);
        assert_eq!(authed.name(), "bob_7");
    }
}
