//! Live quiz sessions keyed by visitor id.
//!
//! The map itself sits behind a short-held `std::sync::Mutex`. Each entry is an
//! `Arc<SessionSlot>` whose async lock serializes every operation on that one
//! session, including awaits on storage.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::MutexGuard as AsyncMutexGuard;

use quiz_core::model::{Player, SessionId};

use crate::error::QuizError;
use crate::quiz::session::PlayerSession;
use crate::Clock;

/// One registry entry. Holding the lock grants exclusive access to the session.
#[derive(Debug)]
pub struct SessionSlot {
    session: AsyncMutex<PlayerSession>,
    evicted: AtomicBool,
}

impl SessionSlot {
    fn new(session: PlayerSession) -> Self {
        Self {
            session: AsyncMutex::new(session),
            evicted: AtomicBool::new(false),
        }
    }

    /// Wait for exclusive access.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::SessionNotFound` if the slot was removed from the
    /// registry while this caller was holding or waiting on it.
    pub async fn lock(&self) -> Result<AsyncMutexGuard<'_, PlayerSession>, QuizError> {
        let guard = self.session.lock().await;
        if self.is_evicted() {
            return Err(QuizError::SessionNotFound);
        }
        Ok(guard)
    }

    #[must_use]
    pub fn is_evicted(&self) -> bool {
        self.evicted.load(Ordering::Acquire)
    }

    fn mark_evicted(&self) {
        self.evicted.store(true, Ordering::Release);
    }
}

#[derive(Debug)]
struct Entry {
    slot: Arc<SessionSlot>,
    last_seen: DateTime<Utc>,
}

/// Owns every live `PlayerSession`.
#[derive(Debug)]
pub struct SessionRegistry {
    clock: Clock,
    entries: Mutex<HashMap<SessionId, Entry>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<SessionId, Entry>>, QuizError> {
        self.entries.lock().map_err(|_| QuizError::RegistryPoisoned)
    }

    /// Insert a fresh zero-score session for `id`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::DuplicateSession` if `id` already has a session.
    pub fn create(&self, id: SessionId, player: Player) -> Result<Arc<SessionSlot>, QuizError> {
        let now = self.clock.now();
        let mut entries = self.entries()?;
        if entries.contains_key(&id) {
            return Err(QuizError::DuplicateSession);
        }
        let slot = Arc::new(SessionSlot::new(PlayerSession::new(id.clone(), player, now)));
        entries.insert(
            id,
            Entry {
                slot: Arc::clone(&slot),
                last_seen: now,
            },
        );
        Ok(slot)
    }

    /// Look up `id` and refresh its last-seen time.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::SessionNotFound` if there is no session for `id`.
    pub fn get(&self, id: &SessionId) -> Result<Arc<SessionSlot>, QuizError> {
        let now = self.clock.now();
        let mut entries = self.entries()?;
        let entry = entries.get_mut(id).ok_or(QuizError::SessionNotFound)?;
        entry.last_seen = now;
        Ok(Arc::clone(&entry.slot))
    }

    /// Drop the session for `id`, if any. Returns whether one was removed.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::RegistryPoisoned` if the map lock is poisoned.
    pub fn remove(&self, id: &SessionId) -> Result<bool, QuizError> {
        let Some(entry) = self.entries()?.remove(id) else {
            return Ok(false);
        };
        entry.slot.mark_evicted();
        Ok(true)
    }

    /// Remove `id` only if it still maps to `slot`.
    ///
    /// A start that replaced the session in the meantime keeps its new entry.
    pub(crate) fn remove_slot(
        &self,
        id: &SessionId,
        slot: &Arc<SessionSlot>,
    ) -> Result<(), QuizError> {
        slot.mark_evicted();
        let mut entries = self.entries()?;
        if entries
            .get(id)
            .is_some_and(|entry| Arc::ptr_eq(&entry.slot, slot))
        {
            entries.remove(id);
        }
        Ok(())
    }

    /// Remove sessions not seen for longer than `max_idle`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::RegistryPoisoned` if the map lock is poisoned.
    pub fn evict_idle(&self, max_idle: Duration) -> Result<usize, QuizError> {
        self.evict_idle_at(self.clock.now(), max_idle)
    }

    /// Same as [`Self::evict_idle`], measured from `now` instead of the registry clock.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::RegistryPoisoned` if the map lock is poisoned.
    pub fn evict_idle_at(
        &self,
        now: DateTime<Utc>,
        max_idle: Duration,
    ) -> Result<usize, QuizError> {
        let mut entries = self.entries()?;
        let before = entries.len();
        entries.retain(|_, entry| {
            let keep = now - entry.last_seen <= max_idle;
            if !keep {
                entry.slot.mark_evicted();
            }
            keep
        });
        Ok(before - entries.len())
    }

    /// # Errors
    ///
    /// Returns `QuizError::RegistryPoisoned` if the map lock is poisoned.
    pub fn len(&self) -> Result<usize, QuizError> {
        Ok(self.entries()?.len())
    }

    /// # Errors
    ///
    /// Returns `QuizError::RegistryPoisoned` if the map lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, QuizError> {
        Ok(self.entries()?.is_empty())
    }
}
