//! Service state management.
//!
//! Contains the SessionRegistry and shared service state.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::policy::ReadingClock;
use crate::session::BoardSession;
use crate::store::RatingStore;

/// Default number of open sessions kept before the oldest is evicted.
pub const DEFAULT_SESSION_CAPACITY: usize = 256;

/// Handle to one open session.
///
/// The async mutex serializes gestures on a session; it is released while a
/// save waits on the store.
pub type SessionHandle = Arc<tokio::sync::Mutex<BoardSession>>;

/// Session registry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum open sessions.
    pub capacity: usize,
}

impl SessionConfig {
    /// Read `SESSION_CAPACITY` from the environment.
    pub fn from_env() -> Self {
        let capacity = std::env::var("SESSION_CAPACITY")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_SESSION_CAPACITY);
        Self { capacity }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { capacity: DEFAULT_SESSION_CAPACITY }
    }
}

/// Open sessions, least recently used evicted first.
///
/// Eviction discards the session's unsaved edits, the same as abandoning it.
pub struct SessionRegistry {
    sessions: Mutex<LruCache<Uuid, SessionHandle>>,
    capacity: usize,
}

impl SessionRegistry {
    /// Create a registry holding at most `capacity` sessions.
    pub fn new(capacity: usize) -> Self {
        let size = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(size)),
            capacity: size.get(),
        }
    }

    /// Register a session and return its id.
    pub fn insert(&self, session: BoardSession) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = Arc::new(tokio::sync::Mutex::new(session));

        if let Some((evicted, _)) = self.sessions.lock().push(id, Arc::clone(&handle)) {
            if evicted != id {
                tracing::warn!(session_id = %evicted, "Evicted idle board session");
            }
        }
        (id, handle)
    }

    /// Look up a session, marking it recently used.
    pub fn get(&self, id: &Uuid) -> Option<SessionHandle> {
        self.sessions.lock().get(id).cloned()
    }

    /// Drop a session without saving.
    pub fn remove(&self, id: &Uuid) -> Option<SessionHandle> {
        self.sessions.lock().pop(id)
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Whether no session is open.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum open sessions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Shared service state.
///
/// Contains the rating store, the open sessions, and an optional fixed clock
/// for deciding which readings are finished.
pub struct ServiceState<S: RatingStore + 'static> {
    /// The rating store for board loads and saves.
    pub store: Arc<S>,
    /// Open editing sessions.
    pub sessions: Arc<SessionRegistry>,
    clock: Option<ReadingClock>,
}

impl<S: RatingStore + 'static> ServiceState<S> {
    /// Create service state with a store and registry settings.
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self {
            store: Arc::new(store),
            sessions: Arc::new(SessionRegistry::new(config.capacity)),
            clock: None,
        }
    }

    /// Create service state with registry settings from the environment.
    pub fn from_env(store: S) -> Self {
        Self::new(store, SessionConfig::from_env())
    }

    /// Pin the clock instead of reading the system time per request.
    pub fn with_clock(mut self, clock: ReadingClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Clock used when opening a board.
    pub fn clock(&self) -> ReadingClock {
        self.clock.unwrap_or_else(ReadingClock::now)
    }
}

impl<S: RatingStore + 'static> Clone for ServiceState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            sessions: Arc::clone(&self.sessions),
            clock: self.clock,
        }
    }
}
