//! # Application State
//!
//! Shared state for HTTP handlers: the database handle and the in-memory
//! composition sessions.
//!
//! ## Session Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Composition Sessions                             │
//! │                                                                     │
//! │  POST /sales/sessions ──► snapshot catalog, new SaleComposer        │
//! │  ...item / installment calls ──► mutate composer under the lock     │
//! │  POST .../commit ──► mark committing, build payload, persist        │
//! │       │                                                             │
//! │       ├── success ──► session removed                               │
//! │       └── failure ──► committing flag reset, session stays open     │
//! │                                                                     │
//! │  Sessions are transient: a restart loses open drafts, never         │
//! │  committed sales.                                                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! Sessions live in `Arc<Mutex<HashMap>>`. Operations under the lock are
//! quick synchronous composer calls; the lock is never held across an
//! await. The `committing` flag is what makes double-submits fail instead
//! of double-persisting.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use fiado_core::{Product, SaleComposer};
use fiado_db::Database;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SessionStore,
}

/// One open composition session.
pub struct Session {
    /// Catalog snapshot taken when the session opened. Stock checks during
    /// composition run against this; the commit transaction re-checks.
    pub snapshot: Vec<Product>,

    /// The in-progress sale.
    pub composer: SaleComposer,

    /// Set while a commit is in flight; concurrent commits are rejected.
    pub committing: bool,

    /// Updated on every access; the sweeper drops stale sessions.
    pub last_touched: Instant,
}

/// Store of open composition sessions.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        SessionStore::default()
    }

    /// Opens a new session over the given catalog snapshot and returns its
    /// ID. The composition date is today.
    pub fn open(&self, snapshot: Vec<Product>) -> Uuid {
        let id = Uuid::new_v4();
        let session = Session {
            snapshot,
            composer: SaleComposer::new(Utc::now().date_naive()),
            committing: false,
            last_touched: Instant::now(),
        };

        self.lock().insert(id, session);
        debug!(session_id = %id, "Composition session opened");
        id
    }

    /// Runs `f` against the session, refreshing its idle timer. Returns
    /// `None` when the session doesn't exist.
    pub fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(&id)?;
        session.last_touched = Instant::now();
        Some(f(session))
    }

    /// Removes a session. Returns whether it existed.
    pub fn remove(&self, id: Uuid) -> bool {
        let existed = self.lock().remove(&id).is_some();
        if existed {
            debug!(session_id = %id, "Composition session removed");
        }
        existed
    }

    /// Clears the committing flag after a failed commit so the user can fix
    /// the draft and retry.
    pub fn release_commit(&self, id: Uuid) {
        if let Some(session) = self.lock().get_mut(&id) {
            session.committing = false;
        }
    }

    /// Drops sessions idle longer than `ttl`. Sessions mid-commit are
    /// spared. Returns how many were dropped.
    pub fn sweep_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| s.committing || s.last_touched.elapsed() < ttl);
        let dropped = before - sessions.len();

        if dropped > 0 {
            info!(dropped, "Swept idle composition sessions");
        }
        dropped
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no sessions are open.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Session>> {
        // A panic while holding the lock poisons it; the map itself is
        // still consistent because composer mutations are atomic per call.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
