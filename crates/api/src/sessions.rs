//! Registry of open wizard sessions.
//!
//! Each session owns one [`Wizard`] behind its own mutex, so requests for
//! the same session are serialized while different sessions proceed
//! independently. Sessions a client walks away from are dropped by
//! [`start_session_sweeper`] once they sit idle past the configured timeout.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use onboard_core::wizard::Wizard;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

/// Idle time after which a finished session is dropped, whatever the
/// configured timeout.
pub const FINISHED_SESSION_GRACE: Duration = Duration::from_secs(60);

/// Handle to one open wizard.
pub type SessionHandle = Arc<Mutex<Wizard>>;

struct SessionEntry {
    wizard: SessionHandle,
    last_touched: Instant,
}

/// Thread-safe via interior `RwLock`; shared through `AppState` in an `Arc`.
pub struct WizardSessions {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl WizardSessions {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a wizard and return its session id.
    pub async fn open(&self, wizard: Wizard) -> Uuid {
        let id = Uuid::new_v4();
        let entry = SessionEntry {
            wizard: Arc::new(Mutex::new(wizard)),
            last_touched: Instant::now(),
        };
        self.sessions.write().await.insert(id, entry);
        id
    }

    /// Look up a session and mark it as used.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_touched = Instant::now();
        Some(Arc::clone(&entry.wizard))
    }

    /// Drop a session. Returns `false` if it was not open.
    pub async fn close(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Number of open sessions.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Remove sessions idle for at least `idle_timeout`, and finished ones
    /// idle for at least [`FINISHED_SESSION_GRACE`]. Returns how many were
    /// removed.
    ///
    /// A session whose wizard is locked by a request in flight is kept.
    pub async fn prune_idle(&self, idle_timeout: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            let idle = entry.last_touched.elapsed();
            if idle >= idle_timeout {
                return entry.wizard.try_lock().is_err();
            }
            if idle >= FINISHED_SESSION_GRACE {
                return match entry.wizard.try_lock() {
                    Ok(wizard) => !wizard.is_terminal(),
                    Err(_) => true,
                };
            }
            true
        });
        before - sessions.len()
    }
}

impl Default for WizardSessions {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a background task that prunes idle sessions every `interval`.
///
/// Returns the [`JoinHandle`](tokio::task::JoinHandle) so the caller can
/// abort the task during shutdown.
pub fn start_session_sweeper(
    sessions: Arc<WizardSessions>,
    idle_timeout: Duration,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;
            let removed = sessions.prune_idle(idle_timeout).await;
            if removed > 0 {
                let remaining = sessions.count().await;
                tracing::info!(removed, remaining, "Pruned idle wizard sessions");
            }
        }
    })
}
