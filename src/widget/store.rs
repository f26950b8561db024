//! In-memory session store: one dialogue session per widget instance.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::dialogue::Session;

/// How often the background sweep looks for idle sessions.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Slot {
    session: Arc<Mutex<Session>>,
    last_seen: Instant,
}

/// Sessions keyed by widget id. Each sits behind its own mutex so a turn
/// in progress can be detected with `try_lock`.
///
/// Widgets closed by the browser never say goodbye, so sessions untouched
/// for longer than `idle_ttl` are dropped by [`SessionStore::expire_idle`].
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Slot>>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
        })
    }

    /// Register a fresh session and return its id.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(
            id,
            Slot {
                session: Arc::new(Mutex::new(Session::new())),
                last_seen: Instant::now(),
            },
        );
        info!(session_id = %id, "Widget session created");
        id
    }

    /// Look up a session and mark it as recently used.
    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<Session>>> {
        let mut sessions = self.sessions.write().await;
        let slot = sessions.get_mut(&id)?;
        slot.last_seen = Instant::now();
        Some(Arc::clone(&slot.session))
    }

    /// Discard a session. Returns false if it did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "Widget session discarded");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for at least `idle_ttl`. A session whose turn is
    /// still running is kept. Returns the number removed.
    pub async fn expire_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, slot| {
            let idle = slot.last_seen.elapsed() >= self.idle_ttl;
            let busy = slot.session.try_lock().is_err();
            if idle && !busy {
                debug!(session_id = %id, "Widget session expired");
                false
            } else {
                true
            }
        });
        let expired = before - sessions.len();
        if expired > 0 {
            info!(count = expired, "Expired idle widget sessions");
        }
        expired
    }
}

/// Spawn a background task that periodically expires idle sessions.
pub fn spawn_expiry_task(store: Arc<SessionStore>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            store.expire_idle().await;
        }
    })
}
