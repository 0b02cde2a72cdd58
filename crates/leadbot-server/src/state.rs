use chrono::{DateTime, Utc};
use leadbot_core::config::Config;
use leadbot_core::gate::AccessGate;
use leadbot_core::questionnaire::{Session, SessionView};
use leadbot_core::store::LeadStore;
use leadbot_core::webhook::WebhookClient;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gate: Arc<AccessGate>,
    pub store: Arc<LeadStore>,
    pub webhook: Arc<WebhookClient>,
    pub sessions: SessionRegistry,
}

impl AppState {
    /// Wire up state from a loaded config. Relative store paths resolve
    /// against `root`. Performs no I/O.
    pub fn new(root: &Path, config: Config) -> Self {
        let gate = AccessGate::new(&config.password);
        let store = LeadStore::open(config.store_path_in(root));
        let webhook = WebhookClient::new(
            config.webhook.url.clone(),
            Duration::from_secs(config.webhook.timeout_secs),
        );
        let minutes = config
            .session
            .idle_ttl_minutes
            .min(leadbot_core::config::MAX_IDLE_TTL_MINUTES);
        let idle_ttl = chrono::Duration::minutes(minutes as i64);
        let sessions = SessionRegistry::new(idle_ttl, config.session.max_sessions.max(1));
        Self {
            config: Arc::new(config),
            gate: Arc::new(gate),
            store: Arc::new(store),
            webhook: Arc::new(webhook),
            sessions,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionRegistry
// ---------------------------------------------------------------------------

struct Entry {
    session: Session,
    last_seen: DateTime<Utc>,
}

/// Per-visitor session contexts keyed by the session cookie value.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
    idle_ttl: chrono::Duration,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(idle_ttl: chrono::Duration, max_sessions: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
            max_sessions,
        }
    }

    /// Start a fresh session and return its id. Idle sessions are pruned
    /// first; at capacity the least recently seen session is evicted.
    pub async fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut map = self.inner.write().await;
        let before = map.len();
        map.retain(|_, e| now - e.last_seen < self.idle_ttl);
        let pruned = before - map.len();
        if pruned > 0 {
            tracing::debug!(pruned, "dropped idle sessions");
        }
        while map.len() >= self.max_sessions {
            let Some(oldest) = map
                .iter()
                .min_by_key(|(_, e)| e.last_seen)
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            map.remove(&oldest);
            tracing::warn!(max = self.max_sessions, "session limit reached, evicted oldest");
        }
        map.insert(
            id.clone(),
            Entry {
                session: Session::new(),
                last_seen: now,
            },
        );
        id
    }

    /// Mark the session as seen. Returns false for unknown or expired ids.
    pub async fn touch(&self, id: &str) -> bool {
        let now = Utc::now();
        let mut map = self.inner.write().await;
        match map.get_mut(id) {
            Some(entry) if now - entry.last_seen < self.idle_ttl => {
                entry.last_seen = now;
                true
            }
            Some(_) => {
                map.remove(id);
                false
            }
            None => false,
        }
    }

    /// Run `f` against the session. `None` if the id is unknown.
    pub async fn with_session<F, R>(&self, id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut map = self.inner.write().await;
        let entry = map.get_mut(id)?;
        entry.last_seen = Utc::now();
        Some(f(&mut entry.session))
    }

    pub async fn view(&self, id: &str) -> Option<SessionView> {
        let map = self.inner.read().await;
        map.get(id).map(|e| e.session.view())
    }

    pub async fn is_authenticated(&self, id: &str) -> bool {
        let map = self.inner.read().await;
        map.get(id)
            .map(|e| e.session.is_authenticated())
            .unwrap_or(false)
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    #[cfg(test)]
    pub(crate) async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
