//! In-memory TTL store backing shareable shopping-list links.
//!
//! Links are short-lived by design, so entries live in process memory and
//! expire after a fixed TTL. There is no background sweeper: expired entries
//! are evicted lazily whenever the store is touched, which bounds the map at
//! the number of links created within one TTL window.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct ShareEntry {
    content: String,
    expires_at: Instant,
}

/// Shared handle to the TTL store; clones point at the same map.
#[derive(Debug, Clone)]
pub struct ShareLinkStore {
    ttl: Duration,
    entries: Arc<std::sync::Mutex<HashMap<Uuid, ShareEntry>>>,
}

impl ShareLinkStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(std::sync::Mutex::new(HashMap::new())),
        }
    }

    /// Stores `content` under a fresh id, evicting anything already expired.
    pub fn insert(&self, content: String) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("share store lock poisoned");
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            id,
            ShareEntry {
                content,
                expires_at: now + self.ttl,
            },
        );
        id
    }

    /// Looks up a link, returning `None` once its TTL has elapsed.
    pub fn get(&self, id: Uuid) -> Option<String> {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("share store lock poisoned");
        entries.retain(|_, e| e.expires_at > now);
        entries.get(&id).map(|e| e.content.clone())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().expect("share store lock poisoned").len()
    }
}
