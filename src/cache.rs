//! Per-session memo of collaborator results (file summaries, user snapshots,
//! diagrams, search accumulators), keyed by repository or user identity.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};

/// Backing key→value store. Swappable so tests and alternative deployments
/// can inject their own.
pub trait CacheStore<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;
    fn insert(&self, key: K, value: V);
    fn remove(&self, key: &K) -> Option<V>;
    fn len(&self) -> usize;
    fn clear(&self);
}

/// In-process store behind a `RwLock<HashMap>`.
pub struct MemoryStore<K, V> {
    map: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for MemoryStore<K, V> {
    fn default() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> CacheStore<K, V> for MemoryStore<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> Option<V> {
        self.map.read().get(key).cloned()
    }

    fn insert(&self, key: K, value: V) {
        self.map.write().insert(key, value);
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.map.write().remove(key)
    }

    fn len(&self) -> usize {
        self.map.read().len()
    }

    fn clear(&self) {
        self.map.write().clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Keep everything for the life of the session.
    Never,
    /// Drop the oldest insertion once the cache holds more than `n` entries.
    MaxEntries(usize),
}

/// Insertion bookkeeping: FIFO order for `MaxEntries`, timestamps for expiry.
struct Ledger<K> {
    order: VecDeque<K>,
    inserted_at: HashMap<K, Instant>,
}

/// Cache with an explicit eviction policy over an injected store.
///
/// Entries may also carry a time to live. An expired entry reads as absent
/// and is removed on the next access.
pub struct SessionCache<K, V> {
    store: Arc<dyn CacheStore<K, V>>,
    policy: EvictionPolicy,
    ttl: Option<Duration>,
    ledger: Mutex<Ledger<K>>,
}

impl<K, V> SessionCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn in_memory(policy: EvictionPolicy) -> Self {
        Self::with_store(Arc::new(MemoryStore::default()), policy)
    }

    pub fn with_store(store: Arc<dyn CacheStore<K, V>>, policy: EvictionPolicy) -> Self {
        Self {
            store,
            policy,
            ttl: None,
            ledger: Mutex::new(Ledger {
                order: VecDeque::new(),
                inserted_at: HashMap::new(),
            }),
        }
    }

    /// Expire entries `ttl` after their first insertion.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn get(&self, key: &K) -> Option<V> {
        if let Some(ttl) = self.ttl {
            let mut ledger = self.ledger.lock();
            let expired = ledger
                .inserted_at
                .get(key)
                .is_some_and(|at| at.elapsed() >= ttl);
            if expired {
                tracing::debug!("Dropping expired session cache entry");
                ledger.order.retain(|k| k != key);
                ledger.inserted_at.remove(key);
                self.store.remove(key);
                return None;
            }
        }
        self.store.get(key)
    }

    /// Insert or replace. Replacing does not refresh the entry's age.
    pub fn insert(&self, key: K, value: V) {
        let mut ledger = self.ledger.lock();
        self.purge_expired(&mut ledger);
        if !ledger.inserted_at.contains_key(&key) {
            ledger.order.push_back(key.clone());
            ledger.inserted_at.insert(key.clone(), Instant::now());
        }
        self.store.insert(key, value);

        if let EvictionPolicy::MaxEntries(max) = self.policy {
            while ledger.order.len() > max {
                if let Some(oldest) = ledger.order.pop_front() {
                    tracing::debug!("Evicting oldest session cache entry");
                    ledger.inserted_at.remove(&oldest);
                    self.store.remove(&oldest);
                }
            }
        }
    }

    // Insertion order is also age order, so expired entries sit at the front
    fn purge_expired(&self, ledger: &mut Ledger<K>) {
        let Some(ttl) = self.ttl else { return };
        while let Some(oldest) = ledger.order.front() {
            let expired = ledger
                .inserted_at
                .get(oldest)
                .map_or(true, |at| at.elapsed() >= ttl);
            if !expired {
                break;
            }
            if let Some(oldest) = ledger.order.pop_front() {
                ledger.inserted_at.remove(&oldest);
                self.store.remove(&oldest);
            }
        }
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let mut ledger = self.ledger.lock();
        ledger.order.retain(|k| k != key);
        ledger.inserted_at.remove(key);
        self.store.remove(key)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut ledger = self.ledger.lock();
        ledger.order.clear();
        ledger.inserted_at.clear();
        self.store.clear();
    }
}
