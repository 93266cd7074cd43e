//! Bounded least-recently-used cache shared by templates and compilers.
//!
//! Recency is tracked with a generation counter: every access stamps the
//! entry with a fresh generation and an ordered index maps generations back
//! to keys, so both touch and eviction are `O(log n)`. Eviction is exact and
//! deterministic; there is no random or wholesale clearing.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries. `0` disables caching.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    CacheConfig::DEFAULT_CAPACITY
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// Default capacity for compiled-fragment caches.
    pub const DEFAULT_CAPACITY: usize = 4096;

    /// Default capacity for compiled-statement caches.
    pub const DEFAULT_STATEMENT_CAPACITY: usize = 8192;

    /// Create a configuration with the default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of entries.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Disable caching.
    pub fn disabled() -> Self {
        Self { capacity: 0 }
    }

    /// Check whether this configuration caches anything.
    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }
}

/// A point-in-time snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
}

impl CacheStats {
    /// Fraction of lookups that were hits (`0.0` when nothing was looked up).
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A thread-safe bounded LRU cache.
#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    inner: Mutex<LruInner<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

#[derive(Debug)]
struct LruInner<K, V> {
    map: HashMap<K, (V, u64)>,
    order: BTreeMap<u64, K>,
    generation: u64,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            capacity: config.capacity,
            inner: Mutex::new(LruInner {
                map: HashMap::new(),
                order: BTreeMap::new(),
                generation: 0,
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Look up a value and mark it as most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.capacity == 0 {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let mut inner = self.lock();
        let found = inner.touch(key);
        drop(inner);

        match &found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Insert a value unless one is already cached, returning the cached one.
    ///
    /// Two threads compiling the same fragment race here; the first insert
    /// wins and both callers observe the same value.
    pub fn insert_if_absent(&self, key: K, value: V) -> V {
        if self.capacity == 0 {
            return value;
        }

        let mut inner = self.lock();
        if let Some(existing) = inner.touch(&key) {
            return existing;
        }

        inner.generation += 1;
        let generation = inner.generation;
        inner.order.insert(generation, key.clone());
        inner.map.insert(key, (value.clone(), generation));

        let evicted = inner.evict_to(self.capacity);
        drop(inner);

        if evicted > 0 {
            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "sqlfrag", evicted, capacity = self.capacity, "cache eviction");
        }
        value
    }

    /// Remove a single entry.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.lock();
        let (value, generation) = inner.map.remove(key)?;
        inner.order.remove(&generation);
        Some(value)
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.map.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            len: self.len(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruInner<K, V>> {
        // A panic while holding the lock cannot leave the map half-updated in
        // a way that matters for a cache, so recover from poisoning.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<K, V> LruInner<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn touch<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.generation += 1;
        let generation = self.generation;
        let (value, last) = self.map.get_mut(key)?;
        let previous = std::mem::replace(last, generation);
        let value = value.clone();
        if let Some(k) = self.order.remove(&previous) {
            self.order.insert(generation, k);
        }
        Some(value)
    }

    fn evict_to(&mut self, capacity: usize) -> usize {
        let mut evicted = 0;
        while self.map.len() > capacity {
            let Some((_, oldest)) = self.order.pop_first() else {
                break;
            };
            self.map.remove(&oldest);
            evicted += 1;
        }
        evicted
    }
}
