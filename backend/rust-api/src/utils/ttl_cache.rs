use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// In-process key/value cache where every entry expires `ttl` after it was set.
pub struct TtlCache<K, V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        None
    }

    pub fn set(&self, key: K, value: V) {
        let stored_at = self.clock.now();
        self.lock().insert(key, Entry { value, stored_at });
    }

    pub fn invalidate(&self, key: &K) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn invalidate_all(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(clock: &Arc<ManualClock>) -> TtlCache<&'static str, u32> {
        TtlCache::with_clock(Duration::from_secs(60), clock.clone())
    }

    #[test]
    fn returns_value_within_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(&clock);
        cache.set("caps", 7);
        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get(&"caps"), Some(7));
    }

    #[test]
    fn entry_expires_at_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(&clock);
        cache.set("caps", 7);
        clock.advance(Duration::from_secs(60));
        assert_eq!(cache.get(&"caps"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn set_refreshes_timestamp() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(&clock);
        cache.set("caps", 1);
        clock.advance(Duration::from_secs(45));
        cache.set("caps", 2);
        clock.advance(Duration::from_secs(45));
        assert_eq!(cache.get(&"caps"), Some(2));
    }

    #[test]
    fn invalidate_removes_entry() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(&clock);
        cache.set("a", 1);
        cache.set("b", 2);
        assert!(cache.invalidate(&"a"));
        assert!(!cache.invalidate(&"a"));
        assert_eq!(cache.get(&"b"), Some(2));
        cache.invalidate_all();
        assert!(cache.is_empty());
    }
}
