use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// What a cache-or-fetch round trip is keyed on.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum CacheKey {
    Location(String),
    Weather(i32),
    Events(i32),
    Movies(i32),
    Yelp(i32),
}

/// One async mutex per cache key, so concurrent misses on the same key fetch once.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    inner: Arc<Mutex<HashMap<CacheKey, Arc<AsyncMutex<()>>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: CacheKey) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            map.retain(|_, slot| Arc::strong_count(slot) > 1);
            map.entry(key).or_default().clone()
        };
        slot.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().map(|m| m.len()).unwrap_or(0)
    }
}
