use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task;
use tokio::time::{sleep, Duration, Instant};

pub struct Config {
    pub enabled: bool,
    pub ttl: Duration,
}

struct Entry<V> {
    inserted: Instant,
    value: Arc<V>,
}

pub struct Cache<K, V> {
    enabled: bool,
    inner: RwLock<HashMap<K, Entry<V>>>,
    ttl: Duration,
}

impl<K, V> Cache<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            enabled: config.enabled,
            ttl: config.ttl,
            inner: Default::default(),
        })
    }

    pub async fn insert(self: Arc<Self>, key: K, value: V) -> Arc<V> {
        let arcd = Arc::new(value);
        if !self.enabled {
            return arcd;
        }

        let inserted = Instant::now();
        self.inner.write().await.insert(
            key.clone(),
            Entry {
                inserted,
                value: Arc::clone(&arcd),
            },
        );

        let self_clone = Arc::clone(&self);
        task::spawn(async move {
            sleep(self_clone.ttl).await;

            let mut inner = self_clone.inner.write().await;
            // a newer entry may have replaced this one after a clear
            if inner.get(&key).is_some_and(|entry| entry.inserted == inserted) {
                inner.remove(&key);
            }
        });

        arcd
    }

    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        if !self.enabled {
            return None;
        }

        return self
            .inner
            .read()
            .await
            .get(key)
            .filter(|entry| entry.inserted.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.value));
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}
