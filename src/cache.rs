use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use tokio::sync::RwLock;
use tokio::task;
use tokio::time::{sleep, Duration};

use crate::event::EventRecord;
use crate::source::Source;

pub struct Config {
    pub enabled: bool,
    pub ttl: Duration,
}

/// Keeps loaded event lists around for `ttl` so that repeated requests do not hit the
/// source every time.
pub struct EventCache {
    enabled: bool,
    ttl: Duration,
    inner: RwLock<HashMap<Source, Arc<Vec<EventRecord>>>>,
}

impl EventCache {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            enabled: config.enabled,
            ttl: config.ttl,
            inner: Default::default(),
        })
    }

    async fn get(&self, source: &Source) -> Option<Arc<Vec<EventRecord>>> {
        if !self.enabled {
            return None;
        }

        self.inner.read().await.get(source).map(Arc::clone)
    }

    async fn insert(self: Arc<Self>, source: Source, events: Vec<EventRecord>) -> Arc<Vec<EventRecord>> {
        let events = Arc::new(events);
        if !self.enabled {
            return events;
        }

        self.inner
            .write()
            .await
            .insert(source.clone(), Arc::clone(&events));

        let cache = Arc::clone(&self);
        task::spawn(async move {
            sleep(cache.ttl).await;
            cache.inner.write().await.remove(&source);
            debug!("Evicted cached events for {source}");
        });

        events
    }

    /// Returns the cached events for `source`, loading them on a miss.
    pub async fn events(self: &Arc<Self>, source: &Source) -> Arc<Vec<EventRecord>> {
        if let Some(events) = self.get(source).await {
            return events;
        }

        let events = source.load().await;
        Arc::clone(self).insert(source.clone(), events).await
    }
}
