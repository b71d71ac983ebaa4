/// In-memory content cache owned by a single manager.
///
/// Entries never expire; they live until `clear()`. There is no single-flight
/// protection: two concurrent misses on the same key both fetch, and the later
/// `set` wins.
///
/// Key schema used by the managers:
/// - `{filename}`: parsed JSON document from `data/{filename}.json`
/// - `md_{filename}_{kind}`: markdown document converted to `kind`
/// - `{page}`: flattened page content from `content/pages/{page}.md`
use std::collections::HashMap;

use tokio::sync::RwLock;

pub struct ContentCache<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V: Clone> ContentCache<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn set(&self, key: &str, value: V) {
        self.entries.write().await.insert(key.to_string(), value);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl<V: Clone> Default for ContentCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn markdown_key(filename: &str, kind: &str) -> String {
    format!("md_{filename}_{kind}")
}
