use std::{
    collections::HashMap,
    hash::{DefaultHasher, Hash, Hasher},
    sync::RwLock
};

use crate::infer::ParameterBinding;

/// Default number of memoised bindings
pub const DEFAULT_CACHE_SIZE: usize = 1000;

/// Bounded memo of `(sql, parameter) -> binding` for one run.
///
/// Shared between worker threads; the lock is held only for the map access.
#[derive(Debug)]
pub struct InferenceCache {
    cache:    RwLock<HashMap<u64, ParameterBinding>>,
    max_size: usize
}

impl InferenceCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            cache: RwLock::new(HashMap::with_capacity(max_size.min(DEFAULT_CACHE_SIZE))),
            max_size
        }
    }

    fn hash_key(sql: &str, parameter: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        sql.hash(&mut hasher);
        parameter.hash(&mut hasher);
        hasher.finish()
    }

    pub fn get(&self, sql: &str, parameter: &str) -> Option<ParameterBinding> {
        let key = Self::hash_key(sql, parameter);
        self.cache.read().ok()?.get(&key).cloned()
    }

    pub fn insert(&self, sql: &str, parameter: &str, binding: ParameterBinding) {
        if self.max_size == 0 {
            return;
        }
        let Ok(mut cache) = self.cache.write() else {
            return;
        };
        // Simple eviction: clear half when full
        if cache.len() >= self.max_size {
            let keys: Vec<_> = cache.keys().take(self.max_size.div_ceil(2)).copied().collect();
            for key in keys {
                cache.remove(&key);
            }
        }
        cache.insert(Self::hash_key(sql, parameter), binding);
    }

    pub fn len(&self) -> usize {
        self.cache.read().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }
}

impl Default for InferenceCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}
