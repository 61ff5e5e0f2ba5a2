//! Bounded FIFO cache of rendered highlights.

use std::collections::VecDeque;

use ahash::AHashMap;
use log::trace;

use crate::highlight::highlighter::HighlightMode;

/// Characters of the source text kept in a cache key.
pub const KEY_PREFIX_CHARS: usize = 64;

/// Cache key: mode, text length, query and a prefix of the text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    mode: HighlightMode,
    text_len: usize,
    query: String,
    text_prefix: String,
}

impl CacheKey {
    pub fn new(mode: HighlightMode, text: &str, query: &str) -> Self {
        CacheKey {
            mode,
            text_len: text.len(),
            query: query.to_string(),
            text_prefix: text.chars().take(KEY_PREFIX_CHARS).collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    text: String,
    html: String,
}

/// Insertion-ordered cache that evicts its oldest entry when full.
///
/// Two texts can share a key when they differ after the prefix, so the full
/// text is stored and compared on lookup.
#[derive(Debug, Clone)]
pub struct HighlightCache {
    capacity: usize,
    entries: AHashMap<CacheKey, CacheEntry>,
    order: VecDeque<CacheKey>,
}

impl HighlightCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        HighlightCache {
            capacity,
            entries: AHashMap::with_capacity(capacity.min(1024)),
            order: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    /// Cached HTML for exactly this text.
    pub fn get(&self, key: &CacheKey, text: &str) -> Option<&str> {
        self.entries
            .get(key)
            .filter(|entry| entry.text == text)
            .map(|entry| entry.html.as_str())
    }

    /// Store HTML for a text. An existing entry under the same key is
    /// replaced in place and keeps its age.
    pub fn insert(&mut self, key: CacheKey, text: &str, html: String) {
        let entry = CacheEntry {
            text: text.to_string(),
            html,
        };
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = entry;
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                trace!("Evicting highlight cache entry for query '{}'", oldest.query);
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
