//! Engine configuration supplied by the host.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RecordSeekError, Result};
use crate::record::EntityType;

/// Per-group result caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupLimits {
    /// Cap for any entity type without its own entry.
    pub default_limit: usize,
    /// Caps for specific entity types.
    pub per_type: BTreeMap<EntityType, usize>,
}

impl Default for GroupLimits {
    fn default() -> Self {
        GroupLimits {
            default_limit: 5,
            per_type: BTreeMap::new(),
        }
    }
}

impl GroupLimits {
    pub fn new(default_limit: usize) -> Self {
        GroupLimits {
            default_limit,
            per_type: BTreeMap::new(),
        }
    }

    /// Set the cap for one entity type.
    pub fn with_limit(mut self, entity_type: EntityType, limit: usize) -> Self {
        self.per_type.insert(entity_type, limit);
        self
    }

    /// Cap for a group; groups not keyed by entity type use the default.
    pub fn limit_for(&self, entity_type: Option<EntityType>) -> usize {
        entity_type
            .and_then(|t| self.per_type.get(&t).copied())
            .unwrap_or(self.default_limit)
    }
}

/// Configuration for the search engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Records examined between cooperative yield points.
    pub batch_size: usize,
    /// Caps applied to each result group.
    pub group_limits: GroupLimits,
    /// Maximum number of rendered highlights kept.
    pub highlight_cache_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            batch_size: 150,
            group_limits: GroupLimits::default(),
            highlight_cache_capacity: 1000,
        }
    }
}

impl SearchConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_group_limits(mut self, group_limits: GroupLimits) -> Self {
        self.group_limits = group_limits;
        self
    }

    pub fn with_highlight_cache_capacity(mut self, capacity: usize) -> Self {
        self.highlight_cache_capacity = capacity;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(RecordSeekError::invalid_config(
                "batch_size must be greater than zero",
            ));
        }
        if self.highlight_cache_capacity == 0 {
            return Err(RecordSeekError::invalid_config(
                "highlight_cache_capacity must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SearchConfig = serde_json::from_str(json)
            .map_err(|e| RecordSeekError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }
}
