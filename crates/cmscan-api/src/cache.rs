//! Cache reply model.
//!
//! The cache reply lists every CMake cache variable together with a declared
//! type. The only consumers here need string comparisons (compiler path
//! suffix checks and the like), so entries are flattened to `name -> value`
//! and the type metadata is discarded.

use crate::error::Result;
use crate::reply::{parse_reply_str, read_reply_file};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CacheFile {
    #[serde(default)]
    entries: Vec<CacheEntry>,
}

#[derive(Debug, Deserialize)]
struct CacheEntry {
    name: String,
    #[serde(default)]
    value: String,
}

/// Flat, read-only view of the configured cache.
#[derive(Debug, Default)]
pub struct CacheModel {
    entries: IndexMap<String, String>,
}

impl CacheModel {
    /// Load the cache model from a cache reply document.
    pub fn load(path: &Path) -> Result<Self> {
        let file: CacheFile = read_reply_file(path)?;
        Ok(Self::from_file(file))
    }

    /// Parse the cache model from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CacheFile = parse_reply_str("cache reply", json)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: CacheFile) -> Self {
        let entries = file
            .entries
            .into_iter()
            .map(|e| (e.name, e.value))
            .collect();
        Self { entries }
    }

    /// Look up one cache variable by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
