// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Options container shared by foreign servers and foreign tables
//!
//! Keys are normalized to upper case when inserted, so lookups are
//! case-insensitive. Values are stored verbatim. The map is persisted as a
//! JSON object string.

use crate::error::CatalogResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForeignOptions {
    options: BTreeMap<String, String>,
}

impl ForeignOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an option, replacing any previous value for the same key
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        self.options
            .insert(key.as_ref().to_uppercase(), value.into())
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(&key.to_uppercase()).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.options.contains_key(&key.to_uppercase())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Serialize to the JSON object string stored in the catalog
    pub fn to_json_string(&self) -> CatalogResult<String> {
        Ok(serde_json::to_string(&self.options)?)
    }

    /// Parse an options string read from the catalog
    ///
    /// An empty string is an empty map. Keys are re-normalized in case the
    /// row was written by something other than this container.
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
        Ok(raw.into_iter().collect())
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ForeignOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = ForeignOptions::new();
        for (key, value) in iter {
            options.insert(key, value);
        }
        options
    }
}
