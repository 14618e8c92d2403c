//! Per-tag slide toggles.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tag name to enabled flag. Tags missing from the map are enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToggleMap(HashMap<String, bool>);

impl ToggleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, tag: impl Into<String>, enabled: bool) {
        self.0.insert(tag.into(), enabled);
    }

    #[inline]
    pub fn is_enabled(&self, tag: &str) -> bool {
        self.0.get(tag).copied().unwrap_or(true)
    }

    /// A slide goes when any one of its tags is switched off.
    pub fn should_remove<'a, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        tags.into_iter().any(|tag| !self.is_enabled(tag))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, bool>> for ToggleMap {
    fn from(map: HashMap<String, bool>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for ToggleMap {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
