//! Replacement map for `{{TOKEN}}` placeholders.

/// Ordered mapping from literal token to replacement value.
///
/// Tokens are matched as exact substrings, one run at a time, in insertion
/// order. Re-inserting a token replaces its value but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementMap {
    entries: Vec<(String, String)>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The token for placeholder `name`, e.g. `COMPANY_NAME` gives
    /// `{{COMPANY_NAME}}`.
    pub fn placeholder(name: &str) -> String {
        format!("{{{{{name}}}}}")
    }

    /// Insert a literal token. Empty tokens are ignored.
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        if token.is_empty() {
            return;
        }
        let value = value.into();
        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some((_, v)) => *v = value,
            None => self.entries.push((token, value)),
        }
    }

    /// Insert `{{name}}`.
    pub fn insert_placeholder(&mut self, name: &str, value: impl Into<String>) {
        self.insert(Self::placeholder(name), value);
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v.as_str()))
    }

    /// Apply every entry to `text` in order, replacing all occurrences.
    ///
    /// Returns `None` when no token occurs in `text`.
    pub fn apply(&self, text: &str) -> Option<String> {
        let mut out: Option<String> = None;
        for (token, value) in &self.entries {
            let current = out.as_deref().unwrap_or(text);
            if current.contains(token.as_str()) {
                out = Some(current.replace(token.as_str(), value));
            }
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ReplacementMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for ReplacementMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (token, value) in iter {
            self.insert(token, value);
        }
    }
}
