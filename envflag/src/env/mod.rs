//! Ordered snapshots of `KEY=VALUE` environment entries.
//!
//! A snapshot is taken once per binder invocation and never cached. Order is
//! preserved, so when two entries resolve to the same flag the later one
//! wins.

/// A single `KEY=VALUE` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    key: String,
    value: String,
}

impl EnvEntry {
    /// Create an entry from its parts.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Split a raw line on the first `=`; a line without `=` has an empty
    /// value.
    ///
    /// ```rust
    /// use envflag::EnvEntry;
    /// let entry = EnvEntry::from_line("URL=postgres://h/db?a=b");
    /// assert_eq!(entry.key(), "URL");
    /// assert_eq!(entry.value(), "postgres://h/db?a=b");
    /// ```
    #[must_use]
    pub fn from_line(line: &str) -> Self {
        line.split_once('=')
            .map_or_else(|| Self::new(line, ""), |(key, value)| Self::new(key, value))
    }

    /// Variable name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Ordered environment captured at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    entries: Vec<EnvEntry>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    ///
    /// Entries whose key or value is not valid UTF-8 cannot name a flag or be
    /// handed to a string setter, so they are left out silently.
    #[must_use]
    pub fn capture() -> Self {
        Self::capture_with(|_| {})
    }

    /// Capture the current process environment, passing the key of every
    /// skipped non-UTF-8 entry to `skipped` (lossily converted).
    #[must_use]
    pub(crate) fn capture_with<F>(mut skipped: F) -> Self
    where
        F: FnMut(&str),
    {
        std::env::vars_os()
            .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (Ok(key), Err(_)) => {
                    skipped(&key);
                    None
                }
                (Err(key), _) => {
                    skipped(key.to_string_lossy().as_ref());
                    None
                }
            })
            .collect()
    }

    /// Build a snapshot from raw `KEY=VALUE` lines.
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: lines
                .into_iter()
                .map(|line| EnvEntry::from_line(line.as_ref()))
                .collect(),
        }
    }

    /// Entries in capture order.
    pub fn iter(&self) -> std::slice::Iter<'_, EnvEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value of the last entry named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.key == key)
            .map(EnvEntry::value)
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| EnvEntry::new(key, value))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EnvSnapshot {
    type Item = &'a EnvEntry;
    type IntoIter = std::slice::Iter<'a, EnvEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
