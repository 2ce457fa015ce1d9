use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::values::{parse_bool, parse_u16};

/// A flat `key=value` property list resolved into a lookup table.
///
/// Each entry is split once on its first `=`. When a key repeats, the last
/// value wins and a warning is logged. Key iteration order is the order of
/// first appearance.
#[derive(Debug, Clone, Default)]
pub struct PropertyList {
    values: HashMap<String, String>,
    order: Vec<String>,
}

impl PropertyList {
    /// Parse an ordered sequence of `key=value` strings.
    pub fn parse<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for entry in entries {
            let entry = entry.as_ref();
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::MalformedProperty {
                    entry: entry.to_string(),
                })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::MalformedProperty {
                    entry: entry.to_string(),
                });
            }
            list.insert(key, value);
        }
        Ok(list)
    }

    fn insert(&mut self, key: &str, value: &str) {
        match self.values.insert(key.to_string(), value.to_string()) {
            Some(previous) if previous != value => {
                tracing::warn!(key, "duplicate configuration key, last value wins");
            }
            Some(_) => {}
            None => self.order.push(key.to_string()),
        }
    }

    /// Raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Keys in order of first appearance.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            Some(value) => parse_bool(key, value),
            None => Ok(default),
        }
    }

    pub(crate) fn u16_or(&self, key: &str, default: u16) -> Result<u16> {
        match self.get(key) {
            Some(value) => parse_u16(key, value),
            None => Ok(default),
        }
    }

    pub(crate) fn string_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Value for `key`, treating an empty string as absent.
    pub(crate) fn optional_string(&self, key: &str) -> Option<String> {
        self.get(key)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    pub(crate) fn optional_path(&self, key: &str) -> Option<PathBuf> {
        self.optional_string(key).map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_equals() {
        let list = PropertyList::parse(["cryptolib.sadb.mariadb.password=a=b=c"]).unwrap();
        assert_eq!(list.get("cryptolib.sadb.mariadb.password"), Some("a=b=c"));
    }

    #[test]
    fn last_value_wins_and_order_is_first_seen() {
        let list = PropertyList::parse(["b=1", "a=2", "b=3"]).unwrap();
        assert_eq!(list.get("b"), Some("3"));
        assert_eq!(list.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn rejects_entry_without_equals() {
        let err = PropertyList::parse(["cryptolib.sadb.type"]).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedProperty { .. }));
    }

    #[test]
    fn rejects_empty_key() {
        assert!(PropertyList::parse(["=value"]).is_err());
    }

    #[test]
    fn empty_value_is_absent_for_optional_lookups() {
        let list = PropertyList::parse(["k="]).unwrap();
        assert_eq!(list.get("k"), Some(""));
        assert_eq!(list.optional_string("k"), None);
        assert_eq!(list.optional_path("k"), None);
    }

    #[test]
    fn typed_lookups_fall_back_to_defaults() {
        let list = PropertyList::parse(Vec::<String>::new()).unwrap();
        assert!(list.is_empty());
        assert!(list.bool_or("missing", true).unwrap());
        assert_eq!(list.u16_or("missing", 8443).unwrap(), 8443);
        assert_eq!(list.string_or("missing", "https"), "https");
    }
}
