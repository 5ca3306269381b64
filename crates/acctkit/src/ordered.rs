//! Ordered mappings that remember declaration order.
//!
//! Configuration mappings (`users`, `ssh_keys`, `accounts`, ...) are
//! resolved in the order they were written so that emitted resources are
//! reproducible. [`Declared`] deserializes from any map and keeps that
//! order, rejecting duplicate keys.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// A name → value mapping in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Declared<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> Declared<T> {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert or replace an entry.
    ///
    /// A replaced entry keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: T) -> Option<T> {
        let name = name.into();
        if let Some(&idx) = self.index.get(&name) {
            return Some(std::mem::replace(&mut self.entries[idx].1, value));
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, value));
        None
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&idx| &self.entries[idx].1)
    }

    /// Get an entry, appending one built by `make` if it does not exist.
    pub fn get_or_insert_with(&mut self, name: &str, make: impl FnOnce() -> T) -> &mut T {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), make()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    /// Check whether an entry exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterate entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Iterate names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Declared<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for Declared<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut declared = Self::new();
        for (name, value) in iter {
            declared.insert(name, value);
        }
        declared
    }
}

impl<T> IntoIterator for Declared<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<T: Serialize> Serialize for Declared<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct DeclaredVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for DeclaredVisitor<T> {
    type Value = Declared<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of names to entries")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut declared = Declared::new();
        while let Some((name, value)) = access.next_entry::<String, T>()? {
            if declared.contains(&name) {
                return Err(de::Error::custom(format!("duplicate entry '{name}'")));
            }
            declared.insert(name, value);
        }
        Ok(declared)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Declared<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DeclaredVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_declaration_order() {
        let declared: Declared<u32> =
            serde_json::from_str(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
        let names: Vec<&str> = declared.names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(declared.get("alpha"), Some(&2));
        assert!(!declared.contains("beta"));
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = serde_json::from_str::<Declared<u32>>(r#"{"a": 1, "a": 2}"#).unwrap_err();
        assert!(err.to_string().contains("duplicate entry 'a'"));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut declared: Declared<&str> = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(declared.insert("a", "3"), Some("1"));
        let entries: Vec<_> = declared.iter().collect();
        assert_eq!(entries, vec![("a", &"3"), ("b", &"2")]);
    }

    #[test]
    fn test_get_or_insert_appends_once() {
        let mut declared: Declared<Vec<u32>> = Declared::new();
        declared.get_or_insert_with("b", Vec::new).push(1);
        declared.get_or_insert_with("a", Vec::new).push(2);
        declared.get_or_insert_with("b", Vec::new).push(3);
        let names: Vec<&str> = declared.names().collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(declared.get("b"), Some(&vec![1, 3]));
    }

    #[test]
    fn test_serializes_in_order() {
        let declared: Declared<u32> = [("b", 1), ("a", 2)].into_iter().collect();
        assert_eq!(serde_json::to_string(&declared).unwrap(), r#"{"b":1,"a":2}"#);
    }
}
