//! Error sink.
//!
//! [`ErrorMap`] collects `(path, message)` pairs during one traversal. Paths
//! keep the order in which they first failed; messages at the same path
//! keep evaluation order.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Ordered mapping from property path to error messages.
///
/// Only paths with at least one message are ever present.
#[derive(Debug, Clone, Default)]
pub struct ErrorMap {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl ErrorMap {
    /// Creates an empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message at a path.
    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        let path = path.into();
        let message = message.into();

        match self.index.get(&path) {
            Some(&slot) => self.entries[slot].1.push(message),
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push((path, vec![message]));
            }
        }
    }

    /// Records a message if one was produced.
    pub fn add_opt(&mut self, path: &str, message: Option<String>) {
        if let Some(message) = message {
            self.add(path, message);
        }
    }

    /// Returns the messages recorded at a path.
    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.index
            .get(path)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    /// Returns true if the path has at least one message.
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Returns the number of failing paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the total number of messages across all paths.
    pub fn message_count(&self) -> usize {
        self.entries.iter().map(|(_, messages)| messages.len()).sum()
    }

    /// Returns the failing paths in first-failure order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(path, _)| path.as_str())
    }

    /// Returns an iterator over `(path, messages)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(path, messages)| (path.as_str(), messages.as_slice()))
    }

    /// Flattens the map into individual messages in map order.
    ///
    /// With `with_paths` each entry reads `path: message`.
    pub fn flatten(&self, with_paths: bool) -> Vec<String> {
        self.iter()
            .flat_map(|(path, messages)| {
                messages.iter().map(move |message| {
                    if with_paths {
                        format!("{path}: {message}")
                    } else {
                        message.clone()
                    }
                })
            })
            .collect()
    }

    /// Converts into `Some(map)` when errors exist, `None` otherwise.
    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

impl PartialEq for ErrorMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for ErrorMap {}

impl<P, M> FromIterator<(P, Vec<M>)> for ErrorMap
where
    P: Into<String>,
    M: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (P, Vec<M>)>>(iter: T) -> Self {
        let mut map = ErrorMap::new();
        for (path, messages) in iter {
            let path = path.into();
            for message in messages {
                map.add(path.clone(), message);
            }
        }
        map
    }
}

impl IntoIterator for ErrorMap {
    type Item = (String, Vec<String>);
    type IntoIter = std::vec::IntoIter<(String, Vec<String>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for ErrorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, messages) in &self.entries {
            map.serialize_entry(path, messages)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_messages_append_per_path() {
        let mut map = ErrorMap::new();
        map.add("a", "first");
        map.add("b", "other");
        map.add("a", "second");

        assert_eq!(map.len(), 2);
        assert_eq!(map.message_count(), 3);
        assert_eq!(
            map.get("a"),
            Some(&["first".to_string(), "second".to_string()][..])
        );
        assert_eq!(map.paths().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_add_opt_skips_none() {
        let mut map = ErrorMap::new();
        map.add_opt("a", None);
        assert!(map.is_empty());
        assert!(!map.contains("a"));
        assert_eq!(map.into_option(), None);
    }

    #[test]
    fn test_flatten() {
        let map: ErrorMap = [
            ("a.b", vec!["b is not a string"]),
            ("c", vec!["c can't be blank", "c is not a number"]),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            map.flatten(false),
            vec!["b is not a string", "c can't be blank", "c is not a number"]
        );
        assert_eq!(
            map.flatten(true),
            vec![
                "a.b: b is not a string",
                "c: c can't be blank",
                "c: c is not a number"
            ]
        );
    }

    #[test]
    fn test_serializes_in_insertion_order() {
        let mut map = ErrorMap::new();
        map.add("z", "last letter");
        map.add("a", "first letter");

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"z":["last letter"],"a":["first letter"]}"#);
    }
}
