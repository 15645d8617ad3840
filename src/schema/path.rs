use crate::{Error, Result};
use indexmap::IndexMap;

/// Maps dotted property paths to the read fragments (column names or formula
/// text) they select.
///
/// A path registered twice with differing fragments is poisoned rather than
/// silently overwritten; resolving a poisoned path is an error naming the
/// ambiguity.
#[derive(Debug, Clone, Default)]
pub struct PathMap {
    entries: IndexMap<String, PathEntry>,
}

#[derive(Debug, Clone, PartialEq)]
enum PathEntry {
    Resolved(Vec<String>),
    Collision,
}

impl PathMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a path. First registration wins; a later registration with
    /// different fragments marks the path as colliding.
    pub fn insert(&mut self, path: impl Into<String>, fragments: Vec<String>) {
        let path = path.into();

        match self.entries.get(&path) {
            None => {
                self.entries.insert(path, PathEntry::Resolved(fragments));
            }
            Some(PathEntry::Resolved(existing)) if *existing != fragments => {
                tracing::trace!(path = %path, "conflicting registrations; poisoning path");
                self.entries.insert(path, PathEntry::Collision);
            }
            Some(_) => {}
        }
    }

    /// Resolves a path to its read fragments.
    pub fn resolve(&self, entity: &str, path: &str) -> Result<&[String]> {
        match self.entries.get(path) {
            Some(PathEntry::Resolved(fragments)) => Ok(fragments),
            Some(PathEntry::Collision) => Err(Error::mapping(
                entity,
                format!("property path `{path}` is ambiguous across the hierarchy"),
            )),
            None => Err(Error::mapping(
                entity,
                format!("unresolvable property path `{path}`"),
            )),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Merges another map into this one, applying the same collision rules
    /// path by path. Used when folding subtype paths into the root's map.
    pub fn merge(&mut self, other: &PathMap) {
        for (path, entry) in &other.entries {
            match entry {
                PathEntry::Resolved(fragments) => self.insert(path.clone(), fragments.clone()),
                PathEntry::Collision => {
                    self.entries.insert(path.clone(), PathEntry::Collision);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_registration_wins() {
        let mut map = PathMap::new();
        map.insert("name", vec!["name".into()]);
        map.insert("name", vec!["name".into()]);

        assert_eq!(map.resolve("Person", "name").unwrap(), ["name"]);
    }

    #[test]
    fn conflicting_registration_poisons() {
        let mut map = PathMap::new();
        map.insert("code", vec!["cat_code".into()]);
        map.insert("code", vec!["dog_code".into()]);

        let err = map.resolve("Animal", "code").unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn missing_path_is_unresolvable() {
        let map = PathMap::new();
        let err = map.resolve("Animal", "missing").unwrap_err();
        assert!(err.to_string().contains("unresolvable"));
    }
}
