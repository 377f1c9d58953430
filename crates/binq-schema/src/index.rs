//! Name to manifest-path directory.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::revision::null_as_default;

/// File name every index must use.
pub const INDEX_FILE_NAME: &str = "index.json";

/// One index entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndiceItem {
    /// Unique artifact name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Manifest location, relative to the index file.
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
}

impl IndiceItem {
    /// Creates an entry.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Entries sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// The entries, ascending by `name`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<IndiceItem>,
}

impl Index {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an index from JSON bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, SchemaError> {
        serde_json::from_slice(bytes).map_err(|e| SchemaError::decode("index", bytes, e))
    }

    /// Encodes the index; `pretty` indents with two spaces.
    pub fn to_json(&self, pretty: bool) -> Result<String, SchemaError> {
        let res = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        res.map_err(|source| SchemaError::Encode {
            kind: "index",
            source,
        })
    }

    /// The entry called `name`.
    pub fn find(&self, name: &str) -> Option<&IndiceItem> {
        self.items.iter().find(|item| item.name == name)
    }

    /// The manifest path of `name`.
    pub fn find_path(&self, name: &str) -> Option<&str> {
        self.find(name).map(|item| item.path.as_str())
    }

    /// Inserts `entry` in name order.
    ///
    /// When the name is taken, nothing changes and the existing entry is
    /// returned so the caller can decide whether to [`swap`](Self::swap).
    pub fn add(&mut self, entry: IndiceItem) -> Option<&IndiceItem> {
        if let Some(at) = self.items.iter().position(|item| item.name == entry.name) {
            return Some(&self.items[at]);
        }
        match self.items.iter().position(|item| item.name > entry.name) {
            Some(at) => self.items.insert(at, entry),
            None => self.items.push(entry),
        }
        None
    }

    /// Replaces the entry called `name` in place.
    ///
    /// The position is kept even when `entry` carries a different name; call
    /// [`sort_by_name`](Self::sort_by_name) afterwards in that case.
    pub fn swap(&mut self, name: &str, entry: IndiceItem) -> bool {
        match self.items.iter_mut().find(|item| item.name == name) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => false,
        }
    }

    /// Removes the entry called `name`.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.name != name);
        self.items.len() != before
    }

    /// Restores ascending name order.
    pub fn sort_by_name(&mut self) {
        self.items.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Two-column listing of names and paths.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:<16}    {:<48}", "Name", "Path");
        let _ = writeln!(out, "{}", "=".repeat(68));
        for item in &self.items {
            let _ = writeln!(out, "{:<16}    {:<48}", item.name, item.path);
        }
        out
    }
}

/// Maps an index argument to the index file it names.
///
/// A `.json` argument must be called `index.json`; anything else is taken as
/// the index root directory.
pub fn resolve_index_file(arg: &Path) -> Result<PathBuf, SchemaError> {
    if arg.extension().is_some_and(|ext| ext == "json") {
        if arg.file_name().is_some_and(|name| name == INDEX_FILE_NAME) {
            return Ok(arg.to_path_buf());
        }
        return Err(SchemaError::InvalidIndexPath(format!(
            "index file must be named {INDEX_FILE_NAME:?}, got {}",
            arg.display()
        )));
    }
    Ok(arg.join(INDEX_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(idx: &Index) -> Vec<&str> {
        idx.items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_add_keeps_order() {
        let mut idx = Index::new();
        assert!(idx.add(IndiceItem::new("aaa", "a/index.json")).is_none());
        assert!(idx.add(IndiceItem::new("ccc", "c/index.json")).is_none());
        assert!(idx.add(IndiceItem::new("bbb", "b/index.json")).is_none());
        assert_eq!(names(&idx), ["aaa", "bbb", "ccc"]);
        assert!(idx.add(IndiceItem::new("zzz", "z")).is_none());
        assert!(idx.add(IndiceItem::new("0", "0")).is_none());
        assert_eq!(names(&idx), ["0", "aaa", "bbb", "ccc", "zzz"]);
    }

    #[test]
    fn test_add_conflict_returns_existing() {
        let mut idx = Index::new();
        idx.add(IndiceItem::new("foo", "old"));
        let existing = idx.add(IndiceItem::new("foo", "new")).cloned();
        assert_eq!(existing, Some(IndiceItem::new("foo", "old")));
        assert_eq!(idx.find_path("foo"), Some("old"));
        assert_eq!(idx.items.len(), 1);
    }

    #[test]
    fn test_add_remove_stays_sorted() {
        let mut idx = Index::new();
        for name in ["m", "c", "x", "a", "q", "c", "b"] {
            idx.add(IndiceItem::new(name, name));
        }
        assert!(idx.remove("q"));
        assert!(!idx.remove("q"));
        idx.add(IndiceItem::new("n", "n"));
        let got = names(&idx);
        let mut sorted = got.clone();
        sorted.sort_unstable();
        assert_eq!(got, sorted);
    }

    #[test]
    fn test_swap_does_not_resort() {
        let mut idx = Index::new();
        idx.add(IndiceItem::new("aaa", "a"));
        idx.add(IndiceItem::new("bbb", "b"));
        assert!(idx.swap("aaa", IndiceItem::new("zzz", "z")));
        assert_eq!(names(&idx), ["zzz", "bbb"]);
        idx.sort_by_name();
        assert_eq!(names(&idx), ["bbb", "zzz"]);
        assert!(!idx.swap("nope", IndiceItem::new("x", "x")));
    }

    #[test]
    fn test_json_shape() {
        let mut idx = Index::new();
        idx.add(IndiceItem::new("foo", "example.com/foo/index.json"));
        let json = idx.to_json(false).unwrap();
        assert_eq!(
            json,
            r#"{"items":[{"name":"foo","path":"example.com/foo/index.json"}]}"#
        );
        assert_eq!(Index::decode(json.as_bytes()).unwrap(), idx);
        assert!(Index::decode(b"{\"items\": 3}").is_err());
    }

    #[test]
    fn test_to_text() {
        let mut idx = Index::new();
        idx.add(IndiceItem::new("foo", "foo.json"));
        let text = idx.to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Name                Path"));
        assert_eq!(lines[1], "=".repeat(68));
        assert!(lines[2].starts_with("foo                 foo.json"));
    }

    #[test]
    fn test_resolve_index_file() {
        assert_eq!(
            resolve_index_file(Path::new("root")).unwrap(),
            Path::new("root/index.json")
        );
        assert_eq!(
            resolve_index_file(Path::new("root/index.json")).unwrap(),
            Path::new("root/index.json")
        );
        assert!(resolve_index_file(Path::new("root/other.json")).is_err());
    }
}
