use crate::element_id::path::{ElementIdPath, content_hash};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Interning registry for element-id paths.
///
/// Owned by the application and shared by reference with every request; equal paths come back as
/// one shared allocation so page-level maps keyed by path stay compact across requests.
#[derive(Debug, Default)]
pub struct ElementIdPathTable {
    by_hash: RwLock<HashMap<u64, Vec<ElementIdPath>>>,
}

impl ElementIdPathTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the canonical path for `levels`, inserting it on first use.
    pub fn intern(&self, levels: &[u16]) -> ElementIdPath {
        let hash = content_hash(levels);
        if let Some(p) = self.find(hash, levels) {
            return p;
        }

        let mut map = self.by_hash.write();
        let bucket = map.entry(hash).or_default();
        // Another request may have interned the same path between the two locks.
        if let Some(p) = bucket.iter().find(|p| p.levels() == levels) {
            return p.clone();
        }
        let p = ElementIdPath::new(levels);
        bucket.push(p.clone());
        p
    }

    /// Canonical instance of an existing path value.
    pub fn intern_path(&self, path: &ElementIdPath) -> ElementIdPath {
        self.intern(path.levels())
    }

    /// Number of distinct paths interned so far.
    pub fn len(&self) -> usize {
        self.by_hash.read().values().map(Vec::len).sum()
    }

    /// `true` if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find(&self, hash: u64, levels: &[u16]) -> Option<ElementIdPath> {
        self.by_hash
            .read()
            .get(&hash)
            .and_then(|bucket| bucket.iter().find(|p| p.levels() == levels).cloned())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/element_id/table.rs"]
mod tests;
