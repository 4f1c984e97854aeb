use crate::foundation::error::{TrellisError, TrellisResult};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_64_with_seed;

const PATH_HASH_SEED: u64 = 0x5a17_c0de_e1e1_d005;

/// Immutable snapshot of an element-id stack: "the Nth child of the Nth child of ...".
///
/// The content hash is computed once at construction, so paths are cheap map keys. Ordering is
/// lexicographic over the counters, which is exactly depth-first pre-order.
#[derive(Clone)]
pub struct ElementIdPath {
    levels: Arc<[u16]>,
    hash: u64,
}

impl ElementIdPath {
    /// Build a path from raw level counters.
    pub fn new(levels: &[u16]) -> Self {
        Self {
            levels: Arc::from(levels),
            hash: content_hash(levels),
        }
    }

    /// Level counters, outermost first.
    pub fn levels(&self) -> &[u16] {
        &self.levels
    }

    /// Number of levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Precomputed content hash.
    pub fn content_hash(&self) -> u64 {
        self.hash
    }

    /// `true` if `self` is `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &ElementIdPath) -> bool {
        other.levels.starts_with(&self.levels)
    }

    /// `true` when both values share one allocation (interned through the same table).
    pub fn ptr_eq(&self, other: &ElementIdPath) -> bool {
        Arc::ptr_eq(&self.levels, &other.levels)
    }
}

pub(crate) fn content_hash(levels: &[u16]) -> u64 {
    let mut bytes = Vec::with_capacity(levels.len() * 2);
    for l in levels {
        bytes.extend_from_slice(&l.to_le_bytes());
    }
    xxh3_64_with_seed(&bytes, PATH_HASH_SEED)
}

impl PartialEq for ElementIdPath {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.levels == other.levels
    }
}

impl Eq for ElementIdPath {}

impl Hash for ElementIdPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialOrd for ElementIdPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ElementIdPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.levels.cmp(&other.levels)
    }
}

impl fmt::Display for ElementIdPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, l) in self.levels.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{l}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ElementIdPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementIdPath({self})")
    }
}

impl FromStr for ElementIdPath {
    type Err = TrellisError;

    /// Parse the dotted form produced by `Display` (`"1.3.2"`).
    fn from_str(s: &str) -> TrellisResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TrellisError::evaluation("element id must be non-empty"));
        }
        let mut levels = Vec::new();
        for part in s.split('.') {
            let l = part.parse::<u16>().map_err(|e| {
                TrellisError::evaluation(format!("invalid element id \"{s}\": {e}"))
            })?;
            levels.push(l);
        }
        Ok(Self::new(&levels))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/element_id/path.rs"]
mod tests;
