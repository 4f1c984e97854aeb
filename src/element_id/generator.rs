use crate::element_id::path::ElementIdPath;
use crate::foundation::error::{TrellisError, TrellisResult};
use smallvec::SmallVec;

/// Largest counter value one level can hold.
pub const MAX_LEVEL_COUNTER: u16 = u16::MAX;

/// Produces the hierarchical element ids of one traversal pass.
///
/// The stack always holds at least one counter after [`reset`](Self::reset). Minting an id bumps
/// the deepest counter; entering a child scope bumps it and pushes a fresh zero counter, so every
/// scope occupies exactly one slot in its parent's numbering.
#[derive(Debug, Clone)]
pub struct ElementIdGenerator {
    levels: SmallVec<[u16; 16]>,
}

impl Default for ElementIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementIdGenerator {
    /// Create a generator already reset to the root position.
    pub fn new() -> Self {
        let mut g = Self {
            levels: SmallVec::new(),
        };
        g.reset();
        g
    }

    /// Empty the stack and seed it with a single zero counter. Called once per phase.
    pub fn reset(&mut self) {
        self.levels.clear();
        self.levels.push(0);
    }

    /// Current stack depth (1 right after `reset`).
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Advance the deepest counter and return the id of the element now being visited.
    pub fn next_element_id(&mut self) -> TrellisResult<ElementIdPath> {
        self.bump(1)?;
        Ok(ElementIdPath::new(&self.levels))
    }

    /// Enter child scope N: bump the deepest counter, then push a zero counter.
    pub fn push_level(&mut self) -> TrellisResult<()> {
        self.bump(1)?;
        self.levels.push(0);
        Ok(())
    }

    /// Leave the scope entered by [`push_level`](Self::push_level).
    pub fn pop_level(&mut self) {
        debug_assert!(self.levels.len() > 1, "pop_level without matching push_level");
        if self.levels.len() > 1 {
            self.levels.pop();
        }
    }

    /// Two-level push reserving sub-index `n` inside a new scope: push, bump by `n`, push again.
    pub fn push_level_n(&mut self, n: u16) -> TrellisResult<()> {
        self.push_level()?;
        self.bump(n)?;
        self.levels.push(0);
        Ok(())
    }

    /// Leave the two levels entered by [`push_level_n`](Self::push_level_n).
    pub fn pop_level_n(&mut self) {
        self.pop_level();
        self.pop_level();
    }

    /// Consume one slot at the current level without entering it.
    pub fn skip_level(&mut self) -> TrellisResult<()> {
        self.bump(1)
    }

    /// Snapshot of the current stack.
    pub fn current_element_id_path(&self) -> ElementIdPath {
        ElementIdPath::new(&self.levels)
    }

    /// Raw view of the current stack.
    pub fn levels(&self) -> &[u16] {
        &self.levels
    }

    /// Id of the innermost open scope (the stack without its deepest counter).
    pub fn scope_levels(&self) -> &[u16] {
        &self.levels[..self.levels.len().saturating_sub(1)]
    }

    /// `true` iff the next id this generator would mint is `path` or an ancestor of it.
    pub fn next_prefix_matches(&self, path: &ElementIdPath) -> bool {
        let target = path.levels();
        let n = self.levels.len();
        if target.len() < n {
            return false;
        }
        let last = self.levels[n - 1];
        if last == MAX_LEVEL_COUNTER {
            return false;
        }
        target[..n - 1] == self.levels[..n - 1] && target[n - 1] == last + 1
    }

    /// `true` iff `path` comes strictly before the next id in depth-first order, i.e. it can no
    /// longer be produced by the remainder of this pass.
    pub fn has_passed(&self, path: &ElementIdPath) -> bool {
        let n = self.levels.len();
        let last = self.levels[n - 1];
        let target = path.levels();
        // Compare against `levels` with the deepest counter advanced by one.
        let common = target.len().min(n);
        for i in 0..common {
            let here = if i == n - 1 {
                u32::from(last) + 1
            } else {
                u32::from(self.levels[i])
            };
            let there = u32::from(target[i]);
            if there != here {
                return there < here;
            }
        }
        target.len() < n
    }

    fn bump(&mut self, n: u16) -> TrellisResult<()> {
        let depth = self.levels.len();
        let last = &mut self.levels[depth - 1];
        match last.checked_add(n) {
            Some(v) => {
                *last = v;
                Ok(())
            }
            None => Err(TrellisError::ElementIdOverflow {
                path: if depth > 1 {
                    ElementIdPath::new(&self.levels[..depth - 1]).to_string()
                } else {
                    "root".to_owned()
                },
                max: MAX_LEVEL_COUNTER,
            }),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/element_id/generator.rs"]
mod tests;
