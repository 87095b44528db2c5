//! Per-block reaching-definitions state.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::definition::Definition;
use crate::ir::OperationId;
use crate::symbol::SymbolId;

/// The set of definitions that can reach a program point for one symbol. Most symbols reach
/// with exactly one definition; `SmallVec` avoids a heap allocation for the common case while
/// still supporting the "maybe-write augments" behavior of [`BlockState::write`].
pub type DefinitionSet = SmallVec<[Definition; 2]>;

/// Mapping from symbol to its non-empty reaching-definition set. The empty mapping is the
/// zero/bottom state; a `BlockState` never stores an empty set for a key (removing the last
/// definition removes the key entirely).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockState {
    reaching: FxHashMap<SymbolId, DefinitionSet>,
}

impl BlockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.reaching.is_empty()
    }

    /// Record a write of `sym` at `op`. A definite write (`maybe = false`) replaces whatever
    /// was reaching `sym` before; a potential write (`maybe = true`, e.g. through a `ref`
    /// argument) augments the existing set, keeping prior definitions live alongside the new
    /// one. Discard symbols should never reach here — callers are expected to have already
    /// filtered those out, but this is re-checked defensively by [`crate::analysis_data::AnalysisData`].
    pub fn write(&mut self, sym: SymbolId, op: Option<OperationId>, maybe: bool) {
        let def = Definition::new(sym, op);
        if maybe {
            let set = self.reaching.entry(sym).or_default();
            if !set.contains(&def) {
                set.push(def);
            }
        } else {
            let mut set = DefinitionSet::new();
            set.push(def);
            self.reaching.insert(sym, set);
        }
    }

    /// The definitions currently reaching `sym`, or an empty iterator if none.
    pub fn reaches(&self, sym: SymbolId) -> impl Iterator<Item = Definition> + '_ {
        self.reaching.get(&sym).into_iter().flatten().copied()
    }

    pub fn reaching_symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.reaching.keys().copied()
    }

    /// Pointwise set union across keys. Returns whichever input the merged state is textually
    /// equal to, when possible, so callers can skip re-propagating an unchanged state (this is
    /// also a cheap way to dodge an allocation on the common "successor already saw this state"
    /// path in the dataflow driver).
    pub fn merge(a: &BlockState, b: &BlockState) -> BlockState {
        if a.is_empty() {
            return b.clone();
        }
        if b.is_empty() {
            return a.clone();
        }

        let mut out = a.clone();
        for (sym, defs) in &b.reaching {
            let entry = out.reaching.entry(*sym).or_default();
            for def in defs {
                if !entry.contains(def) {
                    entry.push(*def);
                }
            }
        }
        if out == *a {
            a.clone()
        } else if out == *b {
            b.clone()
        } else {
            out
        }
    }

    pub fn equals(a: &BlockState, b: &BlockState) -> bool {
        a == b
    }
}
