//! Cross-block accumulators for one method's analysis: the definition-usage map, the
//! symbols-read set, and the delegate-target and l-value-capture side tables the walker and
//! dataflow driver populate as they go.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::block_state::BlockState;
use crate::cfg::BlockId;
use crate::definition::Definition;
use crate::ir::{CaptureId, OperationId};
use crate::symbol::{SymbolId, SymbolTable};

/// `(symbol, write-site) -> has this definition been read on some path?`. Monotone within one
/// fixed-point pass: once `true`, a key is never written back to `false`.
pub type UsageMap = FxHashMap<Definition, bool>;
pub type SymbolsRead = FxHashSet<SymbolId>;
/// `value operation -> candidate delegate-target bodies`.
pub type DelegateTargets = FxHashMap<OperationId, FxHashSet<OperationId>>;
/// `capture id -> definitions it may alias`.
pub type LValueCaptureMap = FxHashMap<CaptureId, FxHashSet<Definition>>;

/// Per-method scratch space threaded through the walker and dataflow driver.
///
/// A nested lambda/local-function analysis shares `usage`, `symbols_read`, and
/// `delegate_targets` with the enclosing method's `AnalysisData` (the three fields are each an
/// `Rc<RefCell<_>>`), but owns its own `per_block_state` and `lvalue_captures` — the sharing is
/// explicit per field rather than handled by cloning the whole struct.
pub struct AnalysisData {
    usage: Rc<RefCell<UsageMap>>,
    symbols_read: Rc<RefCell<SymbolsRead>>,
    delegate_targets: Rc<RefCell<DelegateTargets>>,
    per_block_state: RefCell<FxHashMap<BlockId, BlockState>>,
    lvalue_captures: RefCell<LValueCaptureMap>,
}

impl AnalysisData {
    pub fn new() -> Self {
        Self {
            usage: Rc::new(RefCell::new(UsageMap::default())),
            symbols_read: Rc::new(RefCell::new(SymbolsRead::default())),
            delegate_targets: Rc::new(RefCell::new(DelegateTargets::default())),
            per_block_state: RefCell::new(FxHashMap::default()),
            lvalue_captures: RefCell::new(LValueCaptureMap::default()),
        }
    }

    /// Create scratch space for a nested lambda/local-function analysis that shares this
    /// method's usage map, symbols-read set, and delegate-target map, but starts with fresh
    /// per-block state and l-value capture bookkeeping.
    pub fn for_nested(&self) -> Self {
        Self {
            usage: Rc::clone(&self.usage),
            symbols_read: Rc::clone(&self.symbols_read),
            delegate_targets: Rc::clone(&self.delegate_targets),
            per_block_state: RefCell::new(FxHashMap::default()),
            lvalue_captures: RefCell::new(LValueCaptureMap::default()),
        }
    }

    /// Marks every definition currently reaching `sym` (per `state`) as used, and records `sym`
    /// as read. Discards are never recorded as read or written.
    pub fn mark_read(&self, symbols: &SymbolTable, state: &BlockState, sym: SymbolId) {
        if symbols.get(sym).is_discard() {
            return;
        }
        self.symbols_read.borrow_mut().insert(sym);
        let mut usage = self.usage.borrow_mut();
        for def in state.reaches(sym) {
            usage.insert(def, true);
        }
    }

    /// Records `(sym, op)` as an as-yet-unused definition if it is new, then lets the caller
    /// apply the write to `state`. Discards are never recorded.
    pub fn mark_write(
        &self,
        symbols: &SymbolTable,
        state: &mut BlockState,
        sym: SymbolId,
        op: Option<OperationId>,
        maybe: bool,
    ) {
        if symbols.get(sym).is_discard() {
            return;
        }
        let def = Definition::new(sym, op);
        self.usage.borrow_mut().entry(def).or_insert(false);
        state.write(sym, op, maybe);
    }

    /// Conservative pessimization used when an invocation's delegate target cannot be resolved:
    /// every key currently in the usage map is marked used.
    pub fn reset_state(&self) {
        let mut usage = self.usage.borrow_mut();
        for used in usage.values_mut() {
            *used = true;
        }
    }

    pub fn is_used(&self, def: Definition) -> bool {
        self.usage.borrow().get(&def).copied().unwrap_or(false)
    }

    pub fn was_read(&self, sym: SymbolId) -> bool {
        self.symbols_read.borrow().contains(&sym)
    }

    /// Snapshot of the usage map, for diagnostic selection once analysis has converged.
    pub fn usage_snapshot(&self) -> UsageMap {
        self.usage.borrow().clone()
    }

    pub fn state_for(&self, block: BlockId) -> Option<BlockState> {
        self.per_block_state.borrow().get(&block).cloned()
    }

    pub fn set_state_for(&self, block: BlockId, state: BlockState) {
        self.per_block_state.borrow_mut().insert(block, state);
    }

    pub fn record_delegate_candidates(
        &self,
        value_op: OperationId,
        candidates: impl IntoIterator<Item = OperationId>,
    ) {
        self.delegate_targets
            .borrow_mut()
            .entry(value_op)
            .or_default()
            .extend(candidates);
    }

    pub fn delegate_candidates(&self, value_op: OperationId) -> Option<FxHashSet<OperationId>> {
        self.delegate_targets.borrow().get(&value_op).cloned()
    }

    pub fn record_lvalue_capture(&self, id: CaptureId, def: Definition) {
        self.lvalue_captures.borrow_mut().entry(id).or_default().insert(def);
    }

    pub fn lvalue_capture_targets(&self, id: CaptureId) -> Option<FxHashSet<Definition>> {
        self.lvalue_captures.borrow().get(&id).cloned()
    }
}

impl Default for AnalysisData {
    fn default() -> Self {
        Self::new()
    }
}
