//! Owns the pieces of one method's IR that this crate's analyses walk: its symbol/type tables,
//! operation arena, and control-flow graph (with nested CFGs for lambdas/local functions).
//!
//! This is the crate's concrete stand-in for whatever a production [`crate::interfaces::IrProvider`]
//! would otherwise hand back per-method; see that trait for the boundary a real compiler front-end
//! implements instead.

use crate::cfg::Cfg;
use crate::ir::{OperationArena, OperationId};
use crate::symbol::{SymbolId, SymbolTable, TypeTable};

#[derive(Debug)]
pub struct MethodIr {
    pub symbols: SymbolTable,
    pub types: TypeTable,
    pub operations: OperationArena,
    /// Root of the whole-method operation tree, used by the fast operation-tree path.
    pub root: OperationId,
    pub parameters: Vec<SymbolId>,
    /// Precise CFG for the method body, including nested CFGs for contained lambdas and local
    /// functions, keyed by their declaring operation.
    pub cfg: Cfg,
}

impl MethodIr {
    pub fn operations_len(&self) -> usize {
        self.operations.len()
    }

    /// Look up the body to analyze for a delegate-invocation candidate: a nested CFG if one was
    /// lowered for `candidate` (a local function), or `None` if `candidate` should instead be
    /// walked as an operation-tree root (a lambda with no CFG of its own).
    pub fn nested_cfg_for(&self, candidate: OperationId) -> Option<&Cfg> {
        self.cfg.nested_cfgs.get(&candidate)
    }
}
