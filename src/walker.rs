//! The operation walker.
//!
//! A single recursive traversal, parameterized by [`crate::analysis_data::AnalysisData`] event
//! sinks, rather than subtype-based dispatch on operation kinds. The same function drives both
//! the fast operation-tree path (over a whole method body, including control constructs like
//! `if`) and the precise CFG path (over one basic block's already control-flow-flattened
//! operation list, which never itself contains `Block`/`If` nodes).

use rustc_hash::FxHashSet;

use crate::analysis_data::AnalysisData;
use crate::block_state::BlockState;
use crate::config::AnalysisConfig;
use crate::delegate;
use crate::ir::{ArgumentKind, OperationId, OperationKind};
use crate::method::MethodIr;
use crate::symbol::SymbolId;

/// Visits `op` and its descendants, threading `state` through in source order and emitting
/// read/write events to `data`. See the module doc and the per-kind match arms below for the
/// full contract.
pub fn walk_operation(
    method: &MethodIr,
    op_id: OperationId,
    state: &mut BlockState,
    data: &AnalysisData,
    config: &AnalysisConfig,
) {
    let kind = method.operations.get(op_id).kind.clone();
    match kind {
        OperationKind::Block(children) => {
            for child in children {
                walk_operation(method, child, state, data, config);
            }
        }

        OperationKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            // The fast path is flow-insensitive: both arms are walked against the same
            // threaded state, which can only over-approximate usage (mark more things read
            // than a precise per-path analysis would), never under-approximate it. That
            // asymmetry is exactly what makes it sound to use as a "prove no unused defs"
            // fast path.
            walk_operation(method, condition, state, data, config);
            walk_operation(method, then_branch, state, data, config);
            if let Some(else_branch) = else_branch {
                walk_operation(method, else_branch, state, data, config);
            }
        }

        OperationKind::Return(operand) => {
            if let Some(operand) = operand {
                walk_operation(method, operand, state, data, config);
            }
        }

        OperationKind::VariableDeclarator { symbol, initializer } => {
            // Only a declarator *with* an initializer (or a `foreach` binding, modeled the same
            // way with a synthesized initializer) is a definite write. A bare `int x;` declares
            // scope but writes nothing; the out-argument-declarator case (`out var x`) is
            // handled separately in `walk_argument`, since there the write happens with no
            // initializer at all.
            if let Some(initializer) = initializer {
                walk_operation(method, initializer, state, data, config);
                delegate::record_candidates_if_delegate(method, data, state, op_id, initializer);
                data.mark_write(&method.symbols, state, symbol, Some(op_id), false);
            }
        }

        OperationKind::LocalReference(sym) | OperationKind::ParameterReference(sym) => {
            data.mark_read(&method.symbols, state, sym);
        }

        OperationKind::FieldReference => {
            // Fields are out of scope; nothing to do.
        }

        OperationKind::SimpleAssignment { target, value } => {
            let targets = target_symbols(data, method, target);
            walk_operation(method, value, state, data, config);
            delegate::record_candidates_if_delegate(method, data, state, op_id, value);
            apply_deferred_writes(method, data, state, op_id, &targets, false);
        }

        OperationKind::DeconstructionAssignment { targets, value } => {
            let targets: FxHashSet<SymbolId> = targets
                .iter()
                .flat_map(|&t| target_symbols(data, method, t))
                .collect();
            walk_operation(method, value, state, data, config);
            apply_deferred_writes(method, data, state, op_id, &targets, false);
        }

        OperationKind::CompoundAssignment { target, value } => {
            let targets = target_symbols(data, method, target);
            for &sym in &targets {
                data.mark_read(&method.symbols, state, sym);
            }
            walk_operation(method, value, state, data, config);
            apply_deferred_writes(method, data, state, op_id, &targets, false);
        }

        OperationKind::IncrementOrDecrement { target } => {
            let targets = target_symbols(data, method, target);
            for &sym in &targets {
                data.mark_read(&method.symbols, state, sym);
            }
            apply_deferred_writes(method, data, state, op_id, &targets, false);
        }

        OperationKind::ExpressionStatement { operand } => {
            walk_operation(method, operand, state, data, config);
        }

        OperationKind::Invocation { callee, arguments } => {
            if let Some(callee) = callee {
                walk_operation(method, callee, state, data, config);
                if method
                    .types
                    .is_delegate(method.operations.get(callee).operand_type)
                {
                    delegate::resolve_invocation(method, callee, state, data, config);
                }
            }
            for arg in &arguments {
                walk_argument(method, arg.kind, arg.value, state, data, config);
                if method
                    .types
                    .is_delegate(method.operations.get(arg.value).operand_type)
                {
                    delegate::resolve_invocation(method, arg.value, state, data, config);
                }
            }
        }

        OperationKind::DelegateCreation { target } => {
            walk_operation(method, target, state, data, config);
        }

        OperationKind::Conversion { operand } | OperationKind::Parenthesized { operand } => {
            walk_operation(method, operand, state, data, config);
        }

        OperationKind::MethodReference { .. } | OperationKind::AnonymousFunction { .. } => {
            // Never descend into a function body unless the coordinator explicitly invokes a
            // nested analysis for it.
        }

        OperationKind::FlowAnonymousFunction => {
            // Same as above: the CFG-lowered lambda body is only visited via its own nested
            // CFG, driven by the coordinator or by delegate resolution.
        }

        OperationKind::DeclarationPattern { symbol } => {
            data.mark_write(&method.symbols, state, symbol, Some(op_id), false);
            if !method.operations.parent_is_implicit(op_id) {
                data.mark_read(&method.symbols, state, symbol);
            }
        }

        OperationKind::FlowCapture { id, value } => {
            walk_operation(method, value, state, data, config);
            if let Some(sym) = direct_symbol(method, value) {
                // Bookkeeping only: record which symbol this capture id may alias so a later
                // l-value dereference of the same id can propagate a write to it.
                let def = crate::definition::Definition::new(sym, Some(op_id));
                data.record_lvalue_capture(id, def);
            }
        }

        OperationKind::FlowCaptureReference { id, is_lvalue } => {
            if is_lvalue {
                if let Some(targets) = data.lvalue_capture_targets(id) {
                    for def in targets {
                        data.mark_write(&method.symbols, state, def.symbol, Some(op_id), false);
                    }
                }
            }
        }

        OperationKind::Constant(_) => {}

        OperationKind::Other { operands } => {
            for operand in operands {
                walk_operation(method, operand, state, data, config);
            }
        }
    }
}

fn walk_argument(
    method: &MethodIr,
    kind: ArgumentKind,
    value: OperationId,
    state: &mut BlockState,
    data: &AnalysisData,
    config: &AnalysisConfig,
) {
    match kind {
        ArgumentKind::Value | ArgumentKind::In => {
            walk_operation(method, value, state, data, config);
        }
        ArgumentKind::Ref => {
            if let Some(sym) = direct_symbol(method, value) {
                data.mark_read(&method.symbols, state, sym);
                data.mark_write(&method.symbols, state, sym, Some(value), true);
            } else {
                walk_operation(method, value, state, data, config);
            }
        }
        ArgumentKind::Out => {
            if let Some(sym) = direct_symbol(method, value) {
                data.mark_write(&method.symbols, state, sym, Some(value), false);
            } else if let OperationKind::VariableDeclarator { symbol, .. } =
                method.operations.get(value).kind
            {
                // `out var x`: the declarator has no initializer of its own, so the generic
                // walk would not write it; the `out` position supplies the write instead.
                data.mark_write(&method.symbols, state, symbol, Some(value), false);
            } else {
                // A declaration pattern already emits its own write when walked; either way,
                // an `out` position never reads.
                walk_operation(method, value, state, data, config);
            }
        }
    }
}

/// The symbol directly named by `op`, if `op` is a bare local/parameter reference (no nested
/// expression to walk). Used at assignment-target / ref-argument positions, where we must
/// avoid invoking the generic (read) walk over the target.
fn direct_symbol(method: &MethodIr, op: OperationId) -> Option<SymbolId> {
    match method.operations.get(op).kind {
        OperationKind::LocalReference(s) | OperationKind::ParameterReference(s) => Some(s),
        _ => None,
    }
}

/// Resolves the symbol(s) an assignment target names. A plain reference names one symbol; an
/// l-value flow-capture reference may alias several; anything else (a field, an indexer — out
/// of scope) names none.
fn target_symbols(
    data: &AnalysisData,
    method: &MethodIr,
    target: OperationId,
) -> FxHashSet<SymbolId> {
    match method.operations.get(target).kind {
        OperationKind::LocalReference(s) | OperationKind::ParameterReference(s) => {
            FxHashSet::from_iter([s])
        }
        OperationKind::FlowCaptureReference { id, is_lvalue: true } => data
            .lvalue_capture_targets(id)
            .map(|defs| defs.into_iter().map(|d| d.symbol).collect())
            .unwrap_or_default(),
        _ => FxHashSet::default(),
    }
}

/// Emits the deferred write(s) queued by an assignment once its value has been fully visited.
/// `op_id` is the assignment/declarator operation itself, recorded as the write site.
fn apply_deferred_writes(
    method: &MethodIr,
    data: &AnalysisData,
    state: &mut BlockState,
    op_id: OperationId,
    targets: &FxHashSet<SymbolId>,
    maybe: bool,
) {
    for &sym in targets {
        data.mark_write(&method.symbols, state, sym, Some(op_id), maybe);
    }
}

