//! Best-effort points-to for delegate-typed values.
//!
//! This is deliberately not a precise points-to analysis: it only tracks candidate target
//! bodies through conversions, parenthesization, delegate-creation wrappers, and direct
//! local/parameter aliasing, and falls back to [`AnalysisData::reset_state`] the moment it
//! loses track of a value.

use rustc_hash::FxHashSet;

use crate::analysis_data::AnalysisData;
use crate::block_state::BlockState;
use crate::config::AnalysisConfig;
use crate::dataflow;
use crate::ir::{OperationId, OperationKind};
use crate::method::MethodIr;
use crate::walker;

/// If `definition_op`'s target is of delegate type, compute and record the candidate target
/// set for `value_op` against `definition_op`.
pub fn record_candidates_if_delegate(
    method: &MethodIr,
    data: &AnalysisData,
    state: &BlockState,
    definition_op: OperationId,
    value_op: OperationId,
) {
    let Some(target_symbol) = definition_target_symbol(method, definition_op) else {
        return;
    };
    let declared_type = method.symbols.get(target_symbol).declared_type;
    if !method.types.is_delegate(declared_type) {
        return;
    }
    let candidates = compute_candidates(method, data, state, value_op);
    data.record_delegate_candidates(definition_op, candidates);
}

fn definition_target_symbol(
    method: &MethodIr,
    definition_op: OperationId,
) -> Option<crate::symbol::SymbolId> {
    match method.operations.get(definition_op).kind {
        OperationKind::VariableDeclarator { symbol, .. } => Some(symbol),
        OperationKind::SimpleAssignment { target, .. } => match method.operations.get(target).kind
        {
            OperationKind::LocalReference(s) | OperationKind::ParameterReference(s) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

/// Computes the candidate target-body set for a value expression, unwrapping conversions and
/// delegate-creation wrappers, and following a local/parameter reference to the union of the
/// candidate sets of its currently-reaching definitions.
fn compute_candidates(
    method: &MethodIr,
    data: &AnalysisData,
    state: &BlockState,
    value_op: OperationId,
) -> FxHashSet<OperationId> {
    match method.operations.get(value_op).kind {
        OperationKind::FlowAnonymousFunction | OperationKind::AnonymousFunction { .. } => {
            FxHashSet::from_iter([value_op])
        }
        OperationKind::MethodReference {
            local_function: Some(target),
        } => FxHashSet::from_iter([target]),
        OperationKind::MethodReference {
            local_function: None,
        } => FxHashSet::default(),
        OperationKind::Conversion { operand }
        | OperationKind::Parenthesized { operand }
        | OperationKind::DelegateCreation { target: operand } => {
            compute_candidates(method, data, state, operand)
        }
        OperationKind::LocalReference(sym) | OperationKind::ParameterReference(sym) => state
            .reaches(sym)
            .filter_map(|def| def.operation)
            .flat_map(|def_op| {
                data.delegate_candidates(def_op)
                    .unwrap_or_default()
                    .into_iter()
            })
            .collect(),
        _ => FxHashSet::default(),
    }
}

/// Resolves and analyzes the invocation of a delegate-typed value. If the
/// candidate set is known and non-empty, each candidate body is analyzed from a clone of the
/// current state and the result merged back in; otherwise every live definition is
/// conservatively marked used.
pub fn resolve_invocation(
    method: &MethodIr,
    invoked_value_op: OperationId,
    state: &mut BlockState,
    data: &AnalysisData,
    config: &AnalysisConfig,
) {
    let candidates = compute_candidates(method, data, state, invoked_value_op);
    if candidates.is_empty() {
        log::trace!(
            target: "unused_value_analysis::delegate",
            "unresolvable delegate invocation at {invoked_value_op:?}; resetting usage state",
        );
        data.reset_state();
        return;
    }

    for candidate in candidates {
        let mut candidate_state = state.clone();
        let nested = data.for_nested();
        match method.nested_cfg_for(candidate) {
            Some(cfg) => {
                let exit = dataflow::run_to_fixpoint(method, cfg, &nested, config);
                candidate_state = exit;
            }
            None => {
                walker::walk_operation(method, candidate, &mut candidate_state, &nested, config);
            }
        }
        *state = BlockState::merge(state, &candidate_state);
    }
}
