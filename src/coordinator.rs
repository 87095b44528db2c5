//! The per-method coordinator.
//!
//! Drives the walker and dataflow driver per method, decides between the fast operation-tree
//! path and the precise CFG path, and owns unused-parameter accounting. This is the crate's
//! single public entry point for analyzing one method end-to-end.

use crate::analysis_data::AnalysisData;
use crate::block_state::BlockState;
use crate::cancellation::CancellationToken;
use crate::config::AnalysisConfig;
use crate::dataflow;
use crate::definition::Definition;
use crate::diagnostics::{self, Diagnostic, FixPreference};
use crate::error::Result;
use crate::ir::OperationKind;
use crate::method::MethodIr;
use crate::options::{self, LanguageCapabilities, OptionsProvider};
use crate::symbol::SymbolId;
use crate::traverse;
use crate::walker;

/// Host-supplied facts about the containing method that the unused-parameter check needs but
/// that are outside this crate's IR model (accessor-ness, virtual/override/extern, attributes,
/// whether the method itself is ever used as a delegate). A production host fills this in from its own
/// semantic model; tests use [`MethodMetadata::default`] to mean "an ordinary private method
/// with no special modifiers".
#[derive(Debug, Clone, Default)]
pub struct MethodMetadata {
    pub is_implicitly_declared: bool,
    pub is_accessor: bool,
    pub is_interface_implementation: bool,
    pub is_abstract_virtual_override_or_extern: bool,
    pub attributes: Vec<String>,
    pub used_as_delegate_anywhere: bool,
    pub is_externally_visible: bool,
}

/// Runs the full per-method algorithm and returns diagnostics in ascending source-position
/// order. Fix plans are produced separately by [`crate::fixplan::plan_fixes`] from the returned
/// diagnostics.
pub fn analyze_method(
    method: &MethodIr,
    metadata: &MethodMetadata,
    options: &dyn OptionsProvider,
    caps: &dyn LanguageCapabilities,
    config: &AnalysisConfig,
    cancellation: &CancellationToken,
) -> Result<Vec<Diagnostic>> {
    cancellation.check()?;

    // Step 1: resolve preference; `OptionsUnavailable` and `Disabled` both mean "no diagnostics".
    let Some((preference, severity)) = options.preference(method) else {
        log::debug!(target: "unused_value_analysis::coordinator", "no options available, skipping");
        return Ok(Vec::new());
    };
    if preference == options::Preference::Disabled {
        return Ok(Vec::new());
    }
    let preference = options::effective_preference(preference, caps);
    let fix_preference = match preference {
        options::Preference::PreferDiscard => FixPreference::Discard,
        options::Preference::PreferUnusedLocal => FixPreference::UnusedLocal,
        options::Preference::Disabled => unreachable!("handled above"),
    };

    // Skip methods whose body has syntax errors. Our in-memory IR is always well-formed by
    // construction, so this is a no-op here, but the check is kept to document the contract a
    // real `SemanticModel` must honor.

    let mut diagnostics = Vec::new();

    // EXPR_UNUSED is independent of the dataflow result; collect it from a dedicated sweep
    // regardless of whether the dataflow pass below runs at all.
    traverse::preorder(method, method.root, &mut |op| {
        if let OperationKind::ExpressionStatement { operand } = method.operations.get(op).kind {
            if let Some(d) = diagnostics::select_expr_unused(
                method,
                config,
                fix_preference,
                severity,
                op,
                operand,
            ) {
                diagnostics.push(d);
            }
        }
    });

    let escapes = scan_delegate_escapes(method);
    if escapes.dataflow_disabled {
        log::debug!(
            target: "unused_value_analysis::coordinator",
            "delegate value escapes unanalyzably; dataflow analysis disabled for this method",
        );
        diagnostics.sort_by_key(|d| d.location.start);
        return Ok(diagnostics);
    }

    let data = run_dataflow(method, config, cancellation, escapes.fast_path_disabled)?;

    for (&def, &used) in data.usage_snapshot().iter() {
        if used || def.operation.is_none() {
            continue;
        }
        if let Some(d) =
            diagnostics::select_value_unused(method, &data, fix_preference, severity, def)
        {
            diagnostics.push(d);
        }
    }

    for &param in &method.parameters {
        if let Some(d) = select_param_unused_candidate(
            method, metadata, config, &data, param, fix_preference, severity,
        ) {
            diagnostics.push(d);
        }
    }

    cancellation.check()?;
    diagnostics.sort_by_key(|d| d.location.start);
    Ok(diagnostics)
}

fn run_dataflow(
    method: &MethodIr,
    config: &AnalysisConfig,
    cancellation: &CancellationToken,
    fast_path_disabled: bool,
) -> Result<AnalysisData> {
    if config.try_fast_path() && !fast_path_disabled {
        let fast_data = AnalysisData::new();
        let mut state = BlockState::new();
        for &param in &method.parameters {
            fast_data.mark_write(&method.symbols, &mut state, param, None, false);
        }
        walker::walk_operation(method, method.root, &mut state, &fast_data, config);

        let has_unused = fast_data.usage_snapshot().values().any(|&used| !used);
        if !has_unused {
            log::trace!(
                target: "unused_value_analysis::coordinator",
                "fast path proved no unused definitions; skipping precise CFG path",
            );
            return Ok(fast_data);
        }
    }

    log::trace!(
        target: "unused_value_analysis::coordinator",
        "running precise CFG dataflow pass",
    );
    let data = AnalysisData::new();
    dataflow::run_to_fixpoint_cancellable(method, &method.cfg, &data, config, cancellation)?;
    Ok(data)
}

struct DelegateEscapes {
    /// A delegate value escapes in a way that cannot be soundly analyzed (conversion to a
    /// non-delegate type, a delegate-typed return, or a `Ref`/`Out` delegate parameter):
    /// disables the dataflow analysis entirely.
    dataflow_disabled: bool,
    /// Any delegate-creation expression appears in the method: disables the fast
    /// operation-tree path, since it cannot soundly prove the absence of unused definitions
    /// once delegate invocation may occur.
    fast_path_disabled: bool,
}

fn scan_delegate_escapes(method: &MethodIr) -> DelegateEscapes {
    let mut dataflow_disabled = false;
    let mut fast_path_disabled = false;

    for &param in &method.parameters {
        let symbol = method.symbols.get(param);
        if symbol.is_ref_or_out() && method.types.is_delegate(symbol.declared_type) {
            dataflow_disabled = true;
        }
    }

    traverse::preorder(method, method.root, &mut |op| {
        let node = method.operations.get(op);
        match &node.kind {
            OperationKind::Conversion { operand } => {
                let from = method.operations.get(*operand).operand_type;
                let to = node.operand_type;
                if method.types.is_delegate(from) && !method.types.is_delegate(to) {
                    dataflow_disabled = true;
                }
            }
            OperationKind::Return(Some(value)) => {
                if method
                    .types
                    .is_delegate(method.operations.get(*value).operand_type)
                {
                    dataflow_disabled = true;
                }
            }
            OperationKind::DelegateCreation { .. } => {
                fast_path_disabled = true;
            }
            _ => {}
        }
    });

    DelegateEscapes {
        dataflow_disabled,
        fast_path_disabled,
    }
}

/// Event-handler shape: exactly two parameters, the first of the root object type, the second
/// deriving from the event-args base type.
fn is_event_handler_shape(method: &MethodIr) -> bool {
    let [first, second] = method.parameters.as_slice() else {
        return false;
    };
    let first_ty = method.symbols.get(*first).declared_type;
    let second_ty = method.symbols.get(*second).declared_type;
    method.types.is_object(first_ty) && method.types.is_event_args(second_ty)
}

fn select_param_unused_candidate(
    method: &MethodIr,
    metadata: &MethodMetadata,
    config: &AnalysisConfig,
    data: &AnalysisData,
    param: SymbolId,
    preference: FixPreference,
    severity: crate::options::Severity,
) -> Option<Diagnostic> {
    if metadata.is_implicitly_declared
        || metadata.is_accessor
        || metadata.is_interface_implementation
        || metadata.is_abstract_virtual_override_or_extern
        || metadata.used_as_delegate_anywhere
    {
        return None;
    }
    if metadata
        .attributes
        .iter()
        .any(|a| config.ignores_parameter_attribute(a))
    {
        return None;
    }
    if is_event_handler_shape(method) {
        return None;
    }

    let initial = Definition::implicit(param);
    if data.is_used(initial) {
        return None;
    }

    let any_read = data.was_read(param);
    let location = param_location(method, param);
    Some(diagnostics::select_param_unused(
        method,
        param,
        location,
        preference,
        severity,
        any_read,
        metadata.is_externally_visible,
    ))
}

/// Finds the `VariableDeclarator`/`ParameterReference`-style source location for a parameter by
/// scanning for its implicit binding; production hosts would instead carry the parameter's own
/// declaration span directly. Falls back to the method root's location if the parameter has no
/// explicit reference operation anywhere (e.g. it is truly never mentioned in the body).
fn param_location(method: &MethodIr, param: SymbolId) -> crate::ir::SourceSpan {
    let mut found = None;
    traverse::preorder(method, method.root, &mut |op| {
        if found.is_some() {
            return;
        }
        if let OperationKind::ParameterReference(sym) = method.operations.get(op).kind {
            if sym == param {
                found = Some(method.operations.get(op).location);
            }
        }
    });
    found.unwrap_or(method.operations.get(method.root).location)
}
