//! Diagnostic selection.

use crate::analysis_data::AnalysisData;
use crate::definition::Definition;
use crate::ir::{OperationId, OperationKind, SourceSpan};
use crate::method::MethodIr;
use crate::options::{Preference, Severity};
use crate::symbol::SymbolId;

pub const EXPR_UNUSED: &str = "EXPR_UNUSED";
pub const VALUE_UNUSED: &str = "VALUE_UNUSED";
pub const PARAM_UNUSED: &str = "PARAM_UNUSED";

/// The fix-facing preference a diagnostic was selected under, after the discard-downgrade
/// capability rule has already been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixPreference {
    Discard,
    UnusedLocal,
}

impl From<Preference> for Option<FixPreference> {
    fn from(p: Preference) -> Self {
        match p {
            Preference::Disabled => None,
            Preference::PreferDiscard => Some(FixPreference::Discard),
            Preference::PreferUnusedLocal => Some(FixPreference::UnusedLocal),
        }
    }
}

/// One diagnostic, with the property bag the fix planner needs so it doesn't have to repeat
/// analysis.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub id: &'static str,
    pub severity: Severity,
    pub location: SourceSpan,
    pub message: String,
    pub preference: FixPreference,
    pub is_unused_local: bool,
    pub is_removable_assignment: bool,
    pub symbol: Option<SymbolId>,
    pub definition_op: Option<OperationId>,
}

/// Expression-statement check (`EXPR_UNUSED`). Independent of the dataflow result — it only
/// needs the operand's type and constant-ness — so it is run as its own pass over the
/// statement, not via the walker's events.
pub fn select_expr_unused(
    method: &MethodIr,
    config: &crate::config::AnalysisConfig,
    preference: FixPreference,
    severity: Severity,
    statement_op: OperationId,
    operand: OperationId,
) -> Option<Diagnostic> {
    let operand_node = method.operations.get(operand);
    if method.types.is_void(operand_node.operand_type) {
        return None;
    }
    if matches!(
        operand_node.kind,
        OperationKind::SimpleAssignment { .. }
            | OperationKind::CompoundAssignment { .. }
            | OperationKind::DeconstructionAssignment { .. }
            | OperationKind::IncrementOrDecrement { .. }
    ) {
        return None;
    }
    if !config.flags_boolean_and_constant_expression_statements() {
        if method.types.is_boolean(operand_node.operand_type) {
            return None;
        }
        if operand_node.constant_value.is_some() {
            return None;
        }
    }

    Some(Diagnostic {
        id: EXPR_UNUSED,
        severity,
        location: method.operations.get(statement_op).location,
        message: "the value of this expression is never used".to_string(),
        preference,
        is_unused_local: false,
        is_removable_assignment: false,
        symbol: None,
        definition_op: Some(statement_op),
    })
}

/// `VALUE_UNUSED` selection, including the `PreferUnusedLocal` locally-unread/non-removable
/// filter.
pub fn select_value_unused(
    method: &MethodIr,
    data: &AnalysisData,
    preference: FixPreference,
    severity: Severity,
    def: Definition,
) -> Option<Diagnostic> {
    let op = def.operation?;
    if data.is_used(def) {
        return None;
    }

    let removable = is_removable_assignment(method, op);
    let locally_unread =
        matches!(method.symbols.get(def.symbol).kind, crate::symbol::SymbolKind::Local)
            && !data.was_read(def.symbol);
    if preference == FixPreference::UnusedLocal && locally_unread && !removable {
        return None;
    }

    Some(Diagnostic {
        id: VALUE_UNUSED,
        severity,
        location: method.operations.get(op).location,
        message: "the value assigned here is never used".to_string(),
        preference,
        is_unused_local: locally_unread,
        is_removable_assignment: removable,
        symbol: Some(def.symbol),
        definition_op: Some(op),
    })
}

/// Whether the write at `op` assigns a side-effect-free right-hand side (a constant, a
/// parameter/local reference, or a field reference), i.e. whether deleting the assignment
/// statement outright is safe.
pub fn is_removable_assignment(method: &MethodIr, op: OperationId) -> bool {
    let value = match &method.operations.get(op).kind {
        OperationKind::SimpleAssignment { value, .. } => Some(*value),
        OperationKind::VariableDeclarator { initializer, .. } => *initializer,
        _ => None,
    };
    let Some(value) = value else {
        return false;
    };
    matches!(
        method.operations.get(value).kind,
        OperationKind::Constant(_)
            | OperationKind::LocalReference(_)
            | OperationKind::ParameterReference(_)
            | OperationKind::FieldReference
    )
}

/// `PARAM_UNUSED` selection for a single candidate parameter. `any_read` indicates whether the
/// parameter was read on some path even though its initial (entry) value never was;
/// `externally_visible` indicates the containing method may be part of a shipped public API.
pub fn select_param_unused(
    method: &MethodIr,
    param: SymbolId,
    param_location: SourceSpan,
    preference: FixPreference,
    severity: Severity,
    any_read: bool,
    externally_visible: bool,
) -> Diagnostic {
    let mut message = String::from("this parameter is never used");
    if any_read {
        message.push_str(", its initial value is never used");
    }
    if externally_visible {
        message.push_str(" if it is not part of a shipped public API");
    }
    let _ = method;
    Diagnostic {
        id: PARAM_UNUSED,
        severity,
        location: param_location,
        message,
        preference,
        is_unused_local: false,
        is_removable_assignment: false,
        symbol: Some(param),
        definition_op: None,
    }
}
