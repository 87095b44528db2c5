//! The fix planner.
//!
//! Consumes one method's diagnostics (as selected by [`crate::diagnostics`]) and produces an
//! abstract edit list. Edits never touch concrete syntax: `NewNode` describes the *shape* of a
//! replacement/insertion, and a downstream tree-edit collaborator (out of scope here) renders it
//! into real syntax while preserving trivia.

use rustc_hash::FxHashSet;

use crate::diagnostics::{self, Diagnostic, FixPreference};
use crate::ir::{ArgumentKind, OperationId, OperationKind};
use crate::method::MethodIr;
use crate::options::LanguageCapabilities;
use crate::symbol::SymbolId;
use crate::traverse;

/// Why an edit exists, so a downstream simplifier can pick canonical forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPurpose {
    DeleteUnusedAssignment,
    ReplaceAssignmentTargetWithDiscard,
    ReplaceAssignmentTargetWithUnusedLocal,
    DeleteUnusedDeclaration,
    DeleteUnusedInitializer,
    RewriteOutArgumentToDiscard,
    DeclareUnusedForOutArgument,
    ReplaceOutArgumentWithUnusedLocal,
    RewriteDeconstructionTargetToDiscard,
    RewriteDeconstructionTargetToUnusedLocal,
    RewriteExpressionStatementToDiscard,
    RewriteExpressionStatementToUnusedLocal,
    RewriteDeclarationPatternToDiscard,
    RewriteExistingDiscardDeclaration,
}

/// The shape of a node an edit introduces or rewrites to, abstractly: this crate has no syntax
/// tree of its own to build real nodes from; syntactic rewriting is an external collaborator's
/// job.
#[derive(Debug, Clone, PartialEq)]
pub enum NewNode {
    /// `_ = value;`
    DiscardAssignment { value: OperationId },
    /// `var name = value;`
    UnusedLocalWithInitializer { name: String, value: OperationId },
    /// A declaration of `name` with no initializer, inserted ahead of an `out`-argument call.
    UnusedLocalDeclaration { name: String },
    /// The declarator this edit targets, minus its initializer (`int x;`), keeping the
    /// original symbol's name.
    DeclarationWithoutInitializer,
    /// `is Type _`
    DiscardPattern,
    /// Bare `_`, used at an assignment target, `out`-argument, or deconstruction-target
    /// position.
    DiscardReference,
    /// Bare `name`, used at the same positions as [`NewNode::DiscardReference`] when the
    /// preference is `UnusedLocal`.
    UnusedLocalReference { name: String },
}

/// One abstract tree edit. `trivia_from` names the node whose surrounding trivia the
/// replacement should inherit; preserving it is the downstream collaborator's job.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Insert {
        before: OperationId,
        purpose: EditPurpose,
        new_node: NewNode,
    },
    Replace {
        target: OperationId,
        purpose: EditPurpose,
        new_node: NewNode,
        trivia_from: OperationId,
    },
    Delete {
        target: OperationId,
        purpose: EditPurpose,
    },
}

/// Generates `unused`, `unused1`, `unused2`, … skipping any name already declared in the
/// method's scope or already handed out by this generator.
struct UnusedNameGenerator {
    used: FxHashSet<String>,
    next: u32,
}

impl UnusedNameGenerator {
    fn new(method: &MethodIr) -> Self {
        Self {
            used: method.symbols.names_in_scope().map(str::to_string).collect(),
            next: 0,
        }
    }

    fn next_name(&mut self) -> String {
        loop {
            let candidate = if self.next == 0 {
                "unused".to_string()
            } else {
                format!("unused{}", self.next)
            };
            self.next += 1;
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// Plans fixes for `diagnostics`, one method at a time, under `preference` (already downgraded
/// by the caller's [`crate::options::effective_preference`] if needed at the diagnostic level;
/// this function additionally guards against [`crate::error::AnalysisError::FixPlanInfeasible`]
/// by re-checking `caps` once for the method-level preference).
pub fn plan_fixes(
    method: &MethodIr,
    diagnostics: &[Diagnostic],
    preference: FixPreference,
    caps: &dyn LanguageCapabilities,
) -> Vec<Edit> {
    let preference = downgrade(preference, caps);
    let mut namer = UnusedNameGenerator::new(method);
    let mut edits = Vec::new();

    for diag in diagnostics {
        match diag.id {
            diagnostics::VALUE_UNUSED => plan_value_unused(method, diag, preference, &mut namer, &mut edits),
            diagnostics::EXPR_UNUSED => plan_expr_unused(method, diag, preference, &mut namer, &mut edits),
            // Parameter removal is a separate refactor, never emitted here.
            diagnostics::PARAM_UNUSED => {}
            _ => {}
        }
    }

    rewrite_preexisting_discards(method, preference, &mut edits);
    edits
}

fn downgrade(preference: FixPreference, caps: &dyn LanguageCapabilities) -> FixPreference {
    if preference == FixPreference::Discard && !caps.supports_discard() {
        FixPreference::UnusedLocal
    } else {
        preference
    }
}

fn plan_value_unused(
    method: &MethodIr,
    diag: &Diagnostic,
    preference: FixPreference,
    namer: &mut UnusedNameGenerator,
    edits: &mut Vec<Edit>,
) {
    let (Some(def_op), Some(symbol)) = (diag.definition_op, diag.symbol) else {
        return;
    };

    if let Some(invocation) = enclosing_out_argument(method, def_op) {
        plan_out_argument(def_op, invocation, preference, namer, edits);
        return;
    }

    let kind = method.operations.get(def_op).kind.clone();
    if let OperationKind::DeconstructionAssignment { .. } = kind {
        if let Some(target_op) = enclosing_deconstruction_target(method, def_op, symbol) {
            plan_deconstruction_target(target_op, preference, namer, edits);
        }
        // A deconstruction write whose target symbol cannot be located (e.g. through an
        // l-value capture this planner does not chase) is left without a fix; the diagnostic
        // still stands.
        return;
    }

    match kind {
        OperationKind::VariableDeclarator {
            initializer: Some(_),
            ..
        } => plan_declarator_initializer(method, def_op, symbol, preference, edits),
        OperationKind::DeclarationPattern { .. } => plan_declaration_pattern(def_op, preference, edits),
        OperationKind::SimpleAssignment { .. } => {
            plan_simple_assignment(diag, def_op, kind, preference, namer, edits)
        }
        // Compound assignment, increment/decrement, and any other write site have no fix
        // entry in the decision table; the diagnostic fires without an accompanying edit.
        _ => {}
    }
}

fn plan_declarator_initializer(
    method: &MethodIr,
    def_op: OperationId,
    symbol: SymbolId,
    preference: FixPreference,
    edits: &mut Vec<Edit>,
) {
    if preference != FixPreference::Discard {
        // UnusedLocal: "leave unchanged (preference already met)".
        return;
    }
    if symbol_has_other_occurrences(method, symbol, def_op) {
        edits.push(Edit::Replace {
            target: def_op,
            purpose: EditPurpose::DeleteUnusedInitializer,
            new_node: NewNode::DeclarationWithoutInitializer,
            trivia_from: def_op,
        });
    } else {
        edits.push(Edit::Delete {
            target: def_op,
            purpose: EditPurpose::DeleteUnusedDeclaration,
        });
    }
}

fn plan_simple_assignment(
    diag: &Diagnostic,
    def_op: OperationId,
    kind: OperationKind,
    preference: FixPreference,
    namer: &mut UnusedNameGenerator,
    edits: &mut Vec<Edit>,
) {
    // Row "Assignment to existing local/param (removable RHS, local never read)": delete the
    // whole statement regardless of preference. `is_unused_local` on the diagnostic already
    // carries "symbol is a local read nowhere"; combined with a removable RHS, there is nothing
    // worth keeping a name for.
    if diag.is_removable_assignment && diag.is_unused_local {
        edits.push(Edit::Delete {
            target: def_op,
            purpose: EditPurpose::DeleteUnusedAssignment,
        });
        return;
    }

    let OperationKind::SimpleAssignment { target, value } = kind else {
        return;
    };
    match preference {
        FixPreference::Discard => edits.push(Edit::Replace {
            target,
            purpose: EditPurpose::ReplaceAssignmentTargetWithDiscard,
            new_node: NewNode::DiscardReference,
            trivia_from: target,
        }),
        FixPreference::UnusedLocal => {
            let name = namer.next_name();
            edits.push(Edit::Replace {
                target,
                purpose: EditPurpose::ReplaceAssignmentTargetWithUnusedLocal,
                new_node: NewNode::UnusedLocalWithInitializer { name, value },
                trivia_from: target,
            });
        }
    }
}

fn plan_declaration_pattern(def_op: OperationId, preference: FixPreference, edits: &mut Vec<Edit>) {
    if preference != FixPreference::Discard {
        // UnusedLocal: "leave unchanged (not actionable)".
        return;
    }
    edits.push(Edit::Replace {
        target: def_op,
        purpose: EditPurpose::RewriteDeclarationPatternToDiscard,
        new_node: NewNode::DiscardPattern,
        trivia_from: def_op,
    });
}

fn plan_out_argument(
    def_op: OperationId,
    invocation: OperationId,
    preference: FixPreference,
    namer: &mut UnusedNameGenerator,
    edits: &mut Vec<Edit>,
) {
    match preference {
        FixPreference::Discard => edits.push(Edit::Replace {
            target: def_op,
            purpose: EditPurpose::RewriteOutArgumentToDiscard,
            new_node: NewNode::DiscardReference,
            trivia_from: def_op,
        }),
        FixPreference::UnusedLocal => {
            let name = namer.next_name();
            edits.push(Edit::Insert {
                before: invocation,
                purpose: EditPurpose::DeclareUnusedForOutArgument,
                new_node: NewNode::UnusedLocalDeclaration { name: name.clone() },
            });
            edits.push(Edit::Replace {
                target: def_op,
                purpose: EditPurpose::ReplaceOutArgumentWithUnusedLocal,
                new_node: NewNode::UnusedLocalReference { name },
                trivia_from: def_op,
            });
        }
    }
}

fn plan_deconstruction_target(
    target_op: OperationId,
    preference: FixPreference,
    namer: &mut UnusedNameGenerator,
    edits: &mut Vec<Edit>,
) {
    match preference {
        FixPreference::Discard => edits.push(Edit::Replace {
            target: target_op,
            purpose: EditPurpose::RewriteDeconstructionTargetToDiscard,
            new_node: NewNode::DiscardReference,
            trivia_from: target_op,
        }),
        FixPreference::UnusedLocal => {
            let name = namer.next_name();
            edits.push(Edit::Replace {
                target: target_op,
                purpose: EditPurpose::RewriteDeconstructionTargetToUnusedLocal,
                new_node: NewNode::UnusedLocalReference { name },
                trivia_from: target_op,
            });
        }
    }
}

fn plan_expr_unused(
    method: &MethodIr,
    diag: &Diagnostic,
    preference: FixPreference,
    namer: &mut UnusedNameGenerator,
    edits: &mut Vec<Edit>,
) {
    let Some(statement_op) = diag.definition_op else {
        return;
    };
    let OperationKind::ExpressionStatement { operand } = method.operations.get(statement_op).kind.clone()
    else {
        return;
    };
    match preference {
        FixPreference::Discard => edits.push(Edit::Replace {
            target: statement_op,
            purpose: EditPurpose::RewriteExpressionStatementToDiscard,
            new_node: NewNode::DiscardAssignment { value: operand },
            trivia_from: statement_op,
        }),
        FixPreference::UnusedLocal => {
            let name = namer.next_name();
            edits.push(Edit::Replace {
                target: statement_op,
                purpose: EditPurpose::RewriteExpressionStatementToUnusedLocal,
                new_node: NewNode::UnusedLocalWithInitializer { name, value: operand },
                trivia_from: statement_op,
            });
        }
    }
}

/// Post-pass: under `Discard`, rewrite any pre-existing `var _ = expr;` declaration to a
/// discard assignment, so an inserted discard never collides with one the user already wrote.
fn rewrite_preexisting_discards(method: &MethodIr, preference: FixPreference, edits: &mut Vec<Edit>) {
    if preference != FixPreference::Discard {
        return;
    }
    traverse::preorder(method, method.root, &mut |op| {
        if let OperationKind::VariableDeclarator {
            symbol,
            initializer: Some(value),
        } = &method.operations.get(op).kind
        {
            if method.symbols.get(*symbol).is_discard() {
                edits.push(Edit::Replace {
                    target: op,
                    purpose: EditPurpose::RewriteExistingDiscardDeclaration,
                    new_node: NewNode::DiscardAssignment { value: *value },
                    trivia_from: op,
                });
            }
        }
    });
}

/// Whether `def_op` sits in an `out`-argument position of some invocation: either a
/// `VariableDeclarator` forming an inline `out var x` declaration, or a bare reference to a
/// pre-existing variable passed `out`. Both cases are walked the same
/// way in [`crate::walker`], which always records the argument's own `value` operation as the
/// write site, so a single parent-pointer check covers both.
fn enclosing_out_argument(method: &MethodIr, def_op: OperationId) -> Option<OperationId> {
    let parent = method.operations.get(def_op).parent?;
    match &method.operations.get(parent).kind {
        OperationKind::Invocation { arguments, .. } => arguments
            .iter()
            .any(|a| a.kind == ArgumentKind::Out && a.value == def_op)
            .then_some(parent),
        _ => None,
    }
}

/// Locates the specific deconstruction-assignment target operand that names `symbol`, so the
/// fix can rewrite just that position rather than the whole assignment.
fn enclosing_deconstruction_target(
    method: &MethodIr,
    def_op: OperationId,
    symbol: SymbolId,
) -> Option<OperationId> {
    let OperationKind::DeconstructionAssignment { targets, .. } = &method.operations.get(def_op).kind else {
        return None;
    };
    targets
        .iter()
        .copied()
        .find(|&t| matches!(method.operations.get(t).kind,
            OperationKind::LocalReference(s) | OperationKind::ParameterReference(s) if s == symbol))
}

/// Whether `symbol` is named by any operation other than `excluding` — used to decide whether
/// deleting an unused initializer can take the whole declaration with it, or must leave a bare
/// `int x;` behind because something else in the method still refers to `x`.
fn symbol_has_other_occurrences(method: &MethodIr, symbol: SymbolId, excluding: OperationId) -> bool {
    let mut found = false;
    traverse::preorder(method, method.root, &mut |op| {
        if found || op == excluding {
            return;
        }
        let names_symbol = match method.operations.get(op).kind {
            OperationKind::LocalReference(s) | OperationKind::ParameterReference(s) => s == symbol,
            OperationKind::VariableDeclarator { symbol: s, .. } | OperationKind::DeclarationPattern { symbol: s } => {
                s == symbol
            }
            _ => false,
        };
        if names_symbol {
            found = true;
        }
    });
    found
}
