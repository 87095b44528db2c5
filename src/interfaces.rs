//! External collaborators: the IR provider and semantic model. Production hosts back these with
//! a real compiler front-end; this crate ships [`MethodModel`], a thin wrapper over [`MethodIr`]
//! sufficient to run the analyzer end-to-end in tests.

use crate::ir::{ConstantValue, OperationId};
use crate::method::MethodIr;
use crate::symbol::{SymbolId, TypeId};

/// Given a method, yields its operation tree root and CFG. `get_operation` resolves a source
/// location back to an operation, for the fix planner.
pub trait IrProvider {
    fn method(&self) -> &MethodIr;

    fn get_operation(&self, location: crate::ir::SourceSpan) -> Option<OperationId> {
        // Default: linear scan. A production host would index this.
        let method = self.method();
        (0..method.operations_len())
            .map(OperationId)
            .find(|&id| method.operations.get(id).location == location)
    }
}

/// Queries over the semantic model.
pub trait SemanticModel {
    fn get_type(&self, op: OperationId) -> Option<TypeId>;
    fn get_declared_symbol(&self, op: OperationId) -> Option<SymbolId>;
    fn lookup_symbols(&self, name: &str) -> bool;
    fn has_syntax_errors(&self) -> bool;
    fn get_constant_value(&self, op: OperationId) -> Option<ConstantValue>;
}

/// Default [`SemanticModel`]/[`IrProvider`] backed directly by an in-memory [`MethodIr`]. This
/// is what the bundled tests use; it has no notion of syntax errors since its input is always
/// already a valid tree.
pub struct MethodModel<'a> {
    pub method: &'a MethodIr,
}

impl<'a> MethodModel<'a> {
    pub fn new(method: &'a MethodIr) -> Self {
        Self { method }
    }
}

impl<'a> IrProvider for MethodModel<'a> {
    fn method(&self) -> &MethodIr {
        self.method
    }
}

impl<'a> SemanticModel for MethodModel<'a> {
    fn get_type(&self, op: OperationId) -> Option<TypeId> {
        self.method.operations.get(op).operand_type
    }

    fn get_declared_symbol(&self, op: OperationId) -> Option<SymbolId> {
        use crate::ir::OperationKind::*;
        match &self.method.operations.get(op).kind {
            VariableDeclarator { symbol, .. } | DeclarationPattern { symbol } => Some(*symbol),
            LocalReference(s) | ParameterReference(s) => Some(*s),
            _ => None,
        }
    }

    fn lookup_symbols(&self, name: &str) -> bool {
        self.method.symbols.names_in_scope().any(|n| n == name)
    }

    fn has_syntax_errors(&self) -> bool {
        false
    }

    fn get_constant_value(&self, op: OperationId) -> Option<ConstantValue> {
        self.method.operations.get(op).constant_value.clone()
    }
}
