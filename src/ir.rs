//! The operation tree: the per-method arena of IR nodes this crate's analyses walk.
//!
//! This is the crate's own concrete encoding of the IR that a production host's semantic model
//! would otherwise supply; see [`crate::interfaces::IrProvider`] for the trait boundary a real
//! compiler front-end implements instead of constructing [`Operation`]s directly.

use std::fmt;

use crate::symbol::{SymbolId, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId(pub(crate) u32);

/// Identifies one l-value flow-capture slot within a method. Distinct captures never alias;
/// all writes/reads under the same id may alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureId(pub u32);

/// A 1-based, order-preserving source location. Real hosts would carry file + byte offsets;
/// this crate only needs enough to order diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceSpan {
    pub start: u32,
    pub end: u32,
}

impl SourceSpan {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Bool(bool),
    Int(i64),
    String(String),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Value,
    In,
    Ref,
    Out,
}

#[derive(Debug, Clone)]
pub struct Argument {
    pub kind: ArgumentKind,
    pub value: OperationId,
}

/// The kinds of IR node this crate's analyses classify and react to. Anything not named here is
/// folded into [`OperationKind::Other`] and is transparent to the walker (a read-only leaf with
/// no symbol references of its own).
#[derive(Debug, Clone)]
pub enum OperationKind {
    /// A sequence of statements, evaluated in order. Used both for method bodies and for
    /// nested blocks (`if`/`else` arms, etc).
    Block(Vec<OperationId>),
    /// `declare x [= initializer]` or a `foreach` loop variable binding.
    VariableDeclarator {
        symbol: SymbolId,
        initializer: Option<OperationId>,
    },
    LocalReference(SymbolId),
    ParameterReference(SymbolId),
    FieldReference,
    SimpleAssignment {
        target: OperationId,
        value: OperationId,
    },
    CompoundAssignment {
        target: OperationId,
        value: OperationId,
    },
    DeconstructionAssignment {
        targets: Vec<OperationId>,
        value: OperationId,
    },
    IncrementOrDecrement {
        target: OperationId,
    },
    ExpressionStatement {
        operand: OperationId,
    },
    Invocation {
        callee: Option<OperationId>,
        arguments: Vec<Argument>,
    },
    DelegateCreation {
        target: OperationId,
    },
    Conversion {
        operand: OperationId,
    },
    Parenthesized {
        operand: OperationId,
    },
    /// `SomeLocalFunction` used as a value, e.g. passed where a delegate is expected.
    MethodReference {
        /// The referenced operation, when it names a local function body's declaring op.
        local_function: Option<OperationId>,
    },
    /// Lambda body not yet lowered to a CFG (only occurs in the fast operation-tree path).
    AnonymousFunction {
        body: OperationId,
    },
    /// A lambda lowered to its own CFG, addressed by the enclosing [`crate::cfg::Cfg`]'s
    /// `nested_cfgs` map, keyed by this operation's id.
    FlowAnonymousFunction,
    DeclarationPattern {
        symbol: SymbolId,
    },
    FlowCapture {
        id: CaptureId,
        value: OperationId,
    },
    FlowCaptureReference {
        id: CaptureId,
        is_lvalue: bool,
    },
    If {
        condition: OperationId,
        then_branch: OperationId,
        else_branch: Option<OperationId>,
    },
    Return(Option<OperationId>),
    Constant(ConstantValue),
    /// Any IR node this analysis does not react to specially (binary/call-target expressions
    /// with no symbol references of their own, etc). Still traversed for its operands so that
    /// nested reads/writes are found.
    Other {
        operands: Vec<OperationId>,
    },
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: OperationKind,
    pub parent: Option<OperationId>,
    pub operand_type: Option<TypeId>,
    pub location: SourceSpan,
    pub is_implicit: bool,
    pub constant_value: Option<ConstantValue>,
}

/// Owns every [`Operation`] in one method, including nested lambda/local-function bodies,
/// which live in the same arena as the enclosing method.
#[derive(Debug, Default)]
pub struct OperationArena {
    operations: Vec<Operation>,
}

impl OperationArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, kind: OperationKind, location: SourceSpan) -> OperationId {
        let id = OperationId(self.operations.len() as u32);
        self.operations.push(Operation {
            kind,
            parent: None,
            operand_type: None,
            location,
            is_implicit: false,
            constant_value: None,
        });
        id
    }

    pub fn get(&self, id: OperationId) -> &Operation {
        &self.operations[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn get_mut(&mut self, id: OperationId) -> &mut Operation {
        &mut self.operations[id.0 as usize]
    }

    /// Links children to their parent and implicit-flag metadata. Called once per operation
    /// after a method's tree has been fully built by a builder (see `tests/seed_scenarios.rs`);
    /// production `IrProvider` implementations set `parent` as the tree is built instead.
    pub fn set_parent(&mut self, child: OperationId, parent: OperationId) {
        self.operations[child.0 as usize].parent = Some(parent);
    }

    pub fn set_implicit(&mut self, id: OperationId, implicit: bool) {
        self.operations[id.0 as usize].is_implicit = implicit;
    }

    pub fn set_operand_type(&mut self, id: OperationId, ty: Option<TypeId>) {
        self.operations[id.0 as usize].operand_type = ty;
    }

    pub fn set_constant_value(&mut self, id: OperationId, value: Option<ConstantValue>) {
        self.operations[id.0 as usize].constant_value = value;
    }

    /// The immediate sub-operations of `op`, in source order, stopping at the boundary of a
    /// not-yet-entered lambda/local-function body — i.e. this never descends through
    /// `AnonymousFunction`, `FlowAnonymousFunction`, or `MethodReference`.
    /// Used by passes that need to visit "every operation in this method's own tree" without
    /// re-deriving the walker's per-kind structural knowledge (the escape scan in
    /// [`crate::coordinator`] and the `EXPR_UNUSED` sweep in [`crate::diagnostics`]).
    pub fn children(&self, op: OperationId) -> Vec<OperationId> {
        match &self.get(op).kind {
            OperationKind::Block(items) => items.clone(),
            OperationKind::VariableDeclarator { initializer, .. } => {
                initializer.into_iter().copied().collect()
            }
            OperationKind::LocalReference(_)
            | OperationKind::ParameterReference(_)
            | OperationKind::FieldReference
            | OperationKind::FlowCaptureReference { .. }
            | OperationKind::Constant(_)
            | OperationKind::MethodReference { .. }
            | OperationKind::AnonymousFunction { .. }
            | OperationKind::FlowAnonymousFunction
            | OperationKind::DeclarationPattern { .. } => Vec::new(),
            OperationKind::SimpleAssignment { target, value }
            | OperationKind::CompoundAssignment { target, value } => vec![*target, *value],
            OperationKind::DeconstructionAssignment { targets, value } => {
                let mut v = targets.clone();
                v.push(*value);
                v
            }
            OperationKind::IncrementOrDecrement { target } => vec![*target],
            OperationKind::ExpressionStatement { operand }
            | OperationKind::Conversion { operand }
            | OperationKind::Parenthesized { operand } => vec![*operand],
            OperationKind::Invocation { callee, arguments } => {
                let mut v: Vec<_> = callee.into_iter().copied().collect();
                v.extend(arguments.iter().map(|a| a.value));
                v
            }
            OperationKind::DelegateCreation { target } => vec![*target],
            OperationKind::FlowCapture { value, .. } => vec![*value],
            OperationKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut v = vec![*condition, *then_branch];
                v.extend(*else_branch);
                v
            }
            OperationKind::Return(operand) => operand.into_iter().copied().collect(),
            OperationKind::Other { operands } => operands.clone(),
        }
    }

    /// Whether the immediate parent of `op` is an `is`-pattern match and that parent is
    /// compiler-synthesized. Used by the walker's declaration-pattern rule.
    pub fn parent_is_implicit(&self, op: OperationId) -> bool {
        match self.get(op).parent {
            Some(parent) => self.get(parent).is_implicit,
            None => false,
        }
    }
}
