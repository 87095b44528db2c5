//! Symbols and types.

/// Opaque identity for a local, parameter, or discard, interned within one [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) u32);

/// Opaque identity for a declared type, interned within one [`TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Local,
    Parameter,
    Discard,
    Other,
}

/// Passing mode of a parameter symbol. `None` for non-parameter symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Value,
    In,
    Ref,
    Out,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub ref_kind: Option<RefKind>,
    pub declared_type: Option<TypeId>,
    pub name: Option<String>,
}

impl Symbol {
    pub fn is_discard(&self) -> bool {
        matches!(self.kind, SymbolKind::Discard)
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self.kind, SymbolKind::Parameter)
    }

    pub fn is_ref_or_out(&self) -> bool {
        matches!(self.ref_kind, Some(RefKind::Ref) | Some(RefKind::Out))
    }
}

/// Interner for the symbols visible in one method (including nested lambdas/local functions,
/// which share their enclosing method's table).
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(
        &mut self,
        kind: SymbolKind,
        ref_kind: Option<RefKind>,
        declared_type: Option<TypeId>,
        name: impl Into<Option<String>>,
    ) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            kind,
            ref_kind,
            declared_type,
            name: name.into(),
        });
        id
    }

    pub fn declare_discard(&mut self) -> SymbolId {
        self.declare(SymbolKind::Discard, None, None, None)
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn names_in_scope(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().filter_map(|s| s.name.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Void,
    Boolean,
    Delegate,
    /// The root object type (e.g. `System.Object`), used only to recognize the
    /// event-handler-shape exemption.
    Object,
    /// A type deriving from the framework event-args base type, same purpose as `Object` above.
    EventArgs,
    Other,
}

#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub kind: TypeKind,
}

/// Interner for the small set of type facts this crate needs: whether a type is `void`,
/// `bool`, or a delegate type. Everything else is opaque.
#[derive(Debug, Default)]
pub struct TypeTable {
    types: Vec<TypeInfo>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(TypeInfo { kind });
        id
    }

    pub fn get(&self, id: TypeId) -> &TypeInfo {
        &self.types[id.0 as usize]
    }

    pub fn is_delegate(&self, id: Option<TypeId>) -> bool {
        id.is_some_and(|id| matches!(self.get(id).kind, TypeKind::Delegate))
    }

    pub fn is_void(&self, id: Option<TypeId>) -> bool {
        id.is_some_and(|id| matches!(self.get(id).kind, TypeKind::Void))
    }

    pub fn is_boolean(&self, id: Option<TypeId>) -> bool {
        id.is_some_and(|id| matches!(self.get(id).kind, TypeKind::Boolean))
    }

    pub fn is_object(&self, id: Option<TypeId>) -> bool {
        id.is_some_and(|id| matches!(self.get(id).kind, TypeKind::Object))
    }

    pub fn is_event_args(&self, id: Option<TypeId>) -> bool {
        id.is_some_and(|id| matches!(self.get(id).kind, TypeKind::EventArgs))
    }
}
