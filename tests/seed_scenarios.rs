//! Integration tests covering the full analysis pipeline end to end, each hand-building a
//! method's operation tree and CFG directly against this crate's own types rather than going
//! through a real front-end, then driving the full [`analyze_method`] / [`plan_fixes`] pipeline.

use expect_test::expect;
use pretty_assertions::assert_eq;
use unused_value_analysis::cancellation::CancellationToken;
use unused_value_analysis::cfg::CfgBuilder;
use unused_value_analysis::config::AnalysisConfig;
use unused_value_analysis::coordinator::{analyze_method, MethodMetadata};
use unused_value_analysis::diagnostics::{self, FixPreference};
use unused_value_analysis::fixplan::{plan_fixes, Edit, EditPurpose, NewNode};
use unused_value_analysis::ir::{
    Argument, ArgumentKind, ConstantValue, OperationArena, OperationKind, SourceSpan,
};
use unused_value_analysis::method::MethodIr;
use unused_value_analysis::options::{
    AlwaysSupportsDiscard, NeverSupportsDiscard, Preference, Severity, StaticOptionsProvider,
};
use unused_value_analysis::symbol::{RefKind, SymbolKind, SymbolTable, TypeKind, TypeTable};

fn span(n: u32) -> SourceSpan {
    SourceSpan::new(n, n + 1)
}

fn run(
    method: &MethodIr,
    preference: Preference,
) -> Vec<unused_value_analysis::Diagnostic> {
    let _ = env_logger::builder().is_test(true).try_init();
    let metadata = MethodMetadata::default();
    let options = StaticOptionsProvider(preference, Severity::Warning);
    let caps = AlwaysSupportsDiscard;
    let config = AnalysisConfig::new();
    let cancellation = CancellationToken::new();
    analyze_method(method, &metadata, &options, &caps, &config, &cancellation)
        .expect("analysis is not cancelled")
}

/// `int f() { int x = 1; x = 2; return x; }`. One `VALUE_UNUSED` on the `= 1` initializer,
/// regardless of preference; a fix is only wired up for it under `Discard` (`PreferUnusedLocal`
/// leaves it unchanged, since the preference is already met).
#[test]
fn overwritten_initializer_is_unused() {
    let mut symbols = SymbolTable::new();
    let x = symbols.declare(SymbolKind::Local, None, None, "x".to_string());

    let mut operations = OperationArena::new();
    let one = operations.alloc(OperationKind::Constant(ConstantValue::Int(1)), span(0));
    let decl_x = operations.alloc(
        OperationKind::VariableDeclarator { symbol: x, initializer: Some(one) },
        span(0),
    );
    let two = operations.alloc(OperationKind::Constant(ConstantValue::Int(2)), span(1));
    let x_target = operations.alloc(OperationKind::LocalReference(x), span(1));
    let assign = operations.alloc(
        OperationKind::SimpleAssignment { target: x_target, value: two },
        span(1),
    );
    let x_ret = operations.alloc(OperationKind::LocalReference(x), span(2));
    let ret = operations.alloc(OperationKind::Return(Some(x_ret)), span(2));

    let root = operations.alloc(OperationKind::Block(vec![decl_x, assign, ret]), span(0));

    let mut builder = CfgBuilder::new();
    let entry = builder.add_block();
    let exit = builder.add_block();
    builder.block_mut(entry).operations = vec![decl_x, assign, ret];
    builder.block_mut(entry).fallthrough_successor = Some(exit);
    let cfg = builder.build(entry, exit);

    let method = MethodIr {
        symbols,
        types: TypeTable::new(),
        operations,
        root,
        parameters: vec![],
        cfg,
    };

    for preference in [Preference::PreferDiscard, Preference::PreferUnusedLocal] {
        let diags = run(&method, preference);
        assert_eq!(diags.len(), 1, "expected exactly one diagnostic under {preference:?}");
        let d = &diags[0];
        assert_eq!(d.id, diagnostics::VALUE_UNUSED);
        assert_eq!(d.definition_op, Some(decl_x));
        assert_eq!(d.symbol, Some(x));
        assert!(d.is_removable_assignment);
    }

    let fix_pref = FixPreference::Discard;
    let diags = run(&method, Preference::PreferDiscard);
    let edits = plan_fixes(&method, &diags, fix_pref, &AlwaysSupportsDiscard);
    assert_eq!(edits.len(), 1);
    assert_eq!(
        edits[0],
        Edit::Replace {
            target: decl_x,
            purpose: EditPurpose::DeleteUnusedInitializer,
            new_node: NewNode::DeclarationWithoutInitializer,
            trivia_from: decl_x,
        }
    );

    let diags = run(&method, Preference::PreferUnusedLocal);
    let edits = plan_fixes(&method, &diags, FixPreference::UnusedLocal, &AlwaysSupportsDiscard);
    assert!(edits.is_empty(), "UnusedLocal leaves this row unchanged");
}

/// `int f() { int x; x = call(); x = 2; return x; }` under `PreferDiscard`, and the
/// `PreferUnusedLocal` fix for the same diagnostic.
#[test]
fn side_effecting_rhs_overwritten_is_unused() {
    let mut symbols = SymbolTable::new();
    let x = symbols.declare(SymbolKind::Local, None, None, "x".to_string());

    let mut operations = OperationArena::new();
    let decl_x = operations.alloc(
        OperationKind::VariableDeclarator { symbol: x, initializer: None },
        span(0),
    );
    let call_op = operations.alloc(
        OperationKind::Invocation { callee: None, arguments: vec![] },
        span(1),
    );
    let x_target1 = operations.alloc(OperationKind::LocalReference(x), span(1));
    let assign_call = operations.alloc(
        OperationKind::SimpleAssignment { target: x_target1, value: call_op },
        span(1),
    );
    let two = operations.alloc(OperationKind::Constant(ConstantValue::Int(2)), span(2));
    let x_target2 = operations.alloc(OperationKind::LocalReference(x), span(2));
    let assign_two = operations.alloc(
        OperationKind::SimpleAssignment { target: x_target2, value: two },
        span(2),
    );
    let x_ret = operations.alloc(OperationKind::LocalReference(x), span(3));
    let ret = operations.alloc(OperationKind::Return(Some(x_ret)), span(3));

    let root = operations.alloc(
        OperationKind::Block(vec![decl_x, assign_call, assign_two, ret]),
        span(0),
    );

    let mut builder = CfgBuilder::new();
    let entry = builder.add_block();
    let exit = builder.add_block();
    builder.block_mut(entry).operations = vec![decl_x, assign_call, assign_two, ret];
    builder.block_mut(entry).fallthrough_successor = Some(exit);
    let cfg = builder.build(entry, exit);

    let method = MethodIr {
        symbols,
        types: TypeTable::new(),
        operations,
        root,
        parameters: vec![],
        cfg,
    };

    let diags = run(&method, Preference::PreferDiscard);
    assert_eq!(diags.len(), 1);
    let d = &diags[0];
    assert_eq!(d.id, diagnostics::VALUE_UNUSED);
    assert_eq!(d.definition_op, Some(assign_call));
    assert!(!d.is_removable_assignment, "call() has a side effect");

    let edits = plan_fixes(&method, &diags, FixPreference::Discard, &AlwaysSupportsDiscard);
    assert_eq!(edits.len(), 1);
    assert_eq!(
        edits[0],
        Edit::Replace {
            target: x_target1,
            purpose: EditPurpose::ReplaceAssignmentTargetWithDiscard,
            new_node: NewNode::DiscardReference,
            trivia_from: x_target1,
        }
    );

    let diags_ul = run(&method, Preference::PreferUnusedLocal);
    let edits_ul = plan_fixes(&method, &diags_ul, FixPreference::UnusedLocal, &AlwaysSupportsDiscard);
    assert_eq!(edits_ul.len(), 1);
    assert_eq!(
        edits_ul[0],
        Edit::Replace {
            target: x_target1,
            purpose: EditPurpose::ReplaceAssignmentTargetWithUnusedLocal,
            new_node: NewNode::UnusedLocalWithInitializer { name: "unused".to_string(), value: call_op },
            trivia_from: x_target1,
        }
    );
}

/// `void f() { call(); }` where `call` returns `int`. `EXPR_UNUSED` fires independently of
/// the dataflow pass.
#[test]
fn discarded_call_result_is_unused() {
    let symbols = SymbolTable::new();
    let mut types = TypeTable::new();
    let int_ty = types.declare(TypeKind::Other);

    let mut operations = OperationArena::new();
    let call_op = operations.alloc(
        OperationKind::Invocation { callee: None, arguments: vec![] },
        span(0),
    );
    operations.set_operand_type(call_op, Some(int_ty));
    let expr_stmt = operations.alloc(OperationKind::ExpressionStatement { operand: call_op }, span(0));
    let root = operations.alloc(OperationKind::Block(vec![expr_stmt]), span(0));

    let mut builder = CfgBuilder::new();
    let entry = builder.add_block();
    let exit = builder.add_block();
    builder.block_mut(entry).operations = vec![expr_stmt];
    builder.block_mut(entry).fallthrough_successor = Some(exit);
    let cfg = builder.build(entry, exit);

    let method = MethodIr { symbols, types, operations, root, parameters: vec![], cfg };

    let diags = run(&method, Preference::PreferDiscard);
    assert_eq!(diags.len(), 1);
    expect!["EXPR_UNUSED"].assert_eq(diags[0].id);
    assert_eq!(diags[0].definition_op, Some(expr_stmt));

    let edits = plan_fixes(&method, &diags, FixPreference::Discard, &AlwaysSupportsDiscard);
    assert_eq!(edits.len(), 1);
    assert_eq!(
        edits[0],
        Edit::Replace {
            target: expr_stmt,
            purpose: EditPurpose::RewriteExpressionStatementToDiscard,
            new_node: NewNode::DiscardAssignment { value: call_op },
            trivia_from: expr_stmt,
        }
    );

    let diags_ul = run(&method, Preference::PreferUnusedLocal);
    let edits_ul = plan_fixes(&method, &diags_ul, FixPreference::UnusedLocal, &AlwaysSupportsDiscard);
    assert_eq!(edits_ul.len(), 1);
    assert_eq!(
        edits_ul[0],
        Edit::Replace {
            target: expr_stmt,
            purpose: EditPurpose::RewriteExpressionStatementToUnusedLocal,
            new_node: NewNode::UnusedLocalWithInitializer { name: "unused".to_string(), value: call_op },
            trivia_from: expr_stmt,
        }
    );
}

struct IfMethodParts {
    method: MethodIr,
    decl_x: unused_value_analysis::ir::OperationId,
}

/// Shared builder for `int f(bool b) { int x = 1; if (b) { x = 2; } [else { x = 3; }]
/// return x; }`. `with_else` toggles the else arm.
fn build_if_method(with_else: bool) -> IfMethodParts {
    let mut symbols = SymbolTable::new();
    let b = symbols.declare(SymbolKind::Parameter, Some(RefKind::Value), None, "b".to_string());
    let x = symbols.declare(SymbolKind::Local, None, None, "x".to_string());

    let mut operations = OperationArena::new();
    let one = operations.alloc(OperationKind::Constant(ConstantValue::Int(1)), span(0));
    let decl_x = operations.alloc(
        OperationKind::VariableDeclarator { symbol: x, initializer: Some(one) },
        span(0),
    );

    let two = operations.alloc(OperationKind::Constant(ConstantValue::Int(2)), span(1));
    let x_then_target = operations.alloc(OperationKind::LocalReference(x), span(1));
    let assign_then = operations.alloc(
        OperationKind::SimpleAssignment { target: x_then_target, value: two },
        span(1),
    );
    let then_block_tree = operations.alloc(OperationKind::Block(vec![assign_then]), span(1));

    let else_block_tree = if with_else {
        let three = operations.alloc(OperationKind::Constant(ConstantValue::Int(3)), span(2));
        let x_else_target = operations.alloc(OperationKind::LocalReference(x), span(2));
        let assign_else = operations.alloc(
            OperationKind::SimpleAssignment { target: x_else_target, value: three },
            span(2),
        );
        Some((operations.alloc(OperationKind::Block(vec![assign_else]), span(2)), assign_else))
    } else {
        None
    };

    let b_cond_tree = operations.alloc(OperationKind::ParameterReference(b), span(3));
    let if_node = operations.alloc(
        OperationKind::If {
            condition: b_cond_tree,
            then_branch: then_block_tree,
            else_branch: else_block_tree.map(|(blk, _)| blk),
        },
        span(3),
    );

    let x_ret = operations.alloc(OperationKind::LocalReference(x), span(4));
    let ret = operations.alloc(OperationKind::Return(Some(x_ret)), span(4));

    let root = operations.alloc(OperationKind::Block(vec![decl_x, if_node, ret]), span(0));

    let b_cond_cfg = operations.alloc(OperationKind::ParameterReference(b), span(3));

    let mut builder = CfgBuilder::new().with_parameters(vec![b]);
    let entry = builder.add_block();
    let then_block = builder.add_block();
    let else_block = with_else.then(|| builder.add_block());
    let join = builder.add_block();

    builder.block_mut(entry).operations = vec![decl_x];
    builder.block_mut(entry).branch_value = Some(b_cond_cfg);
    builder.block_mut(entry).conditional_successor = Some(then_block);
    builder.block_mut(entry).fallthrough_successor = Some(else_block.unwrap_or(join));

    builder.block_mut(then_block).operations = vec![assign_then];
    builder.block_mut(then_block).fallthrough_successor = Some(join);

    if let Some(else_block) = else_block {
        let (_, assign_else) = else_block_tree.unwrap();
        builder.block_mut(else_block).operations = vec![assign_else];
        builder.block_mut(else_block).fallthrough_successor = Some(join);
    }

    builder.block_mut(join).operations = vec![x_ret];

    let cfg = builder.build(entry, join);

    let method = MethodIr {
        symbols,
        types: TypeTable::new(),
        operations,
        root,
        parameters: vec![b],
        cfg,
    };

    IfMethodParts { method, decl_x }
}

/// Initializer is overwritten on every path before the read at `return x`, so it is unused.
#[test]
fn initializer_overwritten_on_all_paths_is_unused() {
    let parts = build_if_method(true);
    let diags = run(&parts.method, Preference::PreferDiscard);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].id, diagnostics::VALUE_UNUSED);
    assert_eq!(diags[0].definition_op, Some(parts.decl_x));
}

/// The `else` arm is absent, so the initial value of `x` reaches `return x` when `b` is false;
/// no diagnostic.
#[test]
fn initializer_read_on_else_path_is_used() {
    let parts = build_if_method(false);
    let diags = run(&parts.method, Preference::PreferDiscard);
    assert!(diags.is_empty(), "initial value is read when b is false: {diags:?}");
}

/// `int f() { call(out var x); x = 1; return x; }` under `PreferDiscard`.
#[test]
fn out_var_declarator_overwritten_is_unused() {
    let mut symbols = SymbolTable::new();
    let x = symbols.declare(SymbolKind::Local, None, None, "x".to_string());

    let mut types = TypeTable::new();
    let void_ty = types.declare(TypeKind::Void);

    let mut operations = OperationArena::new();
    let decl_x_outvar = operations.alloc(
        OperationKind::VariableDeclarator { symbol: x, initializer: None },
        span(0),
    );
    let call_op = operations.alloc(
        OperationKind::Invocation {
            callee: None,
            arguments: vec![Argument { kind: ArgumentKind::Out, value: decl_x_outvar }],
        },
        span(0),
    );
    operations.set_parent(decl_x_outvar, call_op);
    operations.set_operand_type(call_op, Some(void_ty));
    let call_stmt = operations.alloc(OperationKind::ExpressionStatement { operand: call_op }, span(0));

    let one = operations.alloc(OperationKind::Constant(ConstantValue::Int(1)), span(1));
    let x_target = operations.alloc(OperationKind::LocalReference(x), span(1));
    let assign_one = operations.alloc(
        OperationKind::SimpleAssignment { target: x_target, value: one },
        span(1),
    );
    let x_ret = operations.alloc(OperationKind::LocalReference(x), span(2));
    let ret = operations.alloc(OperationKind::Return(Some(x_ret)), span(2));

    let root = operations.alloc(OperationKind::Block(vec![call_stmt, assign_one, ret]), span(0));

    let mut builder = CfgBuilder::new();
    let entry = builder.add_block();
    let exit = builder.add_block();
    builder.block_mut(entry).operations = vec![call_stmt, assign_one, ret];
    builder.block_mut(entry).fallthrough_successor = Some(exit);
    let cfg = builder.build(entry, exit);

    let method = MethodIr { symbols, types, operations, root, parameters: vec![], cfg };

    let diags = run(&method, Preference::PreferDiscard);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].id, diagnostics::VALUE_UNUSED);
    assert_eq!(diags[0].definition_op, Some(decl_x_outvar));
    assert_eq!(diags[0].symbol, Some(x));

    let edits = plan_fixes(&method, &diags, FixPreference::Discard, &AlwaysSupportsDiscard);
    assert_eq!(edits.len(), 1);
    assert_eq!(
        edits[0],
        Edit::Replace {
            target: decl_x_outvar,
            purpose: EditPurpose::RewriteOutArgumentToDiscard,
            new_node: NewNode::DiscardReference,
            trivia_from: decl_x_outvar,
        }
    );
}

/// `void f(int p) { }` under any enabled preference emits `PARAM_UNUSED` on `p`, with no fix
/// (parameter removal is a separate refactor, never produced by the planner).
#[test]
fn unused_parameter_has_no_fix() {
    let mut symbols = SymbolTable::new();
    let p = symbols.declare(SymbolKind::Parameter, Some(RefKind::Value), None, "p".to_string());

    let mut operations = OperationArena::new();
    let root = operations.alloc(OperationKind::Block(vec![]), span(0));

    let mut builder = CfgBuilder::new().with_parameters(vec![p]);
    let entry = builder.add_block();
    let exit = builder.add_block();
    builder.block_mut(entry).fallthrough_successor = Some(exit);
    let cfg = builder.build(entry, exit);

    let method = MethodIr {
        symbols,
        types: TypeTable::new(),
        operations,
        root,
        parameters: vec![p],
        cfg,
    };

    for preference in [Preference::PreferDiscard, Preference::PreferUnusedLocal] {
        let diags = run(&method, preference);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].id, diagnostics::PARAM_UNUSED);
        assert_eq!(diags[0].symbol, Some(p));
        assert_eq!(diags[0].definition_op, None);

        let fix_pref = match preference {
            Preference::PreferDiscard => FixPreference::Discard,
            Preference::PreferUnusedLocal => FixPreference::UnusedLocal,
            Preference::Disabled => unreachable!(),
        };
        let edits = plan_fixes(&method, &diags, fix_pref, &AlwaysSupportsDiscard);
        assert!(edits.is_empty(), "PARAM_UNUSED never produces a fix");
    }
}

/// On a language without discard support, no emitted fix introduces a discard symbol, even when
/// the caller requested `PreferDiscard`.
#[test]
fn discard_downgrade_never_emits_discard() {
    let mut symbols = SymbolTable::new();
    let x = symbols.declare(SymbolKind::Local, None, None, "x".to_string());

    let mut operations = OperationArena::new();
    let call_op = operations.alloc(
        OperationKind::Invocation { callee: None, arguments: vec![] },
        span(0),
    );
    let x_target = operations.alloc(OperationKind::LocalReference(x), span(0));
    let assign_call = operations.alloc(
        OperationKind::SimpleAssignment { target: x_target, value: call_op },
        span(0),
    );
    let two = operations.alloc(OperationKind::Constant(ConstantValue::Int(2)), span(1));
    let x_target2 = operations.alloc(OperationKind::LocalReference(x), span(1));
    let assign_two = operations.alloc(
        OperationKind::SimpleAssignment { target: x_target2, value: two },
        span(1),
    );
    let x_ret = operations.alloc(OperationKind::LocalReference(x), span(2));
    let ret = operations.alloc(OperationKind::Return(Some(x_ret)), span(2));
    let root = operations.alloc(
        OperationKind::Block(vec![assign_call, assign_two, ret]),
        span(0),
    );

    let mut builder = CfgBuilder::new();
    let entry = builder.add_block();
    let exit = builder.add_block();
    builder.block_mut(entry).operations = vec![assign_call, assign_two, ret];
    builder.block_mut(entry).fallthrough_successor = Some(exit);
    let cfg = builder.build(entry, exit);

    let method = MethodIr { symbols, types: TypeTable::new(), operations, root, parameters: vec![], cfg };

    let metadata = MethodMetadata::default();
    let options = StaticOptionsProvider(Preference::PreferDiscard, Severity::Warning);
    let caps = NeverSupportsDiscard;
    let config = AnalysisConfig::new();
    let cancellation = CancellationToken::new();
    let diags = analyze_method(&method, &metadata, &options, &caps, &config, &cancellation)
        .expect("analysis is not cancelled");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].preference, FixPreference::UnusedLocal, "discard downgraded at selection time");

    let edits = plan_fixes(&method, &diags, FixPreference::Discard, &NeverSupportsDiscard);
    assert_eq!(edits.len(), 1);
    assert!(
        !matches!(edits[0], Edit::Replace { new_node: NewNode::DiscardReference, .. }),
        "no discard-shaped edit may be produced under NeverSupportsDiscard",
    );
    assert_eq!(
        edits[0],
        Edit::Replace {
            target: x_target,
            purpose: EditPurpose::ReplaceAssignmentTargetWithUnusedLocal,
            new_node: NewNode::UnusedLocalWithInitializer { name: "unused".to_string(), value: call_op },
            trivia_from: x_target,
        }
    );
}
