use pretty_assertions::assert_eq;
use ry_diagnostic::ErrorCode;
use ry_ir::{
    BinaryOp, BlockStyle, ExprKind, ImportKind, Pattern, Protected, SourceUnit, StmtKind, Tree,
};

use super::*;

fn parse_ok(body: &str) -> Tree {
    let text = format!("trash_cleaner = true\n{body}");
    parse(&SourceUnit::inline(text)).unwrap()
}

fn parse_err(text: &str) -> SyntaxError {
    parse(&SourceUnit::inline(text)).unwrap_err()
}

fn first(tree: &Tree) -> &StmtKind {
    &tree.body.stmts[0].kind
}

#[test]
fn directives_are_recorded_not_emitted() {
    let tree = parse(&SourceUnit::inline("trash_cleaner = false\nstrict_typing = true\n")).unwrap();
    assert!(!tree.directives.trash_cleaner);
    assert!(tree.directives.strict_typing);
    assert!(tree.body.stmts.is_empty());
    assert_eq!(tree.body.style, BlockStyle::Module);
}

#[test]
fn missing_duplicate_and_misplaced_directives() {
    assert_eq!(parse_err("x = 1\n").code, ErrorCode::E1006);
    assert_eq!(
        parse_err("trash_cleaner = true\ntrash_cleaner = false\n").code,
        ErrorCode::E1007
    );
    assert_eq!(parse_err("trash_cleaner = 1\n").code, ErrorCode::E1008);
    let nested = parse_err("trash_cleaner = true\nfunc f() {\n    strict_typing = true\n}\n");
    assert_eq!(nested.code, ErrorCode::E1010);
    assert_eq!(nested.line, 3);
}

#[test]
fn lexer_errors_become_syntax_errors() {
    let err = parse_err("trash_cleaner = true\nvar x = 1\n");
    assert_eq!(err.code, ErrorCode::E0007);
    assert_eq!((err.line, err.column), (2, 1));
    assert_eq!(err.snippet, "var x = 1");
    assert_eq!(parse_err("trash_cleaner = true\nx = 1;\n").code, ErrorCode::E0006);
}

#[test]
fn unbalanced_braces() {
    let unclosed = parse_err("trash_cleaner = true\nfunc f() {\n    x = 1\n");
    assert_eq!(unclosed.code, ErrorCode::E1003);
    assert_eq!(unclosed.line, 2);
    let stray = parse_err("trash_cleaner = true\nx = 1\n}\n");
    assert_eq!(stray.code, ErrorCode::E1004);
    assert_eq!(stray.line, 3);
}

#[test]
fn braces_inside_strings_are_not_delimiters() {
    let tree = parse_ok("func f() {\n    print(\"}{\")\n}\n");
    assert!(matches!(first(&tree), StmtKind::Func(f) if f.body.stmts.len() == 1));
}

#[test]
fn function_with_contract() {
    let tree = parse_ok("func sq(x: int) require x >= 0 ensure result >= 0 body {\n    return x * x\n}\n");
    let StmtKind::Func(func) = first(&tree) else {
        panic!("expected function");
    };
    assert_eq!(func.name, "sq");
    assert_eq!(func.params[0].ty.as_deref(), Some("int"));
    let contract = func.contract.as_ref().unwrap();
    assert!(matches!(contract.require.kind, ExprKind::Binary { op: BinaryOp::GtEq, .. }));
    assert_eq!(func.body.style, BlockStyle::Brace);
}

#[test]
fn newline_before_paren_ends_the_expression() {
    let tree = parse_ok("f\n(1)\n");
    assert_eq!(tree.body.stmts.len(), 2);
    assert!(matches!(first(&tree), StmtKind::Expr(e) if matches!(e.kind, ExprKind::Name(_))));

    let tree = parse_ok("f(1)\n");
    assert!(matches!(first(&tree), StmtKind::Expr(e) if matches!(e.kind, ExprKind::Call { .. })));
}

#[test]
fn two_statements_on_one_line_are_rejected() {
    assert_eq!(parse_err("trash_cleaner = true\nx = 1 y = 2\n").code, ErrorCode::E1001);
}

#[test]
fn operator_precedence() {
    let tree = parse_ok("x = 1 + 2 * 3 |> f\n");
    let StmtKind::Assign { value, .. } = first(&tree) else {
        panic!("expected assignment");
    };
    let ExprKind::Binary { op, left, .. } = &value.kind else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Pipe);
    assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
}

#[test]
fn ranges() {
    let tree = parse_ok("for i in 1..n + 1 {\n    print(i)\n}\n");
    let StmtKind::For { iter, .. } = first(&tree) else {
        panic!("expected for");
    };
    assert!(matches!(iter.kind, ExprKind::Range { inclusive: true, .. }));
}

#[test]
fn match_arms_and_patterns() {
    let tree = parse_ok(
        "match v {\n    case 1 => print(\"one\")\n    case Point(p) => {\n        print(p)\n    }\n    case _ => pass\n    else => print(\"other\")\n}\n",
    );
    let StmtKind::Match(m) = first(&tree) else {
        panic!("expected match");
    };
    assert_eq!(m.arms.len(), 3);
    assert!(matches!(m.arms[0].pattern, Pattern::Literal(_)));
    assert_eq!(
        m.arms[1].pattern,
        Pattern::Type {
            type_name: "Point".into(),
            binding: "p".into()
        }
    );
    assert_eq!(m.arms[2].pattern, Pattern::Wildcard);
    assert!(m.default.is_some());
}

#[test]
fn invalid_pattern() {
    let err = parse_err("trash_cleaner = true\nmatch v {\n    case [1] => pass\n}\n");
    assert_eq!(err.code, ErrorCode::E1009);
}

#[test]
fn pack_with_init_and_base() {
    let tree = parse_ok(
        "pack Dog :: Animal {\n    init(name) {\n        this.name = name\n    }\n    func speak() {\n        return this.name\n    }\n}\n",
    );
    let StmtKind::Pack(pack) = first(&tree) else {
        panic!("expected pack");
    };
    assert_eq!(pack.base.as_deref(), Some("Animal"));
    assert_eq!(pack.body.stmts.len(), 2);
    assert!(matches!(&pack.body.stmts[0].kind, StmtKind::Func(f) if f.name == "init"));
}

#[test]
fn struct_state_machine_and_event() {
    let tree = parse_ok(
        "struct Point { x: int = 0, y: int = 0 }\nstate_machine Door {\n    initial closed\n    closed -> open : push\n    open -> closed : pull\n}\nevent ready -> true {\n    print(\"go\")\n}\n",
    );
    let StmtKind::Struct(s) = first(&tree) else {
        panic!("expected struct");
    };
    assert_eq!(s.fields.len(), 2);
    let StmtKind::StateMachine(sm) = &tree.body.stmts[1].kind else {
        panic!("expected state machine");
    };
    assert_eq!(sm.initial, "closed");
    assert_eq!(sm.transitions[1].action, "pull");
    assert!(matches!(tree.body.stmts[2].kind, StmtKind::Event { .. }));
}

#[test]
fn imports_with_aliases() {
    let tree = parse_ok("module import {\n    std.Math:m\n    std.String\n}\npackage import { utils.text, native.sdl }\n");
    let StmtKind::Import(module) = first(&tree) else {
        panic!("expected import");
    };
    assert_eq!(module.kind, ImportKind::Module);
    assert_eq!(module.items[0].dotted(), "std.Math");
    assert_eq!(module.items[0].local_name(), "m");
    assert_eq!(module.items[1].local_name(), "String");
    let StmtKind::Import(package) = &tree.body.stmts[1].kind else {
        panic!("expected import");
    };
    assert_eq!(package.kind, ImportKind::Package);
    assert_eq!(package.items.len(), 2);
}

#[test]
fn try_elerr_finally() {
    let tree = parse_ok(
        "try {\n    risky()\n} elerr ValueError as e {\n    print(e)\n} elerr {\n    pass\n} finally {\n    done()\n}\n",
    );
    let StmtKind::Elerr(t) = first(&tree) else {
        panic!("expected try");
    };
    assert_eq!(t.handlers.len(), 2);
    assert_eq!(t.handlers[0].kind.as_deref(), Some("ValueError"));
    assert_eq!(t.handlers[0].binding.as_deref(), Some("e"));
    assert_eq!(t.handlers[1].kind, None);
    assert!(t.finally.is_some());
}

#[test]
fn foreign_table_macro_and_clib() {
    let source = "#Python(start)\nx = {1; 2}\n#Python(end: x)\ntable cfg <{ \"a\": 1 }>\nmacro twice(v) {\n    print(v)\n    print(v)\n}\ntwice!(3)\nclib: sdl\n";
    let tree = parse_ok(source);
    let StmtKind::Foreign(block) = first(&tree) else {
        panic!("expected foreign block");
    };
    assert_eq!(block.code, Protected::Raw("\nx = {1; 2}\n".into()));
    assert_eq!(block.result, "x");
    assert!(matches!(&tree.body.stmts[1].kind, StmtKind::Table { name, .. } if name == "cfg"));
    assert!(matches!(tree.body.stmts[2].kind, StmtKind::MacroDef(_)));
    assert!(matches!(&tree.body.stmts[3].kind, StmtKind::MacroCall { name, args } if name == "twice" && args.len() == 1));
    assert!(matches!(&tree.body.stmts[4].kind, StmtKind::NativeLib { name } if name == "sdl"));
}

#[test]
fn private_bindings() {
    let tree = parse_ok("private secret = 1\nprivate func helper() {\n    pass\n}\n");
    assert!(matches!(first(&tree), StmtKind::Assign { private: true, .. }));
    assert!(matches!(&tree.body.stmts[1].kind, StmtKind::Func(f) if f.private));
}

#[test]
fn spans_cover_statements() {
    let text = "trash_cleaner = true\ntotal = 1 + 2\n";
    let unit = SourceUnit::inline(text);
    let tree = parse(&unit).unwrap();
    assert_eq!(unit.slice(tree.body.stmts[0].span), "total = 1 + 2");
}

#[test]
fn deep_nesting_does_not_overflow() {
    let depth = 2_000;
    let expr = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let tree = parse_ok(&format!("x = {expr}\n"));
    assert_eq!(tree.body.stmts.len(), 1);
}
