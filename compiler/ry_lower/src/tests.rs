use pretty_assertions::assert_eq;
use ry_diagnostic::ErrorCode;
use ry_ir::{
    Block, BlockStyle, Directives, Expr, ExprKind, HostBinding, MatchStmt, Origin, PassId,
    Protected, SourceUnit, Span, Stmt, StmtKind, Tree,
};

use super::*;

fn unit(body: &str) -> SourceUnit {
    SourceUnit::inline(format!("trash_cleaner = true\n{body}"))
}

fn lowered(body: &str) -> Lowered {
    let unit = unit(body);
    let tree = ry_parse::parse(&unit).unwrap();
    let lowered = lower(tree, &unit).unwrap();
    validate(&lowered.tree, unit.text().len()).unwrap();
    lowered
}

fn lower_err(body: &str) -> LoweringError {
    let unit = unit(body);
    lower(ry_parse::parse(&unit).unwrap(), &unit).unwrap_err()
}

fn host(body: &str) -> String {
    render(&print_host(&lowered(body).tree))
}

fn func_body<'a>(tree: &'a Tree, name: &str) -> &'a [Stmt] {
    tree.body
        .stmts
        .iter()
        .find_map(|s| match &s.kind {
            StmtKind::Func(f) if f.name == name => Some(f.body.stmts.as_slice()),
            _ => None,
        })
        .unwrap()
}

fn all_passes() -> Vec<Box<dyn Pass>> {
    use crate::passes::*;
    vec![
        Box::new(Protect),
        Box::new(Macros),
        Box::new(Blocks),
        Box::new(Contracts),
        Box::new(StrictTyping),
        Box::new(Records),
        Box::new(StateMachines),
        Box::new(Events),
        Box::new(Guards),
        Box::new(Defer),
        Box::new(Match),
        Box::new(Operators),
        Box::new(Ranges),
        Box::new(TrySugar),
        Box::new(Tables),
        Box::new(Oop),
        Box::new(Declarations),
        Box::new(Foreign),
        Box::new(Restore),
    ]
}

#[test]
fn every_pass_leaves_unrelated_trees_alone() {
    let unit = unit("x = 1\nprint(x + 2, [x, \"a\"])\n");
    let tree = ry_parse::parse(&unit).unwrap();
    for pass in all_passes() {
        let mut cx = PassContext::new(tree.directives, &unit);
        let out = pass.run(tree.clone(), &mut cx).unwrap();
        assert_eq!(out, tree, "pass `{}` changed the tree", pass.id());
    }
}

#[test]
fn standard_pipeline_order() {
    let ids: Vec<_> = Pipeline::standard().passes().collect();
    assert_eq!(ids.len(), 19);
    assert_eq!(ids.first(), Some(&PassId::Protect));
    assert_eq!(ids.last(), Some(&PassId::Restore));
    let blocks = ids.iter().position(|p| *p == PassId::Blocks).unwrap();
    let contracts = ids.iter().position(|p| *p == PassId::Contracts).unwrap();
    let declarations = ids.iter().position(|p| *p == PassId::Declarations).unwrap();
    assert!(blocks < contracts);
    assert!(ids[..declarations].contains(&PassId::Oop));
}

#[test]
fn foreign_interior_is_byte_identical() {
    let interior = "\n  weird = {1; 2} |> this..that\n\tmacro x!() <{ }>\n";
    let lowered = lowered(&format!("#Python(start){interior}#Python(end: out)\n"));
    let StmtKind::Assign { target, value, .. } = &lowered.tree.body.stmts[0].kind else {
        panic!("expected assignment");
    };
    assert_eq!(target.kind, ExprKind::Name("out".into()));
    assert_eq!(
        value.kind,
        ExprKind::ForeignCall {
            lang: "Python".into(),
            code: Protected::Raw(interior.into()),
        }
    );
}

#[test]
fn guard_and_defer_program() {
    let source = "module import { std.lib }\nfunc main() {\n    defer {\n        print(\"cleanup\")\n    }\n    guard ready {\n        print(\"not ready\")\n    }\n    print(\"work\")\n}\n";
    let lowered = lowered(source);

    assert_eq!(lowered.blocks.len(), 1);
    let top: Vec<_> = lowered.blocks.at_depth(1).collect();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].title(), "func main");

    let body = func_body(&lowered.tree, "main");
    assert_eq!(body.len(), 1);
    let StmtKind::Try(t) = &body[0].kind else {
        panic!("expected try");
    };
    assert!(t.handlers.is_empty());
    assert_eq!(t.finally.as_ref().unwrap().stmts.len(), 1);
    let StmtKind::If { branches, .. } = &t.body.stmts[0].kind else {
        panic!("expected guard check");
    };
    assert!(matches!(
        branches[0].body.stmts.last().unwrap().kind,
        StmtKind::Return(None)
    ));
    assert_eq!(t.body.stmts.len(), 2);
}

#[test]
fn defers_nest_last_in_first_out() {
    let text = host("func f() {\n    defer {\n        print(1)\n    }\n    defer {\n        print(2)\n    }\n    work()\n}\n");
    let outer = text.find("print(1)").unwrap();
    let inner = text.find("print(2)").unwrap();
    assert!(inner < outer, "inner cleanup must be printed (and run) first:\n{text}");
    assert_eq!(text.matches("try:").count(), 2);
}

#[test]
fn guard_keeps_existing_exit() {
    let lowered = lowered("func f(x) {\n    guard x > 0 {\n        raise ValueError(\"neg\")\n    }\n    return x\n}\n");
    let StmtKind::If { branches, .. } = &func_body(&lowered.tree, "f")[0].kind else {
        panic!("expected if");
    };
    assert_eq!(branches[0].body.stmts.len(), 1);
}

#[test]
fn contracts_wrap_body() {
    let text = host("func sq(x) require x >= 0 ensure result >= 0 body {\n    return x * x\n}\n");
    assert!(text.contains("if not (x >= 0):"), "{text}");
    assert!(text.contains("raise ContractError(\"Precondition failed for `sq`\")"));
    assert!(text.contains("def __body_0():"));
    assert!(text.contains("result = __body_0()"));
    assert!(text.contains("return result"));
}

#[test]
fn strict_typing_only_with_directive() {
    let source = "func f(x: int, y) {\n    return x\n}\n";
    let plain = lowered(source);
    assert_eq!(func_body(&plain.tree, "f").len(), 1);

    let unit = SourceUnit::inline(format!("trash_cleaner = true\nstrict_typing = true\n{source}"));
    let strict = lower(ry_parse::parse(&unit).unwrap(), &unit).unwrap();
    let body = func_body(&strict.tree, "f");
    assert_eq!(body.len(), 2);
    assert_eq!(body[0].origin, Origin::Synthesized(PassId::StrictTyping));
    let text = render(&print_host(&strict.tree));
    assert!(text.contains("if not isinstance(x, int):"), "{text}");
}

#[test]
fn records_become_classes() {
    let text = host("struct Point { x: int = 0, y: int = 0 }\n");
    assert!(text.contains("class Point:"));
    assert!(text.contains("def __init__(self, x: int=0, y: int=0):"), "{text}");
    assert!(text.contains("self.x = x"));
    assert!(text.contains("def __str__(self):"));

    let err = lower_err("struct P { x: int, x: int }\n");
    assert_eq!((err.pass, err.code), (PassId::Records, ErrorCode::E2006));
}

#[test]
fn state_machines_become_classes() {
    let text = host("state_machine Door {\n    initial closed\n    closed -> open : push\n    open -> closed : pull\n}\n");
    assert!(text.contains("class Door:"));
    assert!(text.contains("self.state = \"closed\""));
    assert!(text.contains("{\"closed\": {\"push\": \"open\"}, \"open\": {\"pull\": \"closed\"}}"), "{text}");
    assert!(text.contains("def transition(self, action):"));
    assert!(text.contains("raise StateError("));

    let err = lower_err("state_machine D {\n    initial a\n    a -> b : go\n    a -> c : go\n}\n");
    assert_eq!(err.code, ErrorCode::E2005);
    let err = lower_err("state_machine D {\n    initial z\n    a -> b : go\n}\n");
    assert_eq!(err.code, ErrorCode::E2005);
}

#[test]
fn events_and_parallel_become_watches() {
    let lowered = lowered("event ready -> true {\n    go()\n}\nparallel {\n    spin()\n}\n");
    for stmt in &lowered.tree.body.stmts {
        let StmtKind::Watch { interval_ms, body, .. } = &stmt.kind else {
            panic!("expected watch");
        };
        assert_eq!(*interval_ms, passes::WATCH_INTERVAL_MS);
        assert_eq!(body.style, BlockStyle::Host);
    }
    let text = render(&print_host(&lowered.tree));
    assert!(text.contains("watch ready == True (50ms):"), "{text}");
    assert!(text.contains("watch True (50ms):"));
}

#[test]
fn match_lowers_to_ordered_tests() {
    let text = host("match v {\n    case 1 => print(\"one\")\n    case Point(p) => {\n        print(p)\n    }\n    case _ => pass\n}\n");
    assert!(text.starts_with("__match_0 = v\n"), "{text}");
    assert!(text.contains("if __match_0 == 1:"));
    assert!(text.contains("elif isinstance(__match_0, Point):"));
    assert!(text.contains("p = __match_0"));
    assert!(text.contains("elif True:"));
    assert!(text.contains("raise MatchError(\"No matching pattern\")"));
}

#[test]
fn match_without_arms_is_rejected() {
    let span = Span::new(0, 1);
    let scrutinee = Expr::new(ExprKind::Name("v".into()), span);
    let tree = Tree {
        body: Block::new(
            vec![Stmt::new(
                StmtKind::Match(MatchStmt {
                    scrutinee,
                    arms: Vec::new(),
                    default: None,
                }),
                span,
            )],
            BlockStyle::Module,
            span,
        ),
        directives: Directives::default(),
    };
    let unit = SourceUnit::inline("v");
    let mut cx = PassContext::new(tree.directives, &unit);
    let err = passes::Match.run(tree, &mut cx).unwrap_err();
    assert_eq!(err.code, ErrorCode::E2007);
}

#[test]
fn macros_expand_at_call_site() {
    let lowered = lowered("macro twice(v) {\n    print(v)\n    print(v)\n}\ntwice!(3)\n");
    assert_eq!(lowered.tree.body.stmts.len(), 2);
    for stmt in &lowered.tree.body.stmts {
        assert_eq!(stmt.origin, Origin::Synthesized(PassId::Macros));
    }
    assert_eq!(render(&print_host(&lowered.tree)), "print(3)\nprint(3)\n");
}

#[test]
fn macro_errors() {
    assert_eq!(lower_err("nope!(1)\n").code, ErrorCode::E2002);
    assert_eq!(lower_err("macro m(a) {\n    print(a)\n}\nm!(1, 2)\n").code, ErrorCode::E2003);
    assert_eq!(lower_err("macro m() {\n    m!()\n}\nm!()\n").code, ErrorCode::E2004);
}

#[test]
fn surface_operators() {
    let text = host("a = x |> f\nb = f >> g\nc = x <=> y\n");
    assert!(text.contains("a = f(x)"), "{text}");
    assert!(text.contains("b = lambda __x_0: g(f(__x_0))"));
    let c = text.lines().find(|l| l.contains("c = ")).unwrap();
    assert!(c.contains("c = (lambda __l_"), "{c}");
    assert!(c.trim_end().ends_with(")(x, y)"), "{c}");
    assert!(!c.contains("x >"), "{c}");
}

#[test]
fn ranges_become_calls() {
    let text = host("for i in 1..3 {\n    print(i)\n}\nfor j in 1...3 {\n    print(j)\n}\n");
    assert!(text.contains("for i in range(1, 3 + 1):"), "{text}");
    assert!(text.contains("for j in range(1, 3):"));
}

#[test]
fn packs_become_classes() {
    let text = host("pack Dog :: Animal {\n    init(name) {\n        this.name = name\n    }\n    func speak() {\n        return this.name\n    }\n}\n");
    assert!(text.contains("class Dog(Animal):"), "{text}");
    assert!(text.contains("def __init__(self, name):"));
    assert!(text.contains("self.name = name"));
    assert!(text.contains("def speak(self):"));
    assert!(!text.contains("this"));

    let err = lower_err("x = this.name\n");
    assert_eq!((err.pass, err.code), (PassId::Oop, ErrorCode::E2001));
}

#[test]
fn tables_try_and_clib() {
    let lowered = lowered("table cfg <{ \"a\": 1 }>\ntry {\n    risky()\n} elerr ValueError as e {\n    print(e)\n}\nclib: sdl\n");
    let text = render(&print_host(&lowered.tree));
    assert!(text.contains("cfg = MetaTable(<{ \"a\": 1 }>)"), "{text}");
    assert!(text.contains("except ValueError as e:"));
    let StmtKind::HostImport(import) = &lowered.tree.body.stmts[2].kind else {
        panic!("expected native import");
    };
    assert_eq!(
        import.bindings,
        vec![HostBinding::Native {
            local: "sdl".into(),
            library: "sdl".into()
        }]
    );
}

#[test]
fn synthesized_nodes_keep_source_spans() {
    let unit = unit("func f(x) {\n    guard x {\n        pass\n    }\n    return x\n}\n");
    let lowered = lower(ry_parse::parse(&unit).unwrap(), &unit).unwrap();
    let body = func_body(&lowered.tree, "f");
    assert_eq!(body[0].origin, Origin::Synthesized(PassId::Guards));
    assert!(unit.slice(body[0].span).starts_with("guard x"));
    for line in print_host(&lowered.tree) {
        let span = line.origin.unwrap();
        assert!(span.end as usize <= unit.text().len());
    }
}

#[test]
fn validation_rejects_unresolved_imports() {
    let unit = unit("module import { std.Math }\n");
    let lowered = lower(ry_parse::parse(&unit).unwrap(), &unit).unwrap();
    let err = validate(&lowered.tree, unit.text().len()).unwrap_err();
    assert_eq!((err.pass, err.code), (PassId::Validate, ErrorCode::E2008));
}

#[test]
fn validation_rejects_out_of_range_spans() {
    let lowered = lowered("x = 1\n");
    assert_eq!(validate(&lowered.tree, 3).unwrap_err().code, ErrorCode::E2008);
}
