use std::sync::Arc;

use pretty_assertions::assert_eq;
use rayon::prelude::*;
use ry_ir::visit::{walk_expr, Visit};
use ry_ir::{Expr, SourceUnit, Span, StmtKind};

use super::rebase::Alignment;
use super::{CompileError, Compiled, SourceCache};

const PROGRAM: &str = "trash_cleaner = true\nfunc main() {\n    print(1 + 2)\n}\n";
const RELAID: &str = "trash_cleaner = true\n\n\nfunc   main()   {\n        print(1+2)   // sum\n}\n";

fn main_span(compiled: &Compiled) -> Span {
    compiled
        .lowered
        .tree
        .body
        .stmts
        .iter()
        .find(|s| matches!(&s.kind, StmtKind::Func(f) if f.name == "main"))
        .map(|s| s.span)
        .unwrap()
}

struct Spans(Vec<Span>);

impl Visit for Spans {
    type Error = std::convert::Infallible;

    fn visit_expr(&mut self, expr: &Expr) -> Result<(), Self::Error> {
        if !expr.span.is_dummy() {
            self.0.push(expr.span);
        }
        walk_expr(self, expr)
    }
}

#[test]
fn identical_sources_compile_once() {
    let cache = SourceCache::new();
    let first = cache.compile(&SourceUnit::inline(PROGRAM)).unwrap();
    let second = cache.compile(&SourceUnit::inline(PROGRAM)).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.invocations(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn layout_changes_share_a_run() {
    let cache = SourceCache::new();
    let original = cache.compile(&SourceUnit::inline(PROGRAM)).unwrap();
    let unit = SourceUnit::inline(RELAID);
    let moved = cache.compile(&unit).unwrap();
    assert_eq!(cache.invocations(), 1);
    assert_eq!(original.fingerprint, moved.fingerprint);
    assert_eq!(moved.unit.text(), RELAID);

    let text = unit.slice(main_span(&moved));
    assert!(text.starts_with("func   main()"), "{text:?}");
    assert!(text.ends_with('}'), "{text:?}");
}

#[test]
fn rebased_expressions_point_at_the_same_tokens() {
    let cache = SourceCache::new();
    let original = cache.compile(&SourceUnit::inline(PROGRAM)).unwrap();
    let unit = SourceUnit::inline(RELAID);
    let moved = cache.compile(&unit).unwrap();

    let collect = |c: &Compiled| {
        let mut spans = Spans(Vec::new());
        spans.visit_block(&c.lowered.tree.body).unwrap();
        spans.0
    };
    let squeeze = |text: &str| text.replace(' ', "");
    let pairs: Vec<(String, String)> = collect(&original)
        .into_iter()
        .zip(collect(&moved))
        .map(|(a, b)| (original.unit.slice(a).to_string(), unit.slice(b).to_string()))
        .filter(|(a, _)| !a.contains('\n'))
        .collect();
    assert!(!pairs.is_empty());
    for (before, after) in pairs {
        assert_eq!(squeeze(&before), squeeze(&after));
    }
}

#[test]
fn block_lines_follow_the_new_layout() {
    let cache = SourceCache::new();
    let original = cache.compile(&SourceUnit::inline(PROGRAM)).unwrap();
    let moved = cache.compile(&SourceUnit::inline(RELAID)).unwrap();
    let main = |c: &Compiled| {
        c.lowered
            .blocks
            .iter()
            .map(|(_, b)| b)
            .find(|b| b.name == "main")
            .map(|b| (b.start_line, b.end_line))
            .unwrap()
    };
    assert_eq!(main(&original), (2, Some(4)));
    assert_eq!(main(&moved), (4, Some(6)));
}

#[test]
fn different_programs_get_their_own_entries() {
    let cache = SourceCache::new();
    cache.compile(&SourceUnit::inline(PROGRAM)).unwrap();
    cache
        .compile(&SourceUnit::inline("trash_cleaner = true\nprint(2)\n"))
        .unwrap();
    assert_eq!(cache.invocations(), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
fn concurrent_requests_run_the_pipeline_once() {
    let cache = SourceCache::new();
    let results: Vec<Arc<Compiled>> = (0..16)
        .into_par_iter()
        .map(|_| cache.compile(&SourceUnit::inline(PROGRAM)).unwrap())
        .collect();
    assert_eq!(cache.invocations(), 1);
    assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
}

#[test]
fn errors_are_cached_for_the_same_unit() {
    let cache = SourceCache::new();
    let unit = SourceUnit::inline("trash_cleaner = true\nfunc f( {\n");
    let first = cache.compile(&unit).unwrap_err();
    let second = cache.compile(&unit).unwrap_err();
    assert!(matches!(first, CompileError::Syntax(_)));
    assert_eq!(first, second);
    assert_eq!(cache.invocations(), 1);
}

#[test]
fn errors_are_relocated_for_a_new_layout() {
    let cache = SourceCache::new();
    let CompileError::Syntax(first) = cache
        .compile(&SourceUnit::inline("trash_cleaner = true\nfunc f( {\n"))
        .unwrap_err()
    else {
        panic!("expected a syntax error");
    };
    let CompileError::Syntax(second) = cache
        .compile(&SourceUnit::inline("trash_cleaner = true\n\n\nfunc f( {\n"))
        .unwrap_err()
    else {
        panic!("expected a syntax error");
    };
    assert_eq!(second.line, first.line + 2);
    assert_eq!(cache.invocations(), 2);
}

fn body_of(compiled: &Compiled, name: &str) -> Vec<StmtKind> {
    compiled
        .lowered
        .tree
        .body
        .stmts
        .iter()
        .find_map(|s| match &s.kind {
            StmtKind::Func(f) if f.name == name => {
                Some(f.body.stmts.iter().map(|s| s.kind.clone()).collect())
            }
            _ => None,
        })
        .unwrap()
}

#[test]
fn line_breaks_between_statements_are_not_layout() {
    let cache = SourceCache::new();
    let joined = cache
        .compile(&SourceUnit::inline(
            "trash_cleaner = true\nfunc f() {\n    return 1\n}\n",
        ))
        .unwrap();
    let split = cache
        .compile(&SourceUnit::inline(
            "trash_cleaner = true\nfunc f() {\n    return\n    1\n}\n",
        ))
        .unwrap();
    assert_eq!(cache.invocations(), 2);
    assert_ne!(joined.fingerprint, split.fingerprint);
    assert!(matches!(body_of(&joined, "f").as_slice(), [StmtKind::Return(Some(_))]));
    assert!(matches!(
        body_of(&split, "f").as_slice(),
        [StmtKind::Return(None), StmtKind::Expr(_)]
    ));
}

#[test]
fn joining_statements_onto_one_line_is_still_rejected() {
    let cache = SourceCache::new();
    cache
        .compile(&SourceUnit::inline("trash_cleaner = true\nx = 1\ny = 2\n"))
        .unwrap();
    let error = cache
        .compile(&SourceUnit::inline("trash_cleaner = true\nx = 1 y = 2\n"))
        .unwrap_err();
    assert!(matches!(error, CompileError::Syntax(_)));
    assert_eq!(cache.invocations(), 2);
}

#[test]
fn alignment_needs_the_same_tokens() {
    let tokens = |text: &str| ry_parse::tokenize(&SourceUnit::inline(text)).unwrap();
    let base = "x = 1\nprint(x)\n";
    let relaid = "x   =   1\n\nprint( x )\n";
    let renamed = "y = 1\nprint(y)\n";
    let joined = "x = 1 print(x)\n";

    let old = tokens(base);
    assert!(Alignment::new(&old, base, &tokens(relaid), relaid).is_some());
    // Same token lengths, different text.
    assert!(Alignment::new(&old, base, &tokens(renamed), renamed).is_none());
    assert!(Alignment::new(&old, base, &tokens(joined), joined).is_none());
}
