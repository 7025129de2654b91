use std::fs;
use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use ry_diagnostic::ErrorCode;
use ry_ir::{HostBinding, SourceUnit, Span, StmtKind, Tree};
use tempfile::TempDir;

use super::*;

fn write(dir: &Path, relative: &str, body: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, format!("trash_cleaner = true\n{body}")).unwrap();
}

fn resolver_with(dirs: &[&Path], probe: StaticProbe) -> Resolver {
    Resolver::new(
        ModuleMapping::standard(),
        Arc::new(probe),
        dirs.iter().map(|d| d.to_path_buf()).collect(),
        Arc::new(StandardCompiler),
    )
}

fn std_probe() -> StaticProbe {
    StaticProbe::new(["std", "std.lib", "std.Math", "std.String", "std.Time", "std.Memory", "std.Graphics"])
}

fn resolver(dirs: &[&Path]) -> Resolver {
    resolver_with(dirs, std_probe())
}

fn program(body: &str) -> Tree {
    let unit = SourceUnit::inline(format!("trash_cleaner = true\n{body}"));
    let tree = ry_parse::parse(&unit).unwrap();
    ry_lower::lower(tree, &unit).unwrap().tree
}

fn bindings(tree: &Tree) -> &[HostBinding] {
    match &tree.body.stmts[0].kind {
        StmtKind::HostImport(import) => &import.bindings,
        other => panic!("expected host import, got {}", other.describe()),
    }
}

#[test]
fn module_imports_bind_modules_and_symbols() {
    let resolver = resolver(&[]);
    let tree = resolver
        .expand_imports(program("module import { std.Math, std.lib:lib, std.Math.sqrt:root }\n"), "main")
        .unwrap();
    assert_eq!(
        bindings(&tree),
        &[
            HostBinding::Module {
                local: "Math".into(),
                module: "std.Math".into(),
                symbol: String::new(),
                companions: vec![],
            },
            HostBinding::Module {
                local: "lib".into(),
                module: "std.lib".into(),
                symbol: String::new(),
                companions: vec![],
            },
            HostBinding::Module {
                local: "root".into(),
                module: "std.Math".into(),
                symbol: "sqrt".into(),
                companions: vec![],
            },
        ]
    );
    ry_lower::validate(&tree, usize::MAX).unwrap();
}

#[test]
fn unknown_module_fails_without_touching_mapping() {
    let resolver = resolver(&[]);
    let before = resolver.mapping().clone();
    let err = resolver
        .expand_imports(program("module import { std.Math, nope.thing }\n"), "main")
        .unwrap_err();
    assert!(matches!(&err, ResolutionError::ModuleNotFound { path, .. } if path == "nope"));
    assert_eq!(err.code(), ErrorCode::E3001);
    assert!(err.code().is_resolution());
    assert_eq!(err.to_diagnostic().kind, "ModuleNotFound");
    assert_eq!(resolver.mapping(), &before);
}

#[test]
fn multi_target_modules_are_atomic() {
    let without = resolver(&[]);
    let err = without
        .expand_imports(program("module import { std.Graphics }\n"), "main")
        .unwrap_err();
    assert!(matches!(
        &err,
        ResolutionError::TargetUnavailable { target, .. } if target == "native:sdl"
    ));

    let mut targets: Vec<String> = vec!["native:sdl".into(), "std.Graphics".into()];
    targets.push("std".into());
    let with = resolver_with(&[], StaticProbe::new(targets));
    let tree = with
        .expand_imports(program("module import { std.Graphics:gfx }\n"), "main")
        .unwrap();
    let [HostBinding::Module { local, companions, .. }] = bindings(&tree) else {
        panic!("expected one module binding");
    };
    assert_eq!(local, "gfx");
    assert_eq!(companions, &["native:sdl".to_string()]);
}

#[test]
fn packages_export_public_bindings_in_order() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "utils/text.ry",
        "func shout(s) {\n    return s + \"!\"\n}\nprivate func helper() {\n    pass\n}\nlimit = 3\nprivate secret = 1\npack Box {\n    init(v) {\n        this.v = v\n    }\n}\nlimit = 4\n",
    );
    let resolver = resolver(&[dir.path()]);
    let tree = resolver
        .expand_imports(program("package import { utils.text:text }\n"), "main")
        .unwrap();
    assert_eq!(
        bindings(&tree),
        &[HostBinding::Package {
            local: "text".into(),
            package: "utils.text".into()
        }]
    );

    let record = resolver.package("utils.text").unwrap();
    let names: Vec<_> = record.exports.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["shout", "limit", "Box"]);
    assert_eq!(record.export("Box").unwrap().kind, ExportKind::Class);
    assert!(record.export("secret").is_none());
    assert_eq!(record.path, dir.path().join("utils/text.ry"));
}

#[test]
fn first_search_directory_wins() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write(first.path(), "pkg.ry", "which = 1\n");
    write(second.path(), "pkg.ry", "which = 2\nother = 3\n");
    let resolver = resolver(&[first.path(), second.path()]);
    let record = resolver.load_package("pkg", "main", Span::DUMMY).unwrap();
    assert_eq!(record.exports.len(), 1);
}

#[test]
fn missing_package_lists_search_directories() {
    let dir = TempDir::new().unwrap();
    let resolver = resolver(&[dir.path()]);
    let err = resolver.load_package("ghost", "main", Span::DUMMY).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3003);
    let diag = err.to_diagnostic();
    assert!(diag.notes[0].contains(&dir.path().display().to_string()));
}

#[test]
fn mutual_imports_are_a_cycle() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.ry", "package import { b }\nx = 1\n");
    write(dir.path(), "b.ry", "package import { a }\ny = 2\n");
    let resolver = resolver(&[dir.path()]);
    let err = resolver
        .expand_imports(program("package import { a }\n"), "main")
        .unwrap_err();
    let ResolutionError::PackageCycle { cycle, .. } = err.root() else {
        panic!("expected a cycle, got {err}");
    };
    assert_eq!(cycle, &["a", "b", "a"]);
    assert_eq!(err.code(), ErrorCode::E3002);
    assert!(err.to_diagnostic().message.contains("a -> b -> a"));
    // The cycle was found while resolving `b`, so its span is in b.ry.
    assert!(err.unit().unwrap().name().ends_with("b.ry"));
    assert!(resolver.packages().is_empty());
}

#[test]
fn concurrent_loads_share_one_read() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "util.ry", "func id(x) {\n    return x\n}\n");
    let resolver = resolver(&[dir.path()]);
    let (a, b) = std::thread::scope(|s| {
        let a = s.spawn(|| resolver.load_package("util", "first", Span::DUMMY));
        let b = s.spawn(|| resolver.load_package("util", "second", Span::DUMMY));
        (a.join().unwrap().unwrap(), b.join().unwrap().unwrap())
    });
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(resolver.loader().disk_reads(), 1);
}

#[test]
fn nested_packages_are_loaded() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "outer.ry", "package import { inner }\nmodule import { std.Math }\nz = 1\n");
    write(dir.path(), "inner.ry", "w = 2\n");
    let resolver = resolver(&[dir.path()]);
    resolver
        .expand_imports(program("package import { outer }\n"), "main")
        .unwrap();
    let names: Vec<_> = resolver.packages().iter().map(|p| p.name.clone()).collect();
    assert_eq!(names, ["inner", "outer"]);
    let outer = resolver.package("outer").unwrap();
    assert!(matches!(outer.tree.body.stmts[0].kind, StmtKind::HostImport(_)));
}

#[test]
fn broken_package_reports_its_own_source() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "bad.ry", "x = (1\n");
    let resolver = resolver(&[dir.path()]);
    let err = resolver.load_package("bad", "main", Span::DUMMY).unwrap_err();
    assert!(matches!(err, ResolutionError::PackageFailed { .. }));
    assert!(!err.code().is_resolution());
    assert!(err.unit().unwrap().name().ends_with("bad.ry"));
    assert!(err.to_diagnostic().notes.iter().any(|n| n.contains("`bad`")));
    assert!(err.is_broken_package());
}

#[test]
fn broken_packages_stay_broken_through_importers() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "outer.ry", "package import { bad }\n");
    write(dir.path(), "bad.ry", "x = (1\n");
    let resolver = resolver(&[dir.path()]);
    let err = resolver
        .expand_imports(program("package import { outer }\n"), "main")
        .unwrap_err();
    assert!(err.is_broken_package(), "{err:?}");

    let missing = resolver
        .expand_imports(program("package import { absent }\n"), "main")
        .unwrap_err();
    assert!(!missing.is_broken_package());
}

#[test]
fn native_companions_go_through_the_probe() {
    let resolver = resolver(&[]);
    let err = resolver
        .expand_imports(program("package import { native.sdl }\n"), "main")
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3004);

    let resolver = resolver_with(&[], StaticProbe::new(["native:sdl"]));
    let tree = resolver
        .expand_imports(program("package import { native.sdl }\n"), "main")
        .unwrap();
    assert_eq!(
        bindings(&tree),
        &[HostBinding::Native {
            local: "sdl".into(),
            library: "sdl".into()
        }]
    );
}
