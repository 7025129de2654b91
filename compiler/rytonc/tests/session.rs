//! Sessions shared by several programs.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::fs;
use std::path::Path;

use rayon::prelude::*;
use ry_eval::{buffer_handler, InterpreterStrategy};
use ry_ir::SourceUnit;
use rytonc::session::execute;
use rytonc::{DriverError, Session, SessionConfig};
use tempfile::TempDir;

fn write(dir: &Path, relative: &str, body: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, format!("trash_cleaner = true\n{body}")).unwrap();
}

fn output(program: ry_eval::Program) -> String {
    let out = buffer_handler();
    let strategy = InterpreterStrategy::new().with_print_handler(out.clone());
    execute(program, &strategy).unwrap();
    out.output()
}

#[test]
fn programs_share_one_package_load() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "shared.ry", "print(\"loading\")\nfunc twice(n) {\n    return n * 2\n}\n");
    let session = Session::new(SessionConfig::new().with_search_path(dir.path()));

    let units: Vec<SourceUnit> = (0..8)
        .map(|i| {
            SourceUnit::inline(format!(
                "trash_cleaner = true\npackage import {{ shared }}\nprint(shared.twice({i}))\n"
            ))
        })
        .collect();
    let programs: Vec<_> = units
        .par_iter()
        .map(|unit| session.build(unit).unwrap())
        .collect();

    let resolver = session.resolver(None);
    assert_eq!(resolver.loader().disk_reads(), 1);
    // Eight entry programs plus the package.
    assert_eq!(session.cache().invocations(), 9);
    assert_eq!(output(programs[3].clone()), "loading\n6\n");
}

#[test]
fn layout_variants_compile_once() {
    let session = Session::new(SessionConfig::new());
    let units = [
        SourceUnit::inline("trash_cleaner = true\nx = 1\nprint(x)\n"),
        SourceUnit::inline("trash_cleaner = true\n\nx   =   1\n\nprint( x )  // show\n"),
    ];
    let results = session.compile_many(&units);
    assert!(results.iter().all(Result::is_ok));
    assert_eq!(session.cache().invocations(), 1);

    let program = session.build(&units[1]).unwrap();
    assert_eq!(output(program), "1\n");
}

#[test]
fn errors_keep_the_failing_unit() {
    let session = Session::new(SessionConfig::new());
    let unit = SourceUnit::inline("trash_cleaner = true\nmodule import { std.Nope }\n");
    let error = session.build(&unit).unwrap_err();
    let DriverError::Resolution { unit: failed, .. } = &error else {
        panic!("expected a resolution error, got {error:?}");
    };
    assert_eq!(failed, &unit);
    assert_eq!(error.exit_code(), 2);
}
