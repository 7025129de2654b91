use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use ry_diagnostic::FaultRecord;
use ry_ir::SourceUnit;
use ry_resolve::{ModuleMapping, Resolver, StandardCompiler, StaticProbe};
use tempfile::TempDir;

use super::*;

fn compile_in(dirs: &[&Path], source: &str) -> Program {
    let unit = SourceUnit::inline(source);
    let tree = ry_parse::parse(&unit).unwrap();
    let lowered = ry_lower::lower(tree, &unit).unwrap();
    let resolver = Resolver::new(
        ModuleMapping::standard(),
        Arc::new(StaticProbe::new(host_module_names())),
        dirs.iter().map(|d| d.to_path_buf()).collect(),
        Arc::new(StandardCompiler),
    );
    let tree = resolver.expand_imports(lowered.tree, "main").unwrap();
    Program::new(&unit, tree, lowered.blocks).with_packages(&resolver.packages())
}

fn compile(body: &str) -> Program {
    compile_in(&[], &format!("trash_cleaner = true\n{body}"))
}

fn run(program: &Program) -> (String, Result<(), ExecError>) {
    let out = buffer_handler();
    let mut interp = Interpreter::builder()
        .with_print_handler(Arc::clone(&out))
        .build();
    let result = interp.run_program(program);
    (out.output(), result)
}

fn output(body: &str) -> String {
    let (out, result) = run(&compile(body));
    result.unwrap();
    out
}

fn fault(body: &str) -> (String, RuntimeFault) {
    let (out, result) = run(&compile(body));
    match result {
        Err(ExecError::Fault(fault)) => (out, *fault),
        other => panic!("expected a fault, got {other:?}"),
    }
}

#[test]
fn prints_values_python_style() {
    let out = output("print(1 + 2)\nprint(7 / 2)\nprint(true, None)\nprint([1, \"a\"])\n");
    assert_eq!(out, "3\n3.5\nTrue None\n[1, 'a']\n");
}

#[test]
fn main_runs_after_top_level() {
    let out = output("func main() {\n    print(\"main\")\n}\nprint(\"top\")\n");
    assert_eq!(out, "top\nmain\n");
}

#[test]
fn guard_and_defer_run_cleanup_before_return() {
    let body = "module import { std.lib }\nready = true\nfunc main() {\n    defer {\n        print(\"cleanup\")\n    }\n    guard ready {\n        print(\"not ready\")\n    }\n    print(\"work\")\n}\n";
    let program = compile(body);
    assert_eq!(program.blocks.at_depth(1).count(), 1);
    assert_eq!(run(&program).0, "work\ncleanup\n");

    let out = output(&body.replace("ready = true", "ready = false"));
    assert_eq!(out, "not ready\ncleanup\n");
}

#[test]
fn deferred_blocks_run_last_in_first_out() {
    let out = output("func main() {\n    defer {\n        print(1)\n    }\n    defer {\n        print(2)\n    }\n    print(0)\n}\n");
    assert_eq!(out, "0\n2\n1\n");
}

#[test]
fn contracts_check_both_ends() {
    let source = "func sq(x) require x >= 0 ensure result >= 0 body {\n    return x * x\n}\n";
    assert_eq!(output(&format!("{source}print(sq(3))\n")), "9\n");

    let (_, fault) = fault(&format!("{source}sq(-1)\n"));
    assert_eq!(fault.kind, "ContractError");
    assert_eq!(fault.message, "Precondition failed for `sq`");
}

#[test]
fn state_machine_rejects_unknown_transitions() {
    let (out, fault) = fault(
        "state_machine Door {\n    initial closed\n    closed -> open : push\n    open -> closed : pull\n}\nd = Door()\nd.transition(\"push\")\nprint(d.state)\nd.transition(\"push\")\n",
    );
    assert_eq!(out, "open\n");
    assert_eq!(fault.kind, "StateError");
}

#[test]
fn match_tests_arms_in_order() {
    let source = "struct Point { x: int = 0, y: int = 0 }\nfunc describe(v) {\n    match v {\n        case 1 => print(\"one\")\n        case Point(p) => {\n            print(p.x)\n        }\n        else => print(\"other\")\n    }\n}\n";
    let out = output(&format!("{source}describe(1)\ndescribe(Point(3, 4))\ndescribe(\"z\")\n"));
    assert_eq!(out, "one\n3\nother\n");

    let (_, fault) = fault("match 5 {\n    case 1 => print(\"one\")\n}\n");
    assert_eq!(fault.kind, "MatchError");
    assert_eq!(fault.message, "No matching pattern");
}

#[test]
fn packs_and_records() {
    let out = output(
        "pack Animal {\n    init(name) {\n        this.name = name\n    }\n    func speak() {\n        return this.name + \" makes a sound\"\n    }\n}\npack Dog :: Animal {\n    func speak() {\n        return this.name + \" barks\"\n    }\n}\nprint(Dog(\"Rex\").speak())\nprint(Animal(\"Cat\").speak())\nstruct Point { x: int = 0, y: int = 0 }\nprint(Point(1).y)\n",
    );
    assert_eq!(out, "Rex barks\nCat makes a sound\n0\n");
}

#[test]
fn macros_ranges_and_operators() {
    let out = output(
        "macro twice(v) {\n    print(v)\n    print(v)\n}\ntwice!(3)\nfor i in 1..3 {\n    print(i)\n}\nfor j in 1...3 {\n    print(j)\n}\nfunc inc(x) {\n    return x + 1\n}\nfunc dbl(x) {\n    return x * 2\n}\nprint(4 |> inc)\nh = inc >> dbl\nprint(h(1))\nprint(1 <=> 2, 2 <=> 2)\n",
    );
    assert_eq!(out, "3\n3\n1\n2\n3\n1\n2\n5\n4\n-1 0\n");
}

#[test]
fn spaceship_evaluates_each_operand_once() {
    let out = output(
        "n = [0]\nfunc tick() {\n    n[0] = n[0] + 1\n    return n[0]\n}\nprint(tick() <=> 0)\nprint(n[0])\nprint(0 <=> tick())\nprint(n[0])\n",
    );
    assert_eq!(out, "1\n1\n-1\n2\n");
}

#[test]
fn try_catches_by_hierarchy() {
    let out = output(
        "try {\n    x = 1 / 0\n} elerr ArithmeticError as e {\n    print(\"caught\", e)\n} finally {\n    print(\"done\")\n}\n",
    );
    assert_eq!(out, "caught division by zero\ndone\n");
}

#[test]
fn events_fire_once() {
    let out = output(
        "ready = false\nevent ready -> true {\n    print(\"fired\")\n}\nready = true\nprint(\"after\")\n",
    );
    assert_eq!(out.matches("fired").count(), 1);
    assert!(out.contains("after"));
}

#[test]
fn meta_tables_fall_back_to_index_handler() {
    let out = output(
        "table cfg <{ \"a\": 1, \"name\": \"ry\" }>\nprint(cfg.a, cfg.name)\nprint(cfg.missing)\ncfg.set_metatable({\"__index\": func(t, k) {\n    return k + \"!\"\n}})\nprint(cfg.missing)\nprint(len(cfg))\n",
    );
    assert_eq!(out, "1 ry\nNone\nmissing!\n2\n");
}

#[test]
fn host_modules_are_importable() {
    let out = output(
        "module import { std.Math, std.String:s, std.Math.sqrt:root }\nprint(Math.gcd(12, 18))\nprint(root(16))\nprint(s.slugify(\"Hello World\"))\n",
    );
    assert_eq!(out, "6\n4\nhello-world\n");
}

#[test]
fn gcd_at_the_integer_limit() {
    let out = output(
        "module import { std.Math }\nlow = -9223372036854775807 - 1\nprint(Math.gcd(low, -1))\ntry {\n    Math.gcd(low, 0)\n} elerr OverflowError {\n    print(\"overflow\")\n}\ntry {\n    Math.lcm(low, 1)\n} elerr OverflowError {\n    print(\"overflow\")\n}\n",
    );
    assert_eq!(out, "1\noverflow\noverflow\n");
}

#[test]
fn packages_run_once_and_export_public_names() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("util/text.ry");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        "trash_cleaner = false\nprint(\"loading\")\nfunc shout(s) {\n    return s + \"!\"\n}\nprivate secret = 1\n",
    )
    .unwrap();

    let program = compile_in(
        &[dir.path()],
        "trash_cleaner = true\npackage import { util.text }\npackage import { util.text:t }\nprint(text.shout(\"hi\"))\nprint(t.shout(\"yo\"))\n",
    );
    assert_eq!(program.packages.len(), 1);
    assert_eq!(program.packages[0].exports, ["shout"]);
    let (out, result) = run(&program);
    result.unwrap();
    assert_eq!(out, "loading\nhi!\nyo!\n");
}

#[test]
fn foreign_blocks_call_the_bridge() {
    let program = compile("#Python(start)\nprint(6 * 7)\n#Python(end: out)\nprint(out)\n");
    let bridge = Arc::new(RecordingBridge::new().with_response("Python", "42"));
    let out = buffer_handler();
    let mut interp = Interpreter::builder()
        .with_print_handler(Arc::clone(&out))
        .with_bridge(Arc::clone(&bridge) as Arc<dyn ForeignBridge>)
        .build();
    interp.run_program(&program).unwrap();
    assert_eq!(out.output(), "42\n");
    let calls = bridge.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "Python");
    assert!(calls[0].1.contains("print(6 * 7)"));
}

#[test]
fn faults_resolve_to_the_raising_line() {
    let program = compile("func main() {\n    raise ValueError(\"bad\")\n}\n");
    let err = run(&program).1.unwrap_err();
    let ExecError::Fault(fault) = &err else {
        panic!("expected a fault, got {err:?}");
    };
    assert_eq!((fault.kind.as_str(), fault.message.as_str()), ("ValueError", "bad"));
    assert!(program.source.unit().slice(fault.span).starts_with("ValueError"));

    let rendered = FaultReporter::new(FaultFormat::Json).render(&err, Some(&program));
    let record: FaultRecord = serde_json::from_str(rendered.trim()).unwrap();
    assert_eq!(record.kind, "ValueError");
    assert_eq!(record.line, 3);
    assert_eq!(record.block_hierarchy, ["func main"]);
}

#[test]
fn runaway_recursion_is_a_recursion_error() {
    let (_, fault) = fault("func f(n) {\n    return f(n + 1)\n}\nf(0)\n");
    assert_eq!(fault.kind, "RecursionError");
}

#[test]
fn tracer_records_calls_for_the_fault_report() {
    let out = buffer_handler();
    let strategy = InterpreterStrategy::new()
        .with_trace(true)
        .with_print_handler(Arc::clone(&out));
    let program = compile("func inner() {\n    raise KeyError(\"k\")\n}\nfunc outer() {\n    inner()\n}\nouter()\n");
    let err = strategy.execute(&program, &CancelToken::new()).unwrap_err();
    assert!(!strategy.tracer().is_enabled());
    assert_eq!(
        strategy.tracer().events(),
        ["Called: outer", "Called: inner", "Error in inner: KeyError", "Error in outer: KeyError"]
    );
    let ExecError::Fault(fault) = err else {
        panic!("expected a fault");
    };
    assert_eq!(fault.trace.len(), 4);
}

#[test]
fn trash_cleaner_reclaims_instances() {
    let source = "pack Box {\n    init(v) {\n        this.v = v\n    }\n}\nitems = [Box(1), Box(2), Box(3)]\nmodule import { std.Memory }\nMemory.store(\"keep\", items[0])\n";
    for (directive, live) in [("true", 0), ("false", 3)] {
        let program = compile_in(&[], &format!("trash_cleaner = {directive}\n{source}"));
        let mut interp = Interpreter::builder().with_print_handler(buffer_handler()).build();
        interp.run_program(&program).unwrap();
        let stats = interp.memory().stats();
        assert_eq!(stats.objects_count, live, "trash_cleaner = {directive}");
        assert_eq!(stats.named_objects, if live == 0 { 0 } else { 1 });
    }
}

#[test]
fn cancelled_runs_stop_at_a_safe_point() {
    let program = compile("while true {\n    x = 1\n}\n");
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = InterpreterStrategy::new().execute(&program, &cancel).unwrap_err();
    assert!(matches!(err, ExecError::Cancelled));
}

#[test]
fn timeouts_stop_busy_loops() {
    let program = compile("while true {\n    x = 1\n}\n");
    let err = InterpreterStrategy::new()
        .with_timeout(Some(Duration::from_millis(50)))
        .execute(&program, &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, ExecError::TimedOut(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn artifacts_round_trip_and_reject_foreign_bytes() {
    let program = compile("print(\"hi\")\n");
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hi.rybc");
    write_artifact(&path, &program).unwrap();
    assert_eq!(read_artifact(&path).unwrap(), program);

    let bytes = artifact::encode(&program).unwrap();
    assert!(matches!(artifact::decode(b"NOPE\x01\x00"), Err(ArtifactError::BadMagic)));
    let mut stale = bytes.clone();
    stale[4..6].copy_from_slice(&(FORMAT_VERSION + 1).to_le_bytes());
    assert!(matches!(
        artifact::decode(&stale),
        Err(ArtifactError::StaleVersion { found, .. }) if found == FORMAT_VERSION + 1
    ));
    assert!(matches!(
        artifact::decode(&bytes[..bytes.len() / 2]),
        Err(ArtifactError::Decode(_))
    ));
}

#[cfg(unix)]
#[test]
fn subprocess_reports_the_child_status() {
    let program = compile("print(\"hi\")\n");
    let ok = SubprocessStrategy::new("true");
    ok.execute(&program, &CancelToken::new()).unwrap();

    let err = SubprocessStrategy::new("false")
        .execute(&program, &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, ExecError::ChildFailed(1)));
    assert!(err.is_reported());
}

#[cfg(unix)]
#[test]
fn subprocess_is_killed_on_timeout() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let script = dir.path().join("slow.sh");
    fs::write(&script, "#!/bin/sh\nsleep 5\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let program = compile("print(\"hi\")\n");
    let err = SubprocessStrategy::new(&script)
        .with_timeout(Some(Duration::from_millis(100)))
        .execute(&program, &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, ExecError::TimedOut(_)));
}
