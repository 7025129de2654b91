//! End-to-end tests of the `ryton` binary.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use ry_diagnostic::FaultRecord;
use tempfile::TempDir;

const HEADER: &str = "trash_cleaner = true\n";

fn write(dir: &Path, relative: &str, body: &str) -> PathBuf {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, format!("{HEADER}{body}")).unwrap();
    path
}

fn ryton(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ryton"))
        .args(args)
        .env_remove("RYTON_PATH")
        .env_remove("RYTON_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn record(output: &Output) -> FaultRecord {
    let text = stderr(output);
    let line = text.lines().find(|l| l.starts_with('{')).unwrap();
    serde_json::from_str(line).unwrap()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn run_prints_program_output() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "hello.ry", "func main() {\n    print(\"hi\", 1 + 1)\n}\n");
    let output = ryton(&["run", path_str(&file)]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(stdout(&output), "hi 2\n");
}

#[test]
fn runtime_faults_exit_with_one() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "bad.ry", "func main() {\n    raise ValueError(\"bad\")\n}\n");
    let output = ryton(&["run", "--format=json", path_str(&file)]);
    assert_eq!(output.status.code(), Some(1));
    let record = record(&output);
    assert_eq!(record.kind, "ValueError");
    assert_eq!(record.line, 3);
    assert_eq!(record.block_hierarchy, ["func main"]);
}

#[test]
fn panels_show_the_block_and_source() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "bad.ry", "func main() {\n    raise ValueError(\"bad\")\n}\n");
    let output = ryton(&["run", "--no-color", path_str(&file)]);
    assert_eq!(output.status.code(), Some(1));
    let text = stderr(&output);
    assert!(text.contains("ValueError"), "{text}");
    assert!(text.contains("raise ValueError(\"bad\")"), "{text}");
    assert!(text.contains("bad.ry"), "{text}");
}

#[test]
fn syntax_errors_exit_with_one() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "broken.ry", "func f( {\n");
    let output = ryton(&["run", "--format=json", path_str(&file)]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(record(&output).line, 2);
}

#[test]
fn unavailable_modules_exit_with_two() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "gfx.ry", "module import { std.Graphics }\nprint(1)\n");
    let output = ryton(&["run", path_str(&file)]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout(&output), "");
}

#[test]
fn missing_packages_exit_with_two() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "main.ry", "package import { nowhere.to_be_found }\n");
    let output = ryton(&["check", path_str(&file)]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn broken_packages_exit_with_one() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "util/bad.ry", "x = (1\n");
    let file = write(dir.path(), "main.ry", "package import { util.bad }\nprint(1)\n");
    let output = ryton(&["run", "--format=json", path_str(&file)]);
    assert_eq!(output.status.code(), Some(1), "{}", stderr(&output));
    assert_eq!(stdout(&output), "");
    assert!(record(&output).file.ends_with("bad.ry"), "{}", stderr(&output));
}

#[test]
fn packages_load_from_the_entry_directory() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "util/text.ry", "func shout(s) {\n    return s + \"!\"\n}\n");
    let file = write(
        dir.path(),
        "main.ry",
        "package import { util.text:t }\nprint(t.shout(\"hey\"))\n",
    );
    let output = ryton(&["run", path_str(&file)]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(stdout(&output), "hey!\n");
}

#[test]
fn search_path_flag_finds_packages() {
    let lib = TempDir::new().unwrap();
    let app = TempDir::new().unwrap();
    write(lib.path(), "greet.ry", "func hello() {\n    return \"hello\"\n}\n");
    let file = write(app.path(), "main.ry", "package import { greet }\nprint(greet.hello())\n");
    let flag = format!("--path={}", lib.path().display());
    let output = ryton(&["run", &flag, path_str(&file)]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(stdout(&output), "hello\n");
}

#[test]
fn compile_then_exec() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "prog.ry", "for i in 1..3 {\n    print(i)\n}\n");
    let artifact = dir.path().join("prog.rybc");
    let output = ryton(&["compile", path_str(&file), path_str(&artifact)]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(&fs::read(&artifact).unwrap()[..4], b"RYBC");

    let output = ryton(&["exec", path_str(&artifact)]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(stdout(&output), "1\n2\n3\n");
}

#[test]
fn exec_rejects_foreign_files() {
    let dir = TempDir::new().unwrap();
    let artifact = dir.path().join("junk.rybc");
    fs::write(&artifact, b"not an artifact").unwrap();
    let output = ryton(&["exec", path_str(&artifact)]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("E5002"), "{}", stderr(&output));
}

#[test]
fn subprocess_strategy_matches_the_interpreter() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "prog.ry", "x = [1, 2]\nprint(x, 3 * 4)\n");
    let inline = ryton(&["run", path_str(&file)]);
    let child = ryton(&["run", "--strategy=process", path_str(&file)]);
    assert_eq!(child.status.code(), Some(0), "{}", stderr(&child));
    assert_eq!(stdout(&child), stdout(&inline));
}

#[test]
fn subprocess_faults_are_reported_once() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "bad.ry", "x = 1\nraise KeyError(\"gone\")\n");
    let output = ryton(&["run", "--strategy=process", "--format=json", path_str(&file)]);
    assert_eq!(output.status.code(), Some(1));
    let text = stderr(&output);
    assert_eq!(text.matches("KeyError").count(), 1, "{text}");
    assert_eq!(record(&output).line, 3);
}

#[test]
fn check_reports_each_file() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.ry", "func main() {\n    print(1)\n}\n");
    let b = write(dir.path(), "b.ry", "x = 2\n");
    let output = ryton(&["check", path_str(&a), path_str(&b)]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("OK: ") && lines[0].contains("a.ry"));
    assert!(lines[1].starts_with("OK: ") && lines[1].contains("b.ry"));
}

#[test]
fn translate_prints_the_host_form() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "t.ry", "func twice(n) {\n    return n * 2\n}\n");
    let output = ryton(&["translate", path_str(&file)]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("twice"), "{text}");
    assert!(!text.contains('{'), "{text}");

    let mapped = ryton(&["translate", "--map", path_str(&file)]);
    let first = stdout(&mapped).lines().find(|l| l.contains("twice")).unwrap().to_string();
    assert!(first.trim_start().starts_with("2:1 |"), "{first}");
}

#[test]
fn bad_usage_exits_with_one() {
    assert_eq!(ryton(&["run"]).status.code(), Some(1));
    assert_eq!(ryton(&["frobnicate"]).status.code(), Some(1));
    assert_eq!(ryton(&["run", "--gc=copying", "x.ry"]).status.code(), Some(1));
    assert_eq!(ryton(&["run", "/definitely/not/here.ry"]).status.code(), Some(1));
}
