//! Ryton CLI

use std::io::Write;
use std::path::{Path, PathBuf};

use rytonc::commands::{check_files, compile_file, exec_artifact, run_file, translate_file};
use rytonc::{DriverError, Reporter, Session, SessionConfig};

fn main() {
    rytonc::tracing_setup::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = args[1].as_str();
    if matches!(command, "help" | "--help" | "-h") {
        print_usage();
        return;
    }
    if matches!(command, "version" | "--version" | "-V") {
        println!("ryton {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let mut config = SessionConfig::new();
    let mut positional: Vec<&str> = Vec::new();
    let mut map = false;
    let mut source_stdin = false;
    let parsed = config.apply_env(std::env::vars_os()).and_then(|()| {
        for arg in &args[2..] {
            match arg.as_str() {
                "--map" => map = true,
                flag if flag == ry_eval::SOURCE_STDIN_FLAG => source_stdin = true,
                _ => {
                    if !config.apply_flag(arg)? {
                        positional.push(arg);
                    }
                }
            }
        }
        Ok(())
    });
    if let Err(e) = parsed {
        finish(&config, Err(e.into()));
    }

    let session = Session::new(config);
    let result = match command {
        "run" => one_path(&positional, "run <file.ry>").and_then(|path| run_file(&session, path)),
        "translate" => one_path(&positional, "translate <file.ry> [--map]")
            .and_then(|path| translate_file(&session, path, map))
            .map(|text| print!("{text}")),
        "check" => {
            if positional.is_empty() {
                Err(usage("check <file.ry>..."))
            } else {
                let paths: Vec<PathBuf> = positional.iter().map(PathBuf::from).collect();
                check_files(&session, &paths).map(|lines| {
                    for line in lines {
                        println!("{line}");
                    }
                })
            }
        }
        "compile" => match positional.as_slice() {
            [source, out] => compile_file(&session, Path::new(source), Path::new(out)),
            _ => Err(usage("compile <file.ry> <out.rybc>")),
        },
        "exec" => one_path(&positional, "exec <artifact.rybc>")
            .and_then(|path| exec_artifact(&session, path, source_stdin)),
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };
    finish(session.config(), result);
}

/// Report a failure and exit with its status.
fn finish(config: &SessionConfig, result: Result<(), DriverError>) {
    let _ = std::io::stdout().flush();
    if let Err(error) = result {
        if !error.is_reported() {
            eprint!("{}", Reporter::stderr(config).render(&error));
        }
        std::process::exit(error.exit_code());
    }
}

fn one_path<'a>(positional: &[&'a str], form: &str) -> Result<&'a Path, DriverError> {
    match positional {
        [path] => Ok(Path::new(*path)),
        _ => Err(usage(form)),
    }
}

fn usage(form: &str) -> DriverError {
    DriverError::Usage(format!("usage: ryton {form}"))
}

fn print_usage() {
    eprintln!("Ryton compiler");
    eprintln!();
    eprintln!("Usage: ryton <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <file.ry>                 Compile and execute a program");
    eprintln!("  translate <file.ry> [--map]   Print the lowered host form");
    eprintln!("  check <file.ry>...            Compile and validate without running");
    eprintln!("  compile <file.ry> <out>       Write a program artifact");
    eprintln!("  exec <artifact>               Execute a program artifact");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --path=<dir>                  Add a package search directory");
    eprintln!("  --strategy=interp|process     Run in this process or a child process");
    eprintln!("  --timeout=<secs>              Stop the program after this long");
    eprintln!("  --gc=<algo>                   marksweep, refcount, generational, incremental");
    eprintln!("  --heap=<bytes>                Managed heap size");
    eprintln!("  --threshold=<n>               Allocations between collections");
    eprintln!("  --context=<n>                 Source lines around a fault");
    eprintln!("  --format=json                 Machine-readable diagnostics");
    eprintln!("  --no-color                    Plain diagnostics");
    eprintln!("  --trace                       Show recent calls in fault reports");
    eprintln!("  --native=<lib>                Declare a native library as available");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RYTON_PATH                    Package search directories");
    eprintln!("  RYTON_GC                      Default collector");
    eprintln!("  RYTON_NATIVE                  Comma-separated native libraries");
    eprintln!("  RYTON_BRIDGE_<LANG>           Command that runs <LANG> foreign blocks");
    eprintln!("  RYTON_LOG                     Log filter, e.g. ry_resolve=debug");
}
