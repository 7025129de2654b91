use pretty_assertions::assert_eq;

use super::*;

fn vars(pairs: &[(&str, &str)]) -> Vec<(OsString, OsString)> {
    pairs
        .iter()
        .map(|(k, v)| (OsString::from(k), OsString::from(v)))
        .collect()
}

#[test]
fn flags_override_defaults() {
    let mut config = SessionConfig::new();
    for arg in ["--strategy=process", "--timeout=1.5", "--gc=rc", "--context=4", "--format=json", "--no-color"] {
        assert!(config.apply_flag(arg).unwrap());
    }
    assert!(!config.apply_flag("main.ry").unwrap());
    assert_eq!(config.strategy, StrategyKind::Subprocess);
    assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
    assert_eq!(config.memory.collector, CollectorKind::ReferenceCounting);
    assert_eq!(config.context_radius, 4);
    assert_eq!(config.format, OutputFormat::Json);
    assert_eq!(config.color, ColorMode::Never);
}

#[test]
fn bad_flags_are_rejected() {
    let mut config = SessionConfig::new();
    assert_eq!(
        config.apply_flag("--frobnicate"),
        Err(ConfigError::UnknownFlag("--frobnicate".into()))
    );
    assert!(matches!(
        config.apply_flag("--gc=copying"),
        Err(ConfigError::InvalidValue { flag, .. }) if flag == "--gc"
    ));
    assert!(config.apply_flag("--timeout=-1").is_err());
}

#[test]
fn environment_sets_paths_collector_and_bridges() {
    let path = std::env::join_paths(["/a", "/b"]).unwrap();
    let mut env = vars(&[
        ("RYTON_GC", "generational"),
        ("RYTON_BRIDGE_PYTHON", "python3 -"),
        ("RYTON_NATIVE", "sdl, gl"),
    ]);
    env.push((OsString::from("RYTON_PATH"), path));
    let mut config = SessionConfig::new().with_search_path("/flag");
    config.apply_env(env).unwrap();
    assert_eq!(config.memory.collector, CollectorKind::Generational);
    assert_eq!(config.bridge().languages(), vec!["python"]);
    assert_eq!(config.native_libs, vec!["sdl", "gl"]);
    assert_eq!(
        config.search_paths_for(Some(Path::new("/src/main.ry"))),
        vec![
            PathBuf::from("/flag"),
            PathBuf::from("/a"),
            PathBuf::from("/b"),
            PathBuf::from("/src")
        ]
    );
}

#[test]
fn bare_file_names_search_the_current_directory() {
    let config = SessionConfig::new();
    assert_eq!(
        config.search_paths_for(Some(Path::new("main.ry"))),
        vec![PathBuf::from(".")]
    );
    assert!(config.search_paths_for(None).is_empty());
}

#[test]
fn child_args_round_trip() {
    let config = SessionConfig::new()
        .with_collector(CollectorKind::Incremental)
        .with_format(OutputFormat::Json)
        .with_trace(true);
    let mut child = SessionConfig::new();
    for arg in config.child_args() {
        child.apply_flag(&arg).unwrap();
    }
    assert_eq!(child.memory, config.memory);
    assert_eq!(child.format, OutputFormat::Json);
    assert!(child.trace);
}
