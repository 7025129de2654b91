//! Session configuration from flags and environment.
//!
//! Environment is applied first, then command-line flags, so a flag always
//! wins. Search paths are the exception: they accumulate in the order
//! `--path=` flags, `RYTON_PATH`, then the entry file's directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ry_diagnostic::emitter::ColorMode;
use ry_eval::{FaultFormat, ProcessBridge, DEFAULT_CONTEXT_RADIUS};
use ry_memory::{CollectorKind, MemoryConfig};

/// Prefix of the per-language bridge command variables.
const BRIDGE_VAR_PREFIX: &str = "RYTON_BRIDGE_";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StrategyKind {
    /// Tree-walking interpreter in this process.
    #[default]
    Interpreter,
    /// Serialized artifact run by a child `ryton exec`.
    Subprocess,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Panel,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown option `{0}`")]
    UnknownFlag(String),

    #[error("invalid value `{value}` for `{flag}`: {reason}")]
    InvalidValue {
        flag: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    #[cold]
    fn invalid(flag: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            flag: flag.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Package directories from flags, then `RYTON_PATH`.
    pub search_paths: Vec<PathBuf>,
    pub memory: MemoryConfig,
    pub strategy: StrategyKind,
    pub timeout: Option<Duration>,
    pub context_radius: u32,
    pub format: OutputFormat,
    pub color: ColorMode,
    /// `(language, command line)` used to run foreign blocks.
    pub bridges: Vec<(String, Vec<String>)>,
    /// Record a call/return trace for fault reports.
    pub trace: bool,
    /// Native libraries this host can load, for `clib:` and the modules
    /// that need them.
    pub native_libs: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            search_paths: Vec::new(),
            memory: MemoryConfig::default(),
            strategy: StrategyKind::default(),
            timeout: None,
            context_radius: DEFAULT_CONTEXT_RADIUS,
            format: OutputFormat::default(),
            color: ColorMode::Auto,
            bridges: Vec::new(),
            trace: false,
            native_libs: Vec::new(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_paths.push(dir.into());
        self
    }

    #[must_use]
    pub fn with_memory(mut self, memory: MemoryConfig) -> Self {
        self.memory = memory;
        self
    }

    #[must_use]
    pub fn with_collector(mut self, collector: CollectorKind) -> Self {
        self.memory.collector = collector;
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_context_radius(mut self, radius: u32) -> Self {
        self.context_radius = radius;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: ColorMode) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_bridge(mut self, lang: &str, command: Vec<String>) -> Self {
        self.bridges.retain(|(l, _)| !l.eq_ignore_ascii_case(lang));
        self.bridges.push((lang.to_string(), command));
        self
    }

    #[must_use]
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    #[must_use]
    pub fn with_native_lib(mut self, lib: impl Into<String>) -> Self {
        self.native_libs.push(lib.into());
        self
    }

    /// Apply `RYTON_PATH`, `RYTON_GC`, `RYTON_NATIVE` and
    /// `RYTON_BRIDGE_<LANG>` from `vars`.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut bridges = Vec::new();
        for (key, value) in vars {
            let Some(key) = key.to_str() else { continue };
            match key {
                "RYTON_PATH" => self.search_paths.extend(std::env::split_paths(&value)),
                "RYTON_NATIVE" => self.native_libs.extend(
                    value
                        .to_string_lossy()
                        .split(',')
                        .map(str::trim)
                        .filter(|lib| !lib.is_empty())
                        .map(str::to_string),
                ),
                "RYTON_GC" => {
                    let value = value.to_string_lossy();
                    self.memory.collector = parse_collector("RYTON_GC", &value)?;
                }
                _ => {
                    if let Some(lang) = key.strip_prefix(BRIDGE_VAR_PREFIX) {
                        let command: Vec<String> =
                            value.to_string_lossy().split_whitespace().map(str::to_string).collect();
                        if !lang.is_empty() && !command.is_empty() {
                            bridges.push((lang.to_ascii_lowercase(), command));
                        }
                    }
                }
            }
        }
        // Environment order is unspecified.
        bridges.sort();
        for (lang, command) in bridges {
            *self = std::mem::take(self).with_bridge(&lang, command);
        }
        Ok(())
    }

    /// Apply one `--flag[=value]`. Returns `false` for arguments that are
    /// not session flags, such as positional paths.
    pub fn apply_flag(&mut self, arg: &str) -> Result<bool, ConfigError> {
        if !arg.starts_with("--") {
            return Ok(false);
        }
        let (flag, value) = match arg.split_once('=') {
            Some((flag, value)) => (flag, Some(value)),
            None => (arg, None),
        };
        match (flag, value) {
            ("--path", Some(dir)) => self.search_paths.push(PathBuf::from(dir)),
            ("--strategy", Some("interp" | "interpreter")) => {
                self.strategy = StrategyKind::Interpreter;
            }
            ("--strategy", Some("process" | "subprocess")) => {
                self.strategy = StrategyKind::Subprocess;
            }
            ("--strategy", Some(other)) => {
                return Err(ConfigError::invalid(flag, other, "expected `interp` or `process`"));
            }
            ("--timeout", Some(secs)) => {
                let parsed = secs
                    .parse::<f64>()
                    .ok()
                    .and_then(|s| Duration::try_from_secs_f64(s).ok())
                    .ok_or_else(|| ConfigError::invalid(flag, secs, "expected seconds"))?;
                self.timeout = Some(parsed);
            }
            ("--gc", Some(algo)) => self.memory.collector = parse_collector(flag, algo)?,
            ("--heap", Some(bytes)) => self.memory.heap_size = parse_count(flag, bytes)?,
            ("--threshold", Some(n)) => self.memory.threshold = parse_count(flag, n)?.max(1),
            ("--context", Some(n)) => {
                self.context_radius = n
                    .parse()
                    .map_err(|_| ConfigError::invalid(flag, n, "expected a line count"))?;
            }
            ("--format", Some("json")) => self.format = OutputFormat::Json,
            ("--format", Some("panel" | "human")) => self.format = OutputFormat::Panel,
            ("--format", Some(other)) => {
                return Err(ConfigError::invalid(flag, other, "expected `json` or `panel`"));
            }
            ("--no-color", None) => self.color = ColorMode::Never,
            ("--color", None) => self.color = ColorMode::Always,
            ("--trace", None) => self.trace = true,
            ("--native", Some(lib)) => self.native_libs.push(lib.to_string()),
            _ => return Err(ConfigError::UnknownFlag(arg.to_string())),
        }
        Ok(true)
    }

    /// Search directories for a program whose entry file is `entry`.
    pub fn search_paths_for(&self, entry: Option<&Path>) -> Vec<PathBuf> {
        let mut dirs = self.search_paths.clone();
        let entry_dir = entry
            .and_then(Path::parent)
            .map(|dir| if dir.as_os_str().is_empty() { Path::new(".") } else { dir });
        if let Some(dir) = entry_dir {
            if !dirs.iter().any(|d| d == dir) {
                dirs.push(dir.to_path_buf());
            }
        }
        dirs
    }

    /// Flags that reproduce the execution settings in a child process.
    pub fn child_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--gc={}", self.memory.collector),
            format!("--heap={}", self.memory.heap_size),
            format!("--threshold={}", self.memory.threshold),
            format!("--context={}", self.context_radius),
        ];
        if self.format == OutputFormat::Json {
            args.push("--format=json".to_string());
        }
        match self.color {
            ColorMode::Never => args.push("--no-color".to_string()),
            ColorMode::Always => args.push("--color".to_string()),
            ColorMode::Auto => {}
        }
        if self.trace {
            args.push("--trace".to_string());
        }
        args
    }

    pub fn bridge(&self) -> ProcessBridge {
        self.bridges
            .iter()
            .fold(ProcessBridge::new(), |bridge, (lang, command)| {
                bridge.with_command(lang, command.clone())
            })
    }

    pub fn fault_format(&self, is_tty: bool, width: usize) -> FaultFormat {
        match self.format {
            OutputFormat::Json => FaultFormat::Json,
            OutputFormat::Panel => FaultFormat::Panel {
                color: self.color,
                is_tty,
                width,
            },
        }
    }
}

fn parse_collector(flag: &str, value: &str) -> Result<CollectorKind, ConfigError> {
    value
        .parse()
        .map_err(|e: ry_memory::MemoryError| ConfigError::invalid(flag, value, e.to_string()))
}

fn parse_count(flag: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::invalid(flag, value, "expected a whole number"))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
