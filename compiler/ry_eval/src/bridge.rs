//! Calls into embedded foreign-language code.
//!
//! A foreign block is lowered to a bridge call carrying the language name
//! and the block's verbatim text. What runs it is up to the host: a
//! configured external command per language, or a recording stub.

use std::io::Write;
use std::process::{Command, Stdio};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("no bridge configured for language `{0}`")]
    Unsupported(String),

    #[error("bridge for `{lang}` could not run `{command}`: {message}")]
    Io {
        lang: String,
        command: String,
        message: String,
    },

    #[error("bridge for `{lang}` exited with status {status}: {stderr}")]
    Failed {
        lang: String,
        status: i32,
        stderr: String,
    },
}

pub trait ForeignBridge: Send + Sync {
    /// Run `code` written in `lang`, returning what it printed.
    fn call(&self, lang: &str, code: &str) -> Result<String, BridgeError>;
}

/// Pipes foreign code into a per-language command and captures stdout.
#[derive(Clone, Debug, Default)]
pub struct ProcessBridge {
    commands: FxHashMap<String, Vec<String>>,
}

impl ProcessBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run code in `lang` with `command` (program followed by arguments).
    #[must_use]
    pub fn with_command(mut self, lang: &str, command: Vec<String>) -> Self {
        if !command.is_empty() {
            self.commands.insert(lang.to_ascii_lowercase(), command);
        }
        self
    }

    pub fn languages(&self) -> Vec<&str> {
        let mut langs: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        langs.sort_unstable();
        langs
    }
}

impl ForeignBridge for ProcessBridge {
    fn call(&self, lang: &str, code: &str) -> Result<String, BridgeError> {
        let Some((program, args)) = self
            .commands
            .get(&lang.to_ascii_lowercase())
            .and_then(|c| c.split_first())
        else {
            return Err(BridgeError::Unsupported(lang.to_string()));
        };
        let io_error = |e: std::io::Error| BridgeError::Io {
            lang: lang.to_string(),
            command: program.clone(),
            message: e.to_string(),
        };
        tracing::debug!(%lang, %program, "bridge call");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(io_error)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(code.as_bytes()).map_err(io_error)?;
        }
        let output = child.wait_with_output().map_err(io_error)?;
        if !output.status.success() {
            return Err(BridgeError::Failed {
                lang: lang.to_string(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}

/// Records every call and answers with canned output.
#[derive(Debug, Default)]
pub struct RecordingBridge {
    responses: FxHashMap<String, String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_response(mut self, lang: &str, output: impl Into<String>) -> Self {
        self.responses.insert(lang.to_string(), output.into());
        self
    }

    /// `(lang, code)` of every call so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

impl ForeignBridge for RecordingBridge {
    fn call(&self, lang: &str, code: &str) -> Result<String, BridgeError> {
        self.calls.lock().push((lang.to_string(), code.to_string()));
        Ok(self.responses.get(lang).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_language_is_unsupported() {
        let bridge = ProcessBridge::new().with_command("zig", vec!["zig".into(), "run".into()]);
        assert_eq!(bridge.languages(), vec!["zig"]);
        assert!(matches!(
            bridge.call("Rust", "fn main() {}"),
            Err(BridgeError::Unsupported(lang)) if lang == "Rust"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn process_bridge_pipes_code_through_the_command() {
        let bridge = ProcessBridge::new().with_command("Cat", vec!["cat".into()]);
        assert_eq!(bridge.call("cat", "echo me\n").unwrap(), "echo me");
    }

    #[test]
    fn recording_bridge_keeps_calls_in_order() {
        let bridge = RecordingBridge::new().with_response("Zig", "42");
        assert_eq!(bridge.call("Zig", "a").unwrap(), "42");
        assert_eq!(bridge.call("C", "b").unwrap(), "");
        assert_eq!(
            bridge.calls(),
            vec![("Zig".to_string(), "a".to_string()), ("C".to_string(), "b".to_string())]
        );
    }
}
