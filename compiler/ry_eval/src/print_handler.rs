//! Where `print` output goes.
//!
//! Programs write to stdout; tests capture into a buffer. Enum dispatch
//! keeps the hot path free of vtable calls.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Default)]
pub enum PrintHandler {
    #[default]
    Stdout,
    Buffer(Mutex<String>),
}

impl PrintHandler {
    pub fn println(&self, msg: &str) {
        match self {
            PrintHandler::Stdout => {
                let mut out = std::io::stdout().lock();
                let _ = writeln!(out, "{msg}");
                let _ = out.flush();
            }
            PrintHandler::Buffer(buf) => {
                let mut buf = buf.lock();
                buf.push_str(msg);
                buf.push('\n');
            }
        }
    }

    /// Captured output; empty for stdout.
    pub fn output(&self) -> String {
        match self {
            PrintHandler::Stdout => String::new(),
            PrintHandler::Buffer(buf) => buf.lock().clone(),
        }
    }
}

pub type SharedPrintHandler = Arc<PrintHandler>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Stdout)
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Buffer(Mutex::new(String::new())))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn buffer_handler_captures_lines() {
        let handler = buffer_handler();
        handler.println("hello");
        handler.println("world");
        assert_eq!(handler.output(), "hello\nworld\n");
    }

    #[test]
    fn stdout_handler_captures_nothing() {
        assert_eq!(stdout_handler().output(), "");
    }

    #[test]
    fn buffer_handler_is_thread_safe() {
        let handler = buffer_handler();
        let other = Arc::clone(&handler);
        let t = std::thread::spawn(move || {
            for _ in 0..100 {
                other.println("a");
            }
        });
        for _ in 0..100 {
            handler.println("b");
        }
        t.join().unwrap();
        assert_eq!(handler.output().lines().count(), 200);
    }
}
