//! Source formatting hook
//!
//! Generated files pass through a [`Formatter`] before being written. A
//! failing formatter never blocks a write: callers fall back to the
//! unformatted text via [`format_or_original`].

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Formats source text; `path_hint` tells the formatter which language to use.
pub trait Formatter: Send + Sync {
    fn format(&self, source: &str, path_hint: &str) -> Result<String>;
}

/// Returns the source unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFormatter;

impl Formatter for NoopFormatter {
    fn format(&self, source: &str, _path_hint: &str) -> Result<String> {
        Ok(source.to_string())
    }
}

/// Pipes source through an external command (for example prettier).
///
/// `{file}` in any argument is replaced by the path hint.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    /// Build from a `[program, args...]` list. Returns `None` for an empty list.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn failed(&self, message: impl Into<String>) -> Error {
        Error::FormatFailed {
            command: self.program.clone(),
            message: message.into(),
        }
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, source: &str, path_hint: &str) -> Result<String> {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace("{file}", path_hint))
            .collect();

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.failed(e.to_string()))?;

        // Stdout drains while stdin is written; the child is reaped either way
        let stdin = child.stdin.take();
        let (written, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(source.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (writer.join(), output)
        });

        let output = output.map_err(|e| self.failed(e.to_string()))?;
        if !output.status.success() {
            return Err(self.failed(String::from_utf8_lossy(&output.stderr).trim().to_string()));
        }
        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(self.failed(format!("writing stdin: {e}"))),
            Err(_) => return Err(self.failed("stdin writer panicked")),
        }
        String::from_utf8(output.stdout).map_err(|e| self.failed(e.to_string()))
    }
}

/// Format `source`, or return it unchanged with a warning when formatting fails.
pub fn format_or_original(formatter: &dyn Formatter, source: &str, path_hint: &str) -> String {
    match formatter.format(source, path_hint) {
        Ok(formatted) => formatted,
        Err(e) => {
            tracing::warn!("Formatting {} failed, writing unformatted: {}", path_hint, e);
            source.to_string()
        }
    }
}
