//! Syntax checking through an external assembler front end.
//!
//! The document goes to the program's stdin and the document path, when
//! known, is its only argument. Exit status zero means the source assembled.
//! Otherwise the first stderr line is the diagnostic, optionally prefixed
//! with `LINE:OFFSET:`.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use core_state::{SyntaxCheckError, SyntaxChecker, SyntaxReport};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CommandChecker {
    program: PathBuf,
}

impl CommandChecker {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SyntaxChecker for CommandChecker {
    fn check(&mut self, text: &str, path: Option<&Path>) -> Result<SyntaxReport, SyntaxCheckError> {
        let mut command = Command::new(&self.program);
        command
            .args(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        let mut child = command.spawn().map_err(|e| {
            SyntaxCheckError::Unavailable(format!("{}: {e}", self.program.display()))
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            // The checker may exit before reading everything.
            match stdin.write_all(text.as_bytes()) {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => {
                    return Err(SyntaxCheckError::Failed(e.to_string()));
                }
                _ => {}
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| SyntaxCheckError::Failed(e.to_string()))?;
        debug!(target: "runtime.syntax", status = ?output.status, stderr_bytes = output.stderr.len(), "checker_exit");
        if output.status.success() {
            return Ok(SyntaxReport::Success);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Ok(parse_diagnostic(stderr.lines().next().unwrap_or_default()))
    }
}

/// `"3:7: unknown instruction"` carries a location; anything else is a bare
/// message.
fn parse_diagnostic(line: &str) -> SyntaxReport {
    let located = line.split_once(':').and_then(|(row, rest)| {
        let (column, message) = rest.split_once(':')?;
        Some((row.trim().parse().ok()?, column.trim().parse().ok()?, message))
    });
    match located {
        Some((line, offset, message)) => SyntaxReport::Error {
            line: Some(line),
            offset: Some(offset),
            message: message.trim().to_string(),
        },
        None => SyntaxReport::Error {
            line: None,
            offset: None,
            message: line.trim().to_string(),
        },
    }
}
