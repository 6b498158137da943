//! Running external programs with piped stdio

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{EngineError, Result};

/// Run `program`, feed `input` on stdin and return its stdout
///
/// Stdin is written from a separate thread so a child that starts writing
/// before it has consumed all of its input cannot deadlock us. A launch
/// failure or a non-zero exit is an error carrying the child's stderr.
pub(crate) fn run_with_input(program: &str, args: &[String], input: &str) -> Result<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| EngineError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let stdin = child.stdin.take();
    let output = std::thread::scope(|scope| {
        let writer = scope.spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes())?;
            }
            Ok(())
        });

        let output = child.wait_with_output();
        let written = stdin_outcome(writer.join());
        output.and_then(|output| written.map(|()| output))
    })?;

    if !output.status.success() {
        return Err(EngineError::ProcessFailed {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|_| EngineError::InvalidOutput {
        program: program.to_string(),
    })
}

/// Result of the stdin writer thread
///
/// A child may exit without reading all of its input, so a broken pipe is
/// not an error. A panic in the writer is.
fn stdin_outcome(joined: std::thread::Result<std::io::Result<()>>) -> std::io::Result<()> {
    match joined {
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Ok(written) => written,
        Err(_) => Err(std::io::Error::other("stdin writer thread panicked")),
    }
}
