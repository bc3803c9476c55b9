//! Blocking subprocess helpers
//!
//! All external tools (bup, tar, du) run to completion; a non-zero exit
//! status fails the whole operation.

use std::io::ErrorKind;
use std::process::{Command, Output, Stdio};

use tracing::debug;

use crate::error::{PbupError, PbupResult};

/// Render a command line for logs and error messages
pub fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().to_string()];
    parts.extend(cmd.get_args().map(|arg| arg.to_string_lossy().to_string()));
    parts.join(" ")
}

fn spawn_error(command: String, err: std::io::Error) -> PbupError {
    let status = if err.kind() == ErrorKind::NotFound {
        "not found in PATH".to_string()
    } else {
        format!("could not be started: {}", err)
    };
    PbupError::Subprocess {
        command,
        status,
        stderr: String::new(),
    }
}

/// Run a command with stdout/stderr inherited by the operator's terminal
pub fn run_inherit(cmd: &mut Command) -> PbupResult<()> {
    let command = describe(cmd);
    debug!(command = %command, "running");

    let status = cmd
        .stdin(Stdio::null())
        .status()
        .map_err(|e| spawn_error(command.clone(), e))?;

    if !status.success() {
        return Err(PbupError::Subprocess {
            command,
            status: status.to_string(),
            stderr: String::new(),
        });
    }

    Ok(())
}

/// Run a command and capture its output, failing on non-zero exit
pub fn run_capture(cmd: &mut Command) -> PbupResult<Output> {
    let command = describe(cmd);
    debug!(command = %command, "running");

    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_error(command.clone(), e))?;

    if !output.status.success() {
        return Err(PbupError::Subprocess {
            command,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let mut cmd = Command::new("bup");
        cmd.args(["ls", "-l", "local-data"]);
        assert_eq!(describe(&cmd), "bup ls -l local-data");
    }

    #[test]
    fn test_missing_binary() {
        let err = run_capture(&mut Command::new("pbup-definitely-not-a-binary")).unwrap_err();
        assert!(err.to_string().contains("not found in PATH"));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_captures_stderr() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo boom >&2; exit 3"]);

        match run_capture(&mut cmd).unwrap_err() {
            PbupError::Subprocess { stderr, status, .. } => {
                assert_eq!(stderr.trim(), "boom");
                assert!(status.contains('3'));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_stdout() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "printf 'a\\nb\\n'"]);
        let output = run_capture(&mut cmd).unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), "a\nb\n");
    }
}
