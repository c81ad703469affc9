//! Subprocess execution with stdout line capture.
//!
//! Arguments are passed as discrete tokens; there is no shell involved and
//! no quoting or escaping. Resolution is driven purely by the stdout stream
//! ending — the exit status is logged but deliberately not treated as a
//! failure, and stderr is not captured.

use std::ffi::OsStr;
use std::process::Stdio;

use tracing::debug;

use crate::accessor::ScopedFs;
use crate::error::{Error, Result};

fn spawn_error(command: &str, source: std::io::Error) -> Error {
    Error::Spawn {
        command: command.to_string(),
        source,
    }
}

fn split_lines(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl ScopedFs {
    /// Run `command` with the given arguments and collect its stdout as
    /// non-empty lines, in emission order.
    ///
    /// Failing to start the process is an error; a non-zero exit code is
    /// not.
    pub async fn run_command<S: AsRef<OsStr>>(
        &self,
        command: &str,
        args: &[S],
    ) -> Result<Vec<String>> {
        let child = tokio::process::Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| spawn_error(command, e))?;
        let output = child
            .wait_with_output()
            .await
            .map_err(|e| spawn_error(command, e))?;
        debug!(command, status = ?output.status.code(), "command finished");
        Ok(split_lines(&output.stdout))
    }

    /// Blocking twin of [`run_command`](Self::run_command).
    pub fn run_command_sync<S: AsRef<OsStr>>(
        &self,
        command: &str,
        args: &[S],
    ) -> Result<Vec<String>> {
        let output = std::process::Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| spawn_error(command, e))?;
        debug!(command, status = ?output.status.code(), "command finished");
        Ok(split_lines(&output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_drops_empty_lines() {
        let lines = split_lines(b"one\ntwo\n\nthree\n\n");
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_split_lines_empty_output() {
        assert!(split_lines(b"").is_empty());
        assert!(split_lines(b"\n\n").is_empty());
    }

    #[tokio::test]
    async fn test_run_command_collects_stdout_lines() {
        let accessor = ScopedFs::unrooted();
        let lines = accessor
            .run_command("printf", &["a\nb\nc\n\n"])
            .await
            .unwrap();
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_run_command_arguments_are_discrete_tokens() {
        let accessor = ScopedFs::unrooted();
        // a shell would word-split this; discrete tokens keep it one line
        let lines = accessor.run_command("echo", &["two words"]).await.unwrap();
        assert_eq!(lines, vec!["two words"]);
    }

    #[tokio::test]
    async fn test_run_command_nonzero_exit_is_not_an_error() {
        let accessor = ScopedFs::unrooted();
        let lines = accessor.run_command("false", &[] as &[&str]).await.unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_run_command_spawn_failure() {
        let accessor = ScopedFs::unrooted();
        let result = accessor
            .run_command("definitely-not-a-real-binary", &[] as &[&str])
            .await;
        assert!(matches!(result, Err(Error::Spawn { .. })));
    }

    #[test]
    fn test_run_command_sync_matches_async() {
        let accessor = ScopedFs::unrooted();
        let lines = accessor.run_command_sync("printf", &["x\n\ny\n"]).unwrap();
        assert_eq!(lines, vec!["x", "y"]);
    }
}
