// External command execution (mkdir, mount, findmnt, free, ...)

use crate::error::{Error, Result};
use std::io::Read;
use std::process::Stdio;

/// A program invocation plus how its outcome should be treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    program: String,
    args: Vec<String>,
    merge_stderr: bool,
    ignore_failure: bool,
}

impl Command {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            merge_stderr: false,
            ignore_failure: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Interleave stderr into the captured stdout lines.
    pub fn merge_stderr(mut self) -> Self {
        self.merge_stderr = true;
        self
    }

    /// Return the output even when the exit status is non-zero.
    pub fn ignore_failure(mut self) -> Self {
        self.ignore_failure = true;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn merges_stderr(&self) -> bool {
        self.merge_stderr
    }

    pub fn ignores_failure(&self) -> bool {
        self.ignore_failure
    }

    /// Shell-like rendering for logs and error messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; -1 when the process was killed by a signal.
    pub status: i32,
    /// Captured stdout (with stderr interleaved when merged), split into lines.
    pub lines: Vec<String>,
    /// Captured stderr when it was not merged.
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    pub fn stdout(&self) -> String {
        self.lines.join("\n")
    }

    fn captured(&self) -> String {
        let stdout = self.stdout();
        match (stdout.is_empty(), self.stderr.trim().is_empty()) {
            (_, true) => stdout,
            (true, false) => self.stderr.trim().to_string(),
            (false, false) => format!("{}\n{}", stdout, self.stderr.trim()),
        }
    }
}

/// Runs commands and waits for them. Blocking; no timeout.
pub trait Executor: Send + Sync {
    /// Spawn the program and wait for it, regardless of exit status.
    fn spawn(&self, cmd: &Command) -> Result<CommandOutput>;

    /// Spawn and fail with [`Error::Exec`] on non-zero exit unless the command ignores failure.
    fn execute(&self, cmd: &Command) -> Result<CommandOutput> {
        tracing::debug!(command = %cmd.command_line(), "exec");
        let output = self.spawn(cmd)?;
        if !output.success() {
            if cmd.ignores_failure() {
                tracing::debug!(
                    command = %cmd.command_line(),
                    status = output.status,
                    "non-zero exit ignored"
                );
            } else {
                tracing::warn!(
                    command = %cmd.command_line(),
                    status = output.status,
                    "command failed"
                );
                return Err(Error::Exec {
                    command: cmd.program().to_string(),
                    args: cmd.get_args().to_vec(),
                    status: output.status,
                    output: output.captured(),
                });
            }
        }
        Ok(output)
    }
}

/// Executes commands on the host via `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl SystemExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for SystemExecutor {
    fn spawn(&self, cmd: &Command) -> Result<CommandOutput> {
        let spawn_err = |source: std::io::Error| Error::Spawn {
            command: cmd.program().to_string(),
            source,
        };

        if cmd.merges_stderr() {
            let (mut reader, writer) = std::io::pipe().map_err(spawn_err)?;
            // The Command owns both write ends; it must drop before we read to EOF.
            let mut child = {
                let mut proc = std::process::Command::new(cmd.program());
                proc.args(cmd.get_args())
                    .stdin(Stdio::null())
                    .stdout(writer.try_clone().map_err(spawn_err)?)
                    .stderr(writer);
                proc.spawn().map_err(spawn_err)?
            };
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf).map_err(spawn_err)?;
            let status = child.wait().map_err(spawn_err)?;
            return Ok(CommandOutput {
                status: status.code().unwrap_or(-1),
                lines: split_lines(&buf),
                stderr: String::new(),
            });
        }

        let output = std::process::Command::new(cmd.program())
            .args(cmd.get_args())
            .stdin(Stdio::null())
            .output()
            .map_err(spawn_err)?;
        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            lines: split_lines(&output.stdout),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn split_lines(buf: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(buf)
        .lines()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_joins_program_and_args() {
        let cmd = Command::new("umount").args(["-v", "-f"]).arg("/srv/x");
        assert_eq!(cmd.command_line(), "umount -v -f /srv/x");
    }

    #[test]
    fn system_executor_captures_stdout_lines() {
        let out = SystemExecutor
            .execute(&Command::new("printf").arg("a\\nb\\n"))
            .unwrap();
        assert!(out.success());
        assert_eq!(out.lines, vec!["a", "b"]);
    }

    #[test]
    fn non_zero_exit_is_exec_error() {
        let err = SystemExecutor.execute(&Command::new("false")).unwrap_err();
        match err {
            Error::Exec {
                command, status, ..
            } => {
                assert_eq!(command, "false");
                assert_eq!(status, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ignored_failure_returns_status() {
        let out = SystemExecutor
            .execute(&Command::new("false").ignore_failure())
            .unwrap();
        assert!(!out.success());
    }

    #[test]
    fn merged_stderr_lands_in_lines() {
        let out = SystemExecutor
            .execute(
                &Command::new("sh")
                    .args(["-c", "echo out; echo err >&2"])
                    .merge_stderr(),
            )
            .unwrap();
        assert!(out.lines.contains(&"out".to_string()));
        assert!(out.lines.contains(&"err".to_string()));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let err = SystemExecutor
            .execute(&Command::new("/nonexistent/bin/definitely-not-here"))
            .unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
        assert!(err.is_execution());
    }
}
