// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Command construction and execution.
//!
//! Every interaction with the pool goes through a [`CondorCommand`] run by a
//! [`CommandRunner`]. Commands always carry an explicit timeout: a hung
//! collector must turn into a failed query, never into a hung control loop.
//!
//! # Pool Selection
//! HTCondor tools accept `-pool <collector>` to target a pool other than the
//! locally configured one. [`CondorCommand::pool_command`] injects it right
//! after the program name, so
//! `condor_reconfig -negotiator` becomes
//! `condor_reconfig -pool cm.example.org -negotiator`.

use crate::QueryError;
use std::fmt;
use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Timeout for configuration/usage queries and administrative commands.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the (potentially large) per-host capacity query.
pub const CAPACITY_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval at which a running child is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status 0.
    pub success: bool,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A successful (exit 0) output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed output with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Executes external commands.
///
/// Implementations must return an error of kind [`io::ErrorKind::TimedOut`]
/// when `timeout` elapses before the command finishes.
pub trait CommandRunner: Send + Sync + fmt::Debug {
    /// Runs `program` with `args` to completion or until `timeout` elapses.
    fn run(&self, program: &str, args: &[String], timeout: Duration) -> io::Result<CommandOutput>;
}

/// Runs commands as real child processes.
///
/// On Unix the child leads a process group of its own. When the deadline
/// passes the whole group is killed, so background jobs the tool started
/// go down with it. Output pipes are drained on helper threads and are
/// collected within the same deadline: a descendant that escaped the group
/// and still holds a pipe cannot stall the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], timeout: Duration) -> io::Result<CommandOutput> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let mut child = command.spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "failed to capture stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "failed to capture stderr"))?;
        let stdout_rx = drain(stdout);
        let stderr_rx = drain(stderr);

        // `None` when `now + timeout` overflows: no deadline at all.
        let deadline = Instant::now().checked_add(timeout);
        let timed_out = || {
            io::Error::new(io::ErrorKind::TimedOut, format!("timed out after {timeout:?}"))
        };

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if deadline.is_some_and(|d| Instant::now() >= d) => {
                    kill_tree(&mut child);
                    return Err(timed_out());
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    kill_tree(&mut child);
                    return Err(e);
                }
            }
        };

        let stdout = collect(&stdout_rx, deadline);
        let stderr = collect(&stderr_rx, deadline);
        let (Some(stdout), Some(stderr)) = (stdout, stderr) else {
            // The child exited but something it left behind keeps a pipe open.
            kill_tree(&mut child);
            return Err(timed_out());
        };

        Ok(CommandOutput {
            success: status.success(),
            code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

/// Reads `pipe` to the end on a helper thread.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

/// Waits for a drained pipe until `deadline`; `None` if it is still open.
fn collect(rx: &mpsc::Receiver<Vec<u8>>, deadline: Option<Instant>) -> Option<Vec<u8>> {
    match deadline {
        Some(deadline) => rx
            .recv_timeout(deadline.saturating_duration_since(Instant::now()))
            .ok(),
        None => rx.recv().ok(),
    }
}

/// Kills the child and, on Unix, every process left in its group.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Ok(pid) = i32::try_from(child.id()) {
            // ESRCH only means the group is already gone.
            let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// An HTCondor command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CondorCommand {
    program: String,
    args: Vec<String>,
}

impl CondorCommand {
    /// Builds a command, targeting `pool` if one is given.
    ///
    /// # Example
    /// ```
    /// use condor_query::CondorCommand;
    ///
    /// let cmd = CondorCommand::pool_command("condor_reconfig", ["-negotiator"], Some("cm.example.org"));
    /// assert_eq!(cmd.args(), ["-pool", "cm.example.org", "-negotiator"]);
    ///
    /// let local = CondorCommand::pool_command("condor_reconfig", ["-negotiator"], None);
    /// assert_eq!(local.args(), ["-negotiator"]);
    /// ```
    pub fn pool_command<I, S>(program: &str, args: I, pool: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all_args = Vec::new();
        if let Some(pool) = pool {
            all_args.push("-pool".to_string());
            all_args.push(pool.to_string());
        }
        all_args.extend(args.into_iter().map(Into::into));
        Self {
            program: program.to_string(),
            args: all_args,
        }
    }

    /// The program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// All arguments, including the pool selector if present.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Runs the command and returns its stdout.
    ///
    /// Any non-zero exit, spawn failure or timeout is a [`QueryError`].
    pub fn query(&self, runner: &dyn CommandRunner, timeout: Duration) -> Result<String, QueryError> {
        self.output(runner, timeout).map(|out| out.stdout)
    }

    /// Runs the command for its exit status only.
    pub fn execute(&self, runner: &dyn CommandRunner, timeout: Duration) -> Result<(), QueryError> {
        self.output(runner, timeout).map(|_| ())
    }

    fn output(&self, runner: &dyn CommandRunner, timeout: Duration) -> Result<CommandOutput, QueryError> {
        tracing::trace!(command = %self, ?timeout, "running command");
        let output = runner
            .run(&self.program, &self.args, timeout)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::TimedOut {
                    QueryError::TimedOut {
                        command: self.to_string(),
                        timeout,
                    }
                } else {
                    QueryError::Spawn {
                        command: self.to_string(),
                        source: e,
                    }
                }
            })?;

        if !output.success {
            return Err(QueryError::Failed {
                command: self.to_string(),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

impl fmt::Display for CondorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRunner;

    #[test]
    fn test_pool_command_without_pool() {
        let cmd = CondorCommand::pool_command("condor_userprio", ["-negotiator", "-long"], None);
        assert_eq!(cmd.program(), "condor_userprio");
        assert_eq!(cmd.args(), ["-negotiator", "-long"]);
    }

    #[test]
    fn test_pool_command_injects_pool_after_program() {
        let cmd = CondorCommand::pool_command(
            "condor_config_val",
            ["-negotiator", "-dump", "LIMIT"],
            Some("cm.example.org:9618"),
        );
        assert_eq!(
            cmd.args(),
            ["-pool", "cm.example.org:9618", "-negotiator", "-dump", "LIMIT"]
        );
    }

    #[test]
    fn test_display_quotes_whitespace() {
        let cmd = CondorCommand::pool_command(
            "condor_config_val",
            ["-negotiator", "-rset", "GPU_LIMIT = 7"],
            None,
        );
        assert_eq!(
            cmd.to_string(),
            "condor_config_val -negotiator -rset 'GPU_LIMIT = 7'"
        );
    }

    #[test]
    fn test_query_returns_stdout() {
        let runner = ScriptedRunner::new();
        runner.push_ok("A = 1\n");
        let cmd = CondorCommand::pool_command("condor_userprio", ["-long"], None);
        let out = cmd.query(&runner, QUERY_TIMEOUT).unwrap();
        assert_eq!(out, "A = 1\n");
        assert_eq!(runner.invocations().len(), 1);
    }

    #[test]
    fn test_query_nonzero_exit() {
        let runner = ScriptedRunner::new();
        runner.push_failure(1, "ERROR: can't find address of negotiator\n");
        let cmd = CondorCommand::pool_command("condor_userprio", ["-long"], None);
        match cmd.query(&runner, QUERY_TIMEOUT) {
            Err(QueryError::Failed { code, stderr, .. }) => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "ERROR: can't find address of negotiator");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_query_timeout() {
        let runner = ScriptedRunner::new();
        runner.push_timeout();
        let cmd = CondorCommand::pool_command("condor_status", ["-startd"], None);
        let err = cmd.query(&runner, CAPACITY_TIMEOUT).unwrap_err();
        assert!(matches!(err, QueryError::TimedOut { timeout, .. } if timeout == CAPACITY_TIMEOUT));
        assert_eq!(err.command(), "condor_status -startd");
    }

    #[test]
    fn test_system_runner_missing_program() {
        let cmd = CondorCommand::pool_command("condor-limits-test-no-such-binary", ["-x"], None);
        let err = cmd.query(&SystemRunner, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, QueryError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_stdout() {
        let out = SystemRunner
            .run("sh", &["-c".into(), "echo GPU_LIMIT = 3".into()], Duration::from_secs(5))
            .unwrap();
        assert!(out.success);
        assert_eq!(out.stdout.trim(), "GPU_LIMIT = 3");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_kills_on_timeout() {
        let start = Instant::now();
        let err = SystemRunner
            .run("sleep", &["5".into()], Duration::from_millis(100))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_kills_background_jobs_on_timeout() {
        let start = Instant::now();
        let err = SystemRunner
            .run("sh", &["-c".into(), "sleep 4 & sleep 20".into()], Duration::from_millis(200))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(start.elapsed() < Duration::from_secs(2), "took {:?}", start.elapsed());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_bounded_by_detached_pipe_holder() {
        // The shell exits at once; the detached job keeps stdout open.
        let start = Instant::now();
        let err = SystemRunner
            .run("sh", &["-c".into(), "sleep 20 & echo started".into()], Duration::from_millis(300))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(start.elapsed() < Duration::from_secs(2), "took {:?}", start.elapsed());
    }

    #[test]
    fn test_system_runner_unbounded_timeout() {
        let cmd = CondorCommand::pool_command("condor-limits-test-no-such-binary", ["-x"], None);
        let err = cmd.query(&SystemRunner, Duration::MAX).unwrap_err();
        assert!(matches!(err, QueryError::Spawn { .. }));
    }
}
