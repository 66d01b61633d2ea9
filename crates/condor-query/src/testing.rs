// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A scripted [`CommandRunner`] for tests.
//!
//! [`ScriptedRunner`] never spawns processes. It records each invocation and
//! answers with the next queued response; an empty queue answers with a
//! spawn-style error so an unexpected extra query fails loudly.

use crate::{CommandOutput, CommandRunner};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

/// One recorded call to [`ScriptedRunner::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl Invocation {
    /// `program` followed by its arguments, for compact assertions.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

#[derive(Debug)]
enum Response {
    Output(CommandOutput),
    Timeout,
    SpawnError,
}

/// Records invocations and replays queued responses in FIFO order.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: Mutex<VecDeque<Response>>,
    invocations: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful run printing `stdout`.
    pub fn push_ok(&self, stdout: impl Into<String>) {
        self.push(Response::Output(CommandOutput::ok(stdout)));
    }

    /// Queues a run exiting with `code`.
    pub fn push_failure(&self, code: i32, stderr: impl Into<String>) {
        self.push(Response::Output(CommandOutput::failed(code, stderr)));
    }

    /// Queues a run that exceeds its timeout.
    pub fn push_timeout(&self) {
        self.push(Response::Timeout);
    }

    /// Queues a run whose program cannot be started.
    pub fn push_spawn_error(&self) {
        self.push(Response::SpawnError);
    }

    /// All invocations so far, oldest first.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }

    /// Number of invocations so far.
    pub fn calls(&self) -> usize {
        self.invocations.lock().len()
    }

    /// Number of queued responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.responses.lock().len()
    }

    fn push(&self, response: Response) {
        self.responses.lock().push_back(response);
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[String], timeout: Duration) -> io::Result<CommandOutput> {
        self.invocations.lock().push(Invocation {
            program: program.to_string(),
            args: args.to_vec(),
            timeout,
        });

        let next = self.responses.lock().pop_front();
        match next {
            Some(Response::Output(output)) => Ok(output),
            Some(Response::Timeout) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("timed out after {timeout:?}"),
            )),
            Some(Response::SpawnError) => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{program}: command not found"),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no scripted response for `{program}`"),
            )),
        }
    }
}
