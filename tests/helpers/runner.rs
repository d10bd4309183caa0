//! A command runner answering from canned output.

use std::io;

use bitbake_ls::project::{CommandOutput, CommandRunner};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

#[derive(Default)]
pub struct ScriptedRunner {
    responses: FxHashMap<String, Option<CommandOutput>>,
    calls: Mutex<Vec<String>>,
    suspend: bool,
}

impl ScriptedRunner {
    pub fn respond(mut self, command: &str, stdout: impl Into<String>) -> Self {
        self.responses
            .insert(command.to_string(), Some(CommandOutput::success(stdout)));
        self
    }

    /// Suspend once per command so overlapping requests can interleave
    pub fn suspending(mut self) -> Self {
        self.suspend = true;
        self
    }

    /// The command cannot be spawned at all
    pub fn broken(mut self, command: &str) -> Self {
        self.responses.insert(command.to_string(), None);
        self
    }

    pub fn calls(&self, command: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.as_str() == command)
            .count()
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &str) -> io::Result<CommandOutput> {
        self.calls.lock().push(command.to_string());
        if self.suspend {
            tokio::task::yield_now().await;
        }
        match self.responses.get(command) {
            Some(Some(output)) => Ok(output.clone()),
            Some(None) => Err(io::Error::new(io::ErrorKind::NotFound, "shell not found")),
            None => Ok(CommandOutput::failure(1, "unknown command")),
        }
    }
}
