//! Running BitBake commands inside the build environment.

use super::settings::Settings;
use std::io;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Captured result of one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Executes introspection commands for the project scanner.
///
/// `Err` means the command could not be run at all; a command that ran and
/// failed is an `Ok` output with a non-zero status.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &str) -> impl Future<Output = io::Result<CommandOutput>> + Send;
}

/// Runs commands through the user's shell after sourcing the BitBake
/// environment script.
#[derive(Debug, Clone)]
pub struct BitbakeDriver {
    env_script: Option<PathBuf>,
    build_folder: Option<PathBuf>,
    working_directory: PathBuf,
    shell: String,
}

impl BitbakeDriver {
    /// Driver for `settings`, or `None` when BitBake has not been located.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        if !settings.is_driver_configured() {
            return None;
        }
        Some(Self {
            env_script: settings.path_to_env_script.clone(),
            build_folder: settings.path_to_build_folder.clone(),
            working_directory: settings.working_directory.clone(),
            shell: std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string()),
        })
    }

    /// `set -e && . <env> && cd <build> && <command>`
    pub fn compose_command(&self, command: &str) -> String {
        let mut script = String::from("set -e && ");
        if let Some(env) = &self.env_script {
            script.push_str(&format!(". {} && ", env.display()));
        }
        if let Some(build) = &self.build_folder {
            script.push_str(&format!("cd {} && ", build.display()));
        }
        script.push_str(&sanitize_command(command));
        script
    }
}

impl CommandRunner for BitbakeDriver {
    async fn run(&self, command: &str) -> io::Result<CommandOutput> {
        let script = self.compose_command(command);
        debug!(shell = %self.shell, %script, "executing bitbake command");

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(&script)
            .current_dir(&self.working_directory)
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Strip shell metacharacters so a command cannot chain or redirect.
pub fn sanitize_command(command: &str) -> String {
    command
        .chars()
        .filter(|c| !matches!(c, ';' | '`' | '&' | '|' | '<' | '>' | '$' | '(' | ')' | '{' | '}'))
        .collect()
}
