//! Shell command tasks - run a command line through the platform shell

use super::task::Task;
use crate::error::{CommandError, TaskError};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::process::Command;

/// A command line plus the environment it runs in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellCommand {
    pub command: String,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl ShellCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn current_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Run to completion with inherited stdio
    pub async fn run(&self) -> Result<(), CommandError> {
        log::debug!("Running command: {} (cwd: {:?})", self.command, self.cwd);

        let mut cmd = shell();
        cmd.arg(&self.command);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd.envs(&self.env);

        let status = cmd.status().await.map_err(|source| CommandError::Spawn {
            command: self.command.clone(),
            source,
        })?;

        if status.success() {
            return Ok(());
        }
        match status.code() {
            Some(code) => Err(CommandError::Exited {
                command: self.command.clone(),
                code,
            }),
            None => Err(CommandError::Terminated {
                command: self.command.clone(),
            }),
        }
    }

    /// Wrap as a leaf task; each invocation starts a new process
    pub fn into_task(self) -> Task {
        Task::new(move || {
            let command = self.clone();
            async move { command.run().await.map_err(TaskError::failed) }
        })
    }
}

#[cfg(unix)]
fn shell() -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c");
    cmd
}

#[cfg(windows)]
fn shell() -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C");
    cmd
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_successful_command() {
        assert_ok!(ShellCommand::new("true").run().await);
    }

    #[tokio::test]
    async fn test_exit_code_is_reported() {
        let err = assert_err!(ShellCommand::new("exit 3").run().await);
        match err {
            CommandError::Exited { command, code } => {
                assert_eq!(command, "exit 3");
                assert_eq!(code, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_env_and_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let command = ShellCommand::new(r#"test "$GREETING" = hello && test "$(pwd -P)" = "$EXPECTED""#)
            .current_dir(dir.path())
            .env("GREETING", "hello")
            .env("EXPECTED", dir.path().canonicalize().unwrap().to_string_lossy());

        assert_ok!(command.run().await);
    }

    #[tokio::test]
    async fn test_task_failure_keeps_command_error() {
        let task = ShellCommand::new("exit 7").into_task();
        let err = assert_err!(task.invoke().await);

        let cause = err.downcast_ref::<CommandError>().unwrap();
        assert!(matches!(cause, CommandError::Exited { code: 7, .. }));
    }
}
