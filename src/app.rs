//! Application flow - resolves the command, loads the task file and runs a task

use crate::cli::{help_text, Cli, Invocation};
use crate::core::{format_elapsed, ConsoleReporter, Engine};
use crate::error::TaskError;
use crate::style::{cyan, gray, green, paint_on, red, yellow, Stream};
use crossterm::style::Color;
use crate::taskfile::{TaskFile, TaskSet};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One CLI run
pub struct App {
    cli: Cli,
    cwd: PathBuf,
    started: Instant,
}

impl App {
    pub fn new(cli: Cli, cwd: PathBuf) -> Self {
        Self {
            cli,
            cwd,
            started: Instant::now(),
        }
    }

    /// Execute the requested command; the exit code is 0 only on success
    pub async fn run(&self) -> ExitCode {
        let invocation = match self.cli.invocation() {
            Ok(invocation) => invocation,
            Err(err) => return failure_exit(&err.to_string()),
        };

        if invocation == Invocation::Version {
            println!("{}", VERSION);
            return ExitCode::SUCCESS;
        }

        let located = TaskFile::locate(self.cli.file.as_deref(), &self.cwd);
        println!("{}", start_message(located.as_deref().ok(), &invocation));

        if invocation == Invocation::Help {
            println!("{}", help_text());
            return ExitCode::SUCCESS;
        }

        let path = match located {
            Ok(path) => path,
            Err(err) => return failure_exit(&err.to_string()),
        };
        log::info!("Using task file {}", path.display());

        let engine = Engine::new(ConsoleReporter);
        let base_dir = path.parent().unwrap_or(&self.cwd);
        let tasks = match TaskFile::from_file(&path).and_then(|file| file.compile(&engine, base_dir)) {
            Ok(tasks) => tasks,
            Err(err) => {
                eprintln!("{}", err);
                return failure_exit(&format!("Could not load task file {}", path.display()));
            }
        };

        match invocation {
            Invocation::Run(name) => self.run_task(&tasks, &name).await,
            Invocation::Filter(pattern) => self.show_task_list(&tasks, pattern.as_deref()),
            Invocation::List | Invocation::Help | Invocation::Version => self.show_task_list(&tasks, None),
        }
    }

    async fn run_task(&self, tasks: &TaskSet, name: &str) -> ExitCode {
        let Some(task) = tasks.get(name) else {
            return failure_exit(&format!(
                "Task '{}' not found. Tasks must be defined under `tasks:` in your swigfile. Try 'swig list' to see available tasks.",
                name
            ));
        };

        // The root itself is not reported, only the children its groups run
        let outcome = task.invoke().await;
        let has_errors = outcome.is_err();
        if let Err(err) = outcome {
            let (heading, err) = collapse_failure(err);
            println!("{}", red(&heading));
            eprintln!("{}", err);
        }

        println!("{}", finished_message(self.started, has_errors));
        if has_errors {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }

    fn show_task_list(&self, tasks: &TaskSet, filter: Option<&str>) -> ExitCode {
        let names = match filter {
            Some(pattern) => tasks.filter(pattern),
            None => tasks.names().collect(),
        };

        println!("Available tasks:");
        for name in names {
            match tasks.entry(name).and_then(|entry| entry.description.as_deref()) {
                Some(description) => println!("  {}{}", cyan(name), gray(&format!(" - {}", description))),
                None => println!("  {}", cyan(name)),
            }
        }
        println!("{}", finished_message(self.started, false));
        ExitCode::SUCCESS
    }
}

/// Heading and error to print for a failed root task. A group with a single failure
/// is reported as that failure.
pub fn collapse_failure(err: TaskError) -> (String, TaskError) {
    match err {
        TaskError::Aggregate(mut errors) if errors.len() == 1 => ("Error".to_string(), errors.remove(0)),
        TaskError::Aggregate(errors) => (format!("Errors ({})", errors.len()), TaskError::Aggregate(errors)),
        other => ("Error".to_string(), other),
    }
}

fn start_message(task_file: Option<&Path>, invocation: &Invocation) -> String {
    let kind = if invocation.is_command() { "Command" } else { "Task" };
    let file_name = task_file
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "[ {}: {} ][ Swigfile: {} ][ Version: {} ][ {}swig help{} ]",
        kind,
        cyan(invocation.value()),
        cyan(&file_name),
        cyan(VERSION),
        gray("use "),
        gray(" for more info")
    )
}

fn finished_message(started: Instant, has_errors: bool) -> String {
    let status = if has_errors { red("failed") } else { green("success") };
    let elapsed = format_elapsed(started.elapsed());
    let duration = if has_errors { yellow(&elapsed) } else { green(&elapsed) };
    format!("[ Result: {} ][ Total duration: {} ]", status, duration)
}

fn failure_exit(message: &str) -> ExitCode {
    eprintln!("{} {}", paint_on(Stream::Stderr, "Error:", Color::Red), message);
    ExitCode::FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_failure_is_unwrapped() {
        let (heading, err) = collapse_failure(TaskError::Aggregate(vec![TaskError::msg("only")]));
        assert_eq!(heading, "Error");
        assert!(err.failures().is_none());
        assert_eq!(err.to_string(), "only");
    }

    #[test]
    fn test_multiple_failures_are_counted() {
        let (heading, err) = collapse_failure(TaskError::Aggregate(vec![
            TaskError::msg("a"),
            TaskError::msg("b"),
        ]));
        assert_eq!(heading, "Errors (2)");
        assert_eq!(err.failures().map(<[TaskError]>::len), Some(2));
    }

    #[test]
    fn test_leaf_failure_is_kept() {
        let (heading, err) = collapse_failure(TaskError::msg("boom"));
        assert_eq!(heading, "Error");
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_start_message() {
        let message = start_message(
            Some(Path::new("/work/swigfile.yml")),
            &Invocation::Run("build".to_string()),
        );
        assert!(message.contains("Task: "));
        assert!(message.contains("build"));
        assert!(message.contains("swigfile.yml"));

        let message = start_message(None, &Invocation::List);
        assert!(message.contains("Command: "));
    }
}
