//! Error types for task construction, execution and task-file loading

use crate::core::TaskKind;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A composition input that is not a valid task or named task
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("named task label must not be empty (got {0:?})")]
    EmptyLabel(String),

    #[error("{kind} group needs at least one task")]
    EmptyGroup { kind: TaskKind },
}

/// Rejection reason of a task invocation.
///
/// The engine never inspects a leaf failure: `Failed` carries whatever the task
/// returned, and a failed `parallel` group reports every child failure in input order.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Failed(#[from] anyhow::Error),

    #[error("{}", AggregateDisplay(.0))]
    Aggregate(Vec<TaskError>),
}

impl TaskError {
    /// Wrap any error value as a leaf failure
    pub fn failed<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Failed(anyhow::Error::new(error))
    }

    /// Leaf failure from a plain message
    pub fn msg(message: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Failed(anyhow::Error::msg(message))
    }

    /// Child failures of a parallel group, `None` for a leaf failure
    pub fn failures(&self) -> Option<&[TaskError]> {
        match self {
            Self::Failed(_) => None,
            Self::Aggregate(errors) => Some(errors),
        }
    }

    /// Access the original error value of a leaf failure
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        match self {
            Self::Failed(err) => err.downcast_ref::<E>(),
            Self::Aggregate(_) => None,
        }
    }
}

struct AggregateDisplay<'a>(&'a [TaskError]);

impl fmt::Display for AggregateDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} parallel task(s) failed", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            write!(f, "\n  [{}] {}", i + 1, err.to_string().replace('\n', "\n  "))?;
        }
        Ok(())
    }
}

/// Failure of a shell command leaf
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with code {code}")]
    Exited { command: String, code: i32 },

    #[error("`{command}` was terminated by a signal")]
    Terminated { command: String },
}

/// Errors while locating, parsing or compiling a task file
#[derive(Debug, Error)]
pub enum TaskFileError {
    #[error("task file not found - must be one of the following: {}", .candidates.join(", "))]
    NotFound { candidates: Vec<String> },

    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid task file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid task name {0:?} - only letters, digits and underscores are allowed")]
    InvalidName(String),

    #[error("task '{referenced_by}' references unknown task '{name}'")]
    UnknownTask { name: String, referenced_by: String },

    #[error("task reference cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("task '{0}' has an empty command")]
    EmptyCommand(String),

    #[error("task '{task}': {source}")]
    Validation {
        task: String,
        #[source]
        source: ValidationError,
    },
}
