//! Task model - the atomic unit of work and its labelled variant

use crate::error::{TaskError, ValidationError};
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Future produced by invoking a task
pub type TaskFuture = BoxFuture<'static, Result<(), TaskError>>;

type TaskFn = dyn Fn() -> TaskFuture + Send + Sync;

/// What a task was built as. Set at construction, never inferred from names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Leaf,
    Series,
    Parallel,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf => write!(f, "leaf"),
            Self::Series => write!(f, "series"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

/// A zero-argument asynchronous unit of work.
///
/// Cloning is cheap and shares the underlying function. Invoking a task builds a
/// fresh future each time, so the same task can run any number of times.
#[derive(Clone)]
pub struct Task {
    kind: TaskKind,
    name: Option<String>,
    func: Arc<TaskFn>,
}

impl Task {
    /// Create an anonymous leaf task
    pub fn new<F, Fut, E>(func: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<TaskError> + 'static,
    {
        Self::with_kind(TaskKind::Leaf, move || {
            let fut = func();
            async move { fut.await.map_err(|err| -> TaskError { err.into() }) }
        })
    }

    /// Create a leaf task with an inherent name
    pub fn named<F, Fut, E>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<TaskError> + 'static,
    {
        Self::new(func).with_name(name)
    }

    pub(crate) fn with_kind<F, Fut>(kind: TaskKind, func: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self {
            kind,
            name: None,
            func: Arc::new(move || -> TaskFuture { Box::pin(func()) }),
        }
    }

    /// Give the task an inherent name, used as its label unless a
    /// [`NamedTask`] overrides it. Works for groups too.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = if name.is_empty() { None } else { Some(name) };
        self
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Start the task. Nothing runs until the returned future is polled.
    pub fn invoke(&self) -> TaskFuture {
        (self.func)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A task paired with a label that overrides automatic naming
#[derive(Debug, Clone)]
pub struct NamedTask {
    label: String,
    task: Task,
}

impl NamedTask {
    /// Pair `label` with `task`. The label must contain something other than whitespace.
    pub fn new(label: impl Into<String>, task: Task) -> Result<Self, ValidationError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(ValidationError::EmptyLabel(label));
        }
        Ok(Self { label, task })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn task(&self) -> &Task {
        &self.task
    }
}

/// Input accepted by the combinators and by [`Engine::run`](super::Engine::run)
#[derive(Debug, Clone)]
pub enum TaskOrNamedTask {
    Task(Task),
    Named(NamedTask),
}

impl TaskOrNamedTask {
    pub fn task(&self) -> &Task {
        match self {
            Self::Task(task) => task,
            Self::Named(named) => named.task(),
        }
    }
}

impl From<Task> for TaskOrNamedTask {
    fn from(task: Task) -> Self {
        Self::Task(task)
    }
}

impl From<NamedTask> for TaskOrNamedTask {
    fn from(named: NamedTask) -> Self {
        Self::Named(named)
    }
}
