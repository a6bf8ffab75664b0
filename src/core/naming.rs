//! Naming resolver - derives the label reported for every task invocation

use super::task::{Task, TaskKind, TaskOrNamedTask};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Label used for leaf tasks with no name
pub const ANONYMOUS_LABEL: &str = "anonymous";

/// A task ready to run, with the label it will be reported under
#[derive(Debug, Clone)]
pub struct LabeledTask {
    pub label: String,
    pub task: Task,
}

/// Label generator for one engine.
///
/// Unnamed groups get `nested_series_<n>` / `nested_parallel_<n>`. Both counters
/// start at 1 and only ever grow for the lifetime of the engine, including across
/// repeated invocations of the same composition.
#[derive(Debug)]
pub struct Namer {
    series: AtomicUsize,
    parallel: AtomicUsize,
}

impl Default for Namer {
    fn default() -> Self {
        Self::new()
    }
}

impl Namer {
    pub fn new() -> Self {
        Self {
            series: AtomicUsize::new(1),
            parallel: AtomicUsize::new(1),
        }
    }

    /// Resolve the label for `input`. Bumps a counter when a synthetic group label is
    /// handed out, and only then.
    pub fn resolve(&self, input: &TaskOrNamedTask) -> LabeledTask {
        match input {
            TaskOrNamedTask::Named(named) => LabeledTask {
                label: named.label().to_string(),
                task: named.task().clone(),
            },
            TaskOrNamedTask::Task(task) => LabeledTask {
                label: self.label_for(task),
                task: task.clone(),
            },
        }
    }

    fn label_for(&self, task: &Task) -> String {
        if let Some(name) = task.name() {
            return name.to_string();
        }
        match task.kind() {
            TaskKind::Series => {
                format!("nested_series_{}", self.series.fetch_add(1, Ordering::Relaxed))
            }
            TaskKind::Parallel => {
                format!("nested_parallel_{}", self.parallel.fetch_add(1, Ordering::Relaxed))
            }
            TaskKind::Leaf => ANONYMOUS_LABEL.to_string(),
        }
    }

    /// Number the next unnamed series group would receive
    pub fn next_series(&self) -> usize {
        self.series.load(Ordering::Relaxed)
    }

    /// Number the next unnamed parallel group would receive
    pub fn next_parallel(&self) -> usize {
        self.parallel.load(Ordering::Relaxed)
    }
}
