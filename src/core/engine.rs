//! Execution engine - `series` and `parallel` composition
//!
//! Both combinators are pure constructors: they only capture their children and
//! return a new [`Task`]. Labels are resolved and events emitted when that task is
//! invoked. `parallel` polls its children together on the current task with
//! `join_all`, so concurrency is cooperative and nothing is spawned.

use super::naming::{LabeledTask, Namer};
use super::reporter::{Reporter, SilentReporter, TaskEvent};
use super::task::{Task, TaskKind, TaskOrNamedTask};
use crate::error::{TaskError, ValidationError};
use chrono::Local;
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Composes and runs tasks. Owns the group naming counters and the reporter.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    namer: Namer,
    reporter: Box<dyn Reporter>,
}

impl Engine {
    /// Create an engine that reports every invocation to `reporter`
    pub fn new(reporter: impl Reporter + 'static) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                namer: Namer::new(),
                reporter: Box::new(reporter),
            }),
        }
    }

    /// Engine that reports nothing
    pub fn silent() -> Self {
        Self::new(SilentReporter)
    }

    /// Engine whose events are delivered on the returned channel
    pub fn with_channel() -> (Self, mpsc::UnboundedReceiver<TaskEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn namer(&self) -> &Namer {
        &self.inner.namer
    }

    /// Run `tasks` one after another.
    ///
    /// The returned task stops at the first failing child and rejects with that
    /// child's error unchanged; later children never start.
    pub fn series<I>(&self, tasks: I) -> Result<Task, ValidationError>
    where
        I: IntoIterator,
        I::Item: Into<TaskOrNamedTask>,
    {
        let children = collect_children(TaskKind::Series, tasks)?;
        let engine = self.clone();

        Ok(Task::with_kind(TaskKind::Series, move || {
            let engine = engine.clone();
            let children = children.clone();
            async move {
                for child in children.iter() {
                    let labeled = engine.inner.namer.resolve(child);
                    engine.run_labeled(labeled).await?;
                }
                Ok::<(), TaskError>(())
            }
        }))
    }

    /// Run `tasks` concurrently.
    ///
    /// Every child runs to completion whatever its siblings do. If any failed, the
    /// returned task rejects with [`TaskError::Aggregate`] holding all failures in
    /// input order, even when there is only one.
    pub fn parallel<I>(&self, tasks: I) -> Result<Task, ValidationError>
    where
        I: IntoIterator,
        I::Item: Into<TaskOrNamedTask>,
    {
        let children = collect_children(TaskKind::Parallel, tasks)?;
        let engine = self.clone();

        Ok(Task::with_kind(TaskKind::Parallel, move || {
            let engine = engine.clone();
            let children = children.clone();
            async move {
                // Labels for the whole group are settled before anything starts
                let labeled: Vec<LabeledTask> = children
                    .iter()
                    .map(|child| engine.inner.namer.resolve(child))
                    .collect();

                let outcomes = join_all(labeled.into_iter().map(|l| engine.run_labeled(l))).await;

                let failures: Vec<TaskError> = outcomes.into_iter().filter_map(Result::err).collect();
                if failures.is_empty() {
                    Ok(())
                } else {
                    log::debug!("{} of {} parallel tasks failed", failures.len(), children.len());
                    Err(TaskError::Aggregate(failures))
                }
            }
        }))
    }

    /// Invoke a root task through the reporter
    pub async fn run(&self, task: impl Into<TaskOrNamedTask>) -> Result<(), TaskError> {
        let labeled = self.inner.namer.resolve(&task.into());
        self.run_labeled(labeled).await
    }

    async fn run_labeled(&self, labeled: LabeledTask) -> Result<(), TaskError> {
        let LabeledTask { label, task } = labeled;
        let reporter = &self.inner.reporter;

        let clock = Instant::now();
        reporter.report(TaskEvent::Started {
            label: label.clone(),
            at: Local::now(),
        });

        match task.invoke().await {
            Ok(()) => {
                reporter.report(TaskEvent::Finished {
                    label,
                    at: Local::now(),
                    elapsed: clock.elapsed(),
                });
                Ok(())
            }
            Err(err) => {
                log::debug!("task {} failed: {}", label, err);
                reporter.report(TaskEvent::Failed {
                    label,
                    at: Local::now(),
                    elapsed: clock.elapsed(),
                });
                Err(err)
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::silent()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("namer", &self.inner.namer)
            .finish_non_exhaustive()
    }
}

fn collect_children<I>(kind: TaskKind, tasks: I) -> Result<Arc<[TaskOrNamedTask]>, ValidationError>
where
    I: IntoIterator,
    I::Item: Into<TaskOrNamedTask>,
{
    let children: Vec<TaskOrNamedTask> = tasks.into_iter().map(Into::into).collect();
    if children.is_empty() {
        return Err(ValidationError::EmptyGroup { kind });
    }
    Ok(children.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn ok_task(name: &str) -> Task {
        Task::named(name, || async { Ok::<_, TaskError>(()) })
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<TaskEvent>) -> Vec<TaskEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_empty_groups_are_rejected() {
        let engine = Engine::silent();
        let none: Vec<Task> = Vec::new();

        assert_eq!(
            engine.series(none.clone()).unwrap_err(),
            ValidationError::EmptyGroup { kind: TaskKind::Series }
        );
        assert_eq!(
            engine.parallel(none).unwrap_err(),
            ValidationError::EmptyGroup { kind: TaskKind::Parallel }
        );
    }

    #[test]
    fn test_groups_carry_their_kind() {
        let engine = Engine::silent();
        assert_eq!(engine.series([ok_task("a")]).unwrap().kind(), TaskKind::Series);
        assert_eq!(engine.parallel([ok_task("a")]).unwrap().kind(), TaskKind::Parallel);
    }

    #[tokio::test]
    async fn test_run_reports_root_and_children() {
        let (engine, mut rx) = Engine::with_channel();
        let build = engine.series([ok_task("a"), ok_task("b")]).unwrap().with_name("build");

        assert_ok!(engine.run(build).await);

        let lines: Vec<(String, bool)> = drain(&mut rx)
            .iter()
            .map(|e| (e.label().to_string(), e.is_started()))
            .collect();
        assert_eq!(
            lines,
            vec![
                ("build".to_string(), true),
                ("a".to_string(), true),
                ("a".to_string(), false),
                ("b".to_string(), true),
                ("b".to_string(), false),
                ("build".to_string(), false),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_task_gets_no_finished_event() {
        let (engine, mut rx) = Engine::with_channel();
        let broken = Task::named("broken", || async { Err::<(), _>(TaskError::msg("nope")) });

        let err = assert_err!(engine.run(broken).await);
        assert_eq!(err.to_string(), "nope");

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(events[0].is_started());
        assert!(events[1].is_failed());
        assert!(!events.iter().any(TaskEvent::is_finished));
    }
}
