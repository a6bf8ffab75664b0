//! Swig - minimal task orchestration
//!
//! Tasks are zero-argument async functions. [`Engine::series`] runs tasks one after
//! another and stops at the first failure; [`Engine::parallel`] runs them concurrently,
//! lets every one finish and reports all failures together. Both return a [`Task`], so
//! groups nest freely.
//!
//! ```no_run
//! use swig::{ConsoleReporter, Engine, Task, TaskError};
//!
//! # async fn demo() -> Result<(), TaskError> {
//! let engine = Engine::new(ConsoleReporter);
//! let lint = Task::named("lint", || async { Ok::<_, TaskError>(()) });
//! let test = Task::named("test", || async { Ok::<_, TaskError>(()) });
//! let build = Task::named("build", || async { Ok::<_, TaskError>(()) });
//!
//! let check = engine.parallel([lint, test]).expect("non-empty group");
//! let ci = engine.series([check, build]).expect("non-empty group");
//! engine.run(ci.with_name("ci")).await
//! # }
//! ```

pub mod app;
pub mod cli;
pub mod core;
pub mod error;
pub mod style;
pub mod taskfile;

// Re-exports
pub use app::App;
pub use self::core::{
    ConsoleReporter, Engine, NamedTask, Reporter, ShellCommand, SilentReporter, Task, TaskEvent, TaskKind,
    TaskOrNamedTask,
};
pub use error::{CommandError, TaskError, TaskFileError, ValidationError};
pub use taskfile::{TaskFile, TaskSet};

/// Result type alias
pub type Result<T> = anyhow::Result<T>;
