//! Core engine - task model, naming, series/parallel execution and reporting

mod command;
mod engine;
mod naming;
mod reporter;
mod task;

pub use command::ShellCommand;
pub use engine::Engine;
pub use naming::{LabeledTask, Namer, ANONYMOUS_LABEL};
pub use reporter::{format_elapsed, format_timestamp, ConsoleReporter, Reporter, SilentReporter, TaskEvent};
pub use task::{NamedTask, Task, TaskFuture, TaskKind, TaskOrNamedTask};
