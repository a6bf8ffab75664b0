//! Turns a parsed task file into engine tasks.
//!
//! Compilation is eager: every task is built up front, so a bad reference, an empty
//! group or a reference cycle anywhere in the file fails the load before anything runs.

use super::{CommandDef, Step, TaskFile};
use crate::core::{Engine, NamedTask, ShellCommand, Task, TaskOrNamedTask};
use crate::error::{TaskFileError, ValidationError};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// A compiled top-level task
#[derive(Debug, Clone)]
pub struct TaskEntry {
    pub task: Task,
    pub description: Option<String>,
}

/// All top-level tasks of a task file, by name
#[derive(Debug, Clone, Default)]
pub struct TaskSet {
    entries: BTreeMap<String, TaskEntry>,
}

impl TaskSet {
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.entries.get(name).map(|entry| &entry.task)
    }

    pub fn entry(&self, name: &str) -> Option<&TaskEntry> {
        self.entries.get(name)
    }

    /// Task names in alphabetical order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Names containing `pattern`, ignoring case
    pub fn filter<'a>(&'a self, pattern: &str) -> Vec<&'a str> {
        let pattern = pattern.to_lowercase();
        self.names()
            .filter(|name| name.to_lowercase().contains(&pattern))
            .collect()
    }
}

impl TaskFile {
    /// Build every task against `engine`. Commands run in `base_dir` unless they set `cwd`.
    pub fn compile(&self, engine: &Engine, base_dir: &Path) -> Result<TaskSet, TaskFileError> {
        let mut compiler = Compiler {
            file: self,
            engine,
            base_dir,
            built: HashMap::new(),
            stack: Vec::new(),
        };

        let mut entries = BTreeMap::new();
        for (name, step) in &self.tasks {
            let task = compiler.top_level(name)?;
            entries.insert(
                name.clone(),
                TaskEntry {
                    task,
                    description: step.description().map(str::to_string),
                },
            );
        }

        log::debug!("Compiled {} tasks", entries.len());
        Ok(TaskSet { entries })
    }
}

struct Compiler<'a> {
    file: &'a TaskFile,
    engine: &'a Engine,
    base_dir: &'a Path,
    built: HashMap<String, Task>,
    stack: Vec<String>,
}

impl Compiler<'_> {
    /// Build a top-level task once; its identity is its `name:` or its key
    fn top_level(&mut self, name: &str) -> Result<Task, TaskFileError> {
        if let Some(task) = self.built.get(name) {
            return Ok(task.clone());
        }
        if let Some(pos) = self.stack.iter().position(|n| n == name) {
            let mut cycle = self.stack[pos..].to_vec();
            cycle.push(name.to_string());
            return Err(TaskFileError::Cycle(cycle));
        }

        let file = self.file;
        let step = &file.tasks[name];

        self.stack.push(name.to_string());
        let task = match step {
            Step::Text(command) => self.command(name, &CommandDef::shorthand(command)),
            other => self.body(name, other),
        };
        self.stack.pop();

        let identity = match step.name() {
            Some(label) if label.trim().is_empty() => {
                return Err(TaskFileError::Validation {
                    task: name.to_string(),
                    source: ValidationError::EmptyLabel(label.to_string()),
                })
            }
            Some(label) => label,
            None => name,
        };
        let task = task?.with_name(identity);

        self.built.insert(name.to_string(), task.clone());
        Ok(task)
    }

    /// Build a list item; `owner` is the top-level task it belongs to
    fn step(&mut self, owner: &str, step: &Step) -> Result<TaskOrNamedTask, TaskFileError> {
        if let Step::Text(reference) = step {
            if !self.file.tasks.contains_key(reference) {
                return Err(TaskFileError::UnknownTask {
                    name: reference.clone(),
                    referenced_by: owner.to_string(),
                });
            }
            return Ok(self.top_level(reference)?.into());
        }

        let task = self.body(owner, step)?;
        match step.name() {
            Some(label) => NamedTask::new(label, task)
                .map(Into::into)
                .map_err(|source| TaskFileError::Validation {
                    task: owner.to_string(),
                    source,
                }),
            None => Ok(task.into()),
        }
    }

    fn body(&mut self, owner: &str, step: &Step) -> Result<Task, TaskFileError> {
        match step {
            Step::Text(_) => Ok(self.step(owner, step)?.task().clone()),
            Step::Command(def) => self.command(owner, def),
            Step::Series(def) => {
                let children = self.children(owner, &def.series)?;
                self.engine.series(children).map_err(|source| TaskFileError::Validation {
                    task: owner.to_string(),
                    source,
                })
            }
            Step::Parallel(def) => {
                let children = self.children(owner, &def.parallel)?;
                self.engine.parallel(children).map_err(|source| TaskFileError::Validation {
                    task: owner.to_string(),
                    source,
                })
            }
        }
    }

    fn children(&mut self, owner: &str, steps: &[Step]) -> Result<Vec<TaskOrNamedTask>, TaskFileError> {
        steps.iter().map(|step| self.step(owner, step)).collect()
    }

    fn command(&self, owner: &str, def: &CommandDef) -> Result<Task, TaskFileError> {
        if def.run.trim().is_empty() {
            return Err(TaskFileError::EmptyCommand(owner.to_string()));
        }

        let cwd: PathBuf = match &def.cwd {
            Some(cwd) => self.base_dir.join(cwd),
            None => self.base_dir.to_path_buf(),
        };
        let command = ShellCommand {
            command: def.run.clone(),
            cwd: Some(cwd),
            env: def.env.clone(),
        };

        Ok(command.into_task())
    }
}

impl CommandDef {
    fn shorthand(command: &str) -> Self {
        Self {
            run: command.to_string(),
            name: None,
            description: None,
            cwd: None,
            env: BTreeMap::new(),
        }
    }
}
