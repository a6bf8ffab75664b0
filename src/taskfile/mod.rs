//! Task file - locates and parses `swigfile.yml`
//!
//! ```yaml
//! tasks:
//!   clean: rm -rf dist
//!   build:
//!     description: Build everything
//!     series:
//!       - clean
//!       - parallel: [buildEsm, buildCjs]
//!       - name: version
//!         run: ./scripts/version.sh
//! ```
//!
//! A top-level string is a shell command. Inside `series`/`parallel` lists a string
//! refers to another top-level task by name.

mod compile;

pub use compile::{TaskEntry, TaskSet};

use crate::error::TaskFileError;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Candidate file names, in lookup order
pub const TASK_FILE_NAMES: &[&str] = &["swigfile.yml", "swigfile.yaml", ".swig/swigfile.yml"];

/// Parsed task file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskFile {
    #[serde(default)]
    pub tasks: BTreeMap<String, Step>,
}

/// One task definition, at the top level or inside a group
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// Command shorthand at the top level, task reference inside a group
    Text(String),
    Series(SeriesDef),
    Parallel(ParallelDef),
    Command(CommandDef),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeriesDef {
    pub series: Vec<Step>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParallelDef {
    pub parallel: Vec<Step>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandDef {
    pub run: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Relative paths are resolved against the task file's directory
    pub cwd: Option<PathBuf>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Step {
    /// Explicit label given with `name:`
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Series(def) => def.name.as_deref(),
            Self::Parallel(def) => def.name.as_deref(),
            Self::Command(def) => def.name.as_deref(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Series(def) => def.description.as_deref(),
            Self::Parallel(def) => def.description.as_deref(),
            Self::Command(def) => def.description.as_deref(),
        }
    }
}

impl TaskFile {
    /// Load a task file from YAML
    pub fn from_file(path: &Path) -> Result<Self, TaskFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| TaskFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse YAML content and check task names
    pub fn parse(content: &str) -> Result<Self, TaskFileError> {
        let file: TaskFile = serde_yaml::from_str(content)?;
        if let Some(bad) = file.tasks.keys().find(|name| !is_valid_task_name(name)) {
            return Err(TaskFileError::InvalidName(bad.clone()));
        }
        Ok(file)
    }

    /// First existing candidate file in `dir`
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        TASK_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Pick the task file: an explicit path wins, otherwise discovery in `dir`
    pub fn locate(explicit: Option<&Path>, dir: &Path) -> Result<PathBuf, TaskFileError> {
        if let Some(path) = explicit {
            let path = dir.join(path);
            if path.is_file() {
                return Ok(path);
            }
            return Err(TaskFileError::NotFound {
                candidates: vec![path.display().to_string()],
            });
        }

        Self::discover(dir).ok_or_else(|| TaskFileError::NotFound {
            candidates: TASK_FILE_NAMES.iter().map(|s| s.to_string()).collect(),
        })
    }
}

/// Task names are restricted to letters, digits and underscores
pub fn is_valid_task_name(name: &str) -> bool {
    static TASK_NAME_RE: OnceLock<Regex> = OnceLock::new();
    TASK_NAME_RE
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("task name pattern is valid"))
        .is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
tasks:
  clean: rm -rf dist
  buildEsm:
    run: tsc -p tsconfig.esm.json
    cwd: packages/esm
    env:
      NODE_ENV: production
  build:
    description: Build everything
    series:
      - clean
      - parallel: [buildEsm, clean]
      - name: version
        run: ./version.sh
"#;

    #[test]
    fn test_parse_task_file() {
        let file = TaskFile::parse(SAMPLE).unwrap();
        assert_eq!(file.tasks.keys().collect::<Vec<_>>(), vec!["build", "buildEsm", "clean"]);

        assert_eq!(file.tasks["clean"], Step::Text("rm -rf dist".into()));

        let Step::Command(esm) = &file.tasks["buildEsm"] else {
            panic!("buildEsm should be a command");
        };
        assert_eq!(esm.cwd.as_deref(), Some(Path::new("packages/esm")));
        assert_eq!(esm.env["NODE_ENV"], "production");

        let Step::Series(build) = &file.tasks["build"] else {
            panic!("build should be a series");
        };
        assert_eq!(file.tasks["build"].description(), Some("Build everything"));
        assert_eq!(build.series.len(), 3);
        assert_eq!(build.series[0], Step::Text("clean".into()));
        assert!(matches!(&build.series[1], Step::Parallel(p) if p.parallel.len() == 2));
        assert_eq!(build.series[2].name(), Some("version"));
    }

    #[test]
    fn test_invalid_task_name() {
        let err = TaskFile::parse("tasks:\n  build-all: make\n").unwrap_err();
        assert!(matches!(err, TaskFileError::InvalidName(name) if name == "build-all"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(TaskFile::parse("tasks:\n  a:\n    run: ls\n    retries: 3\n").is_err());
        assert!(TaskFile::parse("jobs: {}\n").is_err());
    }

    #[test]
    fn test_task_name_rule() {
        assert!(is_valid_task_name("build_2"));
        assert!(!is_valid_task_name(""));
        assert!(!is_valid_task_name("rm -rf"));
        assert!(!is_valid_task_name("a.b"));
    }

    #[test]
    fn test_discover_and_locate() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TaskFile::discover(dir.path()).is_none());
        assert!(matches!(
            TaskFile::locate(None, dir.path()),
            Err(TaskFileError::NotFound { candidates }) if candidates.len() == TASK_FILE_NAMES.len()
        ));

        std::fs::write(dir.path().join("swigfile.yaml"), "tasks: {}\n").unwrap();
        assert_eq!(
            TaskFile::discover(dir.path()),
            Some(dir.path().join("swigfile.yaml"))
        );

        std::fs::write(dir.path().join("swigfile.yml"), "tasks: {}\n").unwrap();
        assert_eq!(
            TaskFile::locate(None, dir.path()).unwrap(),
            dir.path().join("swigfile.yml")
        );

        std::fs::write(dir.path().join("other.yml"), "tasks: {}\n").unwrap();
        assert_eq!(
            TaskFile::locate(Some(Path::new("other.yml")), dir.path()).unwrap(),
            dir.path().join("other.yml")
        );
        assert!(TaskFile::locate(Some(Path::new("missing.yml")), dir.path()).is_err());
    }
}
