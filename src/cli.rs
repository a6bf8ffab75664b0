//! Command line surface - argument parsing and command resolution

use crate::style::gray;
use crate::taskfile::is_valid_task_name;
use crate::Result;
use clap::Parser;
use std::path::PathBuf;

/// Command line arguments
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "swig",
    version,
    about = "Run tasks composed in series and parallel",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Task to run, or one of: list, filter, help, version
    pub target: Option<String>,

    /// Further arguments (the pattern for `filter`)
    pub args: Vec<String>,

    /// Task file to use instead of looking for swigfile.yml
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// List available tasks
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    /// List tasks whose names contain PATTERN
    #[arg(short = 'f', long = "filter", value_name = "PATTERN")]
    pub filter: Option<Option<String>>,

    /// Show help message
    #[arg(short = 'h', long = "help")]
    pub help: bool,

    /// Print version number
    #[arg(short = 'v', short_alias = 'V', long = "version")]
    pub version: bool,
}

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    List,
    Filter(Option<String>),
    Help,
    Version,
    Run(String),
}

impl Invocation {
    /// Built-in commands as opposed to task names
    pub fn is_command(&self) -> bool {
        !matches!(self, Self::Run(_))
    }

    /// Text shown in the start banner
    pub fn value(&self) -> &str {
        match self {
            Self::List => "list",
            Self::Filter(_) => "filter",
            Self::Help => "help",
            Self::Version => "version",
            Self::Run(name) => name,
        }
    }
}

pub struct CommandDescriptor {
    pub names: &'static [&'static str],
    pub description: &'static str,
    pub example: &'static str,
}

pub const COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor {
        names: &["<taskName>"],
        description: "Run a task defined in your swigfile",
        example: "swig taskName",
    },
    CommandDescriptor {
        names: &["list", "ls", "l"],
        description: "List available tasks (default)",
        example: "swig list",
    },
    CommandDescriptor {
        names: &["help", "h", "-h", "--help"],
        description: "Show help message",
        example: "swig help",
    },
    CommandDescriptor {
        names: &["version", "v", "-v", "--version"],
        description: "Print version number",
        example: "swig version",
    },
    CommandDescriptor {
        names: &["filter", "f", "-f", "--filter"],
        description: "Filter and list tasks by name",
        example: "swig filter pattern",
    },
];

impl Cli {
    /// Resolve the target into a built-in command or a task name
    pub fn invocation(&self) -> Result<Invocation> {
        if self.help {
            return Ok(Invocation::Help);
        }
        if self.version {
            return Ok(Invocation::Version);
        }
        if let Some(pattern) = &self.filter {
            let pattern = pattern.clone().or_else(|| self.target.clone());
            return Ok(Invocation::Filter(pattern));
        }
        if self.list {
            return Ok(Invocation::List);
        }
        let Some(target) = self.target.as_deref() else {
            return Ok(Invocation::List);
        };

        let invocation = match target.to_lowercase().as_str() {
            "list" | "ls" | "l" => Invocation::List,
            "help" | "h" => Invocation::Help,
            "version" | "v" => Invocation::Version,
            "filter" | "f" => Invocation::Filter(self.args.first().cloned()),
            _ => {
                if !is_valid_task_name(target) {
                    anyhow::bail!("Invalid task name: {}", target);
                }
                Invocation::Run(target.to_string())
            }
        };
        Ok(invocation)
    }
}

/// Usage text for `swig help`
pub fn help_text() -> String {
    let mut lines = vec![
        "Usage: swig <command or taskName> [options]".to_string(),
        "Commands:".to_string(),
    ];
    for command in COMMANDS {
        lines.push(format!(
            "  {}{}",
            command.names.join(", "),
            gray(&format!(" - {}", command.description))
        ));
        lines.push(format!("    {}", gray(command.example)));
    }
    lines.push("Options:".to_string());
    lines.push(format!("  --file <PATH>{}", gray(" - Use a specific task file")));
    lines.join("\n")
}
