//! External command lines and the outcome of mutating calls.

use std::fmt;

/// A program plus its arguments, rendered shell-quoted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    #[must_use]
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_owned(),
            args: args.iter().map(|a| (*a).to_owned()).collect(),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        f.write_str(&shell_words::join(words))
    }
}

/// Outcome of a mutating cloud call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The command ran and exited zero.
    Executed,
    /// Dry-run mode: the command was not executed.
    DryRun(CommandLine),
}

impl Applied {
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun(_))
    }
}
