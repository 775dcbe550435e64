//! Identity lookup through an external cloud CLI.

use std::process::Command;

/// Outcome of asking the credential provider who the caller is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Command ran and exited successfully; stdout as text.
    Output(String),
    /// Command could not be spawned or exited non-zero.
    Failed { command: String, reason: String },
}

/// Something that can report the caller's identity.
pub trait IdentitySource {
    fn lookup(&self) -> Lookup;
}

/// Runs a program with fixed arguments and captures its stdout.
#[derive(Debug, Clone)]
pub struct CommandSource {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSource {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a command line such as `["aws", "sts", ...]`.
    /// Returns None for an empty command line.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    /// Command line as it would be typed, for log messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl IdentitySource for CommandSource {
    fn lookup(&self) -> Lookup {
        let output = match Command::new(&self.program).args(&self.args).output() {
            Ok(o) => o,
            Err(e) => {
                return Lookup::Failed {
                    command: self.display(),
                    reason: e.to_string(),
                };
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Lookup::Failed {
                command: self.display(),
                reason: format!("{}: {}", output.status, stderr.trim()),
            };
        }

        Lookup::Output(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
