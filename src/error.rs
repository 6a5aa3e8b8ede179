// Error taxonomy for mount and stats operations

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// External command exited non-zero and the caller did not suppress it.
    #[error("command `{command} {}` failed with exit status {status}: {output}", .args.join(" "))]
    Exec {
        command: String,
        args: Vec<String>,
        status: i32,
        output: String,
    },

    /// External command could not be started at all.
    #[error("failed to execute `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' exists but is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{what}: expected at least {needed} fields, got {got}")]
    OutOfRange {
        what: &'static str,
        needed: usize,
        got: usize,
    },
}

impl Error {
    /// True for errors raised by running an external command.
    pub fn is_execution(&self) -> bool {
        matches!(self, Error::Exec { .. } | Error::Spawn { .. })
    }
}
