use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by scanning, installing, and settings operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KitError {
    /// A required file or directory does not exist.
    #[error("{what} not found: {}", path.display())]
    NotFound {
        /// What was being looked up (e.g. "template directory", "skill security/pentest-web").
        what: String,
        /// The path that was checked.
        path: PathBuf,
    },

    /// A document exists but cannot be interpreted.
    #[error("malformed {}: {reason}", path.display())]
    Malformed {
        /// The offending document.
        path: PathBuf,
        /// Parser message or shape violation.
        reason: String,
    },

    /// A component name that would escape its type directory or is otherwise unusable.
    #[error("invalid {kind} name '{name}'")]
    InvalidName {
        /// Kind label (agent, skill, ...).
        kind: String,
        /// The rejected name.
        name: String,
    },

    /// A component type string that is not one of agents, skills, commands, rules.
    #[error("unknown component type: {0}")]
    UnknownKind(String),

    /// Filesystem failure with the operation that caused it.
    #[error("{context}: {source}")]
    Io {
        /// Which component and operation failed.
        context: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl KitError {
    /// Wraps an IO error with a short description of the failed operation.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        KitError::Io {
            context: context.into(),
            source,
        }
    }

    /// Builds a `NotFound` error.
    pub fn not_found(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        KitError::NotFound {
            what: what.into(),
            path: path.into(),
        }
    }

    /// True for the NotFound class (missing catalog, component, or settings file).
    pub fn is_not_found(&self) -> bool {
        matches!(self, KitError::NotFound { .. })
    }
}

/// Result alias for claude-kit library operations.
pub type Result<T> = std::result::Result<T, KitError>;
