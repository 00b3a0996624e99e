use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RepoError>;

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("repository is empty, can't publish")]
    EmptyRepository,
    #[error("unable to figure out list of architectures, please supply explicit list")]
    NoArchitectures,
    #[error("package {0} not found in package collection")]
    UnresolvedReference(String),
    #[error("package {0} conflicts with an existing package of the same key")]
    Conflict(String),
    #[error("unable to collect checksums for {path}: {source}")]
    Checksum {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to sign {path}: {reason}")]
    Signing { path: PathBuf, reason: String },
    #[error("{0} matching not implemented yet")]
    NotImplemented(&'static str),
    #[error("malformed {what}: {input}")]
    Malformed { what: &'static str, input: String },
}

impl RepoError {
    /// Wrap an I/O error with a description of the operation that failed
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        RepoError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn malformed(what: &'static str, input: impl Into<String>) -> Self {
        RepoError::Malformed {
            what,
            input: input.into(),
        }
    }
}
