use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Broad category of a [`CopyError`], independent of the path it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    TypeMismatch,
    AlreadyExists,
    Io,
    Aggregate,
}

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("source is empty")]
    EmptySource,

    #[error("destination is empty")]
    EmptyDestination,

    #[error("'{}' has no file name", .path.display())]
    NoFileName { path: PathBuf },

    #[error("'{}' does not exist", .path.display())]
    NotFound { path: PathBuf },

    #[error(
        "cannot copy directory '{}' onto file '{}'",
        .path.display(),
        .target.display()
    )]
    DirectoryOntoFile { path: PathBuf, target: PathBuf },

    #[error(
        "cannot overwrite directory '{}' with file '{}'",
        .target.display(),
        .path.display()
    )]
    FileOntoDirectory { path: PathBuf, target: PathBuf },

    #[error(
        "cannot copy '{}' into itself at '{}'",
        .path.display(),
        .target.display()
    )]
    DestinationInsideSource { path: PathBuf, target: PathBuf },

    #[error("'{}' and '{}' are the same file", .path.display(), .target.display())]
    SameFile { path: PathBuf, target: PathBuf },

    #[error("destination '{}' is a file, expected directory", .path.display())]
    BatchTargetNotDirectory { path: PathBuf },

    #[error("destination '{}' already exists", .path.display())]
    AlreadyExists { path: PathBuf },

    #[error("'{}': {cause}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        cause: io::Error,
    },

    #[error("failed copying '{}': {cause}", .path.display())]
    Child {
        path: PathBuf,
        #[source]
        cause: Box<CopyError>,
    },

    #[error("{} of the sources failed:\n{}", .0.len(), join_errors(.0))]
    Batch(Vec<CopyError>),
}

fn join_errors(errors: &[CopyError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

impl CopyError {
    pub fn io(path: impl Into<PathBuf>, cause: io::Error) -> Self {
        CopyError::Io {
            path: path.into(),
            cause,
        }
    }

    pub fn child(path: impl Into<PathBuf>, cause: CopyError) -> Self {
        CopyError::Child {
            path: path.into(),
            cause: Box::new(cause),
        }
    }

    /// Kind of the innermost cause; `Child` wrappers are looked through.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CopyError::EmptySource
            | CopyError::EmptyDestination
            | CopyError::NoFileName { .. }
            | CopyError::DestinationInsideSource { .. }
            | CopyError::SameFile { .. } => ErrorKind::InvalidArgument,
            CopyError::NotFound { .. } => ErrorKind::NotFound,
            CopyError::DirectoryOntoFile { .. }
            | CopyError::FileOntoDirectory { .. }
            | CopyError::BatchTargetNotDirectory { .. } => ErrorKind::TypeMismatch,
            CopyError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            CopyError::Io { .. } => ErrorKind::Io,
            CopyError::Child { cause, .. } => cause.kind(),
            CopyError::Batch(_) => ErrorKind::Aggregate,
        }
    }

    /// Paths from the outermost wrapper down to the failing entry.
    pub fn path_chain(&self) -> Vec<&std::path::Path> {
        let mut chain = Vec::new();
        let mut current = self;
        loop {
            match current {
                CopyError::Child { path, cause } => {
                    chain.push(path.as_path());
                    current = cause.as_ref();
                }
                CopyError::NoFileName { path }
                | CopyError::NotFound { path }
                | CopyError::DirectoryOntoFile { path, .. }
                | CopyError::FileOntoDirectory { path, .. }
                | CopyError::DestinationInsideSource { path, .. }
                | CopyError::SameFile { path, .. }
                | CopyError::BatchTargetNotDirectory { path }
                | CopyError::AlreadyExists { path }
                | CopyError::Io { path, .. } => {
                    if chain.last() != Some(&path.as_path()) {
                        chain.push(path.as_path());
                    }
                    break;
                }
                CopyError::EmptySource | CopyError::EmptyDestination | CopyError::Batch(_) => {
                    break;
                }
            }
        }
        chain
    }
}

pub type CopyResult<T> = Result<T, CopyError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {cause}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        cause: io::Error,
    },

    #[error("failed to parse config file '{}': {cause}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        cause: toml::de::Error,
    },

    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Copy(#[from] CopyError),
}

pub type CliResult<T> = Result<T, CliError>;
