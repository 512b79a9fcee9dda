use std::fmt;

/// Exhaustive error vocabulary for the index build/merge/query pipeline.
#[derive(Debug)]
pub enum ErrorKind {
    /// An on-disk record is malformed: short read, length overflow, bad sentinel bit.
    CorruptRecord,
    /// A header declares an unsupported container version.
    VersionMismatch,
    /// The partial container is not marked complete.
    Incomplete,
    /// Underlying filesystem error.
    IoFailure,
    /// A requested term/docid/file is absent. Not itself a hard error at call sites;
    /// callers degrade to an empty result rather than propagate this.
    NotFound,
    /// Scoring weights failed to validate against their sum-to-one constraint.
    ConfigInvalid,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Error {
            kind,
            context: context.into(),
        }
    }

    pub fn corrupt(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::CorruptRecord, context)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::IoFailure,
            context: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
