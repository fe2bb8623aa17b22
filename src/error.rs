/// Error type
#[derive(Debug)]
pub enum Error {
    /// An IO error.
    Io(std::io::Error),

    /// Error in storage engine.
    Storage(fjall::Error),

    /// A request parameter was missing or malformed.
    InvalidArgument {
        /// Name of the offending parameter
        param: &'static str,

        /// Description of what was wrong with it
        reason: String,
    },

    /// The end of the requested time window lies before its start.
    InvalidRange {
        /// Requested start time
        start: i64,

        /// Requested end time
        end: i64,
    },

    /// A reduction method is not defined for the given values.
    Domain {
        /// Name of the reduction method
        method: &'static str,

        /// Description of the offending input
        reason: &'static str,
    },

    /// The tag does not exist (or is deactivated).
    NotFound {
        /// The unknown tag id
        tag_id: String,
    },

    /// The request was cancelled or timed out before it completed.
    Cancelled,

    /// A stored record could not be decoded.
    Corrupt(&'static str),
}

impl Error {
    pub(crate) fn invalid_argument(param: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            param,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(tag_id: &str) -> Self {
        Self::NotFound {
            tag_id: tag_id.to_owned(),
        }
    }
}

impl From<fjall::Error> for Error {
    fn from(value: fjall::Error) -> Self {
        Self::Storage(value)
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(e) => {
                write!(f, "{e}")
            }
            Self::Io(e) => {
                write!(f, "{e}")
            }
            Self::InvalidArgument { param, reason } => {
                write!(f, "InvalidArgument: {param}: {reason}")
            }
            Self::InvalidRange { start, end } => {
                write!(f, "InvalidRange: end {end} is before start {start}")
            }
            Self::Domain { method, reason } => {
                write!(f, "DomainError: {method}: {reason}")
            }
            Self::NotFound { tag_id } => {
                write!(f, "NotFound: tag {tag_id:?}")
            }
            Self::Cancelled => {
                write!(f, "Cancelled")
            }
            Self::Corrupt(what) => {
                write!(f, "Corrupt: {what}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Storage(e) => Some(e),
            _ => None,
        }
    }
}

/// Result helper type
pub type Result<T> = std::result::Result<T, Error>;
