use std::fmt;

/// Machine-readable error codes for host-side decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    EmptyInput,
    MissingField,
    InvalidArgument,
    InvariantViolation,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EmptyInput => "E1001",
            Self::MissingField => "E1002",
            Self::InvalidArgument => "E2001",
            Self::InvariantViolation => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::EmptyInput => "No re-share events supplied",
            Self::MissingField => "Record is missing a required field",
            Self::InvalidArgument => "Invalid argument",
            Self::InvariantViolation => "Assembled cascade is not a forest",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::EmptyInput => Some("Supply at least one re-share of the original post."),
            Self::MissingField => {
                Some("Every record needs a user id and a timestamp; re-export the dataset.")
            }
            Self::InvalidArgument => Some(
                "Channels are quote|reply|retweet, strategies are interaction|friendship, weights must be finite and >= 0.",
            ),
            Self::InvariantViolation => Some("Report a bug with the input dataset attached."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised while validating inputs or assembling a cascade.
///
/// All validation happens before inference starts, so a failed call never
/// leaves a partial cascade behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CascadeError {
    /// No re-share events were supplied, so the root cannot be determined.
    #[error("no re-share events supplied; cannot determine the root")]
    EmptyInput,

    /// A record lacks a user id or timestamp.
    #[error("{record} record #{index} is missing `{field}`")]
    MissingField {
        record: &'static str,
        index: usize,
        field: &'static str,
    },

    /// Unknown channel or strategy name, or a malformed weight.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The assembled edge set broke the forest invariants.
    #[error("cascade invariant violated: {0}")]
    InvariantViolation(String),
}

impl CascadeError {
    pub(crate) const fn missing(record: &'static str, index: usize, field: &'static str) -> Self {
        Self::MissingField {
            record,
            index,
            field,
        }
    }

    /// Map this error to its stable [`ErrorCode`].
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyInput => ErrorCode::EmptyInput,
            Self::MissingField { .. } => ErrorCode::MissingField,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::InvariantViolation(_) => ErrorCode::InvariantViolation,
        }
    }
}
