use std::fmt;

/// Machine-readable error codes for integration-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    SnapshotParseError,
    ConfigParseError,
    MissingCollection,
    EmptyIdentifier,
    DuplicateIdentifier,
    InvalidFieldPath,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SnapshotParseError => "E1001",
            Self::ConfigParseError => "E1002",
            Self::MissingCollection => "E2001",
            Self::EmptyIdentifier => "E2002",
            Self::DuplicateIdentifier => "E2003",
            Self::InvalidFieldPath => "E2004",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::SnapshotParseError => "Snapshot parse error",
            Self::ConfigParseError => "Config file parse error",
            Self::MissingCollection => "Required collection missing from snapshot",
            Self::EmptyIdentifier => "Indicator record has an empty identifier",
            Self::DuplicateIdentifier => "Duplicate indicator identifier",
            Self::InvalidFieldPath => "Invalid edge field path",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::SnapshotParseError => {
                Some("The snapshot must be a JSON object with `records` and `edges` arrays.")
            }
            Self::ConfigParseError => Some("Fix syntax in the iocgraph config.toml and retry."),
            Self::MissingCollection => {
                Some("Pass an empty array instead of null when there is nothing to send.")
            }
            Self::EmptyIdentifier | Self::DuplicateIdentifier => {
                Some("Fix the extraction layer so each record carries a unique, non-empty id.")
            }
            Self::InvalidFieldPath => Some("Field paths are dot-separated names, e.g. `from.node`."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Contract violations detected while building a graph.
///
/// Irregular data (unresolvable edges, cycles, empty input) is never an
/// error; it is routed into diagnostics instead. These variants cover input
/// that falls outside the documented shapes.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("malformed snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("snapshot field `{0}` must be an array, found null or nothing")]
    MissingCollection(&'static str),

    #[error("indicator record at position {position} has an empty id")]
    EmptyIdentifier { position: usize },

    #[error("indicator id '{id}' appears at positions {first} and {second}")]
    DuplicateIdentifier {
        id: String,
        first: usize,
        second: usize,
    },

    #[error("invalid edge field path '{0}'")]
    InvalidFieldPath(String),
}

impl GraphError {
    /// Map this error onto its stable [`ErrorCode`].
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Snapshot(_) => ErrorCode::SnapshotParseError,
            Self::MissingCollection(_) => ErrorCode::MissingCollection,
            Self::EmptyIdentifier { .. } => ErrorCode::EmptyIdentifier,
            Self::DuplicateIdentifier { .. } => ErrorCode::DuplicateIdentifier,
            Self::InvalidFieldPath(_) => ErrorCode::InvalidFieldPath,
        }
    }
}
