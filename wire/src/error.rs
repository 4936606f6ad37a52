//! Error types for wire framing.

use std::fmt;

/// Result type for wire framing operations.
pub type WireResult<T> = Result<T, DecodeError>;

/// Errors raised while framing or un-framing messages.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Unknown message kind byte.
    UnknownMessageKind { byte: u8 },

    /// A decode limit was exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Bitstream error.
    Bitstream(bitstream::BitError),
}

/// Specific decode limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    MessageBytes,
    EntityCount,
    ControlEntries,
    StringBytes,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMessageKind { byte } => {
                write!(f, "unknown message kind: {byte}")
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::Bitstream(err) => write!(f, "bitstream error: {err}"),
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MessageBytes => "message bytes",
            Self::EntityCount => "entity count",
            Self::ControlEntries => "control entries",
            Self::StringBytes => "string bytes",
        };
        write!(f, "{name}")
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bitstream(err) => Some(err),
            _ => None,
        }
    }
}

impl From<bitstream::BitError> for DecodeError {
    fn from(err: bitstream::BitError) -> Self {
        Self::Bitstream(err)
    }
}
