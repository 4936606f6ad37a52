//! Error types for component serialization.

use std::fmt;

use schema::ComponentKind;
use world::EntityId;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding component payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Bitstream error.
    Bitstream(bitstream::BitError),

    /// A decode limit was exceeded.
    LimitsExceeded {
        kind: wire::LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Unknown body-shape tag in a construction payload.
    UnknownShapeTag { tag: u8 },

    /// A string field was not valid UTF-8.
    InvalidString,

    /// A required component was missing while encoding.
    MissingComponent {
        entity: EntityId,
        kind: ComponentKind,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bitstream(err) => write!(f, "bitstream error: {err}"),
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::UnknownShapeTag { tag } => write!(f, "unknown body shape tag: {tag}"),
            Self::InvalidString => write!(f, "string field is not valid UTF-8"),
            Self::MissingComponent { entity, kind } => {
                write!(
                    f,
                    "entity {} has no {} component to encode",
                    entity.raw(),
                    kind.name()
                )
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bitstream(err) => Some(err),
            _ => None,
        }
    }
}

impl From<bitstream::BitError> for CodecError {
    fn from(err: bitstream::BitError) -> Self {
        Self::Bitstream(err)
    }
}
