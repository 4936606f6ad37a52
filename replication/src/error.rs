//! Error types for the replication session layer.

use std::fmt;

/// Result type for replication operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised while decoding or applying incoming messages.
///
/// The session layer logs these and drops the offending message; nothing
/// here is fatal to the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Bitstream error.
    Bitstream(bitstream::BitError),

    /// Wire framing error.
    Wire(wire::DecodeError),

    /// Component codec error.
    Codec(codec::CodecError),

    /// A message carried data past its advertised end.
    TrailingData { remaining_bits: usize },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bitstream(err) => write!(f, "bitstream error: {err}"),
            Self::Wire(err) => write!(f, "wire error: {err}"),
            Self::Codec(err) => write!(f, "codec error: {err}"),
            Self::TrailingData { remaining_bits } => {
                write!(f, "trailing data after message body: {remaining_bits} bits")
            }
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bitstream(err) => Some(err),
            Self::Wire(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::TrailingData { .. } => None,
        }
    }
}

impl From<bitstream::BitError> for SyncError {
    fn from(err: bitstream::BitError) -> Self {
        Self::Bitstream(err)
    }
}

impl From<wire::DecodeError> for SyncError {
    fn from(err: wire::DecodeError) -> Self {
        Self::Wire(err)
    }
}

impl From<codec::CodecError> for SyncError {
    fn from(err: codec::CodecError) -> Self {
        Self::Codec(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_trailing() {
        let err = SyncError::TrailingData { remaining_bits: 12 };
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn error_conversions_keep_source() {
        let err: SyncError = bitstream::BitError::InvalidVarint.into();
        assert!(std::error::Error::source(&err).is_some());

        let err: SyncError = wire::DecodeError::UnknownMessageKind { byte: 7 }.into();
        assert!(matches!(err, SyncError::Wire(_)));

        let err: SyncError = codec::CodecError::InvalidString.into();
        assert!(matches!(err, SyncError::Codec(_)));
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<SyncError>();
    }
}
