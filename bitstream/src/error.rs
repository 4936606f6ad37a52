//! Error types for bitstream operations.

use std::fmt;

/// Result type for bitstream operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur during bit-level encoding/decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitError {
    /// Attempted to read past the end of the stream.
    EndOfStream {
        /// Number of bits requested.
        requested: usize,
        /// Number of bits available.
        available: usize,
    },

    /// Invalid bit count for the operation.
    InvalidBitCount {
        /// The invalid bit count provided.
        bits: u32,
        /// Maximum allowed bits for this operation.
        max_bits: u32,
    },

    /// Value does not fit in the requested number of bits.
    ValueOutOfRange {
        /// The value that was out of range.
        value: u64,
        /// Number of bits available.
        bits: u32,
    },

    /// Value lies outside a declared `[lo, hi]` range.
    OutOfRange {
        /// The offending value.
        value: u64,
        /// Inclusive lower bound.
        lo: u64,
        /// Inclusive upper bound.
        hi: u64,
    },

    /// A `[lo, hi]` range was declared with `lo > hi`.
    InvalidRange {
        /// Declared lower bound.
        lo: u64,
        /// Declared upper bound.
        hi: u64,
    },

    /// Byte-aligned access attempted at a misaligned bit position.
    Misaligned {
        /// The current bit position.
        bit_position: usize,
    },

    /// Varint encoding exceeded its maximum width.
    InvalidVarint,
}

impl fmt::Display for BitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfStream {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bits but only {available} bits available"
                )
            }
            Self::InvalidBitCount { bits, max_bits } => {
                write!(f, "invalid bit count {bits}, maximum allowed is {max_bits}")
            }
            Self::ValueOutOfRange { value, bits } => {
                write!(f, "value {value} cannot be represented in {bits} bits")
            }
            Self::OutOfRange { value, lo, hi } => {
                write!(f, "value {value} outside declared range [{lo}, {hi}]")
            }
            Self::InvalidRange { lo, hi } => {
                write!(f, "invalid range: lo {lo} greater than hi {hi}")
            }
            Self::Misaligned { bit_position } => {
                write!(f, "byte-aligned access at misaligned bit position {bit_position}")
            }
            Self::InvalidVarint => write!(f, "varint exceeded maximum encoded width"),
        }
    }
}

impl std::error::Error for BitError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_end_of_stream() {
        let err = BitError::EndOfStream {
            requested: 8,
            available: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("8 bits"), "should mention requested bits");
        assert!(msg.contains("3 bits"), "should mention available bits");
    }

    #[test]
    fn error_display_out_of_range() {
        let err = BitError::OutOfRange {
            value: 17,
            lo: 0,
            hi: 15,
        };
        let msg = err.to_string();
        assert!(msg.contains("17"));
        assert!(msg.contains("[0, 15]"));
    }

    #[test]
    fn error_display_invalid_range() {
        let err = BitError::InvalidRange { lo: 10, hi: 2 };
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains('2'));
    }

    #[test]
    fn error_display_misaligned() {
        let err = BitError::Misaligned { bit_position: 13 };
        assert!(err.to_string().contains("13"));
    }

    #[test]
    fn error_equality() {
        let err1 = BitError::EndOfStream {
            requested: 8,
            available: 3,
        };
        let err2 = BitError::EndOfStream {
            requested: 8,
            available: 3,
        };
        let err3 = BitError::InvalidVarint;
        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<BitError>();
    }
}
