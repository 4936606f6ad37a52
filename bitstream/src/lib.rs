//! Bit-level wire codec primitives for the esync replication layer.
//!
//! Every layer of the protocol is built on these two types:
//!
//! - [`BitWriter`] - growable, reusable MSB-first bit packer
//! - [`BitReader`] - bounds-checked, zero-copy bit unpacker
//!
//! Beyond fixed-width fields and bit-packed booleans, the codec provides
//! range-compressed integers (a value known to lie in `[lo, hi]` costs
//! `ceil(log2(hi - lo + 1))` bits) and optional fields guarded by a single
//! presence bit, which the component serializer uses pervasively.
//!
//! # Design Principles
//!
//! - **Symmetric by construction** - every write has exactly one read shape.
//! - **No silent truncation** - reading past the end is an error the caller
//!   must handle.
//! - **Reusable buffers** - writers are reset between messages, not
//!   reallocated.

mod error;
mod reader;
mod writer;

pub use error::{BitError, BitResult};
pub use reader::BitReader;
pub use writer::BitWriter;

/// Returns the number of bits needed to encode any value in `[lo, hi]`.
///
/// Callers must ensure `lo <= hi`; a degenerate range needs zero bits.
#[must_use]
pub const fn bits_for_range(lo: u64, hi: u64) -> u32 {
    let span = hi - lo;
    if span == 0 {
        0
    } else {
        64 - span.leading_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_for_range_boolean() {
        assert_eq!(bits_for_range(0, 1), 1);
    }

    #[test]
    fn bits_for_range_degenerate() {
        assert_eq!(bits_for_range(7, 7), 0);
    }

    #[test]
    fn bits_for_range_rounds_up() {
        // 3 values -> 2 bits, 4 values -> 2 bits, 5 values -> 3 bits.
        assert_eq!(bits_for_range(0, 2), 2);
        assert_eq!(bits_for_range(0, 3), 2);
        assert_eq!(bits_for_range(0, 4), 3);
    }

    #[test]
    fn bits_for_range_offset_invariant() {
        assert_eq!(bits_for_range(0, 15), bits_for_range(100, 115));
    }

    #[test]
    fn bits_for_range_full_width() {
        assert_eq!(bits_for_range(0, u64::MAX), 64);
    }

    #[test]
    fn public_api_exports() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        let bytes = writer.finish().to_vec();
        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
        let _: BitResult<()> = Ok(());
    }
}
