//! Property tests: every encoded value decodes to itself.

use bitstream::{bits_for_range, BitReader, BitWriter};
use proptest::prelude::*;

proptest! {
    #[test]
    fn bits_round_trip(value: u64, width in 1u32..=64) {
        let masked = if width == 64 { value } else { value & ((1u64 << width) - 1) };
        let mut writer = BitWriter::new();
        writer.write_bits(masked, width).unwrap();
        let bytes = writer.finish().to_vec();

        let mut reader = BitReader::new(&bytes);
        prop_assert_eq!(reader.read_bits(width).unwrap(), masked);
    }

    #[test]
    fn ranged_round_trip(lo in 0u64..1_000_000, span in 0u64..1_000_000, offset in 0u64..1_000_000) {
        let hi = lo + span;
        let value = lo + offset % (span + 1);

        let mut writer = BitWriter::new();
        writer.write_ranged(value, lo, hi).unwrap();
        prop_assert_eq!(writer.bits_written(), bits_for_range(lo, hi) as usize);
        let bytes = writer.finish().to_vec();

        let mut reader = BitReader::new(&bytes);
        prop_assert_eq!(reader.read_ranged(lo, hi).unwrap(), value);
    }

    #[test]
    fn f32_round_trip_is_exact(value: f32) {
        let mut writer = BitWriter::new();
        writer.write_f32(value);
        let bytes = writer.finish().to_vec();

        let mut reader = BitReader::new(&bytes);
        let decoded = reader.read_f32().unwrap();
        prop_assert_eq!(decoded.to_bits(), value.to_bits());
    }

    #[test]
    fn varu32_round_trip(value: u32) {
        let mut writer = BitWriter::new();
        writer.write_varu32(value).unwrap();
        let bytes = writer.finish().to_vec();

        let mut reader = BitReader::new(&bytes);
        prop_assert_eq!(reader.read_varu32().unwrap(), value);
    }

    #[test]
    fn optional_round_trip(value in proptest::option::of(0u64..u64::from(u32::MAX))) {
        let mut writer = BitWriter::new();
        writer.write_optional_bits(value, 32).unwrap();
        let bytes = writer.finish().to_vec();

        let mut reader = BitReader::new(&bytes);
        prop_assert_eq!(reader.read_optional_bits(32).unwrap(), value);
    }

    #[test]
    fn bool_sequence_round_trip(values in proptest::collection::vec(any::<bool>(), 0..256)) {
        let mut writer = BitWriter::new();
        for &bit in &values {
            writer.write_bit(bit);
        }
        let bytes = writer.finish().to_vec();

        let mut reader = BitReader::new(&bytes);
        for &bit in &values {
            prop_assert_eq!(reader.read_bit().unwrap(), bit);
        }
    }
}
