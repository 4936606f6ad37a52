//! Deterministic layout hashing.

use crate::{BodyShape, ComponentKind};

/// Version of the wire layout described by this crate.
///
/// Bump whenever component kinds, their order, or any payload layout
/// changes.
pub const LAYOUT_VERSION: u16 = 1;

/// Computes the deterministic hash of the replication layout.
///
/// Peers compiled against different layouts produce different hashes; the
/// session layer can compare hashes at connection time to reject
/// incompatible builds before any payload is misinterpreted.
#[must_use]
pub fn layout_hash() -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&LAYOUT_VERSION.to_le_bytes());

    for kind in ComponentKind::ORDER {
        hasher.update(&[kind.index() as u8]);
        hasher.update(kind.name().as_bytes());
    }

    for tag in 0..BodyShape::VARIANT_COUNT {
        hasher.update(&[tag]);
        hasher.update(BodyShape::variant_name(tag).as_bytes());
    }

    let hash = hasher.finalize();
    u64::from_le_bytes(hash.as_bytes()[0..8].try_into().expect("hash is 32 bytes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_hash_is_deterministic() {
        assert_eq!(layout_hash(), layout_hash());
    }

    #[test]
    fn layout_hash_is_non_zero() {
        assert_ne!(layout_hash(), 0);
    }
}
