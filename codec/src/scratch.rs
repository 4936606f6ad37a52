//! Per-kind construction scratch buffers.

use bitstream::BitWriter;
use schema::ComponentKind;

/// Scratch buffers holding staged constructor payloads, one per component
/// kind.
///
/// A set lives for exactly one open-request / close-request cycle: the
/// requester stages constructor arguments into it while the request is
/// open, the close step copies the staged bytes into the outgoing message,
/// and [`clear`](Self::clear) readies the buffers for the next request
/// without releasing their allocations.
#[derive(Debug)]
pub struct ComponentStreamSet {
    streams: [BitWriter; ComponentKind::COUNT],
}

impl ComponentStreamSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            streams: std::array::from_fn(|_| BitWriter::new()),
        }
    }

    /// Borrows the scratch writer for `kind`.
    pub fn stream_mut(&mut self, kind: ComponentKind) -> &mut BitWriter {
        &mut self.streams[kind.index()]
    }

    /// Returns `true` if a payload has been staged for `kind`.
    #[must_use]
    pub fn is_staged(&self, kind: ComponentKind) -> bool {
        !self.streams[kind.index()].is_empty()
    }

    /// Returns `true` if nothing has been staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        ComponentKind::ORDER.iter().all(|kind| !self.is_staged(*kind))
    }

    /// Pads and borrows the staged bytes for `kind`.
    pub fn staged_bytes(&mut self, kind: ComponentKind) -> &[u8] {
        self.streams[kind.index()].finish()
    }

    /// Clears every buffer for reuse, keeping allocations.
    pub fn clear(&mut self) {
        for stream in &mut self.streams {
            stream.reset();
        }
    }
}

impl Default for ComponentStreamSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_set_is_empty() {
        let set = ComponentStreamSet::new();
        assert!(set.is_empty());
        for kind in ComponentKind::ORDER {
            assert!(!set.is_staged(kind));
        }
    }

    #[test]
    fn staging_marks_only_that_kind() {
        let mut set = ComponentStreamSet::new();
        set.stream_mut(ComponentKind::RigidBody).write_bit(true);

        assert!(set.is_staged(ComponentKind::RigidBody));
        assert!(!set.is_staged(ComponentKind::Placement));
        assert!(!set.is_empty());
    }

    #[test]
    fn staged_bytes_are_padded() {
        let mut set = ComponentStreamSet::new();
        set.stream_mut(ComponentKind::Placement).write_bit(true);
        assert_eq!(set.staged_bytes(ComponentKind::Placement), &[0b1000_0000]);
    }

    #[test]
    fn clear_resets_every_stream() {
        let mut set = ComponentStreamSet::new();
        for kind in ComponentKind::ORDER {
            set.stream_mut(kind).write_u8(0xFF);
        }
        set.clear();
        assert!(set.is_empty());
    }
}
