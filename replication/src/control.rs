//! Per-tick control intent aggregation and fan-out.

use std::collections::BTreeMap;

use bitstream::{BitReader, BitResult, BitWriter};
use glam::Vec2;
use tracing::debug;
use wire::{LimitKind, Limits, MessageKind};

use crate::error::{SyncError, SyncResult};
use crate::transport::{PeerId, SendProfile, Transport};

/// Highest addressable input device id; device ids are range-compressed.
pub const MAX_DEVICE_ID: u8 = 15;

/// The pair of input devices a peer is currently driving with.
///
/// Exactly one pointer-like device and one discrete (button) device are
/// active at a time; both are switchable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlScheme {
    pub pointer_device: u8,
    pub discrete_device: u8,
}

/// One peer's control intent for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlIntent {
    pub pointer_device: u8,
    pub discrete_device: u8,
    /// Pointer movement delta for the tick.
    pub pointer_delta: Vec2,
    /// Pressed-button bitmask of the discrete device.
    pub buttons: u16,
}

impl ControlIntent {
    /// Builds the intent a scheme produces from raw input readings.
    #[must_use]
    pub const fn from_scheme(scheme: ControlScheme, pointer_delta: Vec2, buttons: u16) -> Self {
        Self {
            pointer_device: scheme.pointer_device,
            discrete_device: scheme.discrete_device,
            pointer_delta,
            buttons,
        }
    }
}

pub(crate) fn encode_intent(writer: &mut BitWriter, intent: &ControlIntent) -> BitResult<()> {
    writer.write_ranged(u64::from(intent.pointer_device), 0, u64::from(MAX_DEVICE_ID))?;
    writer.write_ranged(u64::from(intent.discrete_device), 0, u64::from(MAX_DEVICE_ID))?;
    writer.write_f32(intent.pointer_delta.x);
    writer.write_f32(intent.pointer_delta.y);
    writer.write_bits(u64::from(intent.buttons), 16)?;
    Ok(())
}

pub(crate) fn decode_intent(reader: &mut BitReader<'_>) -> BitResult<ControlIntent> {
    let pointer_device = reader.read_ranged(0, u64::from(MAX_DEVICE_ID))? as u8;
    let discrete_device = reader.read_ranged(0, u64::from(MAX_DEVICE_ID))? as u8;
    let x = reader.read_f32()?;
    let y = reader.read_f32()?;
    let buttons = reader.read_bits(16)? as u16;
    Ok(ControlIntent {
        pointer_device,
        discrete_device,
        pointer_delta: Vec2::new(x, y),
        buttons,
    })
}

/// Collects every peer's intent for one tick and redistributes it.
///
/// The server buffers `(sender, serialized intent)` records across the
/// tick, then sends each connected peer a single message concatenating
/// every *other* peer's record; a peer never receives its own intent back.
/// Receivers keep the latest decoded intent per remote peer.
#[derive(Debug, Default)]
pub struct ControlAggregator {
    buffered: BTreeMap<PeerId, Vec<u8>>,
    remote: BTreeMap<PeerId, ControlIntent>,
}

impl ControlAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest known intent per remote peer.
    #[must_use]
    pub fn remote_intents(&self) -> &BTreeMap<PeerId, ControlIntent> {
        &self.remote
    }

    /// Number of records buffered this tick.
    #[must_use]
    pub fn buffered_count(&self) -> usize {
        self.buffered.len()
    }

    /// Buffers one sender's serialized intent for this tick's fan-out.
    ///
    /// The payload is validated by decoding it; the decoded intent also
    /// becomes the locally-visible state for that peer. A second intent
    /// from the same sender within one tick replaces the first.
    pub(crate) fn buffer(&mut self, sender: PeerId, payload: &[u8]) -> SyncResult<()> {
        let mut reader = BitReader::new(payload);
        let intent = decode_intent(&mut reader)?;
        if reader.bits_remaining() >= 8 {
            return Err(SyncError::TrailingData {
                remaining_bits: reader.bits_remaining(),
            });
        }
        self.remote.insert(sender, intent);
        self.buffered.insert(sender, payload.to_vec());
        Ok(())
    }

    /// Sends each connected peer every other peer's buffered record, then
    /// clears the tick buffer.
    pub(crate) fn fan_out(&mut self, writer: &mut BitWriter, net: &mut dyn Transport) {
        if self.buffered.is_empty() {
            return;
        }
        for recipient in net.connected_peers() {
            let entries: Vec<(PeerId, &Vec<u8>)> = self
                .buffered
                .iter()
                .filter(|(sender, _)| **sender != recipient)
                .map(|(sender, payload)| (*sender, payload))
                .collect();
            if entries.is_empty() {
                continue;
            }
            writer.reset();
            wire::write_kind(writer, MessageKind::ControlSync);
            if let Err(err) = write_entries(writer, &entries) {
                debug!(error = %err, "failed to encode control fan-out");
                continue;
            }
            net.send_to(recipient, writer.finish(), SendProfile::request());
        }
        self.buffered.clear();
    }

    /// Applies a fan-out message received from the server.
    pub(crate) fn apply_fan_out(
        &mut self,
        local: PeerId,
        reader: &mut BitReader<'_>,
        limits: &Limits,
    ) -> SyncResult<()> {
        let count = reader.read_varu32()? as usize;
        if count > limits.max_control_entries {
            return Err(SyncError::Wire(wire::DecodeError::LimitsExceeded {
                kind: LimitKind::ControlEntries,
                limit: limits.max_control_entries,
                actual: count,
            }));
        }
        for _ in 0..count {
            let sender = PeerId::new(reader.read_u32_aligned()?);
            let len = reader.read_varu32()? as usize;
            if len > limits.max_message_bytes {
                return Err(SyncError::Wire(wire::DecodeError::LimitsExceeded {
                    kind: LimitKind::MessageBytes,
                    limit: limits.max_message_bytes,
                    actual: len,
                }));
            }
            let payload = reader.read_bytes_aligned(len)?;
            let mut entry_reader = BitReader::new(payload);
            let intent = decode_intent(&mut entry_reader)?;
            if sender == local {
                // The server must never echo our own intent back.
                debug!("ignoring self-echoed control entry");
                continue;
            }
            self.remote.insert(sender, intent);
        }
        if reader.bits_remaining() >= 8 {
            return Err(SyncError::TrailingData {
                remaining_bits: reader.bits_remaining(),
            });
        }
        Ok(())
    }

    /// Forgets a disconnected peer's intent.
    pub fn forget_peer(&mut self, peer: PeerId) {
        self.buffered.remove(&peer);
        self.remote.remove(&peer);
    }
}

fn write_entries(writer: &mut BitWriter, entries: &[(PeerId, &Vec<u8>)]) -> BitResult<()> {
    writer.write_varu32(entries.len() as u32)?;
    for (sender, payload) in entries {
        writer.write_u32_aligned(sender.raw())?;
        writer.write_varu32(payload.len() as u32)?;
        writer.write_bytes_aligned(payload)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::{LoopbackHub, LoopbackTransport};
    use crate::transport::{MessageCategory, PeerRole};

    fn intent_payload(pointer_device: u8, buttons: u16) -> Vec<u8> {
        let intent = ControlIntent {
            pointer_device,
            discrete_device: 1,
            pointer_delta: Vec2::new(0.5, -0.25),
            buttons,
        };
        let mut writer = BitWriter::new();
        encode_intent(&mut writer, &intent).unwrap();
        writer.finish().to_vec()
    }

    #[test]
    fn intent_round_trip() {
        let intent = ControlIntent {
            pointer_device: 3,
            discrete_device: 7,
            pointer_delta: Vec2::new(12.5, -3.0),
            buttons: 0b1010_0000_0000_0001,
        };
        let mut writer = BitWriter::new();
        encode_intent(&mut writer, &intent).unwrap();
        let bytes = writer.finish().to_vec();

        let mut reader = BitReader::new(&bytes);
        assert_eq!(decode_intent(&mut reader).unwrap(), intent);
        assert!(reader.is_empty());
    }

    #[test]
    fn intent_rejects_out_of_range_device() {
        let intent = ControlIntent {
            pointer_device: MAX_DEVICE_ID + 1,
            discrete_device: 0,
            pointer_delta: Vec2::ZERO,
            buttons: 0,
        };
        let mut writer = BitWriter::new();
        assert!(encode_intent(&mut writer, &intent).is_err());
    }

    #[test]
    fn buffer_replaces_within_tick() {
        let mut aggregator = ControlAggregator::new();
        let peer = PeerId::new(1);
        aggregator.buffer(peer, &intent_payload(2, 1)).unwrap();
        aggregator.buffer(peer, &intent_payload(2, 3)).unwrap();

        assert_eq!(aggregator.buffered_count(), 1);
        assert_eq!(aggregator.remote_intents()[&peer].buttons, 3);
    }

    #[test]
    fn fan_out_never_echoes_own_intent() {
        let hub = LoopbackHub::new();
        let mut server_net = LoopbackTransport::attach(&hub, PeerId::SERVER, PeerRole::Server);
        let mut a_net = LoopbackTransport::attach(&hub, PeerId::new(1), PeerRole::Client);
        let mut b_net = LoopbackTransport::attach(&hub, PeerId::new(2), PeerRole::Client);

        let mut aggregator = ControlAggregator::new();
        aggregator.buffer(PeerId::new(1), &intent_payload(2, 0xA)).unwrap();
        aggregator.buffer(PeerId::new(2), &intent_payload(3, 0xB)).unwrap();

        let mut writer = BitWriter::new();
        aggregator.fan_out(&mut writer, &mut server_net);
        assert_eq!(aggregator.buffered_count(), 0);

        // Client A's message must contain exactly one entry: B's.
        let mut a_side = ControlAggregator::new();
        let received = a_net.poll(MessageCategory::Request);
        assert_eq!(received.len(), 1);
        let (_, bytes) = &received[0];
        let mut reader = BitReader::new(bytes);
        assert_eq!(wire::read_kind(&mut reader).unwrap(), MessageKind::ControlSync);
        a_side
            .apply_fan_out(PeerId::new(1), &mut reader, &Limits::for_testing())
            .unwrap();
        let intents = a_side.remote_intents();
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[&PeerId::new(2)].buttons, 0xB);

        // And symmetrically for B.
        let mut b_side = ControlAggregator::new();
        let received = b_net.poll(MessageCategory::Request);
        assert_eq!(received.len(), 1);
        let (_, bytes) = &received[0];
        let mut reader = BitReader::new(bytes);
        wire::read_kind(&mut reader).unwrap();
        b_side
            .apply_fan_out(PeerId::new(2), &mut reader, &Limits::for_testing())
            .unwrap();
        assert_eq!(b_side.remote_intents().len(), 1);
        assert!(b_side.remote_intents().contains_key(&PeerId::new(1)));
    }

    #[test]
    fn fan_out_with_single_peer_sends_nothing_to_it() {
        let hub = LoopbackHub::new();
        let mut server_net = LoopbackTransport::attach(&hub, PeerId::SERVER, PeerRole::Server);
        let mut a_net = LoopbackTransport::attach(&hub, PeerId::new(1), PeerRole::Client);

        let mut aggregator = ControlAggregator::new();
        aggregator.buffer(PeerId::new(1), &intent_payload(2, 1)).unwrap();

        let mut writer = BitWriter::new();
        aggregator.fan_out(&mut writer, &mut server_net);

        assert!(a_net.poll(MessageCategory::Request).is_empty());
    }

    #[test]
    fn apply_fan_out_rejects_excess_entries() {
        let limits = Limits::for_testing();
        let mut writer = BitWriter::new();
        writer
            .write_varu32(limits.max_control_entries as u32 + 1)
            .unwrap();
        let bytes = writer.finish().to_vec();

        let mut aggregator = ControlAggregator::new();
        let mut reader = BitReader::new(&bytes);
        let err = aggregator
            .apply_fan_out(PeerId::new(1), &mut reader, &limits)
            .unwrap_err();
        assert!(matches!(err, SyncError::Wire(_)));
    }

    #[test]
    fn buffer_rejects_trailing_bytes() {
        let mut payload = intent_payload(1, 1);
        payload.extend_from_slice(&[0, 0]);

        let mut aggregator = ControlAggregator::new();
        let err = aggregator.buffer(PeerId::new(1), &payload).unwrap_err();
        assert!(matches!(err, SyncError::TrailingData { .. }));
    }

    #[test]
    fn forget_peer_drops_state() {
        let mut aggregator = ControlAggregator::new();
        aggregator.buffer(PeerId::new(1), &intent_payload(1, 1)).unwrap();
        aggregator.forget_peer(PeerId::new(1));
        assert_eq!(aggregator.buffered_count(), 0);
        assert!(aggregator.remote_intents().is_empty());
    }
}
