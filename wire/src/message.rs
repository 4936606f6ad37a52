//! Message kinds and the one-byte header every message starts with.

use bitstream::{BitReader, BitResult, BitWriter};

use crate::error::{DecodeError, WireResult};

/// Message kinds carried in the leading header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    /// Entity lifecycle request or fulfilled broadcast (reliable, ordered).
    EntityRequest = 1,
    /// Per-tick control intent, single or fanned out (reliable, ordered).
    ControlSync = 2,
    /// Periodic physics state broadcast (unreliable, sequenced).
    PhysicsSync = 3,
}

impl MessageKind {
    /// Parses a message kind from its raw header byte.
    pub fn parse(byte: u8) -> WireResult<Self> {
        match byte {
            1 => Ok(Self::EntityRequest),
            2 => Ok(Self::ControlSync),
            3 => Ok(Self::PhysicsSync),
            _ => Err(DecodeError::UnknownMessageKind { byte }),
        }
    }
}

/// Entity lifecycle operations, range-compressed to a single bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LifecycleOp {
    Create = 0,
    Destroy = 1,
}

const OP_LO: u64 = LifecycleOp::Create as u64;
const OP_HI: u64 = LifecycleOp::Destroy as u64;

/// Writes the leading message-kind byte.
///
/// Must be the first write into a fresh (byte-aligned) stream.
pub fn write_kind(writer: &mut BitWriter, kind: MessageKind) {
    writer.write_u8(kind as u8);
}

/// Reads and validates the leading message-kind byte.
pub fn read_kind(reader: &mut BitReader<'_>) -> WireResult<MessageKind> {
    let byte = reader.read_u8_aligned()?;
    MessageKind::parse(byte)
}

/// Writes a lifecycle operation in one bit.
pub fn write_op(writer: &mut BitWriter, op: LifecycleOp) -> BitResult<()> {
    writer.write_ranged(op as u64, OP_LO, OP_HI)
}

/// Reads a lifecycle operation.
pub fn read_op(reader: &mut BitReader<'_>) -> BitResult<LifecycleOp> {
    let raw = reader.read_ranged(OP_LO, OP_HI)?;
    Ok(if raw == OP_LO {
        LifecycleOp::Create
    } else {
        LifecycleOp::Destroy
    })
}
