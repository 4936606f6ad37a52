//! Message framing and decode limits for the esync replication layer.
//!
//! Every message on the wire opens with a single message-kind byte
//! ([`MessageKind`]); entity lifecycle messages follow it with a one-bit
//! range-compressed operation ([`LifecycleOp`]). The rest of the payload is
//! kind-specific and owned by the codec and replication crates.
//!
//! See `WIRE_FORMAT.md` for the complete layout.

mod error;
mod limits;
mod message;

pub use error::{DecodeError, LimitKind, WireResult};
pub use limits::Limits;
pub use message::{read_kind, read_op, write_kind, write_op, LifecycleOp, MessageKind};
