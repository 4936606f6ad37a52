//! Component serialization for the esync replication layer.
//!
//! Each component kind implements one bidirectional contract with three
//! routes through it:
//!
//! 1. `stage_construction` - write constructor arguments into a per-kind
//!    scratch buffer while a creation request is open
//! 2. [`encode_staged`] - copy staged payloads, each behind a presence bit,
//!    into an outgoing message when the request is closed
//! 3. `encode_live` / `decode_apply` - serialize from, or apply into, a live
//!    entity in the registry, gated by the same presence bits
//!
//! The same fixed kind order ([`schema::ComponentKind::ORDER`]) is walked on
//! both sides, so the wire carries no component type tags. [`Purpose`]
//! selects between the construction payload (everything needed to
//! instantiate) and the sync payload (everything needed to update).
//!
//! # Design Principles
//!
//! - **Presence is part of the contract** - an absent component still costs
//!   its one presence bit, and decode always consumes exactly what encode
//!   produced, so later fields can never drift.
//! - **Benign staleness** - applying a payload to an entity the local peer
//!   does not know yet consumes the payload and changes nothing.

mod error;
mod fields;
mod scratch;

pub mod entity;
pub mod placement;
pub mod renderable;
pub mod rigid_body;

pub use entity::{decode_entity, encode_entity, encode_staged};
pub use error::{CodecError, CodecResult};
pub use rigid_body::BodySample;
pub use scratch::ComponentStreamSet;

/// Which payload family a serializer call operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// Values needed to instantiate a component.
    Construction,
    /// Values needed to update an existing component.
    Sync,
}
