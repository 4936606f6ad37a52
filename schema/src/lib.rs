//! Component kinds, masks, and layout hashing for the esync replication layer.
//!
//! This crate pins down what both peers must agree on before a single bit is
//! exchanged:
//!
//! - The set of replicated component kinds and their fixed wire order
//! - The component mask gating per-entity presence
//! - The body-shape sum type carrying strongly-typed constructor data
//! - A deterministic hash over all of the above
//!
//! # Design Principles
//!
//! - **Explicit order** - the wire format's implicit type ordering is this
//!   crate's `ORDER` array, not a call-sequence convention.
//! - **Deterministic hashing** - the layout hash is stable given the same
//!   definition.

mod hash;
mod kind;
mod shape;

pub use hash::{layout_hash, LAYOUT_VERSION};
pub use kind::{ComponentKind, ComponentMask};
pub use shape::BodyShape;
