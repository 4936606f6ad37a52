//! Entity lifecycle, control aggregation, and physics synchronization.
//!
//! This crate is the session layer of esync: it turns the codec's payloads
//! into a running protocol between one authoritative server and N clients.
//!
//! - [`Synchronizer`] - the per-process context driven by the simulation
//!   loop (`tick`, physics-step hooks, `rewind`)
//! - [`Transport`] - the collaborator contract for whatever carries bytes;
//!   [`LoopbackTransport`] is the in-process implementation tests and demos
//!   use
//! - [`ControlAggregator`] - per-tick intent collection and no-self-echo
//!   fan-out
//! - [`SnapshotHistory`] - the fixed-capacity rewind ring
//!
//! # Design Principles
//!
//! - **No globals** - role, registries, and transport are explicit
//!   parameters or context fields.
//! - **Nothing blocks** - every transport interaction is a non-blocking
//!   poll; lost state is superseded by the next periodic broadcast, never
//!   awaited.
//! - **Malformed input is logged and dropped** - decode failures never
//!   panic and never poison the session.

mod config;
mod control;
mod error;
mod history;
mod lifecycle;
mod loopback;
mod session;
mod transport;

pub mod physics;

pub use config::{ReconcileMode, SyncConfig};
pub use control::{ControlAggregator, ControlIntent, ControlScheme, MAX_DEVICE_ID};
pub use error::{SyncError, SyncResult};
pub use history::{PhysicsSnapshot, SnapshotHistory};
pub use loopback::{LoopbackHub, LoopbackTransport};
pub use session::Synchronizer;
pub use transport::{
    Channel, MessageCategory, PeerId, PeerRole, Priority, Reliability, SendProfile, Transport,
};
