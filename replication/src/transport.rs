//! The transport collaborator contract.
//!
//! The synchronizer never owns sockets. It talks to whatever carries its
//! bytes through this trait: non-blocking sends, per-category polls, and
//! peer discovery. Ordering and reliability are channel-scoped properties
//! the transport honors, not something this layer re-implements.

/// The role this process plays in the session.
///
/// Set once at startup and carried on the synchronizer context; it gates
/// nearly every behavioral branch in this subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeerRole {
    /// Offline / solo: no transport traffic at all.
    #[default]
    None,
    /// Authoritative peer: assigns ids, owns physics truth.
    Server,
    /// Remote peer: requests, predicts, reconciles.
    Client,
}

/// A connected peer's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId(u32);

impl PeerId {
    /// The server's well-known identity.
    pub const SERVER: Self = Self(0);

    /// Creates a new peer id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Logical message categories the transport splits incoming traffic by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageCategory {
    /// Lifecycle requests and control intents (reliable, ordered).
    Request,
    /// Periodic physics state (unreliable, sequenced).
    Sync,
}

/// Send priority hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Delivery contract for a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reliability {
    /// Delivered exactly once, in send order within its channel.
    ReliableOrdered,
    /// Best effort; stale packets are dropped by the transport.
    UnreliableSequenced,
}

/// Logical sub-streams with their own ordering/reliability contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Entity lifecycle and control traffic.
    EntityControl,
    /// Physics state broadcasts.
    PhysicsState,
}

/// How a message should be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendProfile {
    pub priority: Priority,
    pub reliability: Reliability,
    pub channel: Channel,
}

impl SendProfile {
    /// Profile for lifecycle requests and control intents.
    #[must_use]
    pub const fn request() -> Self {
        Self {
            priority: Priority::High,
            reliability: Reliability::ReliableOrdered,
            channel: Channel::EntityControl,
        }
    }

    /// Profile for periodic physics broadcasts.
    #[must_use]
    pub const fn sync() -> Self {
        Self {
            priority: Priority::Medium,
            reliability: Reliability::UnreliableSequenced,
            channel: Channel::PhysicsState,
        }
    }

    /// The category a message sent with this profile arrives under.
    #[must_use]
    pub const fn category(self) -> MessageCategory {
        match self.channel {
            Channel::EntityControl => MessageCategory::Request,
            Channel::PhysicsState => MessageCategory::Sync,
        }
    }
}

/// The transport collaborator.
///
/// All operations are non-blocking; an empty poll result or peer list means
/// "nothing to do this tick". Send failures and disconnects are the
/// transport's to surface through its own diagnostics.
pub trait Transport {
    /// The role this endpoint was configured with.
    fn role(&self) -> PeerRole;

    /// This endpoint's own identity.
    fn local_id(&self) -> PeerId;

    /// Sends to every connected peer (server) or to the server (client).
    fn send(&mut self, bytes: &[u8], profile: SendProfile);

    /// Sends to one specific peer.
    fn send_to(&mut self, peer: PeerId, bytes: &[u8], profile: SendProfile);

    /// Drains buffered incoming messages of one category, in arrival order.
    fn poll(&mut self, category: MessageCategory) -> Vec<(PeerId, Vec<u8>)>;

    /// Drops buffered incoming messages of one category.
    fn discard(&mut self, category: MessageCategory);

    /// Currently connected peers, excluding this endpoint.
    fn connected_peers(&self) -> Vec<PeerId>;

    /// Peers that connected since the last call; each is reported once.
    fn freshly_connected_peers(&mut self) -> Vec<PeerId>;
}
