//! In-process loopback transport for tests and demos.
//!
//! A star topology over shared queues: clients talk to the server, the
//! server talks to everyone. Single-threaded by design, like the rest of
//! this layer, so the hub is shared through `Rc<RefCell<_>>`.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use crate::transport::{MessageCategory, PeerId, PeerRole, SendProfile, Transport};

#[derive(Debug)]
struct PeerState {
    role: PeerRole,
    request: VecDeque<(PeerId, Vec<u8>)>,
    sync: VecDeque<(PeerId, Vec<u8>)>,
    fresh: bool,
}

impl PeerState {
    fn new(role: PeerRole) -> Self {
        Self {
            role,
            request: VecDeque::new(),
            sync: VecDeque::new(),
            fresh: true,
        }
    }

    fn queue_mut(&mut self, category: MessageCategory) -> &mut VecDeque<(PeerId, Vec<u8>)> {
        match category {
            MessageCategory::Request => &mut self.request,
            MessageCategory::Sync => &mut self.sync,
        }
    }
}

/// The shared message hub every loopback endpoint is attached to.
#[derive(Debug, Default)]
pub struct LoopbackHub {
    peers: BTreeMap<PeerId, PeerState>,
}

impl LoopbackHub {
    /// Creates an empty hub ready for endpoints to attach.
    #[must_use]
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    fn register(&mut self, id: PeerId, role: PeerRole) {
        self.peers.insert(id, PeerState::new(role));
    }

    fn deliver(&mut self, to: PeerId, from: PeerId, bytes: &[u8], category: MessageCategory) {
        if let Some(state) = self.peers.get_mut(&to) {
            state.queue_mut(category).push_back((from, bytes.to_vec()));
        }
    }

    fn server_id(&self) -> Option<PeerId> {
        self.peers
            .iter()
            .find(|(_, state)| state.role == PeerRole::Server)
            .map(|(id, _)| *id)
    }
}

/// One endpoint attached to a [`LoopbackHub`].
#[derive(Debug)]
pub struct LoopbackTransport {
    id: PeerId,
    role: PeerRole,
    hub: Rc<RefCell<LoopbackHub>>,
}

impl LoopbackTransport {
    /// Registers a new endpoint on the hub.
    #[must_use]
    pub fn attach(hub: &Rc<RefCell<LoopbackHub>>, id: PeerId, role: PeerRole) -> Self {
        hub.borrow_mut().register(id, role);
        Self {
            id,
            role,
            hub: Rc::clone(hub),
        }
    }
}

impl Transport for LoopbackTransport {
    fn role(&self) -> PeerRole {
        self.role
    }

    fn local_id(&self) -> PeerId {
        self.id
    }

    fn send(&mut self, bytes: &[u8], profile: SendProfile) {
        let mut hub = self.hub.borrow_mut();
        let category = profile.category();
        match self.role {
            PeerRole::Server => {
                let targets: Vec<PeerId> =
                    hub.peers.keys().copied().filter(|id| *id != self.id).collect();
                for target in targets {
                    hub.deliver(target, self.id, bytes, category);
                }
            }
            PeerRole::Client => {
                if let Some(server) = hub.server_id() {
                    hub.deliver(server, self.id, bytes, category);
                }
            }
            PeerRole::None => {}
        }
    }

    fn send_to(&mut self, peer: PeerId, bytes: &[u8], profile: SendProfile) {
        self.hub
            .borrow_mut()
            .deliver(peer, self.id, bytes, profile.category());
    }

    fn poll(&mut self, category: MessageCategory) -> Vec<(PeerId, Vec<u8>)> {
        let mut hub = self.hub.borrow_mut();
        match hub.peers.get_mut(&self.id) {
            Some(state) => state.queue_mut(category).drain(..).collect(),
            None => Vec::new(),
        }
    }

    fn discard(&mut self, category: MessageCategory) {
        let mut hub = self.hub.borrow_mut();
        if let Some(state) = hub.peers.get_mut(&self.id) {
            state.queue_mut(category).clear();
        }
    }

    fn connected_peers(&self) -> Vec<PeerId> {
        let hub = self.hub.borrow();
        match self.role {
            PeerRole::Server => hub
                .peers
                .keys()
                .copied()
                .filter(|id| *id != self.id)
                .collect(),
            PeerRole::Client => hub.server_id().into_iter().collect(),
            PeerRole::None => Vec::new(),
        }
    }

    fn freshly_connected_peers(&mut self) -> Vec<PeerId> {
        if self.role != PeerRole::Server {
            return Vec::new();
        }
        let mut hub = self.hub.borrow_mut();
        let mut fresh = Vec::new();
        for (id, state) in &mut hub.peers {
            if state.fresh && state.role == PeerRole::Client {
                state.fresh = false;
                fresh.push(*id);
            }
        }
        fresh
    }
}
