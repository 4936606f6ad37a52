//! The synchronizer: role-dependent tick loop over all protocol pieces.

use std::collections::BTreeMap;

use bitstream::{BitReader, BitWriter};
use glam::{Quat, Vec2, Vec3};
use schema::BodyShape;
use tracing::{debug, trace, warn};
use wire::{LifecycleOp, MessageKind};
use world::{EntityId, SimWorld, WorldError};

use crate::config::SyncConfig;
use crate::control::{self, ControlAggregator, ControlIntent, ControlScheme};
use crate::error::{SyncError, SyncResult};
use crate::history::SnapshotHistory;
use crate::lifecycle::{self, RequestState};
use crate::physics;
use crate::transport::{MessageCategory, PeerId, PeerRole, SendProfile, Transport};

/// The entity-state synchronization context.
///
/// One per process, owning all protocol state: the open creation request,
/// the control aggregator, the snapshot history, and the reusable outgoing
/// message buffer. The registry and transport collaborators are passed into
/// every call; nothing here is global.
///
/// The driving loop calls [`tick`](Self::tick) once per simulation tick and
/// brackets each physics step with
/// [`on_before_physics_step`](Self::on_before_physics_step) /
/// [`on_after_physics_step`](Self::on_after_physics_step).
pub struct Synchronizer {
    role: PeerRole,
    local_id: PeerId,
    config: SyncConfig,
    writer: BitWriter,
    request: RequestState,
    control: ControlAggregator,
    scheme: Option<ControlScheme>,
    pointer_delta: Vec2,
    buttons: u16,
    history: SnapshotHistory,
    sync_seq: u8,
    steps_begun: u64,
    elapsed: f32,
}

impl Synchronizer {
    /// Creates a synchronizer bound to the transport's role and identity.
    #[must_use]
    pub fn new(net: &dyn Transport, config: SyncConfig) -> Self {
        let history = SnapshotHistory::new(config.history_capacity);
        Self {
            role: net.role(),
            local_id: net.local_id(),
            config,
            writer: BitWriter::new(),
            request: RequestState::Idle,
            control: ControlAggregator::new(),
            scheme: None,
            pointer_delta: Vec2::ZERO,
            buttons: 0,
            history,
            sync_seq: 0,
            steps_begun: 0,
            elapsed: 0.0,
        }
    }

    /// The role this synchronizer runs as.
    #[must_use]
    pub fn role(&self) -> PeerRole {
        self.role
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The snapshot history ring.
    #[must_use]
    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    // ---- entity lifecycle -------------------------------------------------

    /// Opens a creation request.
    ///
    /// Fails (returns `false`, prior state unchanged) if a request is
    /// already open. Offline, the entity is created immediately; otherwise
    /// constructor arguments accumulate in scratch buffers until
    /// [`close_request`](Self::close_request).
    pub fn open_request(&mut self, world: &mut SimWorld) -> bool {
        if self.request.is_open() {
            warn!("open_request while another request is open");
            return false;
        }
        self.request = match self.role {
            PeerRole::None => RequestState::OpenLocal {
                entity: world.spawn(),
            },
            PeerRole::Server | PeerRole::Client => RequestState::OpenStaged {
                set: codec::ComponentStreamSet::new(),
            },
        };
        true
    }

    /// Adds a placement to the open request.
    pub fn request_placement(
        &mut self,
        world: &mut SimWorld,
        translation: Vec3,
        rotation: Quat,
    ) -> bool {
        match &mut self.request {
            RequestState::Idle => {
                warn!("request_placement without an open request");
                false
            }
            RequestState::OpenLocal { entity } => {
                world.insert_placement(*entity, world::Placement::new(translation, rotation))
            }
            RequestState::OpenStaged { set } => {
                codec::placement::stage_construction(set, translation, rotation);
                true
            }
        }
    }

    /// Adds a rigid body to the open request.
    pub fn request_rigid_body(
        &mut self,
        world: &mut SimWorld,
        shape: BodyShape,
        mass: f32,
        dynamic: bool,
    ) -> bool {
        match &mut self.request {
            RequestState::Idle => {
                warn!("request_rigid_body without an open request");
                false
            }
            RequestState::OpenLocal { entity } => {
                world.insert_body(*entity, world::RigidBody::new(shape, mass, dynamic))
            }
            RequestState::OpenStaged { set } => {
                match codec::rigid_body::stage_construction(
                    set,
                    &shape,
                    mass,
                    dynamic,
                    &self.config.limits,
                ) {
                    Ok(()) => true,
                    Err(err) => {
                        warn!(error = %err, "failed to stage rigid body");
                        false
                    }
                }
            }
        }
    }

    /// Adds a renderable to the open request.
    pub fn request_renderable(
        &mut self,
        world: &mut SimWorld,
        mesh: &str,
        texture: &str,
    ) -> bool {
        match &mut self.request {
            RequestState::Idle => {
                warn!("request_renderable without an open request");
                false
            }
            RequestState::OpenLocal { entity } => {
                world.insert_renderable(*entity, world::Renderable::new(mesh, texture))
            }
            RequestState::OpenStaged { set } => {
                match codec::renderable::stage_construction(set, mesh, texture, &self.config.limits)
                {
                    Ok(()) => true,
                    Err(err) => {
                        warn!(error = %err, "failed to stage renderable");
                        false
                    }
                }
            }
        }
    }

    /// Closes the open request.
    ///
    /// Offline, returns the already-created local id. As a client, sends
    /// the request (entity id zero) to the server and returns
    /// [`EntityId::NONE`]; the entity materializes when the fulfilled
    /// broadcast arrives. As the server, runs the request through the same
    /// decode path a remote request takes, broadcasts the fulfilled
    /// message, and returns the freshly-assigned id.
    ///
    /// Closing without an open request logs and returns [`EntityId::NONE`].
    pub fn close_request(&mut self, world: &mut SimWorld, net: &mut dyn Transport) -> EntityId {
        match std::mem::replace(&mut self.request, RequestState::Idle) {
            RequestState::Idle => {
                warn!("close_request without an open request");
                EntityId::NONE
            }
            RequestState::OpenLocal { entity } => entity,
            RequestState::OpenStaged { mut set } => {
                self.writer.reset();
                if let Err(err) =
                    lifecycle::encode_create_from_staged(&mut self.writer, &mut set)
                {
                    warn!(error = %err, "failed to encode creation request");
                    return EntityId::NONE;
                }
                match self.role {
                    PeerRole::Client => {
                        net.send(self.writer.finish(), SendProfile::request());
                        EntityId::NONE
                    }
                    PeerRole::Server => {
                        // Mirror the remote path: decode our own request.
                        let bytes = self.writer.finish().to_vec();
                        let mut reader = BitReader::new(&bytes[1..]);
                        match self.handle_entity_request(world, net, self.local_id, &mut reader)
                        {
                            Ok(id) => id,
                            Err(err) => {
                                warn!(error = %err, "failed to fulfil local creation request");
                                EntityId::NONE
                            }
                        }
                    }
                    PeerRole::None => EntityId::NONE,
                }
            }
        }
    }

    /// Requests destruction of an entity.
    ///
    /// Offline deletes immediately; a client sends the request and deletes
    /// when the broadcast comes back; the server validates, deletes, and
    /// rebroadcasts.
    pub fn request_destroy(
        &mut self,
        world: &mut SimWorld,
        net: &mut dyn Transport,
        id: EntityId,
    ) -> bool {
        if id.is_none() {
            warn!("request_destroy for the reserved id");
            return false;
        }
        match self.role {
            PeerRole::None => {
                if world.despawn(id) {
                    true
                } else {
                    warn!(entity = id.raw(), "request_destroy for unknown entity");
                    false
                }
            }
            PeerRole::Client => {
                self.writer.reset();
                if let Err(err) = lifecycle::encode_destroy(&mut self.writer, id) {
                    warn!(error = %err, "failed to encode destroy request");
                    return false;
                }
                net.send(self.writer.finish(), SendProfile::request());
                true
            }
            PeerRole::Server => {
                if !world.contains(id) {
                    warn!(entity = id.raw(), "request_destroy for unknown entity");
                    return false;
                }
                world.despawn(id);
                self.writer.reset();
                if let Err(err) = lifecycle::encode_destroy(&mut self.writer, id) {
                    warn!(error = %err, "failed to encode destroy broadcast");
                    return false;
                }
                net.send(self.writer.finish(), SendProfile::request());
                true
            }
        }
    }

    // ---- control ----------------------------------------------------------

    /// Switches the active control scheme (or clears it with `None`).
    pub fn set_control_scheme(&mut self, scheme: Option<ControlScheme>) {
        self.scheme = scheme;
    }

    /// Records this tick's raw input readings.
    pub fn set_control_intent(&mut self, pointer_delta: Vec2, buttons: u16) {
        self.pointer_delta = pointer_delta;
        self.buttons = buttons;
    }

    /// Latest known intent per remote peer.
    #[must_use]
    pub fn remote_intents(&self) -> &BTreeMap<PeerId, ControlIntent> {
        self.control.remote_intents()
    }

    // ---- driving loop -----------------------------------------------------

    /// Runs one tick of the protocol for the current role.
    pub fn tick(&mut self, dt: f32, world: &mut SimWorld, net: &mut dyn Transport) {
        self.elapsed += dt;
        match self.role {
            PeerRole::None => {
                net.discard(MessageCategory::Request);
                net.discard(MessageCategory::Sync);
            }
            PeerRole::Server => {
                self.greet_fresh_peers(world, net);
                self.pump_requests(world, net);
                self.buffer_local_intent();
                self.control.fan_out(&mut self.writer, net);
                // The server is the physics truth; nothing to reconcile.
                net.discard(MessageCategory::Sync);
            }
            PeerRole::Client => {
                self.pump_requests(world, net);
                self.send_local_intent(net);
                self.pump_sync(world, net);
            }
        }
    }

    /// Marks the start of a physics step.
    pub fn on_before_physics_step(&mut self) {
        self.steps_begun += 1;
    }

    /// Captures history and, on the broadcast cadence, sends physics state.
    pub fn on_after_physics_step(&mut self, world: &SimWorld, net: &mut dyn Transport) {
        match self.history.capture(world) {
            Ok(seq) => trace!(seq, "captured physics snapshot"),
            Err(err) => warn!(error = %err, "failed to capture physics snapshot"),
        }

        let interval = u64::from(self.config.sync_interval_steps.max(1));
        if self.role == PeerRole::Server && self.steps_begun % interval == 0 {
            self.sync_seq = self.sync_seq.wrapping_add(1);
            self.writer.reset();
            match physics::encode_sync_message(
                world,
                self.sync_seq,
                &mut self.writer,
                &self.config.limits,
            ) {
                Ok(()) => {
                    net.send(self.writer.finish(), SendProfile::sync());
                    trace!(
                        seq = self.sync_seq,
                        elapsed = self.elapsed,
                        "broadcast physics state"
                    );
                }
                Err(err) => warn!(error = %err, "failed to encode physics broadcast"),
            }
        }
    }

    /// Re-applies the oldest retained snapshot to the world.
    pub fn rewind(&mut self, world: &mut SimWorld) -> Option<u8> {
        match self.history.rewind(world) {
            Ok(Some(seq)) => {
                debug!(seq, "rewound to oldest retained snapshot");
                Some(seq)
            }
            Ok(None) => {
                debug!("rewind requested with empty history");
                None
            }
            Err(err) => {
                warn!(error = %err, "failed to re-apply history snapshot");
                None
            }
        }
    }

    // ---- internals --------------------------------------------------------

    fn greet_fresh_peers(&mut self, world: &SimWorld, net: &mut dyn Transport) {
        for peer in net.freshly_connected_peers() {
            debug!(peer = peer.raw(), entities = world.entity_count(), "greeting fresh peer");
            let ids: Vec<EntityId> = world.entities().collect();
            for id in ids {
                self.writer.reset();
                match lifecycle::encode_create_from_world(
                    &mut self.writer,
                    world,
                    id,
                    &self.config.limits,
                ) {
                    Ok(()) => net.send_to(peer, self.writer.finish(), SendProfile::request()),
                    Err(err) => {
                        warn!(error = %err, entity = id.raw(), "failed to encode entity for fresh peer");
                    }
                }
            }
        }
    }

    fn pump_requests(&mut self, world: &mut SimWorld, net: &mut dyn Transport) {
        for (sender, bytes) in net.poll(MessageCategory::Request) {
            if bytes.len() > self.config.limits.max_message_bytes {
                warn!(
                    peer = sender.raw(),
                    len = bytes.len(),
                    "dropping oversized request message"
                );
                continue;
            }
            let mut reader = BitReader::new(&bytes);
            let kind = match wire::read_kind(&mut reader) {
                Ok(kind) => kind,
                Err(err) => {
                    warn!(error = %err, peer = sender.raw(), "dropping message with bad header");
                    continue;
                }
            };
            let result = match kind {
                MessageKind::EntityRequest => self
                    .handle_entity_request(world, net, sender, &mut reader)
                    .map(|_| ()),
                MessageKind::ControlSync => self.handle_control_sync(sender, &bytes, &mut reader),
                MessageKind::PhysicsSync => {
                    warn!(peer = sender.raw(), "physics sync arrived on the request channel");
                    continue;
                }
            };
            if let Err(err) = result {
                warn!(error = %err, peer = sender.raw(), "dropping malformed message");
            }
        }
    }

    fn handle_entity_request(
        &mut self,
        world: &mut SimWorld,
        net: &mut dyn Transport,
        sender: PeerId,
        reader: &mut BitReader<'_>,
    ) -> SyncResult<EntityId> {
        let op = wire::read_op(reader)?;
        reader.align_to_byte()?;
        let id = EntityId::new(reader.read_u32_aligned()?);

        match (self.role, op) {
            (PeerRole::Server, LifecycleOp::Create) => {
                if !id.is_none() {
                    warn!(
                        peer = sender.raw(),
                        entity = id.raw(),
                        "creation request carried a nonzero id"
                    );
                    return Ok(EntityId::NONE);
                }
                let entity = world.spawn();
                if let Err(err) = codec::decode_entity(
                    codec::Purpose::Construction,
                    world,
                    entity,
                    reader,
                    &self.config.limits,
                ) {
                    world.despawn(entity);
                    return Err(err.into());
                }
                ensure_consumed(reader)?;

                self.writer.reset();
                lifecycle::encode_create_from_world(
                    &mut self.writer,
                    world,
                    entity,
                    &self.config.limits,
                )?;
                net.send(self.writer.finish(), SendProfile::request());
                debug!(peer = sender.raw(), entity = entity.raw(), "fulfilled creation request");
                Ok(entity)
            }
            (PeerRole::Server, LifecycleOp::Destroy) => {
                if !world.contains(id) {
                    warn!(
                        peer = sender.raw(),
                        entity = id.raw(),
                        "destroy request for unknown entity"
                    );
                    return Ok(EntityId::NONE);
                }
                world.despawn(id);
                self.writer.reset();
                lifecycle::encode_destroy(&mut self.writer, id)?;
                net.send(self.writer.finish(), SendProfile::request());
                Ok(id)
            }
            (PeerRole::Client, LifecycleOp::Create) => {
                if id.is_none() {
                    warn!("fulfilled creation broadcast carried id zero");
                    return Ok(EntityId::NONE);
                }
                match world.spawn_with_id(id) {
                    Ok(()) => {}
                    Err(WorldError::IdInUse { .. }) => {
                        // Identity anomaly: the server told us to create an
                        // entity we already have. Keep going and let the
                        // payload overwrite, but say so.
                        warn!(entity = id.raw(), "creation broadcast for an id that is already live");
                    }
                    Err(err) => {
                        warn!(error = %err, entity = id.raw(), "cannot apply creation broadcast");
                        return Ok(EntityId::NONE);
                    }
                }
                codec::decode_entity(
                    codec::Purpose::Construction,
                    world,
                    id,
                    reader,
                    &self.config.limits,
                )?;
                ensure_consumed(reader)?;
                debug!(entity = id.raw(), "created replicated entity");
                Ok(id)
            }
            (PeerRole::Client, LifecycleOp::Destroy) => {
                if world.despawn(id) {
                    debug!(entity = id.raw(), "destroyed replicated entity");
                } else {
                    // Replication is allowed to be momentarily behind.
                    debug!(entity = id.raw(), "destroy broadcast for unknown entity");
                }
                Ok(id)
            }
            (PeerRole::None, _) => Ok(EntityId::NONE),
        }
    }

    fn handle_control_sync(
        &mut self,
        sender: PeerId,
        bytes: &[u8],
        reader: &mut BitReader<'_>,
    ) -> SyncResult<()> {
        match self.role {
            // A client's message carries its single intent; buffer the raw
            // payload for this tick's fan-out.
            PeerRole::Server => self.control.buffer(sender, &bytes[1..]),
            PeerRole::Client => {
                self.control
                    .apply_fan_out(self.local_id, reader, &self.config.limits)
            }
            PeerRole::None => Ok(()),
        }
    }

    fn local_intent(&self) -> Option<ControlIntent> {
        self.scheme
            .map(|scheme| ControlIntent::from_scheme(scheme, self.pointer_delta, self.buttons))
    }

    fn buffer_local_intent(&mut self) {
        let Some(intent) = self.local_intent() else {
            return;
        };
        self.writer.reset();
        wire::write_kind(&mut self.writer, MessageKind::ControlSync);
        if let Err(err) = control::encode_intent(&mut self.writer, &intent) {
            warn!(error = %err, "failed to encode local control intent");
            return;
        }
        let payload = self.writer.finish()[1..].to_vec();
        if let Err(err) = self.control.buffer(self.local_id, &payload) {
            warn!(error = %err, "failed to buffer local control intent");
        }
    }

    fn send_local_intent(&mut self, net: &mut dyn Transport) {
        let Some(intent) = self.local_intent() else {
            return;
        };
        self.writer.reset();
        wire::write_kind(&mut self.writer, MessageKind::ControlSync);
        if let Err(err) = control::encode_intent(&mut self.writer, &intent) {
            warn!(error = %err, "failed to encode local control intent");
            return;
        }
        net.send(self.writer.finish(), SendProfile::request());
    }

    fn pump_sync(&mut self, world: &mut SimWorld, net: &mut dyn Transport) {
        for (sender, bytes) in net.poll(MessageCategory::Sync) {
            if bytes.len() > self.config.limits.max_message_bytes {
                warn!(
                    peer = sender.raw(),
                    len = bytes.len(),
                    "dropping oversized sync message"
                );
                continue;
            }
            let mut reader = BitReader::new(&bytes);
            match wire::read_kind(&mut reader) {
                Ok(MessageKind::PhysicsSync) => {}
                Ok(kind) => {
                    warn!(?kind, peer = sender.raw(), "unexpected kind on the sync channel");
                    continue;
                }
                Err(err) => {
                    warn!(error = %err, peer = sender.raw(), "dropping sync message with bad header");
                    continue;
                }
            }
            match physics::apply_sync_message(world, &mut reader, &self.config) {
                Ok((seq, applied)) => trace!(seq, applied, "applied physics state"),
                Err(err) => warn!(error = %err, peer = sender.raw(), "dropping malformed sync message"),
            }
        }
    }
}

fn ensure_consumed(reader: &BitReader<'_>) -> SyncResult<()> {
    if reader.bits_remaining() >= 8 {
        return Err(SyncError::TrailingData {
            remaining_bits: reader.bits_remaining(),
        });
    }
    Ok(())
}
