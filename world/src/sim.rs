//! The simulation registry and its physics oracle state.

use std::collections::{BTreeMap, BTreeSet};

use glam::Quat;
use schema::{ComponentKind, ComponentMask};

use crate::components::{Placement, Renderable, RigidBody};
use crate::error::{WorldError, WorldResult};
use crate::EntityId;

/// The registry of live entities and their components.
///
/// Component storage uses `BTreeMap` so every iteration order is
/// deterministic across peers. The physics "engine" here is a deliberately
/// naive integrator: the replication layer only ever touches body state
/// through get/set access, so tests and demos exercise exactly the surface
/// a real engine would expose.
#[derive(Debug)]
pub struct SimWorld {
    next_id: u32,
    live: BTreeSet<EntityId>,
    placements: BTreeMap<EntityId, Placement>,
    bodies: BTreeMap<EntityId, RigidBody>,
    renderables: BTreeMap<EntityId, Renderable>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    /// Creates an empty world.
    ///
    /// Id allocation starts at 1; zero stays reserved.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            live: BTreeSet::new(),
            placements: BTreeMap::new(),
            bodies: BTreeMap::new(),
            renderables: BTreeMap::new(),
        }
    }

    /// Allocates a fresh entity id and marks it live.
    ///
    /// Ids are handed out from a monotonic counter and never reused.
    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.live.insert(id);
        id
    }

    /// Marks a server-assigned id live.
    ///
    /// The internal counter is advanced past `id` so later local spawns can
    /// never collide with replicated ids.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ReservedId`] for id zero and
    /// [`WorldError::IdInUse`] when the id is already live.
    pub fn spawn_with_id(&mut self, id: EntityId) -> WorldResult<()> {
        if id.is_none() {
            return Err(WorldError::ReservedId);
        }
        if self.live.contains(&id) {
            return Err(WorldError::IdInUse { id });
        }
        self.live.insert(id);
        self.next_id = self.next_id.max(id.raw() + 1);
        Ok(())
    }

    /// Removes an entity and all of its components.
    ///
    /// Returns `false` if the entity was not live.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let removed = self.live.remove(&id);
        self.placements.remove(&id);
        self.bodies.remove(&id);
        self.renderables.remove(&id);
        removed
    }

    /// Returns `true` if the entity is live.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.live.contains(&id)
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.live.len()
    }

    /// Iterates live entity ids in ascending order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.live.iter().copied()
    }

    /// Returns the mask of components the entity currently has.
    #[must_use]
    pub fn component_mask(&self, id: EntityId) -> ComponentMask {
        let mut mask = ComponentMask::EMPTY;
        if self.placements.contains_key(&id) {
            mask.insert(ComponentKind::Placement);
        }
        if self.bodies.contains_key(&id) {
            mask.insert(ComponentKind::RigidBody);
        }
        if self.renderables.contains_key(&id) {
            mask.insert(ComponentKind::Renderable);
        }
        mask
    }

    /// Returns `true` if the entity has the given component kind.
    #[must_use]
    pub fn has_component(&self, id: EntityId, kind: ComponentKind) -> bool {
        self.component_mask(id).contains(kind)
    }

    /// Attaches a placement. Ignored (returns `false`) for dead entities.
    pub fn insert_placement(&mut self, id: EntityId, placement: Placement) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.placements.insert(id, placement);
        true
    }

    /// Attaches a rigid body. Ignored (returns `false`) for dead entities.
    pub fn insert_body(&mut self, id: EntityId, body: RigidBody) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.bodies.insert(id, body);
        true
    }

    /// Attaches a renderable. Ignored (returns `false`) for dead entities.
    pub fn insert_renderable(&mut self, id: EntityId, renderable: Renderable) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.renderables.insert(id, renderable);
        true
    }

    #[must_use]
    pub fn placement(&self, id: EntityId) -> Option<&Placement> {
        self.placements.get(&id)
    }

    pub fn placement_mut(&mut self, id: EntityId) -> Option<&mut Placement> {
        self.placements.get_mut(&id)
    }

    #[must_use]
    pub fn body(&self, id: EntityId) -> Option<&RigidBody> {
        self.bodies.get(&id)
    }

    pub fn body_mut(&mut self, id: EntityId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(&id)
    }

    #[must_use]
    pub fn renderable(&self, id: EntityId) -> Option<&Renderable> {
        self.renderables.get(&id)
    }

    /// Iterates ids of entities that carry a rigid body, in ascending order.
    pub fn body_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.bodies.keys().copied()
    }

    /// Advances every active dynamic body by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        for (id, body) in &self.bodies {
            if !body.dynamic || !body.active {
                continue;
            }
            if let Some(placement) = self.placements.get_mut(id) {
                placement.translation += body.linear_velocity * dt;
                let spin = Quat::from_scaled_axis(body.angular_velocity * dt);
                placement.rotation = (spin * placement.rotation).normalize();
            }
        }
    }
}
