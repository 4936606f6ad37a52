//! Simulation registry and physics body state for the esync replication layer.
//!
//! [`SimWorld`] is the registry collaborator the protocol reads from and
//! writes into: entity lifetime (`spawn`/`spawn_with_id`/`despawn`),
//! component access gated by [`schema::ComponentMask`], and the physical
//! body state the synchronizer treats as an opaque oracle. The bundled
//! [`SimWorld::step`] integrator exists so tests and demos can advance that
//! oracle without a real physics engine.

mod components;
mod entity;
mod error;
mod sim;

pub use components::{Placement, Renderable, RigidBody};
pub use entity::EntityId;
pub use error::{WorldError, WorldResult};
pub use sim::SimWorld;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let mut world = SimWorld::new();
        let id = world.spawn();
        assert!(world.contains(id));
        let _ = EntityId::NONE;
        let _ = Placement::IDENTITY;
        let _: WorldResult<()> = Ok(());
    }
}
