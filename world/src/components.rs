//! Replicated component data.

use glam::{Quat, Vec3};
use schema::BodyShape;

/// Spatial transform of an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Placement {
    /// Identity placement at the origin.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    #[must_use]
    pub const fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Physical body state, mirrored into and out of the physics oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    /// Constructor shape; fixed for the body's lifetime.
    pub shape: BodyShape,
    /// Mass in simulation units; static bodies carry zero.
    pub mass: f32,
    /// `false` marks passive/static bodies that never move.
    pub dynamic: bool,
    /// `false` marks a sleeping body the physics engine has deactivated.
    pub active: bool,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl RigidBody {
    /// Creates a freshly-spawned (awake, resting) body.
    #[must_use]
    pub fn new(shape: BodyShape, mass: f32, dynamic: bool) -> Self {
        Self {
            shape,
            mass,
            dynamic,
            active: true,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }
}

/// Visual description of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renderable {
    pub mesh: String,
    pub texture: String,
}

impl Renderable {
    #[must_use]
    pub fn new(mesh: impl Into<String>, texture: impl Into<String>) -> Self {
        Self {
            mesh: mesh.into(),
            texture: texture.into(),
        }
    }
}
