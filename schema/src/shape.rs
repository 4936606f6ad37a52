//! Physical body shapes with strongly-typed constructor data.

/// Constructor data for a physical body, one variant per use case.
///
/// The variant tag is range-compressed on the wire (see the codec crate);
/// variant order is part of the wire contract.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BodyShape {
    /// A dynamic ball.
    Sphere { radius: f32 },
    /// A convex hull built from a named mesh.
    ConvexMesh { mesh: String },
    /// A non-moving triangle mesh (terrain, buildings).
    StaticMesh { mesh: String },
    /// A vehicle wheel; orientation is driven by the vehicle controller.
    Wheel { radius: f32, width: f32 },
    /// An upright capsule; orientation is driven by the character controller.
    Character { height: f32, radius: f32 },
}

impl BodyShape {
    /// Number of shape variants (bounds the wire tag).
    pub const VARIANT_COUNT: u8 = 5;

    /// Returns the wire tag for this shape.
    #[must_use]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Sphere { .. } => 0,
            Self::ConvexMesh { .. } => 1,
            Self::StaticMesh { .. } => 2,
            Self::Wheel { .. } => 3,
            Self::Character { .. } => 4,
        }
    }

    /// Whether this shape's orientation matters gameplay-wise.
    ///
    /// Shapes whose orientation is derived locally (wheels, characters) or
    /// never changes (static meshes) skip rotation and angular velocity in
    /// sync payloads.
    #[must_use]
    pub const fn rotation_matters(&self) -> bool {
        matches!(self, Self::Sphere { .. } | Self::ConvexMesh { .. })
    }

    /// Returns the shape's stable name (feeds the layout hash).
    #[must_use]
    pub const fn variant_name(tag: u8) -> &'static str {
        match tag {
            0 => "sphere",
            1 => "convex_mesh",
            2 => "static_mesh",
            3 => "wheel",
            _ => "character",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_shapes() -> Vec<BodyShape> {
        vec![
            BodyShape::Sphere { radius: 0.5 },
            BodyShape::ConvexMesh {
                mesh: "crate".to_owned(),
            },
            BodyShape::StaticMesh {
                mesh: "terrain".to_owned(),
            },
            BodyShape::Wheel {
                radius: 0.3,
                width: 0.2,
            },
            BodyShape::Character {
                height: 1.8,
                radius: 0.4,
            },
        ]
    }

    #[test]
    fn tags_are_dense_and_distinct() {
        let tags: Vec<_> = all_shapes().iter().map(BodyShape::tag).collect();
        assert_eq!(tags, vec![0, 1, 2, 3, 4]);
        assert_eq!(tags.len(), BodyShape::VARIANT_COUNT as usize);
    }

    #[test]
    fn rotation_matters_per_variant() {
        assert!(BodyShape::Sphere { radius: 1.0 }.rotation_matters());
        assert!(BodyShape::ConvexMesh {
            mesh: "m".to_owned()
        }
        .rotation_matters());
        assert!(!BodyShape::StaticMesh {
            mesh: "m".to_owned()
        }
        .rotation_matters());
        assert!(!BodyShape::Wheel {
            radius: 0.3,
            width: 0.2
        }
        .rotation_matters());
        assert!(!BodyShape::Character {
            height: 1.8,
            radius: 0.4
        }
        .rotation_matters());
    }

    #[test]
    fn variant_names_are_distinct() {
        let mut names: Vec<_> = (0..BodyShape::VARIANT_COUNT)
            .map(BodyShape::variant_name)
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BodyShape::VARIANT_COUNT as usize);
    }
}
