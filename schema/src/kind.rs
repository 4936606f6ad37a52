//! Component kinds and the agreed serialization order.

/// The component kinds this layer replicates.
///
/// Both peers iterate [`ComponentKind::ORDER`] identically on encode and
/// decode, so no per-component type tag ever appears on the wire. Adding,
/// removing, or reordering kinds is a wire format change and must bump the
/// layout version (see [`crate::layout_hash`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ComponentKind {
    /// Spatial transform: translation plus rotation.
    Placement = 0,
    /// Physical body: shape, mass, velocities, activity.
    RigidBody = 1,
    /// Visual description: mesh and texture names.
    Renderable = 2,
}

impl ComponentKind {
    /// Number of component kinds.
    pub const COUNT: usize = 3;

    /// The fixed wire order.
    pub const ORDER: [Self; Self::COUNT] = [Self::Placement, Self::RigidBody, Self::Renderable];

    /// Returns the kind's position in the wire order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the kind's stable name (feeds the layout hash).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Placement => "placement",
            Self::RigidBody => "rigid_body",
            Self::Renderable => "renderable",
        }
    }
}

/// A bitset identifying which component kinds an entity currently has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ComponentMask(u8);

impl ComponentMask {
    /// The empty mask.
    pub const EMPTY: Self = Self(0);

    /// Creates a mask from its raw bits.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Returns `true` if the mask contains `kind`.
    #[must_use]
    pub const fn contains(self, kind: ComponentKind) -> bool {
        self.0 & (1 << kind.index()) != 0
    }

    /// Adds `kind` to the mask.
    pub fn insert(&mut self, kind: ComponentKind) {
        self.0 |= 1 << kind.index();
    }

    /// Removes `kind` from the mask.
    pub fn remove(&mut self, kind: ComponentKind) {
        self.0 &= !(1 << kind.index());
    }

    /// Returns `true` if no kind is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the contained kinds in wire order.
    pub fn iter(self) -> impl Iterator<Item = ComponentKind> {
        ComponentKind::ORDER
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<ComponentKind> for ComponentMask {
    fn from_iter<I: IntoIterator<Item = ComponentKind>>(iter: I) -> Self {
        let mut mask = Self::EMPTY;
        for kind in iter {
            mask.insert(kind);
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_matches_indices() {
        for (position, kind) in ComponentKind::ORDER.iter().enumerate() {
            assert_eq!(kind.index(), position);
        }
    }

    #[test]
    fn order_covers_every_kind_once() {
        let mask: ComponentMask = ComponentKind::ORDER.into_iter().collect();
        assert_eq!(mask.raw().count_ones() as usize, ComponentKind::COUNT);
    }

    #[test]
    fn names_are_distinct() {
        let mut names: Vec<_> = ComponentKind::ORDER.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ComponentKind::COUNT);
    }

    #[test]
    fn mask_insert_contains_remove() {
        let mut mask = ComponentMask::EMPTY;
        assert!(mask.is_empty());
        assert!(!mask.contains(ComponentKind::RigidBody));

        mask.insert(ComponentKind::RigidBody);
        assert!(mask.contains(ComponentKind::RigidBody));
        assert!(!mask.contains(ComponentKind::Placement));

        mask.remove(ComponentKind::RigidBody);
        assert!(mask.is_empty());
    }

    #[test]
    fn mask_iter_in_wire_order() {
        let mut mask = ComponentMask::EMPTY;
        mask.insert(ComponentKind::Renderable);
        mask.insert(ComponentKind::Placement);

        let kinds: Vec<_> = mask.iter().collect();
        assert_eq!(kinds, vec![ComponentKind::Placement, ComponentKind::Renderable]);
    }

    #[test]
    fn mask_raw_round_trip() {
        let mut mask = ComponentMask::EMPTY;
        mask.insert(ComponentKind::Placement);
        mask.insert(ComponentKind::RigidBody);
        assert_eq!(ComponentMask::from_raw(mask.raw()), mask);
    }

    #[test]
    fn mask_from_iterator() {
        let mask: ComponentMask =
            [ComponentKind::Placement, ComponentKind::Placement].into_iter().collect();
        assert!(mask.contains(ComponentKind::Placement));
        assert!(!mask.contains(ComponentKind::Renderable));
    }
}
