//! Rigid-body engine seam
//!
//! Round logic only ever talks to physics through [`PhysicsWorld`], so the
//! reducer, spawner and round state machine never see an engine-specific
//! handle type. [`ArcadeWorld`] is the in-crate implementation used by the
//! demos and the tests.

pub mod arcade;

pub use arcade::ArcadeWorld;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Opaque, generational body identifier
///
/// A slot index paired with the generation it was issued in. Once a body is
/// destroyed its handle never resolves again, even if the slot is recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// How a body participates in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moves
    Static,
    /// Moved by the game (position or velocity), unaffected by contacts
    Kinematic,
    /// Integrated and pushed around by contacts
    Dynamic,
}

/// Collision geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
}

impl Shape {
    pub fn cuboid(half_extents: Vec3) -> Self {
        Shape::Box { half_extents }
    }

    pub fn ball(radius: f32) -> Self {
        Shape::Sphere { radius }
    }
}

/// Everything needed to create a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub shape: Shape,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Bounciness used when this body is involved in a response (0 = dead, 1 = perfect)
    pub restitution: f32,
    /// Sensors report contacts but never push anything
    pub sensor: bool,
}

impl BodyDesc {
    pub fn new(kind: BodyKind, shape: Shape, position: Vec3) -> Self {
        Self {
            kind,
            shape,
            position,
            velocity: Vec3::ZERO,
            restitution: 1.0,
            sensor: false,
        }
    }

    pub fn fixed(shape: Shape, position: Vec3) -> Self {
        Self::new(BodyKind::Static, shape, position)
    }

    pub fn kinematic(shape: Shape, position: Vec3) -> Self {
        Self::new(BodyKind::Kinematic, shape, position)
    }

    pub fn dynamic(shape: Shape, position: Vec3) -> Self {
        Self::new(BodyKind::Dynamic, shape, position)
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn as_sensor(mut self) -> Self {
        self.sensor = true;
        self
    }
}

/// Two bodies that started touching during the last step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContactPair {
    pub a: BodyHandle,
    pub b: BodyHandle,
}

impl ContactPair {
    /// Build a pair with a stable (sorted) participant order
    pub fn new(a: BodyHandle, b: BodyHandle) -> Self {
        if a <= b { Self { a, b } } else { Self { a: b, b: a } }
    }

    #[inline]
    pub fn involves(&self, handle: BodyHandle) -> bool {
        self.a == handle || self.b == handle
    }

    /// The participant that is not `handle`, if `handle` is part of the pair
    pub fn other(&self, handle: BodyHandle) -> Option<BodyHandle> {
        if self.a == handle {
            Some(self.b)
        } else if self.b == handle {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Capability interface over a rigid-body engine
///
/// Handles are live from `create_body` until exactly one successful
/// `destroy_body`. Queries against a released handle return `None` and
/// setters ignore it.
pub trait PhysicsWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle;

    /// Release a body. Returns `false` if the handle was already released.
    fn destroy_body(&mut self, handle: BodyHandle) -> bool;

    fn contains(&self, handle: BodyHandle) -> bool;

    /// Number of live bodies
    fn body_count(&self) -> usize;

    fn position(&self, handle: BodyHandle) -> Option<Vec3>;

    fn set_position(&mut self, handle: BodyHandle, position: Vec3);

    fn velocity(&self, handle: BodyHandle) -> Option<Vec3>;

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec3);

    /// Advance the simulation by `dt`, split into `substeps` iterations
    fn step(&mut self, dt: f32, substeps: u32);

    /// Begin-touch pairs produced by the most recent `step`
    fn contact_events(&self) -> &[ContactPair];

    fn create_static_body(&mut self, shape: Shape, position: Vec3) -> BodyHandle {
        self.create_body(&BodyDesc::fixed(shape, position))
    }

    fn create_kinematic_body(&mut self, shape: Shape, position: Vec3) -> BodyHandle {
        self.create_body(&BodyDesc::kinematic(shape, position))
    }

    fn create_dynamic_body(&mut self, shape: Shape, position: Vec3) -> BodyHandle {
        self.create_body(&BodyDesc::dynamic(shape, position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_pair_is_order_independent() {
        let h1 = BodyHandle::new(1, 0);
        let h2 = BodyHandle::new(2, 0);
        assert_eq!(ContactPair::new(h1, h2), ContactPair::new(h2, h1));
    }

    #[test]
    fn test_contact_pair_other() {
        let h1 = BodyHandle::new(1, 0);
        let h2 = BodyHandle::new(2, 0);
        let h3 = BodyHandle::new(3, 0);
        let pair = ContactPair::new(h1, h2);
        assert_eq!(pair.other(h1), Some(h2));
        assert_eq!(pair.other(h2), Some(h1));
        assert_eq!(pair.other(h3), None);
        assert!(!pair.involves(h3));
    }

    #[test]
    fn test_handles_differ_by_generation() {
        assert_ne!(BodyHandle::new(4, 0), BodyHandle::new(4, 1));
    }
}
