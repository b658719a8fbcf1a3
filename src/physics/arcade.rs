//! Arcade-grade rigid-body world
//!
//! Enough physics to bounce a ball off bricks, walls and a paddle:
//! explicit Euler integration, overlap tests between dynamic bodies and
//! everything else, positional push-out and restitution. No rotation,
//! friction, joints or broad-phase.

use std::collections::BTreeSet;

use glam::Vec3;

use super::{BodyDesc, BodyHandle, BodyKind, ContactPair, PhysicsWorld, Shape};

/// Below this distance a separation vector is treated as degenerate
const EPSILON: f32 = 1.0e-6;

#[derive(Debug, Clone, Copy)]
struct Body {
    desc: BodyDesc,
    position: Vec3,
    velocity: Vec3,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Penetration between two bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    /// Unit vector pointing from the second body toward the first
    pub normal: Vec3,
    pub depth: f32,
}

/// Reflect velocity off a surface with the given restitution
///
/// `e = 1` is a perfect mirror: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec3, normal: Vec3, restitution: f32) -> Vec3 {
    velocity - (1.0 + restitution) * velocity.dot(normal) * normal
}

/// Overlap test between two placed shapes
pub fn penetration(a: Shape, pa: Vec3, b: Shape, pb: Vec3) -> Option<Penetration> {
    match (a, b) {
        (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
            let delta = pa - pb;
            let dist = delta.length();
            let reach = ra + rb;
            if dist >= reach {
                return None;
            }
            let normal = if dist > EPSILON { delta / dist } else { Vec3::Y };
            Some(Penetration {
                normal,
                depth: reach - dist,
            })
        }
        (Shape::Sphere { radius }, Shape::Box { half_extents }) => {
            sphere_box(pa, radius, pb, half_extents)
        }
        (Shape::Box { half_extents }, Shape::Sphere { radius }) => {
            sphere_box(pb, radius, pa, half_extents).map(|p| Penetration {
                normal: -p.normal,
                depth: p.depth,
            })
        }
        (Shape::Box { half_extents: ha }, Shape::Box { half_extents: hb }) => {
            let delta = pa - pb;
            let overlap = (ha + hb) - delta.abs();
            if overlap.min_element() <= 0.0 {
                return None;
            }
            let (axis, depth) = min_axis(overlap);
            Some(Penetration {
                normal: axis * signum_or_one(delta[axis_index(axis)]),
                depth,
            })
        }
    }
}

fn sphere_box(center: Vec3, radius: f32, box_pos: Vec3, half: Vec3) -> Option<Penetration> {
    let closest = center.clamp(box_pos - half, box_pos + half);
    let delta = center - closest;
    let dist_sq = delta.length_squared();
    if dist_sq >= radius * radius {
        return None;
    }

    if dist_sq > EPSILON * EPSILON {
        let dist = dist_sq.sqrt();
        return Some(Penetration {
            normal: delta / dist,
            depth: radius - dist,
        });
    }

    // Center is inside the box: leave through the nearest face
    let local = center - box_pos;
    let (axis, face_depth) = min_axis(half - local.abs());
    Some(Penetration {
        normal: axis * signum_or_one(local[axis_index(axis)]),
        depth: face_depth + radius,
    })
}

/// Unit axis and value of the smallest component
fn min_axis(v: Vec3) -> (Vec3, f32) {
    if v.x <= v.y && v.x <= v.z {
        (Vec3::X, v.x)
    } else if v.y <= v.z {
        (Vec3::Y, v.y)
    } else {
        (Vec3::Z, v.z)
    }
}

fn axis_index(axis: Vec3) -> usize {
    if axis.x != 0.0 {
        0
    } else if axis.y != 0.0 {
        1
    } else {
        2
    }
}

#[inline]
fn signum_or_one(v: f32) -> f32 {
    if v >= 0.0 { 1.0 } else { -1.0 }
}

/// Reference [`PhysicsWorld`] with generational handles
#[derive(Debug, Clone)]
pub struct ArcadeWorld {
    gravity: Vec3,
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    /// Pairs that touched during the previous step
    touching: BTreeSet<ContactPair>,
    contacts: Vec<ContactPair>,
}

impl Default for ArcadeWorld {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl ArcadeWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            touching: BTreeSet::new(),
            contacts: Vec::new(),
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.slots
            .get(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.body.as_ref())
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.slots
            .get_mut(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.body.as_mut())
    }

    fn handle_at(&self, index: usize) -> BodyHandle {
        BodyHandle::new(index as u32, self.slots[index].generation)
    }

    fn integrate(&mut self, h: f32) {
        let gravity = self.gravity;
        for body in self.slots.iter_mut().filter_map(|s| s.body.as_mut()) {
            match body.desc.kind {
                BodyKind::Static => {}
                BodyKind::Kinematic => body.position += body.velocity * h,
                BodyKind::Dynamic => {
                    body.velocity += gravity * h;
                    body.position += body.velocity * h;
                }
            }
        }
    }

    /// Detect overlaps for every dynamic body and push it back out
    fn resolve(&mut self, touching: &mut BTreeSet<ContactPair>, began: &mut Vec<ContactPair>) {
        for i in 0..self.slots.len() {
            let Some(mut body) = self.slots[i].body else {
                continue;
            };
            if body.desc.kind != BodyKind::Dynamic {
                continue;
            }

            for j in 0..self.slots.len() {
                if i == j {
                    continue;
                }
                let Some(mut other) = self.slots[j].body else {
                    continue;
                };
                let both_dynamic = other.desc.kind == BodyKind::Dynamic;
                // Dynamic pairs are visited once, from the lower index
                if both_dynamic && j < i {
                    continue;
                }

                let Some(hit) =
                    penetration(body.desc.shape, body.position, other.desc.shape, other.position)
                else {
                    continue;
                };

                let pair = ContactPair::new(self.handle_at(i), self.handle_at(j));
                if touching.insert(pair) {
                    began.push(pair);
                }

                if body.desc.sensor || other.desc.sensor {
                    continue;
                }

                let restitution = body.desc.restitution.max(other.desc.restitution);
                let relative = body.velocity - other.velocity;
                let closing = relative.dot(hit.normal);

                if both_dynamic {
                    body.position += hit.normal * (hit.depth * 0.5);
                    other.position -= hit.normal * (hit.depth * 0.5);
                    if closing < 0.0 {
                        // Equal masses: split the impulse
                        let impulse = -(1.0 + restitution) * closing * 0.5;
                        body.velocity += hit.normal * impulse;
                        other.velocity -= hit.normal * impulse;
                    }
                    self.slots[j].body = Some(other);
                } else {
                    body.position += hit.normal * hit.depth;
                    if closing < 0.0 {
                        body.velocity = other.velocity
                            + reflect_velocity(relative, hit.normal, restitution);
                    }
                }
            }

            self.slots[i].body = Some(body);
        }
    }
}

impl PhysicsWorld for ArcadeWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let body = Body {
            desc: *desc,
            position: desc.position,
            velocity: desc.velocity,
        };

        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize].body = Some(body);
                index as usize
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    body: Some(body),
                });
                self.slots.len() - 1
            }
        };

        self.live += 1;
        self.handle_at(index)
    }

    fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index() as usize) else {
            return false;
        };
        if slot.generation != handle.generation() || slot.body.is_none() {
            return false;
        }

        slot.body = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        self.live -= 1;
        self.touching.retain(|p| !p.involves(handle));
        self.contacts.retain(|p| !p.involves(handle));
        true
    }

    fn contains(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_some()
    }

    fn body_count(&self) -> usize {
        self.live
    }

    fn position(&self, handle: BodyHandle) -> Option<Vec3> {
        self.body(handle).map(|b| b.position)
    }

    fn set_position(&mut self, handle: BodyHandle, position: Vec3) {
        if let Some(body) = self.body_mut(handle) {
            body.position = position;
        }
    }

    fn velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.body(handle).map(|b| b.velocity)
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.body_mut(handle) {
            if body.desc.kind != BodyKind::Static {
                body.velocity = velocity;
            }
        }
    }

    fn step(&mut self, dt: f32, substeps: u32) {
        self.contacts.clear();
        if dt <= 0.0 {
            return;
        }

        let substeps = substeps.max(1);
        let h = dt / substeps as f32;
        let mut touching = BTreeSet::new();
        let mut began = Vec::new();

        for _ in 0..substeps {
            self.integrate(h);
            self.resolve(&mut touching, &mut began);
        }

        let previous = &self.touching;
        self.contacts = began
            .into_iter()
            .filter(|pair| !previous.contains(pair))
            .collect();
        self.touching = touching;
    }

    fn contact_events(&self) -> &[ContactPair] {
        &self.contacts
    }
}
