//! Collision event reducer
//!
//! Maps the begin-touch pairs reported by the physics step back onto
//! scoreables, destroying each matched object and banking its points once.

use crate::physics::{BodyHandle, ContactPair, PhysicsWorld};

use super::state::RoundState;

/// What one batch of contacts did to the round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reduction {
    /// Handles released this batch, in contact order, each paired with its points
    pub destroyed: Vec<(BodyHandle, u32)>,
    pub score_delta: u64,
}

impl Reduction {
    pub fn is_empty(&self) -> bool {
        self.destroyed.is_empty()
    }
}

/// Apply a batch of contact pairs to the round
///
/// Each pair destroys at most one object: the first participant that maps to
/// a live scoreable. When `striker` is given, only pairs involving that body
/// count. Pairs that match nothing (ball vs wall) are ignored, and feeding the
/// same pair twice never scores twice because a destroyed object leaves the
/// index immediately.
pub fn reduce_contacts<W: PhysicsWorld + ?Sized>(
    round: &mut RoundState,
    contacts: &[ContactPair],
    world: &mut W,
    striker: Option<BodyHandle>,
) -> Reduction {
    let mut reduction = Reduction::default();

    for pair in contacts {
        let candidates = match striker {
            Some(striker) => match pair.other(striker) {
                Some(other) => [Some(other), None],
                None => continue,
            },
            None => [Some(pair.a), Some(pair.b)],
        };

        let Some((handle, slot)) = candidates
            .into_iter()
            .flatten()
            .find_map(|h| round.lookup(h).map(|slot| (h, slot)))
        else {
            continue;
        };

        if let Some(points) = round.deactivate(slot) {
            if !world.destroy_body(handle) {
                log::warn!("Scoreable body {:?} was already released", handle);
            }
            log::debug!("Destroyed {:?} for {} points", handle, points);
            reduction.score_delta += u64::from(points);
            reduction.destroyed.push((handle, points));
        }
    }

    reduction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{ArcadeWorld, Shape};
    use crate::sim::state::Scoreable;
    use crate::colors;
    use glam::Vec3;
    use proptest::prelude::*;

    /// World with `n` static bricks plus one free-floating ball
    fn setup(points: &[u32]) -> (ArcadeWorld, RoundState, BodyHandle) {
        let mut world = ArcadeWorld::default();
        let objects = points
            .iter()
            .enumerate()
            .map(|(i, &points)| {
                let position = Vec3::new(i as f32 * 3.0, 10.0, 0.0);
                Scoreable {
                    handle: world.create_static_body(Shape::cuboid(Vec3::splat(0.5)), position),
                    position,
                    size: Vec3::ONE,
                    color: colors::BLUE,
                    points,
                    active: true,
                }
            })
            .collect();
        let ball = world.create_dynamic_body(Shape::ball(0.3), Vec3::ZERO);
        (world, RoundState::new(3, objects), ball)
    }

    #[test]
    fn test_single_hit_scores_and_releases() {
        let (mut world, mut round, ball) = setup(&[10, 20]);
        let target = round.objects()[1].handle;

        let out = reduce_contacts(&mut round, &[ContactPair::new(ball, target)], &mut world, None);

        assert_eq!(out.score_delta, 20);
        assert_eq!(out.destroyed, vec![(target, 20)]);
        assert_eq!(round.score(), 20);
        assert!(!world.contains(target));
        assert!(!round.objects()[1].active);
        assert!(round.objects()[0].active);
    }

    #[test]
    fn test_duplicate_contacts_in_one_batch_count_once() {
        let (mut world, mut round, ball) = setup(&[50]);
        let target = round.objects()[0].handle;
        let pair = ContactPair::new(ball, target);

        let out = reduce_contacts(&mut round, &[pair, pair, pair], &mut world, None);
        assert_eq!(out.score_delta, 50);
        assert_eq!(out.destroyed.len(), 1);
    }

    #[test]
    fn test_refeeding_a_batch_is_idempotent() {
        let (mut world, mut round, ball) = setup(&[5, 5]);
        let batch: Vec<_> = round
            .objects()
            .iter()
            .map(|o| ContactPair::new(ball, o.handle))
            .collect();

        reduce_contacts(&mut round, &batch, &mut world, None);
        let again = reduce_contacts(&mut round, &batch, &mut world, None);

        assert!(again.is_empty());
        assert_eq!(round.score(), 10);
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_unmatched_pairs_are_ignored() {
        let (mut world, mut round, ball) = setup(&[10]);
        let wall = world.create_static_body(Shape::cuboid(Vec3::ONE), Vec3::new(-5.0, 0.0, 0.0));

        let out = reduce_contacts(&mut round, &[ContactPair::new(ball, wall)], &mut world, None);
        assert!(out.is_empty());
        assert!(world.contains(wall));
        assert_eq!(round.score(), 0);
    }

    #[test]
    fn test_striker_filter_skips_other_bodies() {
        let (mut world, mut round, ball) = setup(&[10]);
        let target = round.objects()[0].handle;
        let stray = world.create_dynamic_body(Shape::ball(0.3), Vec3::new(0.0, 5.0, 0.0));

        let out = reduce_contacts(
            &mut round,
            &[ContactPair::new(stray, target)],
            &mut world,
            Some(ball),
        );
        assert!(out.is_empty());
        assert!(world.contains(target));

        let out = reduce_contacts(
            &mut round,
            &[ContactPair::new(ball, target)],
            &mut world,
            Some(ball),
        );
        assert_eq!(out.score_delta, 10);
    }

    /// Bare engine stand-in that only records releases
    #[derive(Default)]
    struct RecordingWorld {
        next: u32,
        destroyed: Vec<BodyHandle>,
    }

    impl PhysicsWorld for RecordingWorld {
        fn create_body(&mut self, _desc: &crate::physics::BodyDesc) -> BodyHandle {
            self.next += 1;
            BodyHandle::new(self.next, 0)
        }

        fn destroy_body(&mut self, handle: BodyHandle) -> bool {
            if self.destroyed.contains(&handle) {
                return false;
            }
            self.destroyed.push(handle);
            true
        }

        fn contains(&self, handle: BodyHandle) -> bool {
            handle.index() <= self.next && !self.destroyed.contains(&handle)
        }

        fn body_count(&self) -> usize {
            self.next as usize - self.destroyed.len()
        }

        fn position(&self, _handle: BodyHandle) -> Option<Vec3> {
            None
        }

        fn set_position(&mut self, _handle: BodyHandle, _position: Vec3) {}

        fn velocity(&self, _handle: BodyHandle) -> Option<Vec3> {
            None
        }

        fn set_velocity(&mut self, _handle: BodyHandle, _velocity: Vec3) {}

        fn step(&mut self, _dt: f32, _substeps: u32) {}

        fn contact_events(&self) -> &[ContactPair] {
            &[]
        }
    }

    #[test]
    fn test_stub_world_sees_one_release_per_object() {
        let mut world = RecordingWorld::default();
        let objects = (0..3)
            .map(|i| Scoreable {
                handle: world.create_static_body(Shape::cuboid(Vec3::ONE), Vec3::ZERO),
                position: Vec3::ZERO,
                size: Vec3::ONE,
                color: colors::RED,
                points: 10 * (i + 1),
                active: true,
            })
            .collect::<Vec<_>>();
        let ball = world.create_dynamic_body(Shape::ball(0.3), Vec3::ZERO);
        let mut round = RoundState::new(1, objects);

        let target = round.objects()[2].handle;
        let pair = ContactPair::new(ball, target);
        reduce_contacts(&mut round, &[pair, pair], &mut world, Some(ball));
        reduce_contacts(&mut round, &[pair], &mut world, Some(ball));

        assert_eq!(world.destroyed, vec![target]);
        assert_eq!(round.score(), 30);
    }

    proptest! {
        #[test]
        fn prop_score_equals_sum_of_destroyed(
            points in prop::collection::vec(1u32..100, 1..20),
            hits in prop::collection::vec(0usize..40, 0..60),
        ) {
            let (mut world, mut round, ball) = setup(&points);
            let handles: Vec<_> = round.objects().iter().map(|o| o.handle).collect();
            let mut last_score = 0;

            for chunk in hits.chunks(3) {
                let batch: Vec<_> = chunk
                    .iter()
                    .map(|&i| ContactPair::new(ball, handles[i % handles.len()]))
                    .collect();
                reduce_contacts(&mut round, &batch, &mut world, None);
                prop_assert!(round.score() >= last_score);
                last_score = round.score();
            }

            let expected: u64 = round
                .objects()
                .iter()
                .filter(|o| !o.active)
                .map(|o| u64::from(o.points))
                .sum();
            prop_assert_eq!(round.score(), expected);
            prop_assert_eq!(world.body_count(), round.active_count() + 1);
        }
    }
}
