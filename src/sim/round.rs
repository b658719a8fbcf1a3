//! Round state machine
//!
//! A round starts `InProgress` and ends `Won` (every scoreable destroyed) or
//! `Lost` (attempt budget exhausted). Terminal rounds ignore everything but
//! [`Round::reset`], which tears the scoreable set down and spawns a new one.
//!
//! Per-step order is fixed by [`Round::settle_step`]: contacts are reduced
//! first, then the clear check runs, then an out-of-bounds agent costs an
//! attempt. A hit that clears the field therefore wins the round even if the
//! agent also left the field on the final attempt.

use serde::{Deserialize, Serialize};

use crate::physics::{BodyHandle, ContactPair, PhysicsWorld};

use super::reducer::reduce_contacts;
use super::spawner::Spawner;
use super::state::{RoundPhase, RoundState};

/// What happens when the last scoreable goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClearPolicy {
    /// Round is won
    #[default]
    Win,
    /// A fresh set is spawned and play continues
    Respawn,
}

/// Observable outcome of a settled step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    ObjectDestroyed { handle: BodyHandle, points: u32 },
    /// Agent went out of bounds; it should be put back in play
    AttemptLost { remaining: u32 },
    Won,
    Lost,
    Respawned { wave: u32 },
    Reset,
}

/// Round state plus the spawner that (re)fills it
#[derive(Debug, Clone)]
pub struct Round {
    state: RoundState,
    spawner: Spawner,
    policy: ClearPolicy,
    starting_attempts: u32,
}

impl Round {
    /// Spawn the first scoreable set and begin play
    pub fn start<W: PhysicsWorld + ?Sized>(
        world: &mut W,
        mut spawner: Spawner,
        attempts: u32,
        policy: ClearPolicy,
    ) -> Self {
        let objects = spawner.spawn(world);
        log::info!(
            "Round started: {} scoreables, {} attempts",
            objects.len(),
            attempts
        );
        Self {
            state: RoundState::new(attempts, objects),
            spawner,
            policy,
            starting_attempts: attempts,
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase()
    }

    pub fn score(&self) -> u64 {
        self.state.score()
    }

    pub fn attempts(&self) -> u32 {
        self.state.attempts()
    }

    pub fn policy(&self) -> ClearPolicy {
        self.policy
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    /// Fold one physics step into the round
    ///
    /// `striker` restricts scoring to contacts involving that body.
    /// `agent_lost` reports that the moving agent crossed the out-of-bounds
    /// threshold this step.
    pub fn settle_step<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        contacts: &[ContactPair],
        striker: Option<BodyHandle>,
        agent_lost: bool,
    ) -> Vec<RoundEvent> {
        let mut events = Vec::new();
        if self.state.phase().is_terminal() {
            return events;
        }

        let reduction = reduce_contacts(&mut self.state, contacts, world, striker);
        events.extend(
            reduction
                .destroyed
                .iter()
                .map(|&(handle, points)| RoundEvent::ObjectDestroyed { handle, points }),
        );

        if self.state.all_cleared() {
            match self.policy {
                ClearPolicy::Win => {
                    self.state.set_phase(RoundPhase::Won);
                    log::info!("Round won with score {}", self.state.score());
                    events.push(RoundEvent::Won);
                    return events;
                }
                ClearPolicy::Respawn => events.push(self.respawn(world)),
            }
        }

        if agent_lost {
            events.push(self.lose_attempt());
        }

        events
    }

    /// Charge one attempt for an out-of-bounds agent
    fn lose_attempt(&mut self) -> RoundEvent {
        let remaining = self.state.spend_attempt();
        if remaining == 0 {
            self.state.set_phase(RoundPhase::Lost);
            log::info!("Round lost with score {}", self.state.score());
            RoundEvent::Lost
        } else {
            log::info!("Attempt lost, {} remaining", remaining);
            RoundEvent::AttemptLost { remaining }
        }
    }

    /// Replace a cleared set without touching score or attempts
    fn respawn<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) -> RoundEvent {
        Spawner::release_all(&self.state.live_handles(), world);
        let objects = self.spawner.spawn(world);
        self.state.replace_objects(objects);
        let wave = self.state.next_wave();
        log::info!("Field cleared, respawned wave {}", wave);
        RoundEvent::Respawned { wave }
    }

    /// Full teardown: release every live scoreable, spawn anew, restore the budget
    pub fn reset<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) -> RoundEvent {
        let released = Spawner::release_all(&self.state.live_handles(), world);
        let objects = self.spawner.spawn(world);
        self.state = RoundState::new(self.starting_attempts, objects);
        log::info!("Round reset ({} bodies released)", released);
        RoundEvent::Reset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{ArcadeWorld, Shape};
    use crate::sim::spawner::{GridLayout, Layout, ScatterLayout};
    use glam::Vec3;
    use proptest::prelude::*;

    fn grid_round(rows: u32, cols: u32, attempts: u32) -> (ArcadeWorld, Round, BodyHandle) {
        let mut world = ArcadeWorld::default();
        let layout = Layout::Grid(GridLayout {
            rows,
            cols,
            ..GridLayout::default()
        });
        let round = Round::start(&mut world, Spawner::new(layout, 1), attempts, ClearPolicy::Win);
        let ball = world.create_dynamic_body(Shape::ball(0.3), Vec3::ZERO);
        (world, round, ball)
    }

    fn hit(round: &Round, ball: BodyHandle, slot: usize) -> ContactPair {
        ContactPair::new(ball, round.state().objects()[slot].handle)
    }

    #[test]
    fn test_win_only_when_every_object_is_gone() {
        let (mut world, mut round, ball) = grid_round(1, 3, 3);

        round.settle_step(&mut world, &[], Some(ball), false);
        assert_eq!(round.phase(), RoundPhase::InProgress);

        let batch = [hit(&round, ball, 0), hit(&round, ball, 1)];
        round.settle_step(&mut world, &batch, Some(ball), false);
        assert_eq!(round.phase(), RoundPhase::InProgress);

        let last = [hit(&round, ball, 2)];
        let events = round.settle_step(&mut world, &last, Some(ball), false);
        assert_eq!(round.phase(), RoundPhase::Won);
        assert_eq!(events.last(), Some(&RoundEvent::Won));
    }

    #[test]
    fn test_top_row_of_default_grid_is_worth_500() {
        let (mut world, mut round, ball) = grid_round(5, 10, 3);
        let batch: Vec<_> = (0..10).map(|slot| hit(&round, ball, slot)).collect();
        round.settle_step(&mut world, &batch, Some(ball), false);
        assert_eq!(round.score(), 500);
    }

    #[test]
    fn test_lost_exactly_on_third_out_of_bounds() {
        let (mut world, mut round, _ball) = grid_round(2, 2, 3);

        let first = round.settle_step(&mut world, &[], None, true);
        assert_eq!(first, vec![RoundEvent::AttemptLost { remaining: 2 }]);
        let second = round.settle_step(&mut world, &[], None, true);
        assert_eq!(second, vec![RoundEvent::AttemptLost { remaining: 1 }]);
        assert_eq!(round.phase(), RoundPhase::InProgress);

        let third = round.settle_step(&mut world, &[], None, true);
        assert_eq!(third, vec![RoundEvent::Lost]);
        assert_eq!(round.phase(), RoundPhase::Lost);
        assert_eq!(round.attempts(), 0);
    }

    #[test]
    fn test_clearing_hit_beats_final_out_of_bounds() {
        let (mut world, mut round, ball) = grid_round(1, 1, 1);
        let events = round.settle_step(&mut world, &[hit(&round, ball, 0)], Some(ball), true);

        assert_eq!(round.phase(), RoundPhase::Won);
        assert_eq!(round.attempts(), 1);
        assert!(!events.contains(&RoundEvent::Lost));
    }

    #[test]
    fn test_terminal_round_ignores_play() {
        let (mut world, mut round, ball) = grid_round(1, 2, 1);
        round.settle_step(&mut world, &[], None, true);
        assert_eq!(round.phase(), RoundPhase::Lost);

        let events = round.settle_step(&mut world, &[hit(&round, ball, 0)], Some(ball), true);
        assert!(events.is_empty());
        assert_eq!(round.score(), 0);
        assert_eq!(round.state().active_count(), 2);
    }

    #[test]
    fn test_reset_restores_budget_and_releases_old_bodies() {
        let (mut world, mut round, ball) = grid_round(2, 3, 3);
        let old: Vec<_> = round.state().objects().iter().map(|o| o.handle).collect();

        round.settle_step(&mut world, &[hit(&round, ball, 0)], Some(ball), true);
        round.settle_step(&mut world, &[], None, true);
        round.settle_step(&mut world, &[], None, true);
        assert_eq!(round.phase(), RoundPhase::Lost);

        assert_eq!(round.reset(&mut world), RoundEvent::Reset);
        assert_eq!(round.phase(), RoundPhase::InProgress);
        assert_eq!(round.attempts(), 3);
        assert_eq!(round.score(), 0);
        assert_eq!(round.state().active_count(), 6);
        assert!(old.iter().all(|h| !world.contains(*h)));
        // six bricks plus the ball
        assert_eq!(world.body_count(), 7);
    }

    #[test]
    fn test_respawn_policy_keeps_playing() {
        let mut world = ArcadeWorld::default();
        let spawner = Spawner::new(Layout::Scatter(ScatterLayout::default()), 9);
        let mut round = Round::start(&mut world, spawner, 10, ClearPolicy::Respawn);
        let ball = world.create_dynamic_body(Shape::ball(0.3), Vec3::ZERO);

        let batch: Vec<_> = (0..5).map(|slot| hit(&round, ball, slot)).collect();
        let events = round.settle_step(&mut world, &batch, Some(ball), false);

        assert!(events.contains(&RoundEvent::Respawned { wave: 1 }));
        assert_eq!(round.phase(), RoundPhase::InProgress);
        assert_eq!(round.state().active_count(), 5);
        assert_eq!(round.attempts(), 10);
        assert_eq!(world.body_count(), 6);
    }

    proptest! {
        #[test]
        fn prop_score_up_attempts_down(
            steps in prop::collection::vec((prop::option::of(0usize..12), any::<bool>()), 0..40),
        ) {
            let (mut world, mut round, ball) = grid_round(3, 4, 5);
            let (mut score, mut attempts) = (round.score(), round.attempts());

            for (slot, lost) in steps {
                let contacts: Vec<_> = slot.map(|s| hit(&round, ball, s)).into_iter().collect();
                round.settle_step(&mut world, &contacts, Some(ball), lost);

                prop_assert!(round.score() >= score);
                prop_assert!(round.attempts() <= attempts);
                if round.attempts() == 0 {
                    prop_assert_eq!(round.phase(), RoundPhase::Lost);
                }
                prop_assert_eq!(
                    round.phase() == RoundPhase::Won,
                    round.state().all_cleared()
                );
                score = round.score();
                attempts = round.attempts();
            }
        }
    }
}
