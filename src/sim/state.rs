//! Round state and scoreable objects
//!
//! The state is the single owner of every scoreable's physics handle and of
//! the handle -> slot index used by the contact reducer.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::Color;
use crate::physics::BodyHandle;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Active gameplay
    InProgress,
    /// Every scoreable was destroyed
    Won,
    /// Attempt budget exhausted
    Lost,
}

impl RoundPhase {
    /// Won and Lost only accept a reset
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RoundPhase::InProgress)
    }
}

/// A destructible entity (brick or target) worth points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scoreable {
    /// Physics body backing this object
    pub handle: BodyHandle,
    /// Placement at spawn time (scoreables never move)
    pub position: Vec3,
    /// Full extents, for drawing
    pub size: Vec3,
    pub color: Color,
    pub points: u32,
    pub active: bool,
}

/// Score, attempt budget and the scoreable set of one round
#[derive(Debug, Clone)]
pub struct RoundState {
    score: u64,
    attempts: u32,
    phase: RoundPhase,
    /// Number of times the scoreable set was rebuilt within this round
    wave: u32,
    objects: Vec<Scoreable>,
    /// Live handles only: an entry is removed the moment its object deactivates
    index: HashMap<BodyHandle, usize>,
}

impl RoundState {
    pub fn new(attempts: u32, objects: Vec<Scoreable>) -> Self {
        let mut state = Self {
            score: 0,
            attempts,
            phase: RoundPhase::InProgress,
            wave: 0,
            objects: Vec::new(),
            index: HashMap::new(),
        };
        state.replace_objects(objects);
        state
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn objects(&self) -> &[Scoreable] {
        &self.objects
    }

    pub fn active_objects(&self) -> impl Iterator<Item = &Scoreable> {
        self.objects.iter().filter(|o| o.active)
    }

    pub fn active_count(&self) -> usize {
        self.index.len()
    }

    /// True once every object of a non-empty set has been destroyed
    pub fn all_cleared(&self) -> bool {
        !self.objects.is_empty() && self.index.is_empty()
    }

    /// Slot of the live object backed by `handle`
    pub fn lookup(&self, handle: BodyHandle) -> Option<usize> {
        self.index.get(&handle).copied()
    }

    /// Flip an object to inactive and bank its points
    ///
    /// Returns the points awarded, or `None` if the object was already inactive.
    pub fn deactivate(&mut self, slot: usize) -> Option<u32> {
        let object = self.objects.get_mut(slot)?;
        if !object.active {
            return None;
        }
        object.active = false;
        self.index.remove(&object.handle);
        self.score += u64::from(object.points);
        Some(object.points)
    }

    /// Take one attempt away, returning what is left
    pub(crate) fn spend_attempt(&mut self) -> u32 {
        self.attempts = self.attempts.saturating_sub(1);
        self.attempts
    }

    pub(crate) fn set_phase(&mut self, phase: RoundPhase) {
        self.phase = phase;
    }

    pub(crate) fn next_wave(&mut self) -> u32 {
        self.wave += 1;
        self.wave
    }

    /// Swap in a freshly spawned set and rebuild the handle index
    pub(crate) fn replace_objects(&mut self, objects: Vec<Scoreable>) {
        self.index = objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.active)
            .map(|(slot, o)| (o.handle, slot))
            .collect();
        self.objects = objects;
    }

    /// Handles still owned by live objects
    pub(crate) fn live_handles(&self) -> Vec<BodyHandle> {
        self.active_objects().map(|o| o.handle).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors;

    fn object(index: u32, points: u32) -> Scoreable {
        Scoreable {
            handle: BodyHandle::new(index, 0),
            position: Vec3::ZERO,
            size: Vec3::ONE,
            color: colors::RED,
            points,
            active: true,
        }
    }

    #[test]
    fn test_new_state_indexes_every_object() {
        let state = RoundState::new(3, (0..4).map(|i| object(i, 10)).collect());
        assert_eq!(state.phase(), RoundPhase::InProgress);
        assert_eq!(state.active_count(), 4);
        assert_eq!(state.lookup(BodyHandle::new(2, 0)), Some(2));
        assert_eq!(state.lookup(BodyHandle::new(9, 0)), None);
    }

    #[test]
    fn test_deactivate_is_one_shot() {
        let mut state = RoundState::new(3, vec![object(0, 50)]);
        assert_eq!(state.deactivate(0), Some(50));
        assert_eq!(state.deactivate(0), None);
        assert_eq!(state.score(), 50);
        assert_eq!(state.lookup(BodyHandle::new(0, 0)), None);
    }

    #[test]
    fn test_all_cleared_boundaries() {
        let mut state = RoundState::new(3, (0..3).map(|i| object(i, 1)).collect());
        assert!(!state.all_cleared());
        state.deactivate(0);
        state.deactivate(1);
        assert!(!state.all_cleared());
        state.deactivate(2);
        assert!(state.all_cleared());
    }

    #[test]
    fn test_empty_set_is_never_cleared() {
        let state = RoundState::new(3, Vec::new());
        assert!(!state.all_cleared());
    }

    #[test]
    fn test_spend_attempt_saturates() {
        let mut state = RoundState::new(1, Vec::new());
        assert_eq!(state.spend_attempt(), 0);
        assert_eq!(state.spend_attempt(), 0);
    }
}
