//! Engine-agnostic round logic
//!
//! Everything here talks to physics only through [`crate::physics::PhysicsWorld`]:
//! - Fixed order per step: reduce contacts, check for a clear, charge out-of-bounds
//! - Seeded RNG only
//! - No rendering or input dependencies

pub mod reducer;
pub mod round;
pub mod spawner;
pub mod state;

pub use reducer::{Reduction, reduce_contacts};
pub use round::{ClearPolicy, Round, RoundEvent};
pub use spawner::{GridLayout, HeightTier, Layout, ScatterLayout, Spawner};
pub use state::{RoundPhase, RoundState, Scoreable};
