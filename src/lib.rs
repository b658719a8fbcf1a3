//! Rigid Arcade - two small physics demos and the round logic they share
//!
//! Core modules:
//! - `physics`: Rigid-body engine seam plus a small reference world
//! - `sim`: Engine-agnostic scoring, spawning and round lifecycle
//! - `demos`: Brick breaker (2D), target range (3D) and a hello-window sample
//! - `render`: Draw surface abstraction and CPU tessellation
//! - `input`: Per-frame key state
//! - `config`: Data-driven demo tuning

pub mod config;
pub mod demos;
pub mod input;
pub mod physics;
pub mod render;
pub mod sim;

pub use config::{BreakoutConfig, JsonConfig, TargetsConfig};
pub use demos::{Breakout, TargetRange};
pub use physics::{ArcadeWorld, BodyHandle, PhysicsWorld};
pub use sim::{ClearPolicy, Round, RoundEvent, RoundPhase};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Engine-wide constants
pub mod consts {
    /// Fixed frame timestep used by the headless runner (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Upper bound on a single frame delta to keep the solver stable
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Frames the headless runner plays before giving up on a round
    pub const MAX_HEADLESS_FRAMES: u32 = 60 * 300;
}

/// 8-bit RGBA color, laid out for direct upload
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Normalized [0, 1] components
    pub fn to_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

/// Named palette shared by the demos
pub mod colors {
    use super::Color;

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RAYWHITE: Color = Color::rgb(245, 245, 245);
    pub const GRAY: Color = Color::rgb(130, 130, 130);
    pub const RED: Color = Color::rgb(230, 41, 55);
    pub const ORANGE: Color = Color::rgb(255, 161, 0);
    pub const YELLOW: Color = Color::rgb(253, 249, 0);
    pub const GOLD: Color = Color::rgb(255, 203, 0);
    pub const GREEN: Color = Color::rgb(0, 228, 48);
    pub const DARKGREEN: Color = Color::rgb(0, 117, 44);
    pub const BLUE: Color = Color::rgb(0, 121, 241);
    pub const SKYBLUE: Color = Color::rgb(102, 191, 255);
    pub const DARKBLUE: Color = Color::rgb(0, 82, 172);
    pub const PURPLE: Color = Color::rgb(200, 122, 255);
}
