//! Demo configuration
//!
//! Every field has a default matching the shipped tuning, so a config file
//! only needs the values it wants to change. Loading never fails: a missing
//! or malformed file falls back to defaults with a warning.

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::sim::{GridLayout, ScatterLayout};

/// Brick breaker tuning (world units are meters, y up)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakoutConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    pub pixels_per_meter: f32,
    /// Full paddle extents
    pub paddle_size: Vec2,
    pub paddle_y: f32,
    pub paddle_speed: f32,
    pub ball_radius: f32,
    /// Speed the ball is launched with and held at
    pub ball_speed: f32,
    /// Launch angle is drawn from [-max, max] degrees off vertical
    pub max_launch_angle_deg: i32,
    /// Smallest allowed |vy| while in flight
    pub min_vertical_speed: f32,
    pub wall_thickness: f32,
    pub lives: u32,
    pub substeps: u32,
    pub bricks: GridLayout,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self {
            screen_width: 800,
            screen_height: 600,
            pixels_per_meter: 30.0,
            paddle_size: Vec2::new(3.0, 0.4),
            paddle_y: 1.5,
            paddle_speed: 15.0,
            ball_radius: 0.3,
            ball_speed: 10.0,
            max_launch_angle_deg: 30,
            min_vertical_speed: 2.0,
            wall_thickness: 0.5,
            lives: 3,
            substeps: 4,
            bricks: GridLayout::default(),
        }
    }
}

impl BreakoutConfig {
    /// Playfield size in meters
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.screen_width as f32 / self.pixels_per_meter,
            self.screen_height as f32 / self.pixels_per_meter,
        )
    }
}

/// Target range tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    pub gravity: f32,
    pub arena_width: f32,
    pub arena_depth: f32,
    pub wall_height: f32,
    /// Full paddle extents
    pub paddle_size: Vec3,
    pub paddle_start: Vec3,
    pub paddle_speed: f32,
    pub ball_radius: f32,
    pub ball_restitution: f32,
    /// Ball rest position relative to the paddle
    pub ball_offset: Vec3,
    pub launch_velocity: Vec3,
    pub balls: u32,
    /// Ball is gone below this height
    pub kill_height: f32,
    /// Ball is gone this far past the side or end walls
    pub out_of_bounds_margin: f32,
    pub substeps: u32,
    pub targets: ScatterLayout,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        let arena_depth = 30.0;
        Self {
            screen_width: 1280,
            screen_height: 720,
            gravity: -9.81,
            arena_width: 20.0,
            arena_depth,
            wall_height: 10.0,
            paddle_size: Vec3::new(2.0, 0.3, 1.5),
            paddle_start: Vec3::new(0.0, 1.0, arena_depth / 2.0 - 3.0),
            paddle_speed: 8.0,
            ball_radius: 0.3,
            ball_restitution: 0.8,
            ball_offset: Vec3::new(0.0, 1.0, -1.0),
            launch_velocity: Vec3::new(0.0, 3.0, -15.0),
            balls: 10,
            kill_height: -2.0,
            out_of_bounds_margin: 5.0,
            substeps: 4,
            targets: ScatterLayout::default(),
        }
    }
}

impl TargetsConfig {
    /// Paddle center limits on x and z
    pub fn paddle_bounds(&self) -> (Vec2, Vec2) {
        let half_width = self.arena_width / 2.0;
        let x = Vec2::new(
            -half_width + self.paddle_size.x,
            half_width - self.paddle_size.x,
        );
        let z = Vec2::new(0.0, self.arena_depth / 2.0 - 2.0);
        (x, z)
    }

    /// Whether a ball at `p` has left the arena for good
    pub fn is_out_of_bounds(&self, p: Vec3) -> bool {
        let margin = self.out_of_bounds_margin;
        p.y < self.kill_height
            || p.x.abs() > self.arena_width / 2.0 + margin
            || p.z.abs() > self.arena_depth / 2.0 + margin
    }
}

/// JSON round-trip and file loading shared by the demo configs
pub trait JsonConfig: Serialize + DeserializeOwned + Default {
    fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Read `path`, falling back to defaults if it cannot be read or parsed
    fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Cannot read {}: {}; using defaults", path.display(), e);
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Bad config in {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

impl JsonConfig for BreakoutConfig {}
impl JsonConfig for TargetsConfig {}
