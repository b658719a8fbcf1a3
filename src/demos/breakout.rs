//! Brick breaker
//!
//! Zero-gravity 2D play in the z = 0 plane. The paddle is kinematic and
//! driven by velocity, the ball is dynamic and held at constant speed, and
//! the bottom wall is a sensor the ball falls through.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::BreakoutConfig;
use crate::consts::MAX_FRAME_DT;
use crate::input::FrameInput;
use crate::physics::{ArcadeWorld, BodyDesc, BodyHandle, PhysicsWorld, Shape};
use crate::render::Canvas;
use crate::sim::{ClearPolicy, Layout, Round, RoundEvent, RoundPhase, Spawner};
use crate::{Color, colors};

use super::Demo;

const BACKGROUND: Color = Color::rgb(20, 20, 30);
const WALL_STRIP: Color = Color::rgb(40, 40, 60);
const PADDLE_GLOW: Color = Color::rgb(200, 200, 255);
const BALL_GLOW: Color = Color::rgba(255, 255, 200, 200);
const OVERLAY: Color = Color::rgba(0, 0, 0, 180);

/// Gap between the paddle top and a parked ball
const PARK_GAP: f32 = 0.1;

/// Rescale `v` to `speed`, then keep it from going too flat
///
/// A vertical component below `min_vy` is lifted to `min_vy` (sign kept) and
/// the vector is rescaled to `speed` once more, so the final `|vy|` sits a
/// little under `min_vy` rather than exactly on it.
pub fn maintain_speed(v: Vec2, speed: f32, min_vy: f32) -> Vec2 {
    let mut v = v;
    let current = v.length();
    if current > 0.1 && current != speed {
        v *= speed / current;
    }

    if v.y.abs() < min_vy {
        v.y = if v.y >= 0.0 { min_vy } else { -min_vy };
        v *= speed / v.length();
    }
    v
}

/// Brick breaker over any physics world
pub struct Breakout<W: PhysicsWorld = ArcadeWorld> {
    config: BreakoutConfig,
    world: W,
    round: Round,
    paddle: BodyHandle,
    ball: BodyHandle,
    walls: [BodyHandle; 4],
    launched: bool,
    rng: Pcg32,
    ticks: u64,
}

impl Breakout<ArcadeWorld> {
    pub fn new(config: BreakoutConfig, seed: u64) -> Self {
        Self::with_world(ArcadeWorld::new(Vec3::ZERO), config, seed)
    }
}

impl<W: PhysicsWorld> Breakout<W> {
    /// Build the field inside `world`, which should have no gravity
    pub fn with_world(mut world: W, config: BreakoutConfig, seed: u64) -> Self {
        let size = config.world_size();
        let t = config.wall_thickness;
        let depth = 1.0;

        let side = Shape::cuboid(Vec3::new(t / 2.0, size.y / 2.0, depth));
        let cap = Shape::cuboid(Vec3::new(size.x / 2.0 + t, t / 2.0, depth));
        let walls = [
            world.create_static_body(side, Vec3::new(-t / 2.0, size.y / 2.0, 0.0)),
            world.create_static_body(side, Vec3::new(size.x + t / 2.0, size.y / 2.0, 0.0)),
            world.create_static_body(cap, Vec3::new(size.x / 2.0, size.y + t / 2.0, 0.0)),
            world.create_body(
                &BodyDesc::fixed(cap, Vec3::new(size.x / 2.0, -t / 2.0, 0.0)).as_sensor(),
            ),
        ];

        let paddle_half = (config.paddle_size / 2.0).extend(depth / 2.0);
        let paddle = world.create_kinematic_body(
            Shape::cuboid(paddle_half),
            Vec3::new(size.x / 2.0, config.paddle_y, 0.0),
        );
        let ball = world.create_dynamic_body(Shape::ball(config.ball_radius), Vec3::ZERO);

        let spawner = Spawner::new(Layout::Grid(config.bricks.clone()), seed);
        let round = Round::start(&mut world, spawner, config.lives, ClearPolicy::Win);

        let mut demo = Self {
            config,
            world,
            round,
            paddle,
            ball,
            walls,
            launched: false,
            rng: Pcg32::seed_from_u64(seed.wrapping_add(1)),
            ticks: 0,
        };
        demo.park_ball();
        demo
    }

    pub fn config(&self) -> &BreakoutConfig {
        &self.config
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn paddle(&self) -> BodyHandle {
        self.paddle
    }

    pub fn ball(&self) -> BodyHandle {
        self.ball
    }

    pub fn walls(&self) -> &[BodyHandle; 4] {
        &self.walls
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    fn paddle_position(&self) -> Vec3 {
        self.world
            .position(self.paddle)
            .unwrap_or(Vec3::new(self.config.world_size().x / 2.0, self.config.paddle_y, 0.0))
    }

    fn ball_position(&self) -> Vec3 {
        self.world.position(self.ball).unwrap_or(Vec3::ZERO)
    }

    /// Put the ball at rest on top of the paddle
    fn park_ball(&mut self) {
        let above = self.config.paddle_size.y / 2.0 + self.config.ball_radius + PARK_GAP;
        let rest = self.paddle_position() + Vec3::new(0.0, above, 0.0);
        self.world.set_position(self.ball, rest);
        self.world.set_velocity(self.ball, Vec3::ZERO);
        self.launched = false;
    }

    fn launch_ball(&mut self) {
        let max = self.config.max_launch_angle_deg.unsigned_abs().min(90) as i32;
        let angle = (self.rng.random_range(-max..=max) as f32).to_radians();
        let speed = self.config.ball_speed;
        self.world.set_velocity(
            self.ball,
            Vec3::new(speed * angle.sin(), speed * angle.cos(), 0.0),
        );
        self.launched = true;
        log::debug!("Ball launched at {:.0} degrees", angle.to_degrees());
    }

    /// Paddle velocity for the requested direction, zeroed at the field edges
    fn paddle_velocity(&self, move_x: f32) -> f32 {
        let x = self.paddle_position().x;
        let min = self.config.paddle_size.x / 2.0;
        let max = self.config.world_size().x - min;
        let vx = move_x.clamp(-1.0, 1.0) * self.config.paddle_speed;
        if (x <= min && vx < 0.0) || (x >= max && vx > 0.0) {
            0.0
        } else {
            vx
        }
    }

    /// Tear down the bricks and start over with the same walls, paddle and ball
    fn restart(&mut self) -> RoundEvent {
        let event = self.round.reset(&mut self.world);
        let center = Vec3::new(self.config.world_size().x / 2.0, self.config.paddle_y, 0.0);
        self.world.set_position(self.paddle, center);
        self.world.set_velocity(self.paddle, Vec3::ZERO);
        self.park_ball();
        event
    }

    fn to_screen(&self, p: Vec3) -> Vec2 {
        let scale = self.config.pixels_per_meter;
        Vec2::new(p.x * scale, self.config.screen_height as f32 - p.y * scale)
    }

    fn draw_centered<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        text: &str,
        y: f32,
        size: f32,
        color: Color,
    ) {
        let width = canvas.measure_text(text, size);
        let x = (self.config.screen_width as f32 - width) / 2.0;
        canvas.text(text, Vec2::new(x, y), size, color);
    }
}

impl<W: PhysicsWorld> Demo for Breakout<W> {
    fn title(&self) -> &str {
        "Breakout"
    }

    fn screen_size(&self) -> (u32, u32) {
        (self.config.screen_width, self.config.screen_height)
    }

    fn update(&mut self, input: &FrameInput, dt: f32) -> Vec<RoundEvent> {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        self.ticks += 1;

        if self.round.phase().is_terminal() {
            if input.reset {
                return vec![self.restart()];
            }
            return Vec::new();
        }

        let vx = self.paddle_velocity(input.move_x);
        self.world.set_velocity(self.paddle, Vec3::new(vx, 0.0, 0.0));

        if !self.launched {
            self.park_ball();
            if input.launch {
                self.launch_ball();
            }
        }

        self.world.step(dt, self.config.substeps);

        // Keep the paddle inside the field after the step
        let min = self.config.paddle_size.x / 2.0;
        let max = self.config.world_size().x - min;
        let paddle = self.paddle_position();
        if paddle.x < min || paddle.x > max {
            self.world
                .set_position(self.paddle, Vec3::new(paddle.x.clamp(min, max), paddle.y, 0.0));
        }

        let contacts = self.world.contact_events().to_vec();

        if self.launched {
            if let Some(v) = self.world.velocity(self.ball) {
                let v = maintain_speed(
                    v.truncate(),
                    self.config.ball_speed,
                    self.config.min_vertical_speed,
                );
                self.world.set_velocity(self.ball, v.extend(0.0));
            }
        }

        let lost = self.launched && self.ball_position().y < 0.0;
        let events = self
            .round
            .settle_step(&mut self.world, &contacts, None, lost);

        if events
            .iter()
            .any(|e| matches!(e, RoundEvent::AttemptLost { .. }))
        {
            self.park_ball();
        }

        events
    }

    fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let (w, h) = (
            self.config.screen_width as f32,
            self.config.screen_height as f32,
        );
        let scale = self.config.pixels_per_meter;

        canvas.begin_frame(BACKGROUND);

        canvas.rect(Vec2::ZERO, Vec2::new(10.0, h), WALL_STRIP);
        canvas.rect(Vec2::new(w - 10.0, 0.0), Vec2::new(10.0, h), WALL_STRIP);
        canvas.rect(Vec2::ZERO, Vec2::new(w, 10.0), WALL_STRIP);

        for brick in self.round.state().active_objects() {
            let size = brick.size.truncate() * scale;
            let top_left = self.to_screen(brick.position) - size / 2.0;
            canvas.rect(top_left, size, brick.color);
            canvas.rect_lines(top_left, size, colors::WHITE);
        }

        let paddle_size = self.config.paddle_size * scale;
        let paddle = self.to_screen(self.paddle_position()) - paddle_size / 2.0;
        canvas.rect(paddle, paddle_size, colors::WHITE);
        canvas.rect(
            paddle + Vec2::new(5.0, 2.0),
            Vec2::new(paddle_size.x - 10.0, 4.0),
            PADDLE_GLOW,
        );

        let ball = self.to_screen(self.ball_position());
        let radius = self.config.ball_radius * scale;
        canvas.circle(ball, radius, colors::WHITE);
        canvas.circle(ball - Vec2::splat(2.0), radius * 0.4, BALL_GLOW);

        canvas.text(
            &format!("SCORE: {}", self.round.score()),
            Vec2::new(20.0, 20.0),
            24.0,
            colors::WHITE,
        );
        canvas.text(
            &format!("LIVES: {}", self.round.attempts()),
            Vec2::new(w - 120.0, 20.0),
            24.0,
            colors::WHITE,
        );

        match self.round.phase() {
            RoundPhase::InProgress => {
                if !self.launched {
                    self.draw_centered(canvas, "Press SPACE to launch", h / 2.0, 20.0, colors::YELLOW);
                }
            }
            phase => {
                let (headline, color) = if phase == RoundPhase::Won {
                    ("YOU WIN!", colors::GREEN)
                } else {
                    ("GAME OVER", colors::RED)
                };
                canvas.rect(Vec2::ZERO, Vec2::new(w, h), OVERLAY);
                self.draw_centered(canvas, headline, h / 2.0 - 50.0, 48.0, color);
                let final_score = format!("Final Score: {}", self.round.score());
                self.draw_centered(canvas, &final_score, h / 2.0 + 10.0, 24.0, colors::WHITE);
                self.draw_centered(canvas, "Press R to Restart", h / 2.0 + 60.0, 20.0, colors::YELLOW);
            }
        }

        canvas.text(
            "A/D or Arrow Keys to Move",
            Vec2::new(20.0, h - 30.0),
            16.0,
            colors::GRAY,
        );

        canvas.end_frame();
    }

    fn autopilot(&self) -> FrameInput {
        if self.round.phase().is_terminal() {
            return FrameInput::default();
        }

        let paddle = self.paddle_position();
        let ball = self.ball_position();

        // Drift the contact point across the paddle so rallies don't loop
        let t = self.ticks as f32 * 0.01;
        let offset = (t.sin() * 0.3 + (t * 0.7).sin() * 0.15) * self.config.paddle_size.x;
        let dx = ball.x + offset - paddle.x;

        FrameInput {
            move_x: if dx.abs() < 0.2 { 0.0 } else { dx.signum() },
            move_z: 0.0,
            launch: !self.launched,
            reset: false,
        }
    }

    fn round(&self) -> Option<&Round> {
        Some(&self.round)
    }
}
