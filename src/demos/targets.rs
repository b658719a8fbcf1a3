//! Target range
//!
//! 3D arena under gravity. The player slides a kinematic paddle around the
//! near half of the floor and serves a ball at targets scattered across the
//! far half. Clearing every target spawns a new set; the round ends when the
//! ball budget runs out.

use glam::{Vec2, Vec3};

use crate::config::TargetsConfig;
use crate::consts::MAX_FRAME_DT;
use crate::input::FrameInput;
use crate::physics::{ArcadeWorld, BodyDesc, BodyHandle, PhysicsWorld, Shape};
use crate::render::{Camera3d, Canvas};
use crate::sim::{ClearPolicy, Layout, Round, RoundEvent, RoundPhase, Spawner};
use crate::{Color, colors};

use super::Demo;

const BACKGROUND: Color = Color::rgb(40, 40, 50);
const FLOOR: Color = Color::rgb(60, 100, 60);
const WALL: Color = Color::rgba(100, 100, 150, 100);
const PANEL: Color = Color::rgba(0, 0, 0, 150);
const PANEL_DARK: Color = Color::rgba(0, 0, 0, 200);

/// Floor grid spacing in meters
const GRID_STEP: f32 = 2.0;

/// Third-person camera trailing the paddle
pub fn follow_camera(paddle: Vec3) -> Camera3d {
    Camera3d::new(
        Vec3::new(paddle.x, 12.0, paddle.z + 15.0),
        Vec3::new(paddle.x, 2.0, paddle.z - 5.0),
    )
}

/// Target range over any physics world
pub struct TargetRange<W: PhysicsWorld = ArcadeWorld> {
    config: TargetsConfig,
    world: W,
    round: Round,
    paddle: BodyHandle,
    ball: BodyHandle,
    /// Floor, back wall, left wall, right wall
    arena: [BodyHandle; 4],
    in_play: bool,
    camera: Camera3d,
}

impl TargetRange<ArcadeWorld> {
    pub fn new(config: TargetsConfig, seed: u64) -> Self {
        let gravity = Vec3::new(0.0, config.gravity, 0.0);
        Self::with_world(ArcadeWorld::new(gravity), config, seed)
    }
}

impl<W: PhysicsWorld> TargetRange<W> {
    /// Build the arena inside `world`; gravity is the world's business
    pub fn with_world(mut world: W, config: TargetsConfig, seed: u64) -> Self {
        let (w, d) = (config.arena_width, config.arena_depth);
        let half_h = config.wall_height / 2.0;

        let mut fixed = |half: Vec3, at: Vec3| {
            world.create_body(&BodyDesc::fixed(Shape::cuboid(half), at).with_restitution(0.0))
        };
        let arena = [
            fixed(Vec3::new(w / 2.0, 0.5, d / 2.0), Vec3::new(0.0, -0.5, 0.0)),
            fixed(Vec3::new(w / 2.0, half_h, 0.5), Vec3::new(0.0, half_h, -d / 2.0)),
            fixed(Vec3::new(0.5, half_h, d / 2.0), Vec3::new(-w / 2.0, half_h, 0.0)),
            fixed(Vec3::new(0.5, half_h, d / 2.0), Vec3::new(w / 2.0, half_h, 0.0)),
        ];

        let paddle = world.create_body(
            &BodyDesc::kinematic(Shape::cuboid(config.paddle_size / 2.0), config.paddle_start)
                .with_restitution(0.0),
        );
        let ball = world.create_body(
            &BodyDesc::dynamic(
                Shape::ball(config.ball_radius),
                config.paddle_start + config.ball_offset,
            )
            .with_restitution(config.ball_restitution),
        );

        let spawner = Spawner::new(Layout::Scatter(config.targets.clone()), seed);
        let round = Round::start(&mut world, spawner, config.balls, ClearPolicy::Respawn);
        let camera = follow_camera(config.paddle_start);

        Self {
            config,
            world,
            round,
            paddle,
            ball,
            arena,
            in_play: false,
            camera,
        }
    }

    pub fn config(&self) -> &TargetsConfig {
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

    pub fn arena(&self) -> &[BodyHandle; 4] {
        &self.arena
    }

    pub fn camera(&self) -> Camera3d {
        self.camera
    }

    pub fn is_in_play(&self) -> bool {
        self.in_play
    }

    /// Balls left to serve, not counting one already in flight
    pub fn balls_remaining(&self) -> u32 {
        self.round.attempts().saturating_sub(u32::from(self.in_play))
    }

    fn paddle_position(&self) -> Vec3 {
        self.world
            .position(self.paddle)
            .unwrap_or(self.config.paddle_start)
    }

    fn ball_position(&self) -> Vec3 {
        self.world.position(self.ball).unwrap_or(Vec3::ZERO)
    }

    /// Hold the ball at rest just in front of the paddle
    fn park_ball(&mut self) {
        let rest = self.paddle_position() + self.config.ball_offset;
        self.world.set_position(self.ball, rest);
        self.world.set_velocity(self.ball, Vec3::ZERO);
    }

    fn move_paddle(&mut self, input: &FrameInput, dt: f32) {
        let (x_range, z_range) = self.config.paddle_bounds();
        let step = self.config.paddle_speed * dt;
        let p = self.paddle_position();
        let next = Vec3::new(
            (p.x + input.move_x.clamp(-1.0, 1.0) * step).clamp(x_range.x, x_range.y),
            p.y,
            (p.z + input.move_z.clamp(-1.0, 1.0) * step).clamp(z_range.x, z_range.y),
        );
        self.world.set_position(self.paddle, next);
    }

    fn serve(&mut self) {
        self.park_ball();
        self.world.set_velocity(self.ball, self.config.launch_velocity);
        self.in_play = true;
        log::debug!("Ball served, {} left", self.balls_remaining());
    }

    /// New target set and full ball budget; arena, paddle and ball are kept
    fn restart(&mut self) -> RoundEvent {
        let event = self.round.reset(&mut self.world);
        self.in_play = false;
        self.park_ball();
        event
    }
}

impl<W: PhysicsWorld> Demo for TargetRange<W> {
    fn title(&self) -> &str {
        "Target Range"
    }

    fn screen_size(&self) -> (u32, u32) {
        (self.config.screen_width, self.config.screen_height)
    }

    fn update(&mut self, input: &FrameInput, dt: f32) -> Vec<RoundEvent> {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        let mut events = Vec::new();

        if input.reset {
            events.push(self.restart());
        }

        // Nothing but a reset moves once the round is over
        if self.round.phase().is_terminal() {
            self.camera = follow_camera(self.paddle_position());
            return events;
        }

        self.move_paddle(input, dt);

        if input.launch && !self.in_play && self.round.attempts() > 0 {
            self.serve();
        }
        if !self.in_play {
            self.park_ball();
        }

        self.world.step(dt, self.config.substeps);

        if !self.in_play {
            self.park_ball();
        }

        let contacts = self.world.contact_events().to_vec();
        let lost = self.in_play && self.config.is_out_of_bounds(self.ball_position());
        events.extend(
            self.round
                .settle_step(&mut self.world, &contacts, Some(self.ball), lost),
        );

        if lost {
            self.in_play = false;
            self.park_ball();
        }

        self.camera = follow_camera(self.paddle_position());
        events
    }

    fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let (sw, sh) = (
            self.config.screen_width as f32,
            self.config.screen_height as f32,
        );
        let (w, d) = (self.config.arena_width, self.config.arena_depth);
        let wall_h = self.config.wall_height;

        canvas.begin_frame(BACKGROUND);
        canvas.begin_3d(self.camera);

        canvas.plane(Vec3::ZERO, Vec2::new(w, d), FLOOR);
        let mut x = -w / 2.0;
        while x <= w / 2.0 {
            canvas.line_3d(
                Vec3::new(x, 0.01, -d / 2.0),
                Vec3::new(x, 0.01, d / 2.0),
                colors::WHITE,
            );
            x += GRID_STEP;
        }
        let mut z = -d / 2.0;
        while z <= d / 2.0 {
            canvas.line_3d(
                Vec3::new(-w / 2.0, 0.01, z),
                Vec3::new(w / 2.0, 0.01, z),
                colors::WHITE,
            );
            z += GRID_STEP;
        }

        let walls = [
            (Vec3::new(0.0, wall_h / 2.0, -d / 2.0), Vec3::new(w, wall_h, 1.0)),
            (Vec3::new(-w / 2.0, wall_h / 2.0, 0.0), Vec3::new(1.0, wall_h, d)),
            (Vec3::new(w / 2.0, wall_h / 2.0, 0.0), Vec3::new(1.0, wall_h, d)),
        ];
        for (center, size) in walls {
            canvas.cube(center, size, WALL);
            canvas.cube_wires(center, size, colors::BLUE);
        }

        let paddle = self.paddle_position();
        canvas.cube(paddle, self.config.paddle_size, colors::SKYBLUE);
        canvas.cube_wires(paddle, self.config.paddle_size, colors::DARKBLUE);

        let ball = self.ball_position();
        canvas.sphere(ball, self.config.ball_radius, colors::YELLOW);
        canvas.sphere_wires(ball, self.config.ball_radius, 8, 8, colors::ORANGE);

        for target in self.round.state().active_objects() {
            canvas.cube(target.position, target.size, target.color);
            canvas.cube_wires(target.position, target.size, colors::BLACK);
        }

        canvas.end_3d();

        // Status panel
        canvas.rect(Vec2::new(10.0, 10.0), Vec2::new(250.0, 120.0), PANEL);
        canvas.rect_lines(Vec2::new(10.0, 10.0), Vec2::new(250.0, 120.0), colors::WHITE);
        canvas.text("TARGET RANGE", Vec2::new(20.0, 20.0), 20.0, colors::WHITE);
        canvas.text(
            &format!("Score: {}", self.round.score()),
            Vec2::new(20.0, 50.0),
            20.0,
            colors::YELLOW,
        );
        canvas.text(
            &format!("Balls: {}", self.balls_remaining()),
            Vec2::new(20.0, 75.0),
            20.0,
            colors::SKYBLUE,
        );
        if !self.in_play && self.round.phase() == RoundPhase::InProgress {
            canvas.text(
                "Press SPACE to launch!",
                Vec2::new(20.0, 100.0),
                16.0,
                colors::GREEN,
            );
        }

        // Controls
        let help = Vec2::new(sw - 220.0, 10.0);
        canvas.rect(help, Vec2::new(210.0, 100.0), PANEL);
        canvas.rect_lines(help, Vec2::new(210.0, 100.0), colors::WHITE);
        canvas.text("Controls:", help + Vec2::new(10.0, 10.0), 16.0, colors::WHITE);
        let lines = [
            "WASD/Arrows - Move paddle",
            "SPACE - Launch ball",
            "R - Reset game",
        ];
        for (i, line) in lines.iter().enumerate() {
            let at = help + Vec2::new(10.0, 30.0 + 18.0 * i as f32);
            canvas.text(line, at, 14.0, colors::GRAY);
        }

        // Point legend, highest tier first
        let mut tiers = self.config.targets.tiers.clone();
        tiers.sort_by(|a, b| b.min_height.total_cmp(&a.min_height));
        let legend_h = 26.0 + 18.0 * tiers.len() as f32;
        let legend = Vec2::new(10.0, sh - legend_h - 10.0);
        canvas.rect(legend, Vec2::new(180.0, legend_h), PANEL);
        canvas.rect_lines(legend, Vec2::new(180.0, legend_h), colors::WHITE);
        canvas.text("Target Points:", legend + Vec2::new(10.0, 8.0), 14.0, colors::WHITE);
        for (i, tier) in tiers.iter().enumerate() {
            let row = legend + Vec2::new(10.0, 26.0 + 18.0 * i as f32);
            canvas.rect(row, Vec2::splat(15.0), tier.color);
            canvas.text(
                &format!("{} pts", tier.points),
                row + Vec2::new(20.0, 0.0),
                14.0,
                tier.color,
            );
        }

        if self.round.phase() == RoundPhase::Lost {
            let panel = Vec2::new(sw / 2.0 - 150.0, sh / 2.0 - 60.0);
            canvas.rect(panel, Vec2::new(300.0, 120.0), PANEL_DARK);
            canvas.rect_lines(panel, Vec2::new(300.0, 120.0), colors::RED);
            canvas.text(
                "GAME OVER",
                Vec2::new(sw / 2.0 - 80.0, sh / 2.0 - 40.0),
                30.0,
                colors::RED,
            );
            canvas.text(
                &format!("Final Score: {}", self.round.score()),
                Vec2::new(sw / 2.0 - 75.0, sh / 2.0),
                20.0,
                colors::WHITE,
            );
            canvas.text(
                "Press R to restart",
                Vec2::new(sw / 2.0 - 70.0, sh / 2.0 + 30.0),
                16.0,
                colors::YELLOW,
            );
        }

        canvas.end_frame();
    }

    fn autopilot(&self) -> FrameInput {
        if self.round.phase().is_terminal() {
            return FrameInput::default();
        }

        // Line up with the nearest live target, serve once aligned
        let paddle = self.paddle_position();
        let aim = self
            .round
            .state()
            .active_objects()
            .map(|t| t.position.x)
            .min_by(|a, b| (a - paddle.x).abs().total_cmp(&(b - paddle.x).abs()))
            .unwrap_or(0.0);
        let dx = aim - paddle.x;
        let aligned = dx.abs() < 0.25;

        FrameInput {
            move_x: if aligned { 0.0 } else { dx.signum() },
            move_z: 0.0,
            launch: aligned && !self.in_play,
            reset: false,
        }
    }

    fn round(&self) -> Option<&Round> {
        Some(&self.round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawList;
    use crate::sim::ScatterLayout;

    const DT: f32 = 1.0 / 60.0;

    fn press(launch: bool, reset: bool) -> FrameInput {
        FrameInput {
            launch,
            reset,
            ..FrameInput::default()
        }
    }

    fn lose_ball(demo: &mut TargetRange) -> Vec<RoundEvent> {
        let ball = demo.ball();
        demo.world_mut().set_position(ball, Vec3::new(0.0, -5.0, 0.0));
        demo.update(&FrameInput::default(), DT)
    }

    #[test]
    fn test_setup() {
        let demo = TargetRange::new(TargetsConfig::default(), 1);
        let round = demo.round().expect("round");
        assert_eq!(round.state().active_count(), 5);
        assert_eq!(round.attempts(), 10);
        assert_eq!(round.policy(), ClearPolicy::Respawn);
        // arena, paddle, ball, targets
        assert_eq!(demo.world().body_count(), 11);
        assert!(!demo.is_in_play());
    }

    #[test]
    fn test_serve_uses_launch_velocity() {
        let mut demo = TargetRange::new(TargetsConfig::default(), 1);
        demo.update(&press(true, false), DT);

        assert!(demo.is_in_play());
        assert_eq!(demo.balls_remaining(), 9);
        assert_eq!(demo.round().map(|r| r.attempts()), Some(10));
        let v = demo.world().velocity(demo.ball()).expect("ball");
        assert!((v.z - -15.0).abs() < 1.0e-3);
        assert!(v.y < 3.0 && v.y > 2.0);
    }

    #[test]
    fn test_parked_ball_rides_with_paddle() {
        let mut demo = TargetRange::new(TargetsConfig::default(), 1);
        let left = FrameInput {
            move_x: -1.0,
            ..FrameInput::default()
        };
        for _ in 0..30 {
            demo.update(&left, DT);
        }
        let paddle = demo.world().position(demo.paddle()).expect("paddle");
        let ball = demo.world().position(demo.ball()).expect("ball");
        assert!((ball - (paddle + demo.config().ball_offset)).length() < 1.0e-4);
    }

    #[test]
    fn test_paddle_clamped_to_bounds() {
        let mut demo = TargetRange::new(TargetsConfig::default(), 1);
        let corner = FrameInput {
            move_x: 1.0,
            move_z: 1.0,
            ..FrameInput::default()
        };
        for _ in 0..600 {
            demo.update(&corner, DT);
        }
        let paddle = demo.world().position(demo.paddle()).expect("paddle");
        let (x, z) = demo.config().paddle_bounds();
        assert!((paddle.x - x.y).abs() < 1.0e-4);
        assert!((paddle.z - z.y).abs() < 1.0e-4);
    }

    #[test]
    fn test_out_of_bounds_costs_a_ball() {
        let mut demo = TargetRange::new(TargetsConfig::default(), 1);
        demo.update(&press(true, false), DT);
        let events = lose_ball(&mut demo);

        assert!(events.contains(&RoundEvent::AttemptLost { remaining: 9 }));
        assert!(!demo.is_in_play());
        assert_eq!(demo.balls_remaining(), 9);
    }

    #[test]
    fn test_budget_runs_out_and_serving_stops() {
        let mut demo = TargetRange::new(TargetsConfig::default(), 1);
        for _ in 0..10 {
            demo.update(&press(true, false), DT);
            lose_ball(&mut demo);
        }
        assert_eq!(demo.round().map(|r| r.phase()), Some(RoundPhase::Lost));

        demo.update(&press(true, false), DT);
        assert!(!demo.is_in_play());

        let mut canvas = DrawList::new();
        demo.draw(&mut canvas);
        assert!(canvas.contains_text("GAME OVER"));
    }

    fn lose_every_ball(demo: &mut TargetRange) {
        for _ in 0..demo.config().balls {
            demo.update(&press(true, false), DT);
            lose_ball(demo);
        }
        assert_eq!(demo.round().map(|r| r.phase()), Some(RoundPhase::Lost));
    }

    #[test]
    fn test_lost_round_freezes_paddle_and_ball() {
        let mut demo = TargetRange::new(TargetsConfig::default(), 1);
        lose_every_ball(&mut demo);

        let paddle = demo.world().position(demo.paddle()).expect("paddle");
        let ball = demo.world().position(demo.ball()).expect("ball");
        let right = FrameInput {
            move_x: 1.0,
            launch: true,
            ..FrameInput::default()
        };
        for _ in 0..30 {
            assert!(demo.update(&right, DT).is_empty());
        }

        assert_eq!(demo.world().position(demo.paddle()), Some(paddle));
        assert_eq!(demo.world().position(demo.ball()), Some(ball));
        assert!(!demo.is_in_play());
    }

    #[test]
    fn test_reset_after_game_over_restores_play() {
        let mut demo = TargetRange::new(TargetsConfig::default(), 1);
        lose_every_ball(&mut demo);

        let events = demo.update(&press(false, true), DT);
        assert_eq!(events.first(), Some(&RoundEvent::Reset));
        let round = demo.round().expect("round");
        assert_eq!(round.phase(), RoundPhase::InProgress);
        assert_eq!(round.attempts(), 10);
        assert_eq!(round.state().active_count(), 5);
        assert_eq!(demo.world().body_count(), 11);

        demo.update(&press(true, false), DT);
        assert!(demo.is_in_play());
        assert_eq!(demo.balls_remaining(), 9);
    }

    #[test]
    fn test_reset_any_time() {
        let mut demo = TargetRange::new(TargetsConfig::default(), 1);
        demo.update(&press(true, false), DT);
        assert!(demo.is_in_play());

        let events = demo.update(&press(false, true), DT);
        assert_eq!(events.first(), Some(&RoundEvent::Reset));
        assert!(!demo.is_in_play());
        assert_eq!(demo.round().map(|r| r.attempts()), Some(10));
        assert_eq!(demo.world().body_count(), 11);
    }

    #[test]
    fn test_hit_scores_and_clearing_respawns() {
        let config = TargetsConfig {
            targets: ScatterLayout {
                count: 1,
                ..ScatterLayout::default()
            },
            ..TargetsConfig::default()
        };
        let mut demo = TargetRange::new(config, 4);
        demo.update(&press(true, false), DT);

        let target = demo.round().expect("round").state().objects()[0];
        let ball = demo.ball();
        demo.world_mut()
            .set_position(ball, target.position + Vec3::new(0.0, 0.0, 0.6));
        let events = demo.update(&FrameInput::default(), DT);

        assert!(events.contains(&RoundEvent::ObjectDestroyed {
            handle: target.handle,
            points: target.points,
        }));
        assert!(events.contains(&RoundEvent::Respawned { wave: 1 }));
        let round = demo.round().expect("round");
        assert_eq!(round.score(), u64::from(target.points));
        assert_eq!(round.state().active_count(), 1);
        assert_eq!(round.phase(), RoundPhase::InProgress);
    }

    #[test]
    fn test_camera_follows_paddle() {
        let mut demo = TargetRange::new(TargetsConfig::default(), 1);
        let right = FrameInput {
            move_x: 1.0,
            ..FrameInput::default()
        };
        demo.update(&right, DT);
        let paddle = demo.world().position(demo.paddle()).expect("paddle");
        assert_eq!(demo.camera(), follow_camera(paddle));
    }

    #[test]
    fn test_hud_counts_ball_in_flight() {
        let mut demo = TargetRange::new(TargetsConfig::default(), 1);
        demo.update(&press(true, false), DT);
        let mut canvas = DrawList::new();
        demo.draw(&mut canvas);
        assert!(canvas.contains_text("Balls: 9"));
        assert!(canvas.contains_text("30 pts"));
    }
}
