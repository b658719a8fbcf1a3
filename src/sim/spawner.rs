//! Entity spawner
//!
//! Builds the scoreable set for a round from a layout policy: a fixed grid
//! whose point values follow the row, or a seeded scatter whose point values
//! follow height tiers. Every spawn creates fresh physics bodies.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::Color;
use crate::colors;
use crate::physics::{BodyHandle, PhysicsWorld, Shape};

use super::state::Scoreable;

/// Rows x columns of equally sized bricks, centered horizontally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    pub rows: u32,
    pub cols: u32,
    /// Brick width and height
    pub cell: Vec2,
    /// Gap between neighbouring bricks
    pub spacing: f32,
    /// Depth of the brick body (bricks live in the z = 0 plane)
    pub depth: f32,
    /// Width of the field the grid is centered in
    pub field_width: f32,
    /// Center height of the top row
    pub top: f32,
    /// Points per row step: row `r` is worth `(rows - r) * point_scale`
    pub point_scale: u32,
    /// Row colors, top to bottom; rows past the end use the last entry
    pub palette: Vec<Color>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 10,
            cell: Vec2::new(1.8, 0.5),
            spacing: 0.15,
            depth: 1.0,
            field_width: 800.0 / 30.0,
            top: 600.0 / 30.0 - 4.0,
            point_scale: 10,
            palette: vec![
                colors::RED,
                colors::ORANGE,
                colors::YELLOW,
                colors::GREEN,
                colors::BLUE,
                colors::PURPLE,
            ],
        }
    }
}

impl GridLayout {
    pub fn count(&self) -> usize {
        (self.rows as usize).saturating_mul(self.cols as usize)
    }

    /// Point value of a row (row 0 is the top)
    pub fn row_points(&self, row: u32) -> u32 {
        self.rows.saturating_sub(row).saturating_mul(self.point_scale)
    }

    pub fn row_color(&self, row: u32) -> Color {
        self.palette
            .get(row as usize)
            .or(self.palette.last())
            .copied()
            .unwrap_or(colors::WHITE)
    }

    /// Center of the brick at (row, col)
    pub fn cell_center(&self, row: u32, col: u32) -> Vec3 {
        let pitch = self.cell + Vec2::splat(self.spacing);
        let total_width = self.cols as f32 * pitch.x - self.spacing;
        let start_x = (self.field_width - total_width) / 2.0 + self.cell.x / 2.0;
        Vec3::new(
            start_x + col as f32 * pitch.x,
            self.top - row as f32 * pitch.y,
            0.0,
        )
    }
}

/// A height band of the scatter layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightTier {
    /// Objects at or above this height fall in the tier
    pub min_height: f32,
    pub points: u32,
    pub color: Color,
}

/// Seeded random placement inside integer coordinate ranges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterLayout {
    pub count: u32,
    /// Inclusive integer ranges per axis
    pub x: (i32, i32),
    pub y: (i32, i32),
    pub z: (i32, i32),
    /// Edge length of the cube body
    pub size: f32,
    /// Checked highest first; the lowest tier also catches anything below it
    pub tiers: Vec<HeightTier>,
}

impl Default for ScatterLayout {
    fn default() -> Self {
        let (width, depth) = (20.0_f32, 30.0_f32);
        Self {
            count: 5,
            x: ((-width / 2.0 + 2.0) as i32, (width / 2.0 - 2.0) as i32),
            y: (1, 4),
            z: ((-depth / 2.0) as i32, (-depth / 4.0) as i32),
            size: 1.0,
            tiers: vec![
                HeightTier {
                    min_height: 3.0,
                    points: 30,
                    color: colors::GOLD,
                },
                HeightTier {
                    min_height: 2.0,
                    points: 20,
                    color: colors::RED,
                },
                HeightTier {
                    min_height: 0.0,
                    points: 10,
                    color: colors::GREEN,
                },
            ],
        }
    }
}

impl ScatterLayout {
    /// Points and color for an object placed at `height`
    pub fn tier_for(&self, height: f32) -> (u32, Color) {
        let mut tiers: Vec<&HeightTier> = self.tiers.iter().collect();
        tiers.sort_by(|a, b| b.min_height.total_cmp(&a.min_height));
        tiers
            .iter()
            .find(|t| height >= t.min_height)
            .or(tiers.last())
            .map(|t| (t.points, t.color))
            .unwrap_or((0, colors::WHITE))
    }
}

/// Placement policy for a round's scoreables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Layout {
    Grid(GridLayout),
    Scatter(ScatterLayout),
}

impl Layout {
    /// Number of objects every spawn produces
    pub fn count(&self) -> usize {
        match self {
            Layout::Grid(grid) => grid.count(),
            Layout::Scatter(scatter) => scatter.count as usize,
        }
    }
}

/// Creates scoreable sets and tears them down again
#[derive(Debug, Clone)]
pub struct Spawner {
    layout: Layout,
    rng: Pcg32,
}

impl Spawner {
    pub fn new(layout: Layout, seed: u64) -> Self {
        Self {
            layout,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn target_count(&self) -> usize {
        self.layout.count()
    }

    /// Create a fresh set of scoreables, each backed by a new static body
    pub fn spawn<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) -> Vec<Scoreable> {
        let objects = match &self.layout {
            Layout::Grid(grid) => spawn_grid(grid, world),
            Layout::Scatter(scatter) => spawn_scatter(scatter, &mut self.rng, world),
        };
        log::debug!("Spawned {} scoreables", objects.len());
        objects
    }

    /// Release every handle in `handles`, returning how many were live
    pub fn release_all<W: PhysicsWorld + ?Sized>(handles: &[BodyHandle], world: &mut W) -> usize {
        handles.iter().filter(|&&h| world.destroy_body(h)).count()
    }
}

fn spawn_grid<W: PhysicsWorld + ?Sized>(grid: &GridLayout, world: &mut W) -> Vec<Scoreable> {
    let half = Vec3::new(grid.cell.x / 2.0, grid.cell.y / 2.0, grid.depth / 2.0);
    let mut objects = Vec::with_capacity(grid.count());

    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let position = grid.cell_center(row, col);
            objects.push(Scoreable {
                handle: world.create_static_body(Shape::cuboid(half), position),
                position,
                size: half * 2.0,
                color: grid.row_color(row),
                points: grid.row_points(row),
                active: true,
            });
        }
    }

    objects
}

fn spawn_scatter<W: PhysicsWorld + ?Sized>(
    scatter: &ScatterLayout,
    rng: &mut Pcg32,
    world: &mut W,
) -> Vec<Scoreable> {
    let size = Vec3::splat(scatter.size);
    (0..scatter.count)
        .map(|_| {
            let position = Vec3::new(
                random_in(rng, scatter.x) as f32,
                random_in(rng, scatter.y) as f32,
                random_in(rng, scatter.z) as f32,
            );
            let (points, color) = scatter.tier_for(position.y);
            Scoreable {
                handle: world.create_static_body(Shape::cuboid(size / 2.0), position),
                position,
                size,
                color,
                points,
                active: true,
            }
        })
        .collect()
}

/// Inclusive range draw that tolerates reversed bounds
fn random_in(rng: &mut Pcg32, (lo, hi): (i32, i32)) -> i32 {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    rng.random_range(lo..=hi)
}
