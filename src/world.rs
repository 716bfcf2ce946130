//! Fixed dimensions of the playfield, in world pixels.
//!
//! The simulation runs in an 800x500 world regardless of terminal size; the
//! presentation layer scales it.

pub const CANVAS_WIDTH: f64 = 800.0;
pub const CANVAS_HEIGHT: f64 = 500.0;

// ── Pipes ───────────────────────────────────────────────────────────────────

pub const PIPE_WIDTH: f64 = 80.0;
pub const GAP: f64 = 180.0;
pub const MIN_TOP_HEIGHT: f64 = 100.0;
pub const MIN_BOTTOM_HEIGHT: f64 = 100.0;
pub const MAX_TOP_HEIGHT: f64 = CANVAS_HEIGHT - GAP - MIN_BOTTOM_HEIGHT;
pub const PIPE_SPACING: f64 = 260.0;
pub const GROUP_PIPE_SPACING: f64 = 90.0;
pub const FIRST_PIPE_START_LEFT: f64 = 1100.0;
pub const INITIAL_PIPES: usize = 4;
pub const DEFAULT_PIPE_SPEED: f64 = 5.0;
/// Scroll speed gained per point scored.
pub const SPEED_PER_POINT: f64 = 0.1;

// ── Bird ────────────────────────────────────────────────────────────────────

pub const BIRD_X: f64 = 70.0;
pub const BIRD_START_Y: f64 = 247.0;
pub const BIRD_WIDTH: f64 = 34.0;
pub const BIRD_HEIGHT: f64 = 24.0;

// ── Hazards, gates, scenery ─────────────────────────────────────────────────

pub const NO_TOUCH_SIZE: f64 = 60.0;
pub const NO_TOUCH_SPACING: f64 = 150.0;
/// Horizontal room kept between the last hazard and the next recycled pipe.
pub const NO_TOUCH_CLEARANCE: f64 = 500.0;
pub const GATE_SIZE: f64 = 80.0;
pub const GATE_OFFSET: f64 = 200.0;
pub const CLOUD_SPEED: f64 = 2.0;
pub const CLOUD_COUNT: usize = 4;

// ── Session ─────────────────────────────────────────────────────────────────

/// ~1.2s at a 20ms tick.
pub const START_GRACE_TICKS: u32 = 60;

/// Axis-aligned rectangle in world pixels, origin top-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}
