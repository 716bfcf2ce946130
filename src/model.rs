//! Plain state records for everything that scrolls across the playfield.

use crate::world::{
    CANVAS_HEIGHT, GAP, GATE_SIZE, MIN_BOTTOM_HEIGHT, MIN_TOP_HEIGHT, NO_TOUCH_SIZE, PIPE_WIDTH,
    Rect,
};

/// Stable handle the presentation layer keys its render objects by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

pub type GroupId = u32;

/// Progress of a one-time vertical relocation.
///
/// Codes follow the `0 / 1 / 3` contract; no state ever used code 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementStage {
    NotStarted,
    Moving,
    Stopped,
}

impl MovementStage {
    pub const fn code(self) -> u8 {
        match self {
            MovementStage::NotStarted => 0,
            MovementStage::Moving => 1,
            MovementStage::Stopped => 3,
        }
    }
}

/// Slide of an oscillation's center toward a new base height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drift {
    pub target: f64,
    pub speed: f64,
    pub stop_x: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Oscillation {
    pub phase: f64,
    /// Radians per tick.
    pub speed: f64,
    pub amplitude: f64,
    /// `Some` while the center is still sliding; cleared once frozen.
    pub drift: Option<Drift>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetMove {
    pub target: f64,
    /// Pixels per tick.
    pub speed: f64,
    pub stop_x: f64,
    pub stage: MovementStage,
}

/// How a pipe pair's gap moves. Exactly one family applies at a time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionMode {
    Static,
    Oscillating(Oscillation),
    /// Smooth glide to a new height, then a permanent stop.
    TargetMove(TargetMove),
    /// Same as `TargetMove` at a much higher speed.
    Jump(TargetMove),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupMembership {
    pub id: GroupId,
    /// 0 is the leader.
    pub index: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PipePair {
    pub id: EntityId,
    pub x: f64,
    pub base_top: f64,
    pub current_top: f64,
    pub min_top: f64,
    pub min_bottom: f64,
    pub motion: MotionMode,
    pub delay_frames: u32,
    pub frame_count: u32,
    pub group: Option<GroupMembership>,
}

impl PipePair {
    pub fn new(id: EntityId, x: f64) -> Self {
        Self {
            id,
            x,
            base_top: MIN_TOP_HEIGHT,
            current_top: MIN_TOP_HEIGHT,
            min_top: MIN_TOP_HEIGHT,
            min_bottom: MIN_BOTTOM_HEIGHT,
            motion: MotionMode::Static,
            delay_frames: 0,
            frame_count: 0,
            group: None,
        }
    }

    /// A pair pinned at `top` with no motion, as used for staircase members.
    pub fn at_height(id: EntityId, x: f64, top: f64) -> Self {
        Self {
            base_top: top,
            current_top: top,
            ..Self::new(id, x)
        }
    }

    pub fn max_top(&self) -> f64 {
        CANVAS_HEIGHT - GAP - self.min_bottom
    }

    pub fn clamp_top(&self, top: f64) -> f64 {
        top.clamp(self.min_top, self.max_top())
    }

    pub fn right(&self) -> f64 {
        self.x + PIPE_WIDTH
    }

    pub fn is_animated(&self) -> bool {
        !matches!(self.motion, MotionMode::Static)
    }

    pub fn is_oscillating(&self) -> bool {
        matches!(self.motion, MotionMode::Oscillating(_))
    }

    pub fn is_jump_pattern(&self) -> bool {
        matches!(self.motion, MotionMode::Jump(_))
    }

    /// An oscillation drift is pending, or a target/jump glide has a target.
    pub fn has_target_movement(&self) -> bool {
        match self.motion {
            MotionMode::Oscillating(osc) => osc.drift.is_some(),
            MotionMode::TargetMove(_) | MotionMode::Jump(_) => true,
            MotionMode::Static => false,
        }
    }

    pub fn is_moving(&self) -> bool {
        match self.motion {
            MotionMode::Oscillating(osc) => osc.drift.is_some(),
            MotionMode::TargetMove(mv) | MotionMode::Jump(mv) => {
                mv.stage != MovementStage::Stopped
            }
            MotionMode::Static => false,
        }
    }

    pub fn target_top(&self) -> f64 {
        match self.motion {
            MotionMode::Oscillating(Oscillation { drift: Some(d), .. }) => d.target,
            MotionMode::TargetMove(mv) | MotionMode::Jump(mv) => mv.target,
            _ => self.base_top,
        }
    }

    pub fn jump_target_top(&self) -> Option<f64> {
        match self.motion {
            MotionMode::Jump(mv) => Some(mv.target),
            _ => None,
        }
    }

    pub fn target_movement_stage(&self) -> MovementStage {
        match self.motion {
            MotionMode::TargetMove(mv) | MotionMode::Jump(mv) => mv.stage,
            _ => MovementStage::NotStarted,
        }
    }

    pub fn group_id(&self) -> Option<GroupId> {
        self.group.map(|g| g.id)
    }

    pub fn group_index(&self) -> usize {
        self.group.map_or(0, |g| g.index)
    }

    pub fn is_group_leader(&self) -> bool {
        matches!(self.group, Some(GroupMembership { index: 0, .. }))
    }

    pub fn is_group_follower(&self) -> bool {
        matches!(self.group, Some(g) if g.index > 0)
    }

    /// Projects the pair onto the canvas: `(top pipe, bottom pipe)`.
    pub fn geometry(&self) -> PipeGeometry {
        let top = self.clamp_top(self.current_top);
        let bottom_y = top + GAP;
        PipeGeometry {
            top: Rect::new(self.x, 0.0, PIPE_WIDTH, top),
            bottom: Rect::new(self.x, bottom_y, PIPE_WIDTH, CANVAS_HEIGHT - bottom_y),
        }
    }

    /// Bottom edge of the gap, i.e. the top of the lower pipe.
    pub fn gap_bottom(&self) -> f64 {
        self.clamp_top(self.current_top) + GAP
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipeGeometry {
    pub top: Rect,
    pub bottom: Rect,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NoTouchObstacle {
    pub id: EntityId,
    pub x: f64,
    pub base_y: f64,
    pub current_y: f64,
    pub is_oscillating: bool,
    pub amplitude: f64,
    pub phase: f64,
    pub speed: f64,
    pub spawn_x: f64,
}

impl NoTouchObstacle {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.current_y, NO_TOUCH_SIZE, NO_TOUCH_SIZE)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Gate {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub spawn_x: f64,
    pub is_activated: bool,
}

impl Gate {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, GATE_SIZE, GATE_SIZE)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cloud {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Cloud {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Counters the orchestrator keeps across recycles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StageProgress {
    pub total_pipes_passed: u32,
    pub next_group_id: GroupId,
    /// Memoized trigger index for the current phase.
    pub next_no_touch_spawn_at: Option<u32>,
    pub last_spawned_phase: Option<u32>,
    /// Batches since the last gate.
    pub no_touch_spawn_count: u32,
    pub is_night: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::MAX_TOP_HEIGHT;

    #[test]
    fn geometry_keeps_gap_and_clamps() {
        let mut pair = PipePair::at_height(EntityId(1), 300.0, 160.0);
        let g = pair.geometry();
        assert_eq!(g.top.h, 160.0);
        assert_eq!(g.bottom.y - g.top.h, GAP);
        assert_eq!(g.bottom.bottom(), CANVAS_HEIGHT);

        pair.current_top = 999.0;
        let g = pair.geometry();
        assert_eq!(g.top.h, MAX_TOP_HEIGHT);
        assert_eq!(g.bottom.h, MIN_BOTTOM_HEIGHT);

        pair.current_top = -5.0;
        assert_eq!(pair.geometry().top.h, MIN_TOP_HEIGHT);
    }

    #[test]
    fn flags_follow_motion_mode() {
        let mut pair = PipePair::new(EntityId(2), 0.0);
        assert!(!pair.is_animated());
        assert_eq!(pair.target_movement_stage().code(), 0);

        pair.motion = MotionMode::Jump(TargetMove {
            target: 200.0,
            speed: 2.0,
            stop_x: 330.0,
            stage: MovementStage::Moving,
        });
        assert!(pair.is_animated() && pair.is_moving() && pair.is_jump_pattern());
        assert_eq!(pair.jump_target_top(), Some(200.0));
        assert_eq!(pair.target_movement_stage().code(), 1);

        pair.group = Some(GroupMembership { id: 4, index: 0 });
        assert!(pair.is_group_leader());
        assert!(!pair.is_group_follower());
    }
}
