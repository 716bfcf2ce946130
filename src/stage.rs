//! Scrolling, recycling and spawning of everything the bird flies past.

use crate::animation::apply_pipe_animation;
use crate::generator::{randomize_pipe, randomize_pipe_animation_only};
use crate::model::{
    Cloud, EntityId, Gate, GroupId, GroupMembership, NoTouchObstacle, PipePair, StageProgress,
};
use crate::rng::RandomSource;
use crate::world::{
    CANVAS_HEIGHT, CANVAS_WIDTH, CLOUD_SPEED, FIRST_PIPE_START_LEFT, GAP, GATE_OFFSET, GATE_SIZE,
    GROUP_PIPE_SPACING, MAX_TOP_HEIGHT, MIN_BOTTOM_HEIGHT, MIN_TOP_HEIGHT, NO_TOUCH_CLEARANCE,
    NO_TOUCH_SPACING, PIPE_SPACING, PIPE_WIDTH, Rect, SPEED_PER_POINT,
};
use std::collections::HashMap;
use std::f64::consts::TAU;
use tracing::debug;

/// Staircase members never start closer than this to the top.
const STAIR_TOP_MARGIN: f64 = 50.0;
const ANIMATED_STAIR_STEP: f64 = 20.0;
const STATIC_STAIR_STEP: f64 = 50.0;
const PIPES_PER_PHASE: u32 = 10;
const MAX_HAZARDS_PER_BATCH: u32 = 9;
const HAZARD_OSCILLATION_CHANCE: f64 = 0.6;
const NO_TOUCH_OFFSCREEN_X: f64 = -100.0;
const GATE_OFFSCREEN_X: f64 = -150.0;
const CLOUD_OFFSCREEN_X: f64 = -150.0;

/// Something the orchestrator did during a tick that the driver reacts to.
#[derive(Clone, Debug, PartialEq)]
pub enum StageEvent {
    PipePassed {
        total: u32,
    },
    GroupSpawned {
        group: GroupId,
        size: usize,
        ascending: bool,
        animated: bool,
    },
    HazardsSpawned {
        phase: u32,
        count: u32,
    },
    GateSpawned {
        x: f64,
    },
}

/// Output of the staircase layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Staircase {
    pub tops: Vec<f64>,
    pub ascending: bool,
    pub step: f64,
}

pub struct Stage {
    pipes: Vec<PipePair>,
    no_touch: Vec<NoTouchObstacle>,
    gates: Vec<Gate>,
    clouds: Vec<Cloud>,
    progress: StageProgress,
    pipe_speed: f64,
    next_entity: u64,
}

impl Stage {
    pub fn new(pipe_speed: f64) -> Self {
        Self {
            pipes: Vec::new(),
            no_touch: Vec::new(),
            gates: Vec::new(),
            clouds: Vec::new(),
            progress: StageProgress::default(),
            pipe_speed,
            next_entity: 0,
        }
    }

    /// Clears every entity and counter. Day mode is restored too.
    pub fn reset(&mut self) {
        self.pipes.clear();
        self.no_touch.clear();
        self.gates.clear();
        self.clouds.clear();
        self.progress = StageProgress::default();
    }

    /// Initial fill: `pipes` pairs from the first start x, plus the clouds.
    pub fn populate(&mut self, pipes: usize, clouds: usize, rng: &mut dyn RandomSource) {
        for i in 0..pipes {
            self.create_pipe_pair(FIRST_PIPE_START_LEFT + i as f64 * PIPE_SPACING, 0, rng);
        }
        for i in 0..clouds {
            let cloud = Cloud {
                id: self.next_id(),
                x: 200.0 + i as f64 * 250.0,
                y: rng.next_range(20, 150) as f64,
                width: rng.next_range(110, 180) as f64,
                height: rng.next_range(50, 90) as f64,
            };
            self.clouds.push(cloud);
        }
    }

    fn next_id(&mut self) -> EntityId {
        self.next_entity += 1;
        EntityId(self.next_entity)
    }

    pub fn pipes(&self) -> &[PipePair] {
        &self.pipes
    }

    pub fn pipes_mut(&mut self) -> &mut [PipePair] {
        &mut self.pipes
    }

    pub fn no_touch(&self) -> &[NoTouchObstacle] {
        &self.no_touch
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    pub fn progress(&self) -> &StageProgress {
        &self.progress
    }

    pub fn is_night(&self) -> bool {
        self.progress.is_night
    }

    pub fn toggle_day_night(&mut self) -> bool {
        self.progress.is_night = !self.progress.is_night;
        self.progress.is_night
    }

    pub fn set_night(&mut self, night: bool) {
        self.progress.is_night = night;
    }

    pub fn pipe_speed(&self) -> f64 {
        self.pipe_speed
    }

    pub fn set_pipe_speed(&mut self, speed: f64) {
        self.pipe_speed = speed;
    }

    pub fn scroll_speed(&self, score: u32) -> f64 {
        self.pipe_speed + score as f64 * SPEED_PER_POINT
    }

    pub fn create_pipe_pair(&mut self, x: f64, score: u32, rng: &mut dyn RandomSource) -> EntityId {
        let id = self.next_id();
        let mut pair = PipePair::new(id, x);
        randomize_pipe(&mut pair, score, rng);
        self.pipes.push(pair);
        id
    }

    /// One simulation tick. `score` is the score before this tick's points.
    pub fn advance(&mut self, score: u32, rng: &mut dyn RandomSource) -> Vec<StageEvent> {
        let speed = self.scroll_speed(score);
        let mut events = Vec::new();

        for pair in &mut self.pipes {
            pair.x -= speed;
        }
        self.align_followers();
        for pair in &mut self.pipes {
            apply_pipe_animation(pair);
        }
        self.update_no_touch(speed);
        for gate in &mut self.gates {
            gate.x -= speed;
        }
        self.update_clouds(rng);

        let mut passed = 0;
        while let Some(index) = self.next_recyclable() {
            self.recycle(index, score + passed, rng, &mut events);
            passed += 1;
        }

        self.no_touch.retain(|n| n.x >= NO_TOUCH_OFFSCREEN_X);
        self.gates.retain(|g| g.x >= GATE_OFFSCREEN_X);
        events
    }

    fn align_followers(&mut self) {
        let leaders: HashMap<GroupId, f64> = self
            .pipes
            .iter()
            .filter(|p| p.is_group_leader())
            .filter_map(|p| p.group_id().map(|id| (id, p.x)))
            .collect();
        for pair in &mut self.pipes {
            if let Some(GroupMembership { id, index }) = pair.group {
                if let Some(leader_x) = leaders.get(&id) {
                    pair.x = leader_x + index as f64 * GROUP_PIPE_SPACING;
                }
            }
        }
    }

    fn update_no_touch(&mut self, speed: f64) {
        for hazard in &mut self.no_touch {
            hazard.x -= speed;
            if hazard.is_oscillating {
                hazard.phase += hazard.speed;
                hazard.current_y = hazard.base_y + hazard.phase.sin() * hazard.amplitude;
            }
        }
    }

    fn update_clouds(&mut self, rng: &mut dyn RandomSource) {
        for cloud in &mut self.clouds {
            cloud.x -= CLOUD_SPEED;
            if cloud.x < CLOUD_OFFSCREEN_X {
                cloud.x = 1000.0 + rng.next_range(0, 200) as f64;
                cloud.y = rng.next_range(20, 150) as f64;
            }
        }
    }

    /// Rightmost edge of the group `pair` leads, or of `pair` alone.
    fn trailing_right(&self, pair: &PipePair) -> f64 {
        match pair.group_id() {
            Some(id) => self
                .pipes
                .iter()
                .filter(|p| p.group_id() == Some(id))
                .map(PipePair::right)
                .fold(pair.right(), f64::max),
            None => pair.right(),
        }
    }

    /// Singles and leaders whose whole formation has left the screen.
    ///
    /// A group recycles once its trailing member is off screen, taking the
    /// leader and every follower with it.
    fn next_recyclable(&self) -> Option<usize> {
        self.pipes
            .iter()
            .position(|p| !p.is_group_follower() && self.trailing_right(p) < 0.0)
    }

    /// Where the next recycled pipe goes.
    pub fn recycle_x(&self) -> f64 {
        let Some(farthest_pipe) = self.pipes.iter().map(|p| p.x).reduce(f64::max) else {
            return FIRST_PIPE_START_LEFT;
        };
        let anchor = match self.no_touch.iter().map(|n| n.x).reduce(f64::max) {
            Some(hazard_x) => farthest_pipe.max(hazard_x + NO_TOUCH_CLEARANCE),
            None => farthest_pipe,
        };
        (anchor + PIPE_SPACING).max(CANVAS_WIDTH)
    }

    fn recycle(
        &mut self,
        index: usize,
        score: u32,
        rng: &mut dyn RandomSource,
        events: &mut Vec<StageEvent>,
    ) {
        let old = self.pipes.remove(index);
        if let Some(group) = old.group_id() {
            self.pipes.retain(|p| p.group_id() != Some(group));
        }

        let x = self.recycle_x();
        let mut right = x + PIPE_WIDTH;
        let mut grouped = false;
        if should_create_group(score, rng) {
            let size = group_size(score, rng);
            let animated = rng.chance(0.5);
            let stairs = generate_group_heights(size, animated, rng);
            if stairs.tops.len() >= 2 {
                let group = self.spawn_group(x, &stairs, animated, score, rng);
                right = x + (stairs.tops.len() - 1) as f64 * GROUP_PIPE_SPACING + PIPE_WIDTH;
                debug!(group, size = stairs.tops.len(), ascending = stairs.ascending, animated, x, "staircase spawned");
                events.push(StageEvent::GroupSpawned {
                    group,
                    size: stairs.tops.len(),
                    ascending: stairs.ascending,
                    animated,
                });
                grouped = true;
            }
        }
        if !grouped {
            self.create_pipe_pair(x, score, rng);
        }

        self.progress.total_pipes_passed += 1;
        let total = self.progress.total_pipes_passed;
        debug!(total, x, "pipe recycled");
        events.push(StageEvent::PipePassed { total });

        if let Some((phase, count)) = self.schedule_no_touch(rng) {
            events.push(StageEvent::HazardsSpawned { phase, count });
            if let Some(gate_x) = self.spawn_no_touch_group(count, right + NO_TOUCH_SPACING, rng) {
                events.push(StageEvent::GateSpawned { x: gate_x });
            }
        }
    }

    fn spawn_group(
        &mut self,
        x: f64,
        stairs: &Staircase,
        animated: bool,
        score: u32,
        rng: &mut dyn RandomSource,
    ) -> GroupId {
        let group = self.progress.next_group_id;
        self.progress.next_group_id += 1;
        for (index, &top) in stairs.tops.iter().enumerate() {
            let id = self.next_id();
            let mut pair = PipePair::at_height(id, x + index as f64 * GROUP_PIPE_SPACING, top);
            pair.group = Some(GroupMembership { id: group, index });
            if animated {
                randomize_pipe_animation_only(&mut pair, score, rng);
            }
            self.pipes.push(pair);
        }
        group
    }

    /// Decides whether this recycle triggers a hazard batch: `(phase, count)`.
    ///
    /// Each phase of ten passed pipes memoizes one trigger index and spawns at
    /// most once.
    fn schedule_no_touch(&mut self, rng: &mut dyn RandomSource) -> Option<(u32, u32)> {
        let total = self.progress.total_pipes_passed;
        if total <= PIPES_PER_PHASE {
            return None;
        }
        let phase = (total - 1) / PIPES_PER_PHASE;
        let count = phase.min(MAX_HAZARDS_PER_BATCH);
        if count == 0 || self.progress.last_spawned_phase == Some(phase) {
            return None;
        }

        let trigger = match self.progress.next_no_touch_spawn_at {
            Some(at) => at,
            None => {
                let first = phase * PIPES_PER_PHASE + 1;
                let last = (phase + 1) * PIPES_PER_PHASE;
                let at = rng.next_range(first as i32, last as i32 + 1) as u32;
                self.progress.next_no_touch_spawn_at = Some(at);
                at
            }
        };

        if total < trigger {
            return None;
        }
        self.progress.last_spawned_phase = Some(phase);
        self.progress.next_no_touch_spawn_at = None;
        Some((phase, count))
    }

    /// Spawns `count` hazards 150px apart. Returns the gate x when this batch
    /// also earns a gate.
    fn spawn_no_touch_group(
        &mut self,
        count: u32,
        start_x: f64,
        rng: &mut dyn RandomSource,
    ) -> Option<f64> {
        for i in 0..count {
            let x = start_x + i as f64 * NO_TOUCH_SPACING;
            let y = rng.next_range(80, CANVAS_HEIGHT as i32 - 120) as f64;
            let hazard = NoTouchObstacle {
                id: self.next_id(),
                x,
                base_y: y,
                current_y: y,
                is_oscillating: rng.chance(HAZARD_OSCILLATION_CHANCE),
                amplitude: rng.next_range(25, 50) as f64,
                phase: rng.next_f64() * TAU,
                speed: 0.03 + rng.next_f64() * 0.02,
                spawn_x: x,
            };
            self.no_touch.push(hazard);
        }
        debug!(count, start_x, "no-touch batch spawned");

        self.progress.no_touch_spawn_count += 1;
        if self.progress.no_touch_spawn_count < 2 {
            return None;
        }
        self.progress.no_touch_spawn_count = 0;
        let gate_x = start_x + count as f64 * NO_TOUCH_SPACING + GATE_OFFSET;
        self.spawn_gate(gate_x);
        Some(gate_x)
    }

    /// Places an inactive gate at `x`, centred vertically.
    pub fn spawn_gate(&mut self, x: f64) -> EntityId {
        let id = self.next_id();
        self.gates.push(Gate {
            id,
            x,
            y: (CANVAS_HEIGHT - GATE_SIZE) / 2.0,
            spawn_x: x,
            is_activated: false,
        });
        debug!(x, "gate spawned");
        id
    }

    pub fn pipe_hit(&self, bird: &Rect) -> bool {
        self.pipes.iter().any(|p| {
            let g = p.geometry();
            g.top.intersects(bird) || g.bottom.intersects(bird)
        })
    }

    pub fn no_touch_hit(&self, bird: &Rect) -> bool {
        self.no_touch.iter().any(|n| n.bounds().intersects(bird))
    }

    /// Gates whose left edge lies within `radius` of `x`.
    pub fn gates_near(&self, x: f64, radius: f64) -> impl Iterator<Item = &Gate> {
        self.gates.iter().filter(move |g| (g.x - x).abs() < radius)
    }

    /// Latches the first inactive nearby gate the bird overlaps and flips day
    /// and night. Returns the new night flag when a toggle happened.
    pub fn activate_gates(&mut self, bird: &Rect, radius: f64) -> Option<bool> {
        let id = self
            .gates_near(bird.x, radius)
            .find(|g| !g.is_activated && g.bounds().intersects(bird))?
            .id;
        let gate = self.gates.iter_mut().find(|g| g.id == id)?;
        gate.is_activated = true;
        Some(self.toggle_day_night())
    }
}

pub fn should_create_group(score: u32, rng: &mut dyn RandomSource) -> bool {
    if score < 15 {
        return false;
    }
    let chance = if score >= 50 { 0.65 } else { 0.45 };
    rng.chance(chance)
}

pub fn group_size(score: u32, rng: &mut dyn RandomSource) -> usize {
    match score {
        15..=40 => rng.next_range(2, 4) as usize,
        41.. => 4,
        _ => 1,
    }
}

/// Lays out a staircase of top heights.
///
/// Each member is derived from the previous member's bottom edge so the gap
/// edges step by exactly `step`. The layout stops early rather than leave the
/// canvas; callers treat fewer than two tops as no group.
pub fn generate_group_heights(size: usize, animated: bool, rng: &mut dyn RandomSource) -> Staircase {
    let ascending = rng.chance(0.5);
    let step = if animated {
        ANIMATED_STAIR_STEP
    } else {
        STATIC_STAIR_STEP
    };
    let lowest_top = MIN_TOP_HEIGHT + STAIR_TOP_MARGIN;
    let max_bottom = CANVAS_HEIGHT - MIN_BOTTOM_HEIGHT;

    let mut tops = Vec::with_capacity(size);
    let mut current = if ascending {
        MIN_TOP_HEIGHT + rng.next_range(50, 150) as f64
    } else {
        max_bottom - rng.next_range(0, 100) as f64 - GAP
    }
    .clamp(lowest_top, MAX_TOP_HEIGHT);
    tops.push(current);

    for _ in 1..size {
        let previous_bottom = current + GAP;
        let next_bottom = if ascending {
            previous_bottom + step
        } else {
            previous_bottom - step
        };
        let next_top = next_bottom - GAP;
        if next_top < lowest_top || next_bottom > max_bottom {
            break;
        }
        tops.push(next_top);
        current = next_top;
    }

    Staircase {
        tops,
        ascending,
        step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Scripted;
    use crate::world::INITIAL_PIPES;

    #[test]
    fn populate_lays_out_initial_pipes_and_clouds() {
        let mut stage = Stage::new(5.0);
        stage.populate(INITIAL_PIPES, 4, &mut Scripted::quiet());
        let xs: Vec<f64> = stage.pipes().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![1100.0, 1360.0, 1620.0, 1880.0]);
        assert!(stage.pipes().iter().all(|p| !p.is_animated()));
        assert_eq!(stage.clouds().len(), 4);
        assert_eq!(stage.clouds()[1].x, 450.0);
    }

    #[test]
    fn scroll_speed_grows_with_score() {
        let stage = Stage::new(5.0);
        assert_eq!(stage.scroll_speed(0), 5.0);
        assert!((stage.scroll_speed(25) - 7.5).abs() < 1e-9);
    }

    #[test]
    fn recycle_x_keeps_clear_of_hazards() {
        let mut stage = Stage::new(5.0);
        assert_eq!(stage.recycle_x(), FIRST_PIPE_START_LEFT);

        stage.create_pipe_pair(300.0, 0, &mut Scripted::quiet());
        assert_eq!(stage.recycle_x(), CANVAS_WIDTH);
        stage.pipes_mut()[0].x = 700.0;
        assert_eq!(stage.recycle_x(), 960.0);

        stage.spawn_no_touch_group(1, 900.0, &mut Scripted::quiet());
        assert_eq!(stage.recycle_x(), 900.0 + NO_TOUCH_CLEARANCE + PIPE_SPACING);
    }

    #[test]
    fn hazard_batches_follow_phase_schedule() {
        let mut stage = Stage::new(5.0);
        let mut rng = Scripted::quiet().with_fallback(0.0);
        let mut spawned = Vec::new();
        for total in 1..=140 {
            stage.progress.total_pipes_passed = total;
            if let Some((phase, count)) = stage.schedule_no_touch(&mut rng) {
                spawned.push((total, phase, count));
            }
        }
        // fallback 0.0 puts every trigger on the first pipe of its phase
        let expected: Vec<(u32, u32, u32)> = (1..=13).map(|p| (p * 10 + 1, p, p.min(9))).collect();
        assert_eq!(spawned, expected);
    }

    #[test]
    fn a_phase_spawns_at_most_once() {
        let mut stage = Stage::new(5.0);
        // trigger index 15 for phase 1
        let mut rng = Scripted::new([0.45]);
        let mut hits = 0;
        for total in 11..=20 {
            stage.progress.total_pipes_passed = total;
            if stage.schedule_no_touch(&mut rng).is_some() {
                assert_eq!(total, 15);
                hits += 1;
            }
        }
        assert_eq!(hits, 1);
        assert_eq!(rng.drawn(), 1);
    }

    #[test]
    fn every_second_batch_earns_a_gate() {
        let mut stage = Stage::new(5.0);
        let mut rng = Scripted::quiet();
        assert_eq!(stage.spawn_no_touch_group(2, 1000.0, &mut rng), None);
        assert_eq!(stage.spawn_no_touch_group(3, 2000.0, &mut rng), Some(2000.0 + 450.0 + 200.0));
        assert_eq!(stage.spawn_no_touch_group(1, 3000.0, &mut rng), None);
        assert_eq!(stage.gates().len(), 1);
        assert_eq!(stage.no_touch().len(), 6);
        assert_eq!(stage.gates()[0].y, 210.0);
    }

    #[test]
    fn hazards_are_spaced_and_parameterized() {
        let mut stage = Stage::new(5.0);
        let mut rng = Scripted::new([0.0, 0.5, 0.0, 0.25, 0.5]);
        stage.spawn_no_touch_group(2, 500.0, &mut rng);
        let h = &stage.no_touch()[0];
        assert_eq!((h.x, h.base_y), (500.0, 80.0));
        assert!(h.is_oscillating);
        assert_eq!(h.amplitude, 25.0);
        assert!((h.phase - TAU / 4.0).abs() < 1e-9);
        assert!((h.speed - 0.04).abs() < 1e-9);
        assert_eq!(stage.no_touch()[1].x, 650.0);
        assert!(!stage.no_touch()[1].is_oscillating);
    }

    #[test]
    fn gate_toggles_once() {
        let mut stage = Stage::new(5.0);
        let mut rng = Scripted::quiet();
        stage.spawn_no_touch_group(0, 0.0, &mut rng);
        stage.spawn_no_touch_group(0, 0.0, &mut rng);
        let gate = stage.gates()[0].bounds();
        let bird = Rect::new(gate.x + 10.0, gate.y + 10.0, 34.0, 24.0);

        assert_eq!(stage.activate_gates(&bird, 150.0), Some(true));
        assert_eq!(stage.activate_gates(&bird, 150.0), None);
        assert!(stage.is_night());
        assert!(stage.gates()[0].is_activated);
    }

    #[test]
    fn far_gates_are_not_probed() {
        let mut stage = Stage::new(5.0);
        let mut rng = Scripted::quiet();
        stage.spawn_no_touch_group(0, 0.0, &mut rng);
        stage.spawn_no_touch_group(0, 0.0, &mut rng);
        let bird = Rect::new(-500.0, 200.0, 34.0, 24.0);
        assert_eq!(stage.gates_near(bird.x, 150.0).count(), 0);
        assert_eq!(stage.activate_gates(&bird, 150.0), None);
    }

    fn stage_with_pipe_at(top: f64) -> Stage {
        let mut stage = Stage::new(5.0);
        let id = stage.next_id();
        stage.pipes.push(PipePair::at_height(id, 300.0, top));
        stage
    }

    #[test]
    fn pipe_hits_cover_both_halves_but_not_the_gap() {
        let stage = stage_with_pipe_at(160.0);
        let bird = |y| Rect::new(310.0, y, 34.0, 24.0);

        assert!(stage.pipe_hit(&bird(140.0)));
        assert!(stage.pipe_hit(&bird(160.0 + GAP - 10.0)));
        assert!(!stage.pipe_hit(&bird(200.0)));
        // touching edges is not contact
        assert!(!stage.pipe_hit(&bird(160.0)));
        assert!(!stage.pipe_hit(&Rect::new(380.0, 140.0, 34.0, 24.0)));
        assert!(!stage.no_touch_hit(&bird(140.0)));
    }

    #[test]
    fn hazards_hit_on_overlap() {
        let mut stage = Stage::new(5.0);
        stage.spawn_no_touch_group(1, 300.0, &mut Scripted::quiet());
        let hazard = stage.no_touch()[0].bounds();

        assert!(stage.no_touch_hit(&Rect::new(hazard.x + 10.0, hazard.y + 10.0, 34.0, 24.0)));
        assert!(!stage.no_touch_hit(&Rect::new(hazard.right(), hazard.y, 34.0, 24.0)));
        assert!(!stage.no_touch_hit(&Rect::new(hazard.x, hazard.bottom() + 1.0, 34.0, 24.0)));
        assert!(!stage.pipe_hit(&hazard));
    }

    #[test]
    fn spawned_gate_is_centred_and_inactive() {
        let mut stage = Stage::new(5.0);
        let id = stage.spawn_gate(400.0);
        let gate = &stage.gates()[0];
        assert_eq!((gate.id, gate.x, gate.y), (id, 400.0, 210.0));
        assert!(!gate.is_activated);
        assert_eq!(stage.gates_near(300.0, 150.0).count(), 1);
    }

    #[test]
    fn descending_static_staircase_steps_by_fifty() {
        // descending, first bottom = 400 - 0
        let mut rng = Scripted::new([0.9, 0.0]);
        let stairs = generate_group_heights(4, false, &mut rng);
        assert!(!stairs.ascending);
        assert_eq!(stairs.tops, vec![220.0, 170.0]);
    }

    #[test]
    fn staircase_can_truncate_below_two() {
        // ascending from the top limit leaves no room for a second member
        let mut rng = Scripted::new([0.1, 0.999]);
        let stairs = generate_group_heights(3, false, &mut rng);
        assert_eq!(stairs.tops, vec![MAX_TOP_HEIGHT]);
    }

    #[test]
    fn group_rules_by_score() {
        let mut rng = Scripted::new([0.0]);
        assert!(!should_create_group(14, &mut rng));
        assert_eq!(rng.drawn(), 0);
        assert!(should_create_group(15, &mut rng));
        assert!(!should_create_group(49, &mut Scripted::new([0.5])));
        assert!(should_create_group(50, &mut Scripted::new([0.5])));

        assert_eq!(group_size(14, &mut Scripted::quiet()), 1);
        assert_eq!(group_size(40, &mut Scripted::new([0.0])), 2);
        assert_eq!(group_size(41, &mut Scripted::quiet()), 4);
    }

    #[test]
    fn followers_leave_with_their_leader() {
        let mut stage = Stage::new(5.0);
        let stairs = Staircase {
            tops: vec![150.0, 170.0, 190.0],
            ascending: true,
            step: 20.0,
        };
        let mut rng = Scripted::quiet();
        stage.spawn_group(-400.0, &stairs, false, 0, &mut rng);
        stage.create_pipe_pair(600.0, 0, &mut rng);

        let events = stage.advance(0, &mut rng);
        assert_eq!(events, vec![StageEvent::PipePassed { total: 1 }]);
        assert_eq!(stage.pipes().len(), 2);
        assert!(stage.pipes().iter().all(|p| p.group.is_none()));
        assert_eq!(stage.pipes()[1].x, 595.0 + PIPE_SPACING);
    }

    #[test]
    fn group_waits_for_trailing_member() {
        let mut stage = Stage::new(5.0);
        let stairs = Staircase {
            tops: vec![150.0, 170.0],
            ascending: true,
            step: 20.0,
        };
        let mut rng = Scripted::quiet();
        stage.spawn_group(-120.0, &stairs, false, 0, &mut rng);
        let events = stage.advance(0, &mut rng);
        assert!(events.is_empty());
        assert_eq!(stage.pipes().len(), 2);
        assert_eq!(stage.pipes()[1].x, stage.pipes()[0].x + GROUP_PIPE_SPACING);
    }
}
