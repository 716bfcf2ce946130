//! Score-driven sampling of pipe heights and motion.
//!
//! Draw order for [`randomize_pipe`], which [`randomize_pipe_animation_only`]
//! shares from step 3 on:
//!
//! 1. base height, `next_range(min_top, max_top + 1)`
//! 2. band roll; a biased band draws one more `next_range(0, 40)`
//! 3. animation roll
//! 4. amplitude, oscillation roll, drift roll (score >= 20, oscillating only),
//!    jump roll (score >= 20, not oscillating), delay roll (score >= 20) and
//!    `next_range(10, 40)` when it hits
//! 5. per family: phase + speed (+ direction + drift speed), or direction +
//!    speed

use crate::model::{Drift, MotionMode, MovementStage, Oscillation, PipePair, TargetMove};
use crate::rng::RandomSource;
use crate::world::{BIRD_X, MAX_TOP_HEIGHT, MIN_BOTTOM_HEIGHT, MIN_TOP_HEIGHT, PIPE_SPACING};
use std::f64::consts::TAU;

const BAND_CHANCE: f64 = 0.15;
const BAND_WIDTH: i32 = 40;
const DRIFT_CHANCE: f64 = 0.4;
const JUMP_CHANCE: f64 = 0.3;
const DELAY_CHANCE: f64 = 0.25;
/// Oscillation needs at least this much room to read as motion.
const MIN_OSCILLATION_AMPLITUDE: f64 = 20.0;
/// Past this x every scripted relocation has finished.
pub const TARGET_STOP_X: f64 = BIRD_X + PIPE_SPACING;

/// Probability that a freshly spawned pipe moves at all.
///
/// The two top tiers intentionally share 0.80.
pub fn animation_chance(score: u32) -> f64 {
    match score {
        0..10 => 0.0,
        10..20 => 0.50,
        20..30 => 0.65,
        30..50 => 0.80,
        _ => 0.80,
    }
}

/// Probability that an animated pipe oscillates rather than glides.
pub fn oscillation_chance(score: u32) -> f64 {
    animation_chance(score)
}

/// `(base, range)` of the desired amplitude before clamping.
fn amplitude_tier(score: u32) -> (f64, f64) {
    match score {
        40.. => (140.0, 70.0),
        30.. => (130.0, 65.0),
        20.. => (120.0, 60.0),
        _ => (100.0, 50.0),
    }
}

fn oscillation_speed(score: u32, r: f64) -> f64 {
    let base = match score {
        40.. => 0.05,
        20.. => 0.04,
        _ => 0.03,
    };
    base + r * 0.02
}

fn speed_multiplier(score: u32, cap: f64) -> f64 {
    (1.0 + score as f64 * 0.01).min(cap)
}

/// Moves `base` up or down by `offset` on a coin flip, staying in bounds.
fn offset_target(base: f64, offset: f64, rng: &mut dyn RandomSource) -> f64 {
    let offset = if rng.chance(0.5) { -offset } else { offset };
    (base + offset).clamp(MIN_TOP_HEIGHT, MAX_TOP_HEIGHT)
}

/// Resamples height and motion of `pair` for a spawn at `score`.
pub fn randomize_pipe(pair: &mut PipePair, score: u32, rng: &mut dyn RandomSource) {
    pair.min_top = MIN_TOP_HEIGHT;
    pair.min_bottom = MIN_BOTTOM_HEIGHT;
    let min_top = pair.min_top;
    let max_top = pair.max_top();

    let mut base = rng.next_range(min_top as i32, max_top as i32 + 1) as f64;
    let band = rng.next_f64();
    if band < BAND_CHANCE {
        base = min_top + rng.next_range(0, BAND_WIDTH) as f64;
    } else if band < BAND_CHANCE * 2.0 {
        base = max_top - rng.next_range(0, BAND_WIDTH) as f64;
    }

    pair.base_top = base;
    pair.current_top = base;
    randomize_pipe_animation_only(pair, score, rng);
}

/// Resamples only the motion, keeping `base_top`/`current_top`.
///
/// Staircase members use this so their heights stay where the layout put
/// them while still bobbing or drifting independently.
pub fn randomize_pipe_animation_only(pair: &mut PipePair, score: u32, rng: &mut dyn RandomSource) {
    let (motion, delay) = sample_motion(pair.base_top, pair.min_top, pair.max_top(), score, rng);
    pair.motion = motion;
    pair.delay_frames = delay;
    pair.frame_count = 0;
}

fn sample_motion(
    base: f64,
    min_top: f64,
    max_top: f64,
    score: u32,
    rng: &mut dyn RandomSource,
) -> (MotionMode, u32) {
    if !rng.chance(animation_chance(score)) {
        return (MotionMode::Static, 0);
    }

    let max_amplitude = (base - min_top).min(max_top - base).max(0.0);
    let (tier_base, tier_range) = amplitude_tier(score);
    let desired = tier_base + rng.next_f64() * tier_range;
    let amplitude = if max_amplitude > 0.0 {
        desired.min(max_amplitude)
    } else {
        0.0
    };

    let use_oscillation = rng.chance(oscillation_chance(score));
    let use_target = !use_oscillation || (score >= 20 && rng.chance(DRIFT_CHANCE));
    let use_jump = score >= 20 && !use_oscillation && use_target && rng.chance(JUMP_CHANCE);
    let delay = if score >= 20 && rng.chance(DELAY_CHANCE) {
        rng.next_range(10, 40) as u32
    } else {
        0
    };

    if use_oscillation && amplitude > MIN_OSCILLATION_AMPLITUDE {
        let phase = rng.next_f64() * TAU;
        let speed = oscillation_speed(score, rng.next_f64());
        let drift = (use_target && score >= 20).then(|| {
            let target = offset_target(base, (amplitude * 1.8).min(max_amplitude), rng);
            Drift {
                target,
                speed: (0.5 + rng.next_f64() * 0.25) * speed_multiplier(score, 1.4),
                stop_x: TARGET_STOP_X,
            }
        });
        let osc = Oscillation {
            phase,
            speed,
            amplitude,
            drift,
        };
        return (MotionMode::Oscillating(osc), delay);
    }

    if !use_target {
        return (MotionMode::Static, 0);
    }

    if use_jump {
        let target = offset_target(base, (amplitude * 2.0).min(max_amplitude), rng);
        let jump = TargetMove {
            target,
            speed: 1.5 + rng.next_f64() * 0.8,
            stop_x: TARGET_STOP_X,
            stage: MovementStage::NotStarted,
        };
        (MotionMode::Jump(jump), delay)
    } else {
        let target = offset_target(base, (amplitude * 2.5).min(max_amplitude), rng);
        let glide = TargetMove {
            target,
            speed: (0.7 + rng.next_f64() * 0.3) * speed_multiplier(score, 1.5),
            stop_x: TARGET_STOP_X,
            stage: MovementStage::NotStarted,
        };
        (MotionMode::TargetMove(glide), delay)
    }
}
