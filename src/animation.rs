//! Per-tick vertical motion of pipe pairs.

use crate::model::{MotionMode, MovementStage, PipePair, TargetMove};
use std::f64::consts::TAU;

/// Advances `pair` by one tick of its motion family.
///
/// The stored `current_top` stays within the pair's bounds afterwards.
pub fn apply_pipe_animation(pair: &mut PipePair) {
    if !pair.is_animated() {
        return;
    }

    if pair.frame_count < pair.delay_frames {
        pair.frame_count += 1;
        return;
    }

    let x = pair.x;
    match &mut pair.motion {
        MotionMode::Static => {}
        MotionMode::Oscillating(osc) => {
            osc.phase += osc.speed;
            if osc.phase > TAU {
                osc.phase -= TAU;
            }
            let offset = osc.phase.sin() * osc.amplitude;

            if let Some(drift) = osc.drift {
                if x <= drift.stop_x {
                    // Freeze where the pair currently is and keep bobbing from there.
                    osc.drift = None;
                    pair.base_top = pair.current_top - offset;
                } else {
                    let distance = drift.target - pair.base_top;
                    let step = drift.speed * distance.signum();
                    if distance.abs() <= step.abs() {
                        pair.base_top = drift.target;
                        osc.drift = None;
                    } else {
                        pair.base_top += step;
                    }
                }
            }

            pair.current_top = pair.base_top + offset;
        }
        MotionMode::TargetMove(mv) | MotionMode::Jump(mv) => {
            pair.current_top = step_toward_target(mv, x, pair.current_top);
        }
    }

    pair.current_top = pair.clamp_top(pair.current_top);
}

fn step_toward_target(mv: &mut TargetMove, x: f64, current: f64) -> f64 {
    match mv.stage {
        MovementStage::Stopped => return current,
        MovementStage::NotStarted => mv.stage = MovementStage::Moving,
        MovementStage::Moving => {}
    }

    if x <= mv.stop_x {
        mv.stage = MovementStage::Stopped;
        return current;
    }

    let distance = mv.target - current;
    let step = mv.speed * distance.signum();
    if distance.abs() <= step.abs() {
        mv.stage = MovementStage::Stopped;
        mv.target
    } else {
        current + step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Drift, EntityId, Oscillation};
    use crate::world::{MAX_TOP_HEIGHT, MIN_TOP_HEIGHT};

    fn glide(target: f64, speed: f64) -> TargetMove {
        TargetMove {
            target,
            speed,
            stop_x: 330.0,
            stage: MovementStage::NotStarted,
        }
    }

    #[test]
    fn static_pairs_do_not_move() {
        let mut p = PipePair::at_height(EntityId(0), 600.0, 150.0);
        apply_pipe_animation(&mut p);
        assert_eq!(p.current_top, 150.0);
    }

    #[test]
    fn delay_postpones_motion() {
        let mut p = PipePair::at_height(EntityId(0), 600.0, 150.0);
        p.motion = MotionMode::TargetMove(glide(200.0, 2.0));
        p.delay_frames = 3;
        for _ in 0..3 {
            apply_pipe_animation(&mut p);
            assert_eq!(p.current_top, 150.0);
        }
        assert_eq!(p.frame_count, 3);
        apply_pipe_animation(&mut p);
        assert_eq!(p.current_top, 152.0);
        assert_eq!(p.target_movement_stage(), MovementStage::Moving);
    }

    #[test]
    fn glide_snaps_to_target_without_overshoot() {
        let mut p = PipePair::at_height(EntityId(0), 600.0, 150.0);
        p.motion = MotionMode::Jump(glide(155.0, 2.0));
        let mut seen = Vec::new();
        for _ in 0..5 {
            apply_pipe_animation(&mut p);
            seen.push(p.current_top);
        }
        assert_eq!(seen, vec![152.0, 154.0, 155.0, 155.0, 155.0]);
        assert_eq!(p.target_movement_stage().code(), 3);
        assert!(!p.is_moving());
    }

    #[test]
    fn glide_stops_once_past_stop_x() {
        let mut p = PipePair::at_height(EntityId(0), 600.0, 150.0);
        p.motion = MotionMode::TargetMove(glide(210.0, 1.0));
        apply_pipe_animation(&mut p);
        p.x = 300.0;
        apply_pipe_animation(&mut p);
        p.x = 900.0;
        apply_pipe_animation(&mut p);
        assert_eq!(p.current_top, 151.0);
        assert_eq!(p.target_movement_stage(), MovementStage::Stopped);
    }

    #[test]
    fn drift_freezes_and_reanchors_seamlessly() {
        let mut p = PipePair::at_height(EntityId(0), 600.0, 160.0);
        p.motion = MotionMode::Oscillating(Oscillation {
            phase: 0.0,
            speed: 0.05,
            amplitude: 30.0,
            drift: Some(Drift {
                target: 190.0,
                speed: 0.5,
                stop_x: 330.0,
            }),
        });
        for _ in 0..10 {
            apply_pipe_animation(&mut p);
        }
        assert!((p.base_top - 165.0).abs() < 1e-9);
        assert!(p.is_moving());

        let before = p.current_top;
        p.x = 320.0;
        apply_pipe_animation(&mut p);
        assert!(!p.is_moving());
        assert!((p.current_top - before).abs() < 1e-9);

        let frozen_base = p.base_top;
        apply_pipe_animation(&mut p);
        assert_eq!(p.base_top, frozen_base);
    }

    #[test]
    fn every_family_stays_in_bounds() {
        let modes = [
            MotionMode::Oscillating(Oscillation {
                phase: 1.0,
                speed: 0.07,
                amplitude: 60.0,
                drift: Some(Drift {
                    target: MAX_TOP_HEIGHT,
                    speed: 0.7,
                    stop_x: -1000.0,
                }),
            }),
            MotionMode::TargetMove(glide(MIN_TOP_HEIGHT - 50.0, 1.5)),
            MotionMode::Jump(glide(MAX_TOP_HEIGHT + 50.0, 2.3)),
        ];
        for mode in modes {
            let mut p = PipePair::at_height(EntityId(0), 5000.0, 160.0);
            p.motion = mode;
            for _ in 0..1000 {
                apply_pipe_animation(&mut p);
                assert!(p.current_top >= p.min_top && p.current_top <= p.max_top());
                p.x -= 5.0;
            }
        }
    }
}
