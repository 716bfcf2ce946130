use crate::world::{BIRD_HEIGHT, BIRD_START_Y, BIRD_WIDTH, BIRD_X, Rect};

const GRAVITY: f64 = 1.0;
const JUMP_STRENGTH: f64 = -10.0;
/// Below this speed the bird shows its flapping frames.
const FLAP_THRESHOLD: f64 = -3.0;
/// Above this speed the bird shows its falling frame.
const FALL_THRESHOLD: f64 = 2.0;
const MAX_UP_ROTATION: f64 = -30.0;
pub const MAX_DOWN_ROTATION: f64 = 90.0;
const ROTATION_BLEND: f64 = 0.2;
/// Wing positions in the flapping cycle.
pub const FLAP_FRAMES: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationState {
    Flying,
    Falling,
    Dead,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BirdState {
    pub speed: f64,
    /// Degrees, positive is nose down.
    pub rotation: f64,
    pub animation: AnimationState,
    pub frame_index: usize,
    pub x: f64,
    pub y: f64,
}

impl Default for BirdState {
    fn default() -> Self {
        Self {
            speed: 0.0,
            rotation: 0.0,
            animation: AnimationState::Flying,
            frame_index: 0,
            x: BIRD_X,
            y: BIRD_START_Y,
        }
    }
}

impl BirdState {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, BIRD_WIDTH, BIRD_HEIGHT)
    }

    pub fn is_dead(&self) -> bool {
        self.animation == AnimationState::Dead
    }

    pub fn jump(&mut self) {
        self.speed = JUMP_STRENGTH;
        self.animation = AnimationState::Flying;
        self.frame_index = 0;
    }

    /// One simulation tick of gravity, position and sprite state.
    pub fn update(&mut self) {
        self.speed += GRAVITY;
        self.y += self.speed;
        self.update_animation_state();
        self.update_rotation();
    }

    fn update_animation_state(&mut self) {
        if self.is_dead() {
            return;
        }
        let next = if self.speed < FLAP_THRESHOLD {
            AnimationState::Flying
        } else if self.speed > FALL_THRESHOLD {
            AnimationState::Falling
        } else {
            return;
        };
        if next != self.animation {
            self.animation = next;
            self.frame_index = 0;
        }
    }

    fn update_rotation(&mut self) {
        if self.is_dead() {
            return;
        }
        let target = (self.speed * 3.0).clamp(MAX_UP_ROTATION, MAX_DOWN_ROTATION);
        self.rotation += (target - self.rotation) * ROTATION_BLEND;
    }

    pub fn set_dead(&mut self) {
        self.animation = AnimationState::Dead;
        self.frame_index = 0;
    }

    /// Cosmetic sprite clock. Only the frame index changes.
    pub fn advance_frame(&mut self) {
        self.frame_index = match self.animation {
            AnimationState::Flying => (self.frame_index + 1) % FLAP_FRAMES,
            AnimationState::Falling | AnimationState::Dead => 0,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_forces_flying_regardless_of_state() {
        let mut bird = BirdState {
            speed: 8.0,
            animation: AnimationState::Falling,
            frame_index: 0,
            ..BirdState::default()
        };
        bird.jump();
        assert_eq!(bird.speed, -10.0);
        assert_eq!(bird.animation, AnimationState::Flying);
    }

    #[test]
    fn gravity_turns_flight_into_fall() {
        let mut bird = BirdState::default();
        bird.jump();
        let mut states = Vec::new();
        for _ in 0..15 {
            bird.update();
            states.push((bird.speed, bird.animation));
        }
        // -9 .. -4 flying, -3 .. 2 hysteresis, 3 and up falling
        assert!(states[..6].iter().all(|&(_, s)| s == AnimationState::Flying));
        assert!(states[6..12].iter().all(|&(_, s)| s == AnimationState::Flying));
        assert_eq!(states[12], (3.0, AnimationState::Falling));
        assert_eq!(states[14], (5.0, AnimationState::Falling));
    }

    #[test]
    fn hysteresis_holds_falling_until_flap_threshold() {
        let mut bird = BirdState {
            speed: -2.0,
            animation: AnimationState::Falling,
            ..BirdState::default()
        };
        bird.update();
        assert_eq!(bird.animation, AnimationState::Falling);
    }

    #[test]
    fn rotation_eases_toward_clamped_target() {
        let mut bird = BirdState::default();
        bird.speed = 49.0;
        bird.update();
        // target = clamp(150) = 90, eased by 0.2
        assert!((bird.rotation - 18.0).abs() < 1e-9);
        for _ in 0..200 {
            bird.speed = 49.0;
            bird.update();
        }
        assert!((bird.rotation - MAX_DOWN_ROTATION).abs() < 1e-6);
    }

    #[test]
    fn dead_bird_ignores_speed_thresholds() {
        let mut bird = BirdState::default();
        bird.rotation = 12.0;
        bird.set_dead();
        bird.speed = -20.0;
        bird.update();
        assert_eq!(bird.animation, AnimationState::Dead);
        assert_eq!(bird.rotation, 12.0);
    }

    #[test]
    fn sprite_clock_cycles_only_while_flying() {
        let mut bird = BirdState::default();
        let y = bird.y;
        let frames: Vec<_> = (0..4)
            .map(|_| {
                bird.advance_frame();
                bird.frame_index
            })
            .collect();
        assert_eq!(frames, vec![1, 2, 0, 1]);
        assert_eq!(bird.y, y);

        bird.animation = AnimationState::Falling;
        bird.advance_frame();
        assert_eq!(bird.frame_index, 0);
    }
}
