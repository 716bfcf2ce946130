//! Cosmetic interpolations that run outside the simulation.
//!
//! Nothing here feeds back into gameplay. The driver pushes tweens in
//! response to game events and reads the current values when drawing.

use crate::bird::MAX_DOWN_ROTATION;
use std::time::Duration;

pub const DAY_NIGHT_FADE: Duration = Duration::from_millis(2500);
pub const RESET_TO_DAY_FADE: Duration = Duration::from_millis(1000);
pub const DEATH_FALL: Duration = Duration::from_millis(800);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ease {
    Linear,
    QuadIn,
    /// Power-2 ease in and out.
    QuadInOut,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::QuadIn => t * t,
            Ease::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = 2.0 * (1.0 - t);
                    1.0 - 0.5 * u * u
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    elapsed: Duration,
    duration: Duration,
    ease: Ease,
}

impl Tween {
    pub fn new(from: f64, to: f64, duration: Duration, ease: Ease) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
            ease,
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        self.elapsed.as_secs_f64() / self.duration.as_secs_f64()
    }

    pub fn value(&self) -> f64 {
        self.from + (self.to - self.from) * self.ease.apply(self.progress())
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// The bird dropping to the ground after a hit.
#[derive(Clone, Debug, PartialEq)]
pub struct DeathFall {
    y: Tween,
    rotation: Tween,
}

impl DeathFall {
    pub fn y(&self) -> f64 {
        self.y.value()
    }

    pub fn rotation(&self) -> f64 {
        self.rotation.value()
    }
}

/// The presentation queue: at most one sky fade and one death fall at once.
#[derive(Clone, Debug, Default)]
pub struct Tweens {
    sky: Option<Tween>,
    /// 0 is full day, 1 full night. Held when no fade runs.
    sky_level: f64,
    death: Option<DeathFall>,
}

impl Tweens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fade from wherever the sky currently is.
    pub fn fade_sky(&mut self, night: bool) {
        let to = if night { 1.0 } else { 0.0 };
        self.sky = Some(Tween::new(
            self.night_level(),
            to,
            DAY_NIGHT_FADE,
            Ease::QuadInOut,
        ));
    }

    pub fn fade_to_day(&mut self) {
        self.sky = Some(Tween::new(
            self.night_level(),
            0.0,
            RESET_TO_DAY_FADE,
            Ease::Linear,
        ));
    }

    pub fn fall(&mut self, from_y: f64, ground_y: f64, from_rotation: f64) {
        self.death = Some(DeathFall {
            y: Tween::new(from_y, ground_y, DEATH_FALL, Ease::QuadIn),
            rotation: Tween::new(from_rotation, MAX_DOWN_ROTATION, DEATH_FALL, Ease::QuadIn),
        });
    }

    pub fn advance(&mut self, dt: Duration) {
        if let Some(sky) = &mut self.sky {
            sky.advance(dt);
            if sky.is_done() {
                self.sky_level = sky.value();
                self.sky = None;
            }
        }
        if let Some(death) = &mut self.death {
            death.y.advance(dt);
            death.rotation.advance(dt);
        }
    }

    pub fn night_level(&self) -> f64 {
        self.sky.as_ref().map_or(self.sky_level, Tween::value)
    }

    /// Current pose of a falling or fallen bird.
    pub fn death(&self) -> Option<&DeathFall> {
        self.death.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.sky.is_none() && self.death.as_ref().is_none_or(|d| d.y.is_done())
    }

    /// Cancels everything in flight and snaps the sky to `night`.
    pub fn clear(&mut self, night: bool) {
        self.sky = None;
        self.death = None;
        self.sky_level = if night { 1.0 } else { 0.0 };
    }
}
