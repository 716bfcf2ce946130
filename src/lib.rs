//! Flappy Bird with moving pipes, staircase groups, no-touch hazards and
//! day/night gates.
//!
//! The simulation ([`game`], [`stage`], [`generator`], [`animation`],
//! [`bird`]) is deterministic given a [`rng::RandomSource`]. Presentation,
//! audio and persistence sit behind small traits.

pub mod animation;
pub mod audio;
pub mod bird;
pub mod clock;
pub mod config;
pub mod game;
pub mod generator;
pub mod input;
pub mod model;
pub mod present;
pub mod rng;
pub mod session;
pub mod stage;
pub mod store;
pub mod tween;
pub mod world;
