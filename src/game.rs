//! The frame driver: one session, one bird, one stage.

use crate::bird::BirdState;
use crate::model::EntityId;
use crate::present::{Hud, RenderSink, Screen, Sprite};
use crate::rng::RandomSource;
use crate::session::{GameSession, RunSummary};
use crate::stage::{Stage, StageEvent};
use crate::store::ScoreStore;
use crate::world::{CANVAS_HEIGHT, CLOUD_COUNT, INITIAL_PIPES, PIPE_WIDTH, Rect};
use std::collections::HashSet;
use tracing::{info, warn};

/// Stage entity ids start at 1.
pub const BIRD_ENTITY: EntityId = EntityId(0);
/// Gates are probed on every n-th tick only.
pub const GATE_PROBE_INTERVAL: u64 = 5;
pub const GATE_PROBE_RADIUS: f64 = 150.0;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Point { score: u32 },
    Hit,
    Died(RunSummary),
    DayNight { night: bool },
    HazardsSpawned { phase: u32, count: u32 },
    GateSpawned { x: f64 },
}

pub struct Game<R, S> {
    session: GameSession,
    bird: BirdState,
    stage: Stage,
    rng: R,
    store: S,
    last_run: Option<RunSummary>,
    scroll: f64,
    projected: HashSet<EntityId>,
}

impl<R: RandomSource, S: ScoreStore> Game<R, S> {
    pub fn new(rng: R, mut store: S, pipe_speed: f64) -> Self {
        let high_score = store.load_high_score();
        let mut game = Self {
            session: GameSession::new(high_score),
            bird: BirdState::default(),
            stage: Stage::new(pipe_speed),
            rng,
            store,
            last_run: None,
            scroll: 0.0,
            projected: HashSet::new(),
        };
        game.rebuild_stage();
        game
    }

    fn rebuild_stage(&mut self) {
        self.bird = BirdState::default();
        self.stage.reset();
        self.stage.populate(INITIAL_PIPES, CLOUD_COUNT, &mut self.rng);
        self.scroll = 0.0;
    }

    /// Starts a fresh run, from the ready screen or after a game over.
    pub fn start(&mut self) {
        self.rebuild_stage();
        self.session.start();
        self.last_run = None;
        info!(high_score = self.session.high_score, "run started");
    }

    /// Back to the ready screen with a fresh stage.
    pub fn reset_to_menu(&mut self) {
        self.session.reset();
        self.last_run = None;
        self.rebuild_stage();
    }

    pub fn jump(&mut self) -> bool {
        if !self.session.is_playing || self.session.is_game_over {
            return false;
        }
        self.bird.jump();
        true
    }

    pub fn toggle_day_night(&mut self) -> bool {
        let night = self.stage.toggle_day_night();
        info!(night, "day/night toggled");
        night
    }

    pub fn set_pipe_speed(&mut self, speed: f64) {
        self.stage.set_pipe_speed(speed);
    }

    /// One simulation tick. Does nothing outside a run.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !self.session.is_playing || self.session.is_game_over {
            return events;
        }

        self.session.advance_frame();
        self.bird.update();

        let score = self.session.score;
        self.scroll += self.stage.scroll_speed(score);
        for event in self.stage.advance(score, &mut self.rng) {
            match event {
                StageEvent::PipePassed { .. } => {
                    self.session.increment_score();
                    events.push(GameEvent::Point {
                        score: self.session.score,
                    });
                }
                StageEvent::HazardsSpawned { phase, count } => {
                    events.push(GameEvent::HazardsSpawned { phase, count })
                }
                StageEvent::GateSpawned { x } => events.push(GameEvent::GateSpawned { x }),
                StageEvent::GroupSpawned { .. } => {}
            }
        }

        let bounds = self.bird.bounds();
        if self.session.frame_count % GATE_PROBE_INTERVAL == 0 {
            if let Some(night) = self.stage.activate_gates(&bounds, GATE_PROBE_RADIUS) {
                info!(night, "gate crossed");
                events.push(GameEvent::DayNight { night });
            }
        }

        if !self.session.in_grace() && self.collides(&bounds) {
            events.extend(self.end_game());
        }
        events
    }

    fn collides(&self, bird: &Rect) -> bool {
        bird.y < 0.0
            || bird.bottom() > CANVAS_HEIGHT
            || self.stage.pipe_hit(bird)
            || self.stage.no_touch_hit(bird)
    }

    /// Ends the run. Only the first call per run has any effect.
    pub fn end_game(&mut self) -> Vec<GameEvent> {
        let Some(summary) = self.session.end() else {
            return Vec::new();
        };
        self.bird.set_dead();
        self.last_run = Some(summary);
        info!(score = summary.score, high_score = summary.high_score, "run over");
        if summary.new_best {
            if let Err(e) = self.store.save_high_score(summary.high_score) {
                warn!(error = %e, "high score not saved");
            }
        }
        vec![GameEvent::Hit, GameEvent::Died(summary)]
    }

    /// Cosmetic sprite clock.
    pub fn advance_sprite(&mut self) {
        self.bird.advance_frame();
    }

    /// Pushes every live entity into `sink` and drops the ones that are gone.
    ///
    /// `bird_pose` overrides the bird's `(y, rotation)` while a death fall is
    /// being animated.
    pub fn project(&mut self, sink: &mut dyn RenderSink, bird_pose: Option<(f64, f64)>) {
        let mut live = HashSet::new();
        let mut put = |id: EntityId, rect: Rect, sprite: Sprite| {
            sink.upsert(id, rect, sprite);
            live.insert(id);
        };

        for cloud in self.stage.clouds() {
            put(cloud.id, cloud.bounds(), Sprite::Cloud);
        }
        for pair in self.stage.pipes() {
            let g = pair.geometry();
            put(
                pair.id,
                Rect::new(pair.x, 0.0, PIPE_WIDTH, CANVAS_HEIGHT),
                Sprite::Pipe {
                    gap_top: g.top.bottom(),
                    gap_bottom: g.bottom.y,
                    grouped: pair.group.is_some(),
                },
            );
        }
        for hazard in self.stage.no_touch() {
            put(hazard.id, hazard.bounds(), Sprite::NoTouch);
        }
        for gate in self.stage.gates() {
            put(
                gate.id,
                gate.bounds(),
                Sprite::Gate {
                    activated: gate.is_activated,
                },
            );
        }

        let mut rect = self.bird.bounds();
        let mut rotation = self.bird.rotation;
        if let Some((y, r)) = bird_pose {
            rect.y = y;
            rotation = r;
        }
        put(
            BIRD_ENTITY,
            rect,
            Sprite::Bird {
                frame: self.bird.frame_index,
                rotation,
            },
        );

        for gone in self.projected.difference(&live) {
            sink.remove(*gone);
        }
        self.projected = live;
    }

    pub fn hud(&self, night_level: f64, speed_hint: Option<u32>) -> Hud {
        let screen = match (self.session.is_playing, self.last_run) {
            (true, _) => Screen::Playing,
            (false, Some(run)) => Screen::GameOver {
                score: run.score,
                high_score: run.high_score,
                new_best: run.new_best,
            },
            (false, None) => Screen::Ready,
        };
        Hud {
            score: self.session.score,
            high_score: self.session.high_score,
            screen,
            night_level,
            scroll: self.scroll,
            speed_hint,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn bird(&self) -> &BirdState {
        &self.bird
    }

    pub fn bird_mut(&mut self) -> &mut BirdState {
        &mut self.bird
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_night(&self) -> bool {
        self.stage.is_night()
    }
}
