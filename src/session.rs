use crate::world::START_GRACE_TICKS;

/// Score and lifecycle flags of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSession {
    pub score: u32,
    pub high_score: u32,
    pub is_game_over: bool,
    pub is_playing: bool,
    pub frame_count: u64,
    pub grace_ticks_remaining: u32,
}

/// What a finished run reports to the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub score: u32,
    pub high_score: u32,
    pub new_best: bool,
}

impl GameSession {
    pub fn new(high_score: u32) -> Self {
        Self {
            score: 0,
            high_score,
            is_game_over: false,
            is_playing: false,
            frame_count: 0,
            grace_ticks_remaining: START_GRACE_TICKS,
        }
    }

    pub fn start(&mut self) {
        self.is_playing = true;
        self.is_game_over = false;
        self.score = 0;
        self.frame_count = 0;
        self.grace_ticks_remaining = START_GRACE_TICKS;
    }

    /// Back to the ready screen, keeping the high score.
    pub fn reset(&mut self) {
        *self = Self::new(self.high_score);
    }

    pub fn advance_frame(&mut self) {
        self.frame_count += 1;
        self.grace_ticks_remaining = self.grace_ticks_remaining.saturating_sub(1);
    }

    pub fn in_grace(&self) -> bool {
        self.grace_ticks_remaining > 0
    }

    pub fn increment_score(&mut self) {
        self.score += 1;
    }

    /// Ends the run once. Later calls return `None`.
    pub fn end(&mut self) -> Option<RunSummary> {
        if self.is_game_over || !self.is_playing {
            return None;
        }
        self.is_game_over = true;
        self.is_playing = false;
        let new_best = self.score > self.high_score;
        if new_best {
            self.high_score = self.score;
        }
        Some(RunSummary {
            score: self.score,
            high_score: self.high_score,
            new_best,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grace_counts_down_to_zero() {
        let mut s = GameSession::new(0);
        s.start();
        for _ in 0..START_GRACE_TICKS {
            assert!(s.in_grace());
            s.advance_frame();
        }
        assert!(!s.in_grace());
        s.advance_frame();
        assert_eq!(s.grace_ticks_remaining, 0);
        assert_eq!(s.frame_count, START_GRACE_TICKS as u64 + 1);
    }

    #[test]
    fn end_fires_once() {
        let mut s = GameSession::new(3);
        s.start();
        s.score = 5;
        let first = s.end().expect("first end reports");
        assert_eq!(
            first,
            RunSummary {
                score: 5,
                high_score: 5,
                new_best: true
            }
        );
        assert!(s.end().is_none());
        assert!(s.is_game_over && !s.is_playing);
    }

    #[test]
    fn end_without_start_is_a_no_op() {
        let mut s = GameSession::new(0);
        assert!(s.end().is_none());
        assert!(!s.is_game_over);
    }
}
