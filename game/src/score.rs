//! Authoritative score plus a debounced "displayed" view of it.
//!
//! The displayed score trails the real one: it only catches up once the score
//! has been quiet for the debounce period, so a quick run of hits animates as
//! a single jump. The delta between the two is surfaced on every change.

use std::time::Duration;

use engine::Debounce;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreChange {
    pub score: u32,
    /// `score - displayed` at the moment of the change.
    pub delta: i64,
}

#[derive(Debug, Clone)]
pub struct ScoreEngine {
    score: u32,
    displayed: u32,
    debounce: Debounce<u32>,
}

impl ScoreEngine {
    pub fn new(quiet: Duration) -> Self {
        Self {
            score: 0,
            displayed: 0,
            debounce: Debounce::new(quiet),
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn displayed(&self) -> u32 {
        self.displayed
    }

    pub fn delta(&self) -> i64 {
        i64::from(self.score) - i64::from(self.displayed)
    }

    pub fn is_settling(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Returns `None` when the value did not change.
    pub fn set_score(&mut self, score: u32) -> Option<ScoreChange> {
        if score == self.score {
            return None;
        }
        self.score = score;
        Some(ScoreChange {
            score,
            delta: self.delta(),
        })
    }

    pub fn increment(&mut self) -> ScoreChange {
        let next = self.score.saturating_add(1);
        self.set_score(next).unwrap_or(ScoreChange {
            score: next,
            delta: self.delta(),
        })
    }

    /// Arms the debounce with `score`. Called from the score-changed handler.
    pub fn schedule_display(&mut self, score: u32, now: Duration) {
        self.debounce.push(score, now);
    }

    /// Commits the pending display value once it is due.
    pub fn poll(&mut self, now: Duration) -> Option<u32> {
        let value = self.debounce.poll(now)?;
        self.displayed = value;
        Some(value)
    }

    /// Sets the displayed score immediately and drops anything pending.
    pub fn force_displayed(&mut self, value: u32) {
        self.debounce.cancel();
        self.displayed = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn delta_tracks_gap_between_score_and_display() {
        let mut engine = ScoreEngine::new(ms(1000));
        assert_eq!(engine.increment(), ScoreChange { score: 1, delta: 1 });
        assert_eq!(engine.increment(), ScoreChange { score: 2, delta: 2 });

        engine.schedule_display(2, ms(0));
        assert_eq!(engine.poll(ms(1000)), Some(2));
        assert_eq!(engine.delta(), 0);
        assert_eq!(engine.increment(), ScoreChange { score: 3, delta: 1 });
    }

    #[test]
    fn unchanged_score_is_not_a_change() {
        let mut engine = ScoreEngine::new(ms(1000));
        assert_eq!(engine.set_score(0), None);
        assert!(engine.set_score(4).is_some());
        assert_eq!(engine.set_score(4), None);
    }

    #[test]
    fn force_displayed_bypasses_pending_value() {
        let mut engine = ScoreEngine::new(ms(1000));
        engine.set_score(5);
        engine.schedule_display(5, ms(0));
        engine.force_displayed(0);
        assert!(!engine.is_settling());
        assert_eq!(engine.displayed(), 0);
        assert_eq!(engine.poll(ms(5000)), None);
        assert_eq!(engine.displayed(), 0);
    }
}
