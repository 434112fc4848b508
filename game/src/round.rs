//! Level, target and marker state for a single round.

use std::collections::VecDeque;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// Source of uniformly distributed block indices.
pub trait IndexSource {
    /// A value in `0..len`. `len` is always at least 2.
    fn next_index(&mut self, len: usize) -> usize;
}

#[derive(Debug, Clone)]
pub struct RandomIndices {
    rng: StdRng,
}

impl RandomIndices {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl IndexSource for RandomIndices {
    fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Replays a fixed list of draws, cycling when it runs out. Draws are taken modulo `len`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedIndices {
    draws: VecDeque<usize>,
}

impl ScriptedIndices {
    pub fn new(draws: impl IntoIterator<Item = usize>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }
}

impl IndexSource for ScriptedIndices {
    fn next_index(&mut self, len: usize) -> usize {
        let Some(draw) = self.draws.pop_front() else {
            return 0;
        };
        self.draws.push_back(draw);
        draw % len
    }
}

impl<R: IndexSource + ?Sized> IndexSource for &mut R {
    fn next_index(&mut self, len: usize) -> usize {
        (**self).next_index(len)
    }
}

/// One draw with a single deterministic retry: a repeat of `previous` moves to the next block.
pub fn reroll_target<R: IndexSource + ?Sized>(rng: &mut R, previous: usize, len: usize) -> usize {
    let draw = rng.next_index(len);
    if draw == previous {
        (draw + 1) % len
    } else {
        draw
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    #[default]
    Idle,
    Running,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TapOutcome {
    Hit,
    Miss,
    /// The round is not running.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelEntered {
    pub level: u32,
    pub target: usize,
}

#[derive(Debug, Clone)]
pub struct Round {
    config: GameConfig,
    phase: RoundPhase,
    level: u32,
    target: usize,
    marker: f64,
    current: usize,
    speed: f64,
}

impl Round {
    /// `config` must already be validated; the session checks it before building a round.
    pub(crate) fn new(config: &GameConfig) -> Self {
        Self {
            config: config.clone(),
            phase: RoundPhase::Idle,
            level: 0,
            target: 0,
            marker: 0.0,
            current: 0,
            speed: config.speed_for_level(0),
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn marker(&self) -> f64 {
        self.marker
    }

    /// Block index under the marker.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn block_count(&self) -> usize {
        self.config.block_count
    }

    /// Enters `Running` at level 1. The caller announces the level change.
    pub fn start(&mut self) -> u32 {
        self.phase = RoundPhase::Running;
        self.level = 1;
        self.level
    }

    /// Bumps the level. The caller announces it so `enter_level` runs.
    pub fn level_up(&mut self) -> u32 {
        self.level = self.level.saturating_add(1);
        self.level
    }

    pub fn end(&mut self) {
        self.phase = RoundPhase::Ended;
    }

    /// Applies a level change: new speed, marker back to block 0, fresh target.
    pub fn enter_level<R: IndexSource + ?Sized>(&mut self, level: u32, rng: &mut R) -> LevelEntered {
        self.level = level;
        self.speed = self.config.speed_for_level(level);
        self.marker = 0.0;
        self.current = 0;
        self.target = reroll_target(rng, self.target, self.block_count());
        LevelEntered {
            level,
            target: self.target,
        }
    }

    /// Moves the marker by `speed * dt`, wrapping at the end of the row.
    /// Returns the new block index when it changed.
    pub fn advance(&mut self, dt: Duration) -> Option<usize> {
        self.marker += self.speed * dt.as_secs_f64();
        let block_count = self.block_count();
        if self.marker >= block_count as f64 {
            self.marker = 0.0;
        }
        let current = (self.marker.floor() as usize).min(block_count.saturating_sub(1));
        if current == self.current {
            return None;
        }
        self.current = current;
        Some(current)
    }

    /// On a hit the caller bumps the score and calls `level_up`.
    pub fn tap(&self) -> TapOutcome {
        if !self.is_running() {
            TapOutcome::Ignored
        } else if self.current == self.target {
            TapOutcome::Hit
        } else {
            TapOutcome::Miss
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(blocks: usize) -> Round {
        Round::new(&GameConfig::default().with_block_count(blocks))
    }

    #[test]
    fn reroll_moves_off_a_repeated_draw() {
        let mut rng = ScriptedIndices::new([3]);
        assert_eq!(reroll_target(&mut rng, 3, 5), 4);
        let mut rng = ScriptedIndices::new([4]);
        assert_eq!(reroll_target(&mut rng, 4, 5), 0);
        let mut rng = ScriptedIndices::new([2]);
        assert_eq!(reroll_target(&mut rng, 4, 5), 2);
    }

    #[test]
    fn entering_a_level_resets_marker_and_sets_speed() {
        let mut r = round(5);
        r.start();
        let mut rng = ScriptedIndices::new([2]);
        r.enter_level(1, &mut rng);
        r.advance(Duration::from_millis(900));
        assert_ne!(r.marker(), 0.0);

        let entered = r.enter_level(3, &mut rng);
        assert_eq!(entered.level, 3);
        assert_eq!(r.marker(), 0.0);
        assert_eq!(r.current(), 0);
        assert!((r.speed() - 2.1).abs() < 1e-9);
    }

    #[test]
    fn level_speed_comes_from_config() {
        let config = GameConfig {
            base_speed: 2.0,
            speed_per_level: 0.5,
            ..GameConfig::default()
        };
        let mut r = Round::new(&config);
        r.start();
        let mut rng = ScriptedIndices::new([1, 2, 3]);
        for level in 1..=3 {
            r.enter_level(level, &mut rng);
            assert!((r.speed() - config.speed_for_level(level)).abs() < 1e-9);
        }
        // 3.5 blocks/s at level 3.
        assert_eq!(r.advance(Duration::from_secs(1)), Some(3));
    }

    #[test]
    fn marker_advances_by_speed_and_wraps() {
        let mut r = round(5);
        r.start();
        r.enter_level(0, &mut ScriptedIndices::new([1]));
        // 1.5 blocks per second at level 0.
        assert_eq!(r.advance(Duration::from_secs(1)), Some(1));
        assert!((r.marker() - 1.5).abs() < 1e-9);
        assert_eq!(r.advance(Duration::from_secs(2)), Some(4));
        assert_eq!(r.advance(Duration::from_secs(1)), Some(0));
        assert_eq!(r.marker(), 0.0);
    }

    #[test]
    fn tap_outcome_depends_on_phase_and_alignment() {
        let mut r = round(5);
        assert_eq!(r.tap(), TapOutcome::Ignored);

        r.start();
        r.enter_level(1, &mut ScriptedIndices::new([0]));
        // Previous target defaults to 0, so a draw of 0 rerolls to 1.
        assert_eq!(r.target(), 1);
        assert_eq!(r.tap(), TapOutcome::Miss);

        r.advance(Duration::from_millis(700));
        assert_eq!(r.current(), 1);
        assert_eq!(r.tap(), TapOutcome::Hit);

        r.end();
        assert_eq!(r.tap(), TapOutcome::Ignored);
    }
}
