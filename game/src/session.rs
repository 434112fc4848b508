//! Top-level game session: menu panels, round lifecycle and handler dispatch.
//!
//! Everything runs on the caller's thread, one frame at a time. State changes
//! raise [`Signal`]s which are drained to live handlers before the triggering
//! call returns, so a frame is fully processed before the next one arrives.
//!
//! Handlers are registered in a [`Registry`] and grouped into two sets:
//!
//! - the session set (score delta, score debounce, high score, display
//!   commit), alive until [`Session::shutdown`];
//! - the round set (level change, marker advance, tap), rebuilt by every
//!   [`Session::start_game`] and disposed by every [`Session::stop_game`].

use std::collections::VecDeque;
use std::time::Duration;

use engine::{Clock, Frame, FrameLoop, Registry, SubscriptionSet};
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::display::{
    BlockMaterial, Display, DisplayUpdate, PulseTarget, best_text, format_delta, level_text,
};
use crate::error::ConfigError;
use crate::highscore::HighScoreAggregator;
use crate::round::{IndexSource, Round, RoundPhase, TapOutcome};
use crate::score::ScoreEngine;
use crate::store::ScoreStore;
use crate::view::{Panel, PanelEffect, PanelEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handler {
    LevelChange,
    MarkerAdvance,
    Tap,
    ScoreDelta,
    ScoreDebounce,
    HighScore,
    DisplayCommit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Level,
    Score,
    Frame,
}

impl Handler {
    pub const ROUND: [Handler; 3] = [Handler::LevelChange, Handler::MarkerAdvance, Handler::Tap];
    pub const SESSION: [Handler; 4] = [
        Handler::ScoreDelta,
        Handler::ScoreDebounce,
        Handler::HighScore,
        Handler::DisplayCommit,
    ];

    fn trigger(self) -> Trigger {
        match self {
            Handler::LevelChange => Trigger::Level,
            Handler::ScoreDelta | Handler::ScoreDebounce | Handler::HighScore => Trigger::Score,
            Handler::MarkerAdvance | Handler::Tap | Handler::DisplayCommit => Trigger::Frame,
        }
    }

    /// Position within a frame: marker before tap before display commit.
    fn frame_order(self) -> u8 {
        match self {
            Handler::MarkerAdvance => 0,
            Handler::Tap => 1,
            _ => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Level(u32),
    Score(u32),
}

impl Signal {
    fn trigger(self) -> Trigger {
        match self {
            Signal::Level(_) => Trigger::Level,
            Signal::Score(_) => Trigger::Score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub score: u32,
    pub best: u32,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub panel: Panel,
    pub phase: RoundPhase,
    pub score: u32,
    pub displayed_score: u32,
    pub delta: i64,
    pub level: u32,
    pub target: usize,
    pub current: usize,
    pub marker: f64,
    pub speed: f64,
    pub high_score: u32,
    pub rounds_started: u32,
    pub live_subscriptions: usize,
    pub round_subscriptions: usize,
}

pub struct Session<S: ScoreStore, R: IndexSource, D: Display> {
    config: GameConfig,
    store: S,
    rng: R,
    display: D,
    registry: Registry<Handler>,
    session_set: SubscriptionSet<Handler>,
    round_set: SubscriptionSet<Handler>,
    signals: VecDeque<Signal>,
    clock: Clock,
    panel: Panel,
    round: Round,
    score: ScoreEngine,
    high_score: HighScoreAggregator,
    last_summary: Option<RoundSummary>,
    rounds_started: u32,
    shut_down: bool,
}

impl<S: ScoreStore, R: IndexSource, D: Display> Session<S, R, D> {
    pub fn new(config: GameConfig, store: S, rng: R, mut display: D) -> Result<Self, ConfigError> {
        config.validate()?;

        let high_score = HighScoreAggregator::seeded(&store, &config.highscore_key);
        let mut registry = Registry::new();
        let mut session_set = SubscriptionSet::new("session");
        for handler in Handler::SESSION {
            session_set.subscribe(&mut registry, handler);
        }

        display.apply(DisplayUpdate::Panel(Panel::MainMenu));

        Ok(Self {
            round: Round::new(&config),
            score: ScoreEngine::new(config.display_debounce),
            config,
            store,
            rng,
            display,
            registry,
            session_set,
            round_set: SubscriptionSet::new("round"),
            signals: VecDeque::new(),
            clock: Clock::new(),
            panel: Panel::MainMenu,
            high_score,
            last_summary: None,
            rounds_started: 0,
            shut_down: false,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn is_running(&self) -> bool {
        self.round.is_running()
    }

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    pub fn displayed_score(&self) -> u32 {
        self.score.displayed()
    }

    pub fn delta(&self) -> i64 {
        self.score.delta()
    }

    pub fn high_score(&self) -> u32 {
        self.high_score.best()
    }

    pub fn level(&self) -> u32 {
        self.round.level()
    }

    pub fn target(&self) -> usize {
        self.round.target()
    }

    pub fn current(&self) -> usize {
        self.round.current()
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn last_summary(&self) -> Option<RoundSummary> {
        self.last_summary
    }

    pub fn rounds_started(&self) -> u32 {
        self.rounds_started
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn live_subscriptions(&self) -> usize {
        self.registry.live_count()
    }

    pub fn round_subscriptions(&self) -> usize {
        self.round_set.len()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            panel: self.panel,
            phase: self.round.phase(),
            score: self.score.score(),
            displayed_score: self.score.displayed(),
            delta: self.score.delta(),
            level: self.round.level(),
            target: self.round.target(),
            current: self.round.current(),
            marker: self.round.marker(),
            speed: self.round.speed(),
            high_score: self.high_score.best(),
            rounds_started: self.rounds_started,
            live_subscriptions: self.registry.live_count(),
            round_subscriptions: self.round_set.len(),
        }
    }

    /// Starts a round from the main menu or the summary. Called mid-round it
    /// restarts in place. Returns `false` after shutdown.
    pub fn start_game(&mut self) -> bool {
        if self.shut_down {
            tracing::warn!("start_game after shutdown ignored");
            return false;
        }

        let (panel, effect) = match self.panel.handle(PanelEvent::Start) {
            (panel, PanelEffect::BeginRound) => (panel, PanelEffect::BeginRound),
            _ => self.panel.handle(PanelEvent::Restart),
        };
        if effect != PanelEffect::BeginRound {
            tracing::warn!(panel = ?self.panel, "start_game not available from this panel");
            return false;
        }
        self.set_panel(panel);

        let stale = self.round_set.dispose(&mut self.registry);
        if stale > 0 {
            tracing::debug!(stale, "restarting over a live round");
        }

        self.score.force_displayed(0);
        self.show_displayed(0);
        if self.score.set_score(0).is_some() {
            self.signals.push_back(Signal::Score(0));
        }

        for handler in Handler::ROUND {
            self.round_set.subscribe(&mut self.registry, handler);
        }
        let level = self.round.start();
        self.signals.push_back(Signal::Level(level));
        self.rounds_started += 1;
        self.drain_signals();

        tracing::info!(
            round = self.rounds_started,
            target = self.round.target(),
            high_score = self.high_score.best(),
            "round started"
        );
        true
    }

    /// Ends the running round: handlers off, summary up, store flushed.
    pub fn stop_game(&mut self) -> bool {
        if self.shut_down || !self.round.is_running() {
            tracing::warn!(panel = ?self.panel, "stop_game without a running round ignored");
            return false;
        }

        self.round_set.dispose(&mut self.registry);
        self.round.end();

        let (panel, effect) = self.panel.handle(PanelEvent::Fail);
        self.set_panel(panel);

        let summary = RoundSummary {
            score: self.score.score(),
            best: self.high_score.best(),
            level: self.round.level(),
        };
        if effect == PanelEffect::ShowSummary {
            self.display.apply(DisplayUpdate::Summary {
                score: summary.score.to_string(),
                best: best_text(summary.best),
            });
        }
        self.last_summary = Some(summary);

        if let Err(err) = self.store.flush() {
            tracing::error!(%err, "failed to flush score store");
        }

        tracing::info!(
            score = summary.score,
            best = summary.best,
            level = summary.level,
            "round ended"
        );
        true
    }

    /// Disposes every subscription exactly once. Later calls are no-ops that return 0.
    pub fn shutdown(&mut self) -> usize {
        if self.shut_down {
            return 0;
        }
        self.shut_down = true;
        self.signals.clear();
        let cancelled = self.round_set.dispose(&mut self.registry)
            + self.session_set.dispose(&mut self.registry);
        if let Err(err) = self.store.flush() {
            tracing::error!(%err, "failed to flush score store on shutdown");
        }
        tracing::info!(cancelled, "session shut down");
        cancelled
    }

    /// Processes one tick: pending signals, marker, tap, then the display debounce.
    pub fn frame(&mut self, frame: Frame) {
        if self.shut_down {
            return;
        }
        let now = self.clock.advance(frame.dt);
        self.drain_signals();

        let mut subs = self.registry.live(|h| h.trigger() == Trigger::Frame);
        subs.sort_by_key(|s| s.handler.frame_order());
        for sub in subs {
            // An earlier handler this frame may have ended the round.
            if !self.registry.is_live(sub.id) {
                continue;
            }
            match sub.handler {
                Handler::MarkerAdvance => self.on_marker_advance(frame.dt),
                Handler::Tap if frame.tap => self.on_tap(),
                Handler::DisplayCommit => self.on_display_commit(now),
                _ => {}
            }
            self.drain_signals();
        }
    }

    fn drain_signals(&mut self) {
        while let Some(signal) = self.signals.pop_front() {
            let trigger = signal.trigger();
            for sub in self.registry.live(|h| h.trigger() == trigger) {
                if !self.registry.is_live(sub.id) {
                    continue;
                }
                match (sub.handler, signal) {
                    (Handler::LevelChange, Signal::Level(level)) => self.on_level_change(level),
                    (Handler::ScoreDelta, Signal::Score(score)) => self.on_score_delta(score),
                    (Handler::ScoreDebounce, Signal::Score(score)) => {
                        self.score.schedule_display(score, self.clock.now());
                    }
                    (Handler::HighScore, Signal::Score(score)) => {
                        self.high_score.observe(&mut self.store, score);
                    }
                    _ => {}
                }
            }
        }
    }

    fn on_level_change(&mut self, level: u32) {
        let entered = self.round.enter_level(level, &mut self.rng);
        tracing::debug!(
            level = entered.level,
            target = entered.target,
            speed = self.round.speed(),
            "level entered"
        );

        self.display.apply(DisplayUpdate::Level(level_text(entered.level)));
        self.display.apply(DisplayUpdate::Marker(self.round.current()));
        for index in 0..self.round.block_count() {
            let material = if index == entered.target {
                BlockMaterial::Active
            } else {
                BlockMaterial::Inactive
            };
            self.display.apply(DisplayUpdate::Block { index, material });
        }
    }

    fn on_marker_advance(&mut self, dt: Duration) {
        if let Some(current) = self.round.advance(dt) {
            self.display.apply(DisplayUpdate::Marker(current));
        }
    }

    fn on_tap(&mut self) {
        match self.round.tap() {
            TapOutcome::Hit => {
                let change = self.score.increment();
                let level = self.round.level_up();
                self.signals.push_back(Signal::Score(change.score));
                self.signals.push_back(Signal::Level(level));
            }
            TapOutcome::Miss => {
                tracing::debug!(
                    current = self.round.current(),
                    target = self.round.target(),
                    "missed tap"
                );
                self.stop_game();
            }
            TapOutcome::Ignored => {}
        }
    }

    fn on_score_delta(&mut self, score: u32) {
        let delta = i64::from(score) - i64::from(self.score.displayed());
        self.display.apply(DisplayUpdate::Score(score));
        self.display.apply(DisplayUpdate::Delta(format_delta(delta)));
        self.display.apply(DisplayUpdate::Pulse(PulseTarget::Delta));
    }

    fn on_display_commit(&mut self, now: Duration) {
        if let Some(value) = self.score.poll(now) {
            self.show_displayed(value);
        }
    }

    fn show_displayed(&mut self, value: u32) {
        self.display.apply(DisplayUpdate::DisplayedScore(value));
        self.display.apply(DisplayUpdate::Pulse(PulseTarget::DisplayedScore));
        self.display.apply(DisplayUpdate::ClearDelta);
    }

    fn set_panel(&mut self, panel: Panel) {
        if panel != self.panel {
            self.panel = panel;
            self.display.apply(DisplayUpdate::Panel(panel));
        }
    }
}

impl<S: ScoreStore, R: IndexSource, D: Display> FrameLoop for Session<S, R, D> {
    fn on_frame(&mut self, frame: Frame) {
        self.frame(frame);
    }

    fn is_finished(&self) -> bool {
        self.shut_down || self.round.phase() == RoundPhase::Ended
    }
}
