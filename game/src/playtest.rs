use engine::{FixedStep, Frame, FrameLoop, HeadlessRunner};
use serde::{Deserialize, Serialize};

use crate::display::Display;
use crate::round::{IndexSource, Round};
use crate::session::Session;
use crate::store::ScoreStore;

/// Scripted player: taps exactly when the marker will be on the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoPlayer {
    /// From this level on the player taps off-target instead.
    pub miss_at_level: Option<u32>,
}

impl AutoPlayer {
    pub fn perfect() -> Self {
        Self::default()
    }

    pub fn missing_at(level: u32) -> Self {
        Self {
            miss_at_level: Some(level),
        }
    }

    /// Looks one step ahead: the marker moves before the tap is judged.
    pub fn wants_tap(&self, round: &Round, frame: Frame) -> bool {
        if !round.is_running() {
            return false;
        }
        let mut lookahead = round.clone();
        lookahead.advance(frame.dt);
        let on_target = lookahead.current() == lookahead.target();
        match self.miss_at_level {
            Some(level) if round.level() >= level => !on_target,
            _ => on_target,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    pub score: u32,
    pub level: u32,
    pub best: u32,
    pub frames: usize,
    /// `false` when the frame cap was hit first.
    pub ended: bool,
}

struct Autoplay<'a, S: ScoreStore, R: IndexSource, D: Display> {
    session: &'a mut Session<S, R, D>,
    player: AutoPlayer,
}

impl<S: ScoreStore, R: IndexSource, D: Display> FrameLoop for Autoplay<'_, S, R, D> {
    fn on_frame(&mut self, frame: Frame) {
        let tap = self.player.wants_tap(self.session.round(), frame);
        self.session.frame(Frame { tap, ..frame });
    }

    fn is_finished(&self) -> bool {
        self.session.is_finished()
    }
}

/// Starts a round and drives it at `fps` until it ends or `max_frames` pass.
pub fn play_round<S, R, D>(
    session: &mut Session<S, R, D>,
    player: AutoPlayer,
    fps: u32,
    max_frames: usize,
) -> RoundReport
where
    S: ScoreStore,
    R: IndexSource,
    D: Display,
{
    session.start_game();
    let mut runner = HeadlessRunner::new(Autoplay { session, player });
    let frames = runner.run(FixedStep::per_second(fps).map(Frame::idle), max_frames);
    let session = runner.into_inner().session;

    let ended = !session.is_running();
    tracing::debug!(frames, ended, "autoplay round finished");
    RoundReport {
        score: session.score(),
        level: session.level(),
        best: session.high_score(),
        frames,
        ended,
    }
}
