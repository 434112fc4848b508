use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One tick of the frame clock, joined with whatever input arrived on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Time since the previous frame.
    pub dt: Duration,
    /// A tap/click landed on this frame.
    pub tap: bool,
}

impl Frame {
    pub fn idle(dt: Duration) -> Self {
        Self { dt, tap: false }
    }

    pub fn tap(dt: Duration) -> Self {
        Self { dt, tap: true }
    }

    /// Zips a clock with an input source.
    ///
    /// The stream ends when the clock ends. An exhausted input source reads as
    /// "no tap" for every remaining frame.
    pub fn stream<C, I>(clock: C, input: I) -> impl Iterator<Item = Frame>
    where
        C: IntoIterator<Item = Duration>,
        I: IntoIterator<Item = bool>,
    {
        let mut input = input.into_iter().fuse();
        clock.into_iter().map(move |dt| Frame {
            dt,
            tap: input.next().unwrap_or(false),
        })
    }
}

/// Infinite clock with a constant step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedStep {
    dt: Duration,
}

impl FixedStep {
    pub fn new(dt: Duration) -> Self {
        Self { dt }
    }

    /// Step for a given frame rate. A rate of 0 is treated as 1 fps.
    pub fn per_second(fps: u32) -> Self {
        Self::new(Duration::from_secs(1) / fps.max(1))
    }

    pub fn dt(&self) -> Duration {
        self.dt
    }
}

impl Iterator for FixedStep {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.dt)
    }
}

/// Plays back a fixed list of frames, then ends.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFrames {
    frames: Vec<Frame>,
    cursor: usize,
}

impl ScriptedFrames {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames, cursor: 0 }
    }

    pub fn push(mut self, frame: Frame) -> Self {
        self.frames.push(frame);
        self
    }

    /// Appends `count` tap-free frames of `dt` each.
    pub fn idle(mut self, dt: Duration, count: usize) -> Self {
        self.frames
            .extend(std::iter::repeat_n(Frame::idle(dt), count));
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len() - self.cursor
    }
}

impl Iterator for ScriptedFrames {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let frame = self.frames.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(frame)
    }
}

/// Monotonic virtual time, advanced only by frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    now: Duration,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn advance(&mut self, dt: Duration) -> Duration {
        self.now = self.now.saturating_add(dt);
        self.now
    }
}
