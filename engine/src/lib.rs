pub mod debounce;
pub mod frame;
pub mod subscription;

pub use debounce::Debounce;
pub use frame::{Clock, FixedStep, Frame, ScriptedFrames};
pub use subscription::{Registry, Subscription, SubscriptionId, SubscriptionSet};

/// Anything that consumes frames one at a time.
pub trait FrameLoop {
    fn on_frame(&mut self, frame: Frame);

    /// Lets a loop stop the runner early (e.g. the round ended).
    fn is_finished(&self) -> bool {
        false
    }
}

/// Pumps a frame source into a [`FrameLoop`] without a window or real clock.
#[derive(Debug)]
pub struct HeadlessRunner<L: FrameLoop> {
    target: L,
    frame: usize,
}

impl<L: FrameLoop> HeadlessRunner<L> {
    pub fn new(target: L) -> Self {
        Self { target, frame: 0 }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn target(&self) -> &L {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut L {
        &mut self.target
    }

    pub fn into_inner(self) -> L {
        self.target
    }

    pub fn step(&mut self, frame: Frame) -> usize {
        self.target.on_frame(frame);
        self.frame += 1;
        self.frame
    }

    /// Runs until the source ends, the loop reports finished, or `limit` frames
    /// have been delivered by this call. Returns the frames delivered.
    pub fn run<I>(&mut self, frames: I, limit: usize) -> usize
    where
        I: IntoIterator<Item = Frame>,
    {
        let mut delivered = 0;
        for frame in frames.into_iter() {
            if delivered >= limit || self.target.is_finished() {
                break;
            }
            self.step(frame);
            delivered += 1;
        }
        delivered
    }
}
