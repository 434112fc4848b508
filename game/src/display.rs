//! Push-only boundary to whatever draws the game.

use serde::{Deserialize, Serialize};

use crate::view::Panel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockMaterial {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PulseTarget {
    DisplayedScore,
    Delta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayUpdate {
    Score(u32),
    DisplayedScore(u32),
    /// Already formatted, see [`format_delta`].
    Delta(String),
    ClearDelta,
    Level(String),
    Summary { score: String, best: String },
    Block { index: usize, material: BlockMaterial },
    Marker(usize),
    Pulse(PulseTarget),
    Panel(Panel),
}

pub trait Display {
    fn apply(&mut self, update: DisplayUpdate);
}

impl<D: Display + ?Sized> Display for &mut D {
    fn apply(&mut self, update: DisplayUpdate) {
        (**self).apply(update);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDisplay;

impl Display for NullDisplay {
    fn apply(&mut self, _update: DisplayUpdate) {}
}

/// Keeps every update in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    updates: Vec<DisplayUpdate>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> &[DisplayUpdate] {
        &self.updates
    }

    pub fn count(&self, pred: impl Fn(&DisplayUpdate) -> bool) -> usize {
        self.updates.iter().filter(|u| pred(u)).count()
    }

    pub fn last_panel(&self) -> Option<Panel> {
        self.updates.iter().rev().find_map(|u| match u {
            DisplayUpdate::Panel(p) => Some(*p),
            _ => None,
        })
    }
}

impl Display for RecordingDisplay {
    fn apply(&mut self, update: DisplayUpdate) {
        self.updates.push(update);
    }
}

/// Logs updates at trace level; used by the headless binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDisplay;

impl Display for TracingDisplay {
    fn apply(&mut self, update: DisplayUpdate) {
        match &update {
            DisplayUpdate::Marker(_) | DisplayUpdate::Block { .. } | DisplayUpdate::Pulse(_) => {
                tracing::trace!(?update, "display");
            }
            _ => tracing::debug!(?update, "display"),
        }
    }
}

/// Positive deltas get a leading `+`; zero and negatives print bare.
pub fn format_delta(delta: i64) -> String {
    if delta > 0 {
        format!("+{delta}")
    } else {
        delta.to_string()
    }
}

pub fn level_text(level: u32) -> String {
    format!("Level {level}")
}

pub fn best_text(best: u32) -> String {
    format!("BEST {best}")
}
