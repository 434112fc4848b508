use serde::{Deserialize, Serialize};

/// Which menu panel is showing. Exactly one is visible at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    #[default]
    MainMenu,
    Gameplay,
    EndSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelEvent {
    Start,
    Fail,
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelEffect {
    None,
    BeginRound,
    ShowSummary,
}

impl Panel {
    /// Pure transition function for the menu panels.
    ///
    /// Side effects (starting a round, filling in the summary) are reported via
    /// `PanelEffect` so the session decides when to run them.
    pub fn handle(self, event: PanelEvent) -> (Panel, PanelEffect) {
        match (self, event) {
            (Panel::MainMenu, PanelEvent::Start) => (Panel::Gameplay, PanelEffect::BeginRound),
            (Panel::Gameplay, PanelEvent::Fail) => (Panel::EndSummary, PanelEffect::ShowSummary),
            (Panel::EndSummary, PanelEvent::Restart) => {
                (Panel::Gameplay, PanelEffect::BeginRound)
            }
            // Restarting mid-round replaces the round in place.
            (Panel::Gameplay, PanelEvent::Restart) => (Panel::Gameplay, PanelEffect::BeginRound),

            // Ignore irrelevant events in the current state.
            (state, _) => (state, PanelEffect::None),
        }
    }
}
