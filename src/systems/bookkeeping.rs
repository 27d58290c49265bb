use crate::{
    engine::{System, SystemContext},
    history::HistoricDataPoint,
    state::GameState,
};

/// Appends the turn's indicators to the history.
pub struct BookkeepingSystem;

impl BookkeepingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BookkeepingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for BookkeepingSystem {
    fn name(&self) -> &str {
        "bookkeeping"
    }

    fn run(&self, _ctx: &mut SystemContext<'_>, state: &mut GameState) {
        state.history.push(HistoricDataPoint {
            turn: state.current_turn,
            indicators: state.indicators,
        });
        debug_assert_eq!(state.history.len(), state.current_turn as usize + 1);
    }
}
