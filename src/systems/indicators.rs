use crate::{
    engine::{System, SystemContext},
    indicators::recompute,
    state::GameState,
};

pub struct IndicatorSystem;

impl IndicatorSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IndicatorSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for IndicatorSystem {
    fn name(&self) -> &str {
        "indicators"
    }

    fn run(&self, ctx: &mut SystemContext<'_>, state: &mut GameState) {
        state.indicators = recompute(&state.placed_buildings, ctx.catalog, ctx.rules);
    }
}
