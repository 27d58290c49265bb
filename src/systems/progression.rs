use tracing::info;

use crate::{
    engine::{System, SystemContext},
    progression::derive_unlocks,
    state::GameState,
};

pub struct ProgressionSystem;

impl ProgressionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProgressionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ProgressionSystem {
    fn name(&self) -> &str {
        "progression"
    }

    fn run(&self, ctx: &mut SystemContext<'_>, state: &mut GameState) {
        let unlocks = derive_unlocks(
            &state.placed_buildings,
            &state.indicators,
            &state.available_buildings,
            state.unlocked_terrain_areas,
            ctx.rules,
        );
        for kind in &unlocks.newly_available {
            info!(
                target: "vila_verde::progression",
                turn = ctx.turn,
                %kind,
                "building.unlocked"
            );
        }
        if unlocks.terrain > state.unlocked_terrain_areas {
            info!(
                target: "vila_verde::progression",
                turn = ctx.turn,
                rings = unlocks.terrain,
                "terrain.expanded"
            );
        }
        state.available_buildings = unlocks.available;
        state.unlocked_terrain_areas = unlocks.terrain;
        ctx.newly_available.extend(unlocks.newly_available);
    }
}
