use rand::Rng;

use crate::{
    catalog::BuildingKind,
    config::Rules,
    engine::Intent,
    placement::PlacementIntent,
    rng::RngManager,
    state::GameState,
};

/// Seeded stand-in for a player: dismisses any offered challenge, otherwise
/// picks an unlocked kind and a cell inside the current terrain.
///
/// The chosen cell may already be occupied or the kind unaffordable; callers
/// treat a rejected intent as a wasted attempt.
pub struct RandomPlanner {
    rng: RngManager,
}

impl RandomPlanner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: RngManager::new(seed),
        }
    }

    pub fn next_intent(&mut self, state: &GameState, rules: &Rules) -> Intent {
        if state.current_challenge.is_some() {
            return Intent::CloseChallenge;
        }

        let kinds: Vec<BuildingKind> = state.available_buildings.iter().copied().collect();
        let kind = if kinds.is_empty() {
            BuildingKind::House
        } else {
            kinds[self.rng.stream("kinds").gen_range(0..kinds.len())]
        };

        let limit = rules.terrain_limit(state.unlocked_terrain_areas);
        let cell = i64::from(rules.cell_size.max(1));
        // largest cell index whose coordinate stays strictly inside the limit
        let reach = ((limit - 1).max(0) / cell) as i32;
        let mut cells = self.rng.stream("cells");
        let x = cells.gen_range(-reach..=reach) * rules.cell_size;
        let z = cells.gen_range(-reach..=reach) * rules.cell_size;

        Intent::Place(PlacementIntent::new(kind, x, z))
    }
}
