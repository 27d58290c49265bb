use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{BuildingKind, INITIAL_AVAILABLE};
use crate::challenges::ChallengeId;
use crate::history::HistoricDataPoint;
use crate::indicators::{IndicatorSnapshot, BASELINE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub u64);

impl BuildingId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Ground-level cell position in world units, already snapped to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub z: i32,
}

impl GridPosition {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Snaps a raycast hit on the ground plane to the nearest cell; halves round up.
    pub fn snap(world_x: f64, world_z: f64, cell_size: i32) -> Self {
        let cell = f64::from(cell_size.max(1));
        let snap_axis = |value: f64| ((value / cell + 0.5).floor() * cell) as i32;
        Self {
            x: snap_axis(world_x),
            z: snap_axis(world_z),
        }
    }

    pub fn within(self, limit: i64) -> bool {
        i64::from(self.x).abs() < limit && i64::from(self.z).abs() < limit
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedBuilding {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub position: GridPosition,
}

/// A challenge closed without completion, remembered for the turn it was closed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Acknowledgement {
    pub challenge: ChallengeId,
    pub turn: u32,
}

/// The authoritative aggregate. Only the engine produces new values of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub placed_buildings: Vec<PlacedBuilding>,
    pub indicators: IndicatorSnapshot,
    pub available_buildings: BTreeSet<BuildingKind>,
    pub unlocked_terrain_areas: u32,
    pub history: Vec<HistoricDataPoint>,
    pub current_turn: u32,
    pub current_challenge: Option<ChallengeId>,
    pub completed_challenge_ids: Vec<ChallengeId>,
    pub acknowledged: Option<Acknowledgement>,
    pub selected_building_for_info: Option<BuildingKind>,
    next_building_id: u64,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            placed_buildings: Vec::new(),
            indicators: BASELINE,
            available_buildings: INITIAL_AVAILABLE.into_iter().collect(),
            unlocked_terrain_areas: 0,
            history: vec![HistoricDataPoint {
                turn: 0,
                indicators: BASELINE,
            }],
            current_turn: 0,
            current_challenge: None,
            completed_challenge_ids: Vec::new(),
            acknowledged: None,
            selected_building_for_info: None,
            next_building_id: 0,
        }
    }

    pub fn building_count(&self) -> usize {
        self.placed_buildings.len()
    }

    pub fn count_of(&self, kind: BuildingKind) -> usize {
        self.placed_buildings
            .iter()
            .filter(|building| building.kind == kind)
            .count()
    }

    pub fn has(&self, kind: BuildingKind) -> bool {
        self.placed_buildings
            .iter()
            .any(|building| building.kind == kind)
    }

    pub fn house_count(&self) -> usize {
        self.count_of(BuildingKind::House)
    }

    pub fn building_at(&self, position: GridPosition) -> Option<&PlacedBuilding> {
        self.placed_buildings
            .iter()
            .find(|building| building.position == position)
    }

    pub fn is_available(&self, kind: BuildingKind) -> bool {
        self.available_buildings.contains(&kind)
    }

    pub fn is_completed(&self, challenge: ChallengeId) -> bool {
        self.completed_challenge_ids.contains(&challenge)
    }

    /// True while `challenge` was dismissed during the current turn.
    pub fn is_acknowledged(&self, challenge: ChallengeId) -> bool {
        self.acknowledged
            .is_some_and(|ack| ack.challenge == challenge && ack.turn == self.current_turn)
    }

    pub(crate) fn push_building(&mut self, kind: BuildingKind, position: GridPosition) -> BuildingId {
        let id = BuildingId(self.next_building_id);
        self.next_building_id += 1;
        self.placed_buildings.push(PlacedBuilding { id, kind, position });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_turn_zero_history() {
        let state = GameState::new();
        assert_eq!(state.current_turn, 0);
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].turn, 0);
        assert!(state.is_available(BuildingKind::House));
        assert!(state.is_available(BuildingKind::CommunityGarden));
        assert!(!state.is_available(BuildingKind::SolarArray));
    }

    #[test]
    fn snapping_rounds_half_up() {
        assert_eq!(GridPosition::snap(0.9, -0.9, 2), GridPosition::new(0, 0));
        assert_eq!(GridPosition::snap(1.0, 3.1, 2), GridPosition::new(2, 4));
        assert_eq!(GridPosition::snap(-1.0, -3.0, 2), GridPosition::new(0, -2));
    }

    #[test]
    fn bounds_are_exclusive() {
        assert!(GridPosition::new(8, -8).within(10));
        assert!(!GridPosition::new(10, 0).within(10));
        assert!(!GridPosition::new(0, -10).within(10));
    }

    #[test]
    fn building_ids_are_unique() {
        let mut state = GameState::new();
        let a = state.push_building(BuildingKind::House, GridPosition::new(0, 0));
        let b = state.push_building(BuildingKind::House, GridPosition::new(2, 0));
        assert_ne!(a, b);
        assert_eq!(state.house_count(), 2);
        assert!(state.building_at(GridPosition::new(2, 0)).is_some());
    }
}
