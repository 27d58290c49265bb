use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{BuildingKind, Catalog, UnknownKind};
use crate::config::Rules;
use crate::state::{GameState, GridPosition};

/// Cell coordinates as sent by the scene layer; `y` is always ground level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCoords {
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    pub z: i32,
}

impl From<CellCoords> for GridPosition {
    fn from(value: CellCoords) -> Self {
        GridPosition::new(value.x, value.z)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementIntent {
    pub position: CellCoords,
    pub kind: String,
}

impl PlacementIntent {
    pub fn new(kind: BuildingKind, x: i32, z: i32) -> Self {
        Self {
            position: CellCoords { x, y: 0, z },
            kind: kind.as_str().to_string(),
        }
    }

    pub fn resolve(&self) -> Result<(GridPosition, BuildingKind), PlacementError> {
        let kind = self.kind.parse::<BuildingKind>()?;
        Ok((self.position.into(), kind))
    }
}

/// A ground-plane hit in world units, before snapping to the cell grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldPlacement {
    pub x: f64,
    pub z: f64,
    pub kind: String,
}

impl WorldPlacement {
    pub fn snap(&self, cell_size: i32) -> PlacementIntent {
        let position = GridPosition::snap(self.x, self.z, cell_size);
        PlacementIntent {
            position: CellCoords {
                x: position.x,
                y: 0,
                z: position.z,
            },
            kind: self.kind.clone(),
        }
    }
}

/// Rejected placement preconditions. None of them change state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("unknown building kind '{0}'")]
    UnknownKind(String),
    #[error("cell ({x}, {z}) is outside the unlocked terrain (limit {limit})")]
    OutOfBounds { x: i32, z: i32, limit: i64 },
    #[error("cell ({x}, {z}) is already occupied")]
    CellOccupied { x: i32, z: i32 },
    #[error("{0} has not been unlocked yet")]
    Locked(BuildingKind),
    #[error("insufficient energy: {kind} needs {required}, balance is {available}")]
    InsufficientEnergy {
        kind: BuildingKind,
        required: i32,
        available: i32,
    },
}

impl From<UnknownKind> for PlacementError {
    fn from(value: UnknownKind) -> Self {
        PlacementError::UnknownKind(value.0)
    }
}

impl PlacementError {
    pub fn code(&self) -> &'static str {
        match self {
            PlacementError::UnknownKind(_) => "unknown_kind",
            PlacementError::OutOfBounds { .. } => "out_of_bounds",
            PlacementError::CellOccupied { .. } => "cell_occupied",
            PlacementError::Locked(_) => "locked",
            PlacementError::InsufficientEnergy { .. } => "insufficient_energy",
        }
    }
}

/// Checks every precondition of placing `kind` at `position` against `state`.
pub fn check(
    state: &GameState,
    position: GridPosition,
    kind: BuildingKind,
    catalog: &Catalog,
    rules: &Rules,
) -> Result<(), PlacementError> {
    let limit = rules.terrain_limit(state.unlocked_terrain_areas);
    if !position.within(limit) {
        return Err(PlacementError::OutOfBounds {
            x: position.x,
            z: position.z,
            limit,
        });
    }

    if state.building_at(position).is_some() {
        return Err(PlacementError::CellOccupied {
            x: position.x,
            z: position.z,
        });
    }

    if !state.is_available(kind) {
        return Err(PlacementError::Locked(kind));
    }

    let energy = catalog.definition_of(kind).effects.energy();
    let founding = rules.free_first_placement && state.placed_buildings.is_empty();
    // Solar is the generator itself and never pays for its own placement.
    if energy < 0 && kind != BuildingKind::SolarArray && !founding {
        let required = energy.saturating_neg();
        if state.indicators.energy_balance < required {
            return Err(PlacementError::InsufficientEnergy {
                kind,
                required,
                available: state.indicators.energy_balance,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_is_reported_verbatim() {
        let intent = PlacementIntent {
            position: CellCoords { x: 0, y: 0, z: 0 },
            kind: "skyscraper".into(),
        };
        assert_eq!(
            intent.resolve(),
            Err(PlacementError::UnknownKind("skyscraper".into()))
        );
    }

    #[test]
    fn intent_json_accepts_missing_y() {
        let intent: PlacementIntent =
            serde_json::from_str(r#"{"position":{"x":2,"z":-4},"kind":"house"}"#).unwrap();
        assert_eq!(
            intent.resolve(),
            Ok((GridPosition::new(2, -4), BuildingKind::House))
        );
    }

    #[test]
    fn world_hits_snap_to_the_nearest_cell() {
        let hit = WorldPlacement {
            x: 2.9,
            z: -1.0,
            kind: "community_garden".into(),
        };
        let intent = hit.snap(2);
        assert_eq!(intent, PlacementIntent::new(BuildingKind::CommunityGarden, 2, 0));
        assert_eq!(
            intent.resolve(),
            Ok((GridPosition::new(2, 0), BuildingKind::CommunityGarden))
        );
    }

    #[test]
    fn locked_kind_is_rejected() {
        let state = GameState::new();
        let result = check(
            &state,
            GridPosition::new(0, 0),
            BuildingKind::School,
            &Catalog::builtin(),
            &Rules::default(),
        );
        assert_eq!(result, Err(PlacementError::Locked(BuildingKind::School)));
    }

    #[test]
    fn founding_placement_skips_energy_check() {
        let state = GameState::new();
        let catalog = Catalog::builtin();
        assert!(check(
            &state,
            GridPosition::new(0, 0),
            BuildingKind::House,
            &catalog,
            &Rules::default()
        )
        .is_ok());

        let strict = Rules {
            free_first_placement: false,
            ..Rules::default()
        };
        assert_eq!(
            check(&state, GridPosition::new(0, 0), BuildingKind::House, &catalog, &strict),
            Err(PlacementError::InsufficientEnergy {
                kind: BuildingKind::House,
                required: 1,
                available: 0,
            })
        );
    }

    #[test]
    fn bounds_checked_before_occupancy() {
        let state = GameState::new();
        let result = check(
            &state,
            GridPosition::new(10, 0),
            BuildingKind::House,
            &Catalog::builtin(),
            &Rules::default(),
        );
        assert_eq!(
            result,
            Err(PlacementError::OutOfBounds {
                x: 10,
                z: 0,
                limit: 10
            })
        );
    }
}
