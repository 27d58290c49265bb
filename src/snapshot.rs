use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::catalog::BuildingKind;
use crate::challenges::ChallengeId;
use crate::indicators::IndicatorSnapshot;
use crate::state::{GameState, PlacedBuilding};

/// Export-only summary of a settlement at one turn.
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot<'a> {
    pub scenario: &'a str,
    pub turn: u32,
    pub exported_at: DateTime<Utc>,
    pub indicators: IndicatorSnapshot,
    pub buildings: &'a [PlacedBuilding],
    pub available_buildings: Vec<BuildingKind>,
    pub unlocked_terrain_areas: u32,
    pub current_challenge: Option<ChallengeId>,
    pub completed_challenges: &'a [ChallengeId],
}

impl<'a> GameSnapshot<'a> {
    pub fn capture(scenario: &'a str, state: &'a GameState) -> Self {
        Self {
            scenario,
            turn: state.current_turn,
            exported_at: Utc::now(),
            indicators: state.indicators,
            buildings: &state.placed_buildings,
            available_buildings: state.available_buildings.iter().copied().collect(),
            unlocked_terrain_areas: state.unlocked_terrain_areas,
            current_challenge: state.current_challenge,
            completed_challenges: &state.completed_challenge_ids,
        }
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Writes `turn_NNNNNN.json` under `<output_dir>/<scenario>/` every `interval` turns.
pub struct SnapshotWriter {
    output_dir: PathBuf,
    interval: u32,
    last_written_turn: Option<u32>,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl AsRef<Path>, interval: u32) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            interval,
            last_written_turn: None,
        }
    }

    /// Writes at most once per interval turn; intents that do not advance the
    /// turn never rewrite an existing file.
    pub fn maybe_write(
        &mut self,
        scenario: &str,
        state: &GameState,
    ) -> Result<Option<PathBuf>, SnapshotError> {
        if self.interval == 0 || state.current_turn == 0 {
            return Ok(None);
        }
        if state.current_turn % self.interval != 0
            || self.last_written_turn == Some(state.current_turn)
        {
            return Ok(None);
        }
        let path = self.write(scenario, state)?;
        self.last_written_turn = Some(state.current_turn);
        Ok(Some(path))
    }

    pub fn write(&self, scenario: &str, state: &GameState) -> Result<PathBuf, SnapshotError> {
        let dir = self.output_dir.join(scenario);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("turn_{:06}.json", state.current_turn));
        let json = serde_json::to_string_pretty(&GameSnapshot::capture(scenario, state))?;
        fs::write(&path, json)?;
        debug!(
            target: "vila_verde::snapshot",
            turn = state.current_turn,
            path = %path.display(),
            "snapshot.written"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::challenges::Overlays;
    use crate::state::GridPosition;

    #[test]
    fn writes_only_on_interval_turns() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = SnapshotWriter::new(dir.path(), 2);
        let engine = Engine::default();
        let mut state = engine.initial_state();
        assert!(writer.maybe_write("demo", &state).unwrap().is_none());

        state = engine
            .place_building(
                &state,
                GridPosition::new(0, 0),
                BuildingKind::CommunityGarden,
                Overlays::default(),
            )
            .unwrap()
            .state;
        assert!(writer.maybe_write("demo", &state).unwrap().is_none());

        state = engine
            .place_building(
                &state,
                GridPosition::new(2, 0),
                BuildingKind::CommunityGarden,
                Overlays::default(),
            )
            .unwrap()
            .state;
        let path = writer.maybe_write("demo", &state).unwrap().unwrap();
        assert!(path.ends_with("demo/turn_000002.json"));

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["turn"], 2);
        assert_eq!(value["indicators"]["food_supply"], 40);
        assert_eq!(value["buildings"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn same_turn_is_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = SnapshotWriter::new(dir.path(), 2);
        let engine = Engine::default();
        let mut state = engine.initial_state();
        for x in [0, 2] {
            state = engine
                .place_building(
                    &state,
                    GridPosition::new(x, 0),
                    BuildingKind::CommunityGarden,
                    Overlays::default(),
                )
                .unwrap()
                .state;
        }
        assert!(writer.maybe_write("demo", &state).unwrap().is_some());

        // closing a panel keeps the turn at 2
        state = engine
            .apply(&state, &crate::engine::Intent::CloseInfoPanel, Overlays::default())
            .unwrap()
            .state;
        assert_eq!(state.current_turn, 2);
        assert!(writer.maybe_write("demo", &state).unwrap().is_none());
    }

    #[test]
    fn zero_interval_disables_writes() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = SnapshotWriter::new(dir.path(), 0);
        let mut state = GameState::new();
        state.current_turn = 10;
        assert!(writer.maybe_write("demo", &state).unwrap().is_none());
    }
}
