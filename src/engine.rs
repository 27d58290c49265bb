use std::{fmt, time::Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    catalog::{BuildingKind, Catalog},
    challenges::{self, Notification, Overlays},
    config::Rules,
    placement::{self, PlacementError, PlacementIntent},
    state::{BuildingId, GameState, GridPosition},
    systems::{BookkeepingSystem, ChallengeSystem, IndicatorSystem, ProgressionSystem},
};

/// Everything the host can ask the engine to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Place(PlacementIntent),
    CloseChallenge,
    InspectBuilding { kind: BuildingKind },
    CloseInfoPanel,
    SetOverlays(Overlays),
}

impl Intent {
    /// Overlay flags in effect once this intent has been applied.
    pub fn overlays_after(&self, current: Overlays) -> Overlays {
        match self {
            Intent::SetOverlays(next) => *next,
            Intent::CloseInfoPanel => Overlays {
                info_open: false,
                ..current
            },
            _ => current,
        }
    }
}

pub struct SystemContext<'a> {
    pub turn: u32,
    pub catalog: &'a Catalog,
    pub rules: &'a Rules,
    pub overlays: Overlays,
    pub notifications: Vec<Notification>,
    pub newly_available: Vec<BuildingKind>,
}

/// One stage of the turn pipeline.
pub trait System: Send + Sync {
    fn name(&self) -> &str;
    fn run(&self, ctx: &mut SystemContext<'_>, state: &mut GameState);
}

#[derive(Clone, Debug, Serialize)]
pub struct SystemRunReport {
    pub name: String,
    pub duration_ms: f64,
}

/// A committed step: the next state plus what the host should surface.
#[derive(Clone, Debug)]
pub struct Transition {
    pub state: GameState,
    pub placed: Option<BuildingId>,
    pub notifications: Vec<Notification>,
    pub newly_available: Vec<BuildingKind>,
    pub reports: Vec<SystemRunReport>,
}

impl Transition {
    fn quiet(state: GameState) -> Self {
        Self {
            state,
            placed: None,
            notifications: Vec::new(),
            newly_available: Vec::new(),
            reports: Vec::new(),
        }
    }
}

pub struct EngineBuilder {
    catalog: Catalog,
    rules: Rules,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            catalog: Catalog::builtin(),
            rules: Rules::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            catalog: self.catalog,
            rules: self.rules,
            pipeline: vec![
                Box::new(IndicatorSystem::new()),
                Box::new(ProgressionSystem::new()),
                Box::new(BookkeepingSystem::new()),
                Box::new(ChallengeSystem::new()),
            ],
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure transition functions over `GameState`. The engine never holds a state
/// of its own; callers pass one in and get the next one back.
pub struct Engine {
    catalog: Catalog,
    rules: Rules,
    pipeline: Vec<Box<dyn System>>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stages: Vec<&str> = self.pipeline.iter().map(|system| system.name()).collect();
        f.debug_struct("Engine")
            .field("rules", &self.rules)
            .field("catalog", &self.catalog)
            .field("pipeline", &stages)
            .finish()
    }
}

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::new().build()
    }
}

impl Engine {
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn initial_state(&self) -> GameState {
        GameState::new()
    }

    pub fn apply(
        &self,
        state: &GameState,
        intent: &Intent,
        overlays: Overlays,
    ) -> Result<Transition, PlacementError> {
        let overlays = intent.overlays_after(overlays);
        match intent {
            Intent::Place(placement) => {
                let (position, kind) = placement.resolve()?;
                self.place_building(state, position, kind, overlays)
            }
            Intent::CloseChallenge => Ok(self.close_challenge(state, overlays)),
            Intent::InspectBuilding { kind } => {
                let mut next = state.clone();
                next.selected_building_for_info = Some(*kind);
                Ok(Transition::quiet(next))
            }
            Intent::CloseInfoPanel => Ok(self.close_info_panel(state, overlays)),
            Intent::SetOverlays(_) => Ok(self.evaluate_challenges(state, overlays)),
        }
    }

    /// Validates, then runs one full turn. On error `state` is untouched.
    pub fn place_building(
        &self,
        state: &GameState,
        position: GridPosition,
        kind: BuildingKind,
        overlays: Overlays,
    ) -> Result<Transition, PlacementError> {
        placement::check(state, position, kind, &self.catalog, &self.rules)?;

        let mut next = state.clone();
        let id = next.push_building(kind, position);
        next.current_turn += 1;
        next.selected_building_for_info = None;

        let mut ctx = SystemContext {
            turn: next.current_turn,
            catalog: &self.catalog,
            rules: &self.rules,
            overlays,
            notifications: Vec::new(),
            newly_available: Vec::new(),
        };
        let reports = self.run_pipeline(&mut ctx, &mut next);

        info!(
            target: "vila_verde::engine",
            turn = next.current_turn,
            %kind,
            x = position.x,
            z = position.z,
            energy = next.indicators.energy_balance,
            "placement.committed"
        );

        Ok(Transition {
            placed: Some(id),
            notifications: ctx.notifications,
            newly_available: ctx.newly_available,
            reports,
            state: next,
        })
    }

    /// Dismisses the active challenge and offers the next eligible one, if any.
    pub fn close_challenge(&self, state: &GameState, overlays: Overlays) -> Transition {
        let mut next = state.clone();
        if let Some(closed) = challenges::close_active(&mut next) {
            debug!(
                target: "vila_verde::engine",
                challenge = %closed,
                turn = next.current_turn,
                "challenge.acknowledged"
            );
        }
        let notifications = challenges::select_next(&mut next, overlays)
            .into_iter()
            .collect();
        Transition {
            notifications,
            ..Transition::quiet(next)
        }
    }

    /// Clears the info selection; a challenge held back by the panel may now be offered.
    pub fn close_info_panel(&self, state: &GameState, overlays: Overlays) -> Transition {
        let mut next = state.clone();
        next.selected_building_for_info = None;
        let notifications = challenges::select_next(&mut next, overlays)
            .into_iter()
            .collect();
        Transition {
            notifications,
            ..Transition::quiet(next)
        }
    }

    /// Re-runs completion and selection without advancing the turn.
    pub fn evaluate_challenges(&self, state: &GameState, overlays: Overlays) -> Transition {
        let mut next = state.clone();
        let notifications = challenges::evaluate(&mut next, overlays)
            .into_iter()
            .collect();
        Transition {
            notifications,
            ..Transition::quiet(next)
        }
    }

    fn run_pipeline(
        &self,
        ctx: &mut SystemContext<'_>,
        state: &mut GameState,
    ) -> Vec<SystemRunReport> {
        let mut reports = Vec::with_capacity(self.pipeline.len());
        for system in &self.pipeline {
            let start = Instant::now();
            system.run(ctx, state);
            let duration_ms = start.elapsed().as_secs_f64() * 1_000.0;
            debug!(
                target: "vila_verde::engine",
                system = system.name(),
                turn = ctx.turn,
                duration_ms,
                "system.finished"
            );
            reports.push(SystemRunReport {
                name: system.name().to_string(),
                duration_ms,
            });
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_runs_in_fixed_order() {
        let engine = Engine::default();
        let state = engine.initial_state();
        let transition = engine
            .place_building(
                &state,
                GridPosition::new(0, 0),
                BuildingKind::CommunityGarden,
                Overlays::default(),
            )
            .unwrap();
        let names: Vec<&str> = transition.reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["indicators", "progression", "bookkeeping", "challenges"]);
    }

    #[test]
    fn debug_output_names_pipeline_stages() {
        let rendered = format!("{:?}", Engine::default());
        assert!(rendered.contains("indicators"));
        assert!(rendered.contains("challenges"));
        assert!(rendered.contains("cell_size"));
    }

    #[test]
    fn inspect_then_place_clears_selection() {
        let engine = Engine::default();
        let state = engine.initial_state();
        let inspected = engine
            .apply(
                &state,
                &Intent::InspectBuilding {
                    kind: BuildingKind::House,
                },
                Overlays::default(),
            )
            .unwrap()
            .state;
        assert_eq!(inspected.selected_building_for_info, Some(BuildingKind::House));
        assert_eq!(inspected.current_turn, 0);

        let placed = engine
            .apply(
                &inspected,
                &Intent::Place(PlacementIntent::new(BuildingKind::House, 0, 0)),
                Overlays::default(),
            )
            .unwrap()
            .state;
        assert_eq!(placed.selected_building_for_info, None);
    }

    #[test]
    fn closing_info_panel_releases_pending_challenge() {
        let engine = Engine::default();
        let info = Overlays {
            info_open: true,
            ..Overlays::default()
        };
        let mut state = engine.initial_state();
        for x in [0, 2, 4] {
            state = engine
                .apply(
                    &state,
                    &Intent::Place(PlacementIntent::new(BuildingKind::CommunityGarden, x, 0)),
                    info,
                )
                .unwrap()
                .state;
        }
        assert_eq!(state.current_challenge, None);

        let closed = engine.apply(&state, &Intent::CloseInfoPanel, info).unwrap();
        assert_eq!(closed.notifications.len(), 1);
        assert_eq!(closed.state.current_challenge, Some(challenges::ChallengeId::Energy));
        assert_eq!(closed.state.current_turn, 3);
    }

    #[test]
    fn overlays_after_tracks_info_panel() {
        let info = Overlays {
            info_open: true,
            dashboard_open: true,
            ..Overlays::default()
        };
        let closed = Intent::CloseInfoPanel.overlays_after(info);
        assert!(!closed.info_open);
        assert!(closed.dashboard_open);
        assert_eq!(Intent::CloseChallenge.overlays_after(info), info);
    }

    #[test]
    fn intents_round_trip_through_json_tags() {
        let intent: Intent = serde_json::from_str(
            r#"{"intent":"place","position":{"x":0,"y":0,"z":2},"kind":"community_garden"}"#,
        )
        .unwrap();
        assert_eq!(
            intent,
            Intent::Place(PlacementIntent::new(BuildingKind::CommunityGarden, 0, 2))
        );
        let close: Intent = serde_json::from_str(r#"{"intent":"close_challenge"}"#).unwrap();
        assert_eq!(close, Intent::CloseChallenge);
        let overlays: Intent =
            serde_json::from_str(r#"{"intent":"set_overlays","welcome_open":true}"#).unwrap();
        assert_eq!(
            overlays,
            Intent::SetOverlays(Overlays {
                welcome_open: true,
                ..Overlays::default()
            })
        );
    }
}
