use serde::Serialize;
use tracing::warn;

use crate::{
    challenges::{Notification, Overlays},
    engine::{Engine, Intent, Transition},
    placement::PlacementError,
    state::GameState,
};

#[derive(Debug, Clone, Serialize)]
pub struct AppliedTransition {
    pub sequence: u64,
    pub turn: u32,
    pub intent: Intent,
    pub notifications: Vec<Notification>,
}

/// Owns the single live `GameState` and commits engine transitions to it.
pub struct Session {
    engine: Engine,
    state: GameState,
    overlays: Overlays,
    log: Vec<AppliedTransition>,
}

impl Session {
    pub fn new(engine: Engine) -> Self {
        let state = engine.initial_state();
        Self {
            engine,
            state,
            overlays: Overlays::default(),
            log: Vec::new(),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn overlays(&self) -> Overlays {
        self.overlays
    }

    pub fn log(&self) -> &[AppliedTransition] {
        &self.log
    }

    /// Applies `intent`; a rejected intent leaves the session exactly as it was.
    pub fn apply(&mut self, intent: Intent) -> Result<&AppliedTransition, PlacementError> {
        let transition = match self.engine.apply(&self.state, &intent, self.overlays) {
            Ok(transition) => transition,
            Err(err) => {
                warn!(
                    target: "vila_verde::session",
                    turn = self.state.current_turn,
                    reason = err.code(),
                    error = %err,
                    "intent.rejected"
                );
                return Err(err);
            }
        };
        self.overlays = intent.overlays_after(self.overlays);
        Ok(self.commit(intent, transition))
    }

    fn commit(&mut self, intent: Intent, transition: Transition) -> &AppliedTransition {
        self.state = transition.state;
        let entry = AppliedTransition {
            sequence: self.log.len() as u64,
            turn: self.state.current_turn,
            intent,
            notifications: transition.notifications,
        };
        self.log.push(entry);
        &self.log[self.log.len() - 1]
    }
}
