use tracing::info;

use crate::{
    challenges::{self, Notification},
    engine::{System, SystemContext},
    state::GameState,
};

pub struct ChallengeSystem;

impl ChallengeSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ChallengeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ChallengeSystem {
    fn name(&self) -> &str {
        "challenges"
    }

    fn run(&self, ctx: &mut SystemContext<'_>, state: &mut GameState) {
        let Some(notification) = challenges::evaluate(state, ctx.overlays) else {
            return;
        };
        match &notification {
            Notification::ChallengeOffered { id, .. } => {
                info!(
                    target: "vila_verde::challenges",
                    turn = ctx.turn,
                    challenge = %id,
                    "challenge.offered"
                );
            }
            Notification::ChallengeCompleted { id, .. } => {
                info!(
                    target: "vila_verde::challenges",
                    turn = ctx.turn,
                    challenge = %id,
                    "challenge.completed"
                );
            }
        }
        ctx.notifications.push(notification);
    }
}
