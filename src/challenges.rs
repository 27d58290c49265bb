//! Scripted challenges: at most one is offered at a time, in declaration order,
//! and each can be completed exactly once.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::BuildingKind;
use crate::state::{Acknowledgement, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChallengeId {
    #[serde(rename = "challenge1_energy")]
    Energy,
    #[serde(rename = "challenge2_clean_water")]
    CleanWater,
    #[serde(rename = "challenge3_happiness")]
    Happiness,
    #[serde(rename = "challenge4_waste_management")]
    WasteManagement,
}

impl ChallengeId {
    /// Selection order.
    pub const ALL: [ChallengeId; 4] = [
        ChallengeId::Energy,
        ChallengeId::CleanWater,
        ChallengeId::Happiness,
        ChallengeId::WasteManagement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChallengeId::Energy => "challenge1_energy",
            ChallengeId::CleanWater => "challenge2_clean_water",
            ChallengeId::Happiness => "challenge3_happiness",
            ChallengeId::WasteManagement => "challenge4_waste_management",
        }
    }

    pub fn challenge(self) -> &'static Challenge {
        match self {
            ChallengeId::Energy => &CHALLENGES[0],
            ChallengeId::CleanWater => &CHALLENGES[1],
            ChallengeId::Happiness => &CHALLENGES[2],
            ChallengeId::WasteManagement => &CHALLENGES[3],
        }
    }
}

impl fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offer and completion thresholds for one challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ChallengeRule {
    Energy {
        min_buildings: usize,
        offer_at_or_below: i32,
        goal_above: i32,
    },
    CleanWater {
        offer_at_or_below: i32,
        min_population: i32,
        goal_above: i32,
    },
    Happiness {
        offer_at_or_below: i32,
        min_houses: usize,
        goal_above: i32,
    },
    WasteManagement {
        min_houses: usize,
    },
}

impl ChallengeRule {
    /// Whether the challenge should be offered now.
    pub fn triggered(&self, state: &GameState) -> bool {
        let indicators = &state.indicators;
        match *self {
            ChallengeRule::Energy {
                min_buildings,
                offer_at_or_below,
                ..
            } => {
                state.building_count() >= min_buildings
                    && indicators.energy_balance <= offer_at_or_below
            }
            ChallengeRule::CleanWater {
                offer_at_or_below,
                min_population,
                ..
            } => {
                indicators.water_quality <= offer_at_or_below
                    && indicators.population >= min_population
                    && !state.has(BuildingKind::WaterTreatment)
            }
            ChallengeRule::Happiness {
                offer_at_or_below,
                min_houses,
                ..
            } => {
                indicators.community_happiness <= offer_at_or_below
                    && state.house_count() >= min_houses
                    && !state.has(BuildingKind::CommunityCenter)
            }
            ChallengeRule::WasteManagement { min_houses } => {
                state.house_count() >= min_houses && !state.has(BuildingKind::WasteCollection)
            }
        }
    }

    /// Whether the challenge's goal has been reached.
    pub fn achieved(&self, state: &GameState) -> bool {
        let indicators = &state.indicators;
        match *self {
            ChallengeRule::Energy { goal_above, .. } => indicators.energy_balance > goal_above,
            ChallengeRule::CleanWater { goal_above, .. } => {
                indicators.water_quality > goal_above && state.has(BuildingKind::WaterTreatment)
            }
            ChallengeRule::Happiness { goal_above, .. } => {
                indicators.community_happiness > goal_above
                    && state.has(BuildingKind::CommunityCenter)
            }
            ChallengeRule::WasteManagement { .. } => state.has(BuildingKind::WasteCollection),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Challenge {
    pub id: ChallengeId,
    pub title: &'static str,
    pub description: &'static str,
    pub reward: &'static str,
    pub rule: ChallengeRule,
}

pub static CHALLENGES: [Challenge; 4] = [
    Challenge {
        id: ChallengeId::Energy,
        title: "Energy for Everyone!",
        description: "The community is growing and needs more energy. Consider building renewable sources.",
        reward: "New leisure-focused building options are on the way!",
        rule: ChallengeRule::Energy {
            min_buildings: 3,
            offer_at_or_below: 5,
            goal_above: 10,
        },
    },
    Challenge {
        id: ChallengeId::CleanWater,
        title: "Clean Water, Healthy Life!",
        description: "River water quality needs urgent attention as the population grows. A treatment plant is essential.",
        reward: "Aquatic life is back! Small fish can be seen in the clearer river.",
        rule: ChallengeRule::CleanWater {
            offer_at_or_below: 45,
            min_population: 8,
            goal_above: 70,
        },
    },
    Challenge {
        id: ChallengeId::Happiness,
        title: "A Happy Community!",
        description: "Community happiness matters. Invest in shared spaces and leisure for everyone.",
        reward: "The village has become a model of well-being and social cohesion!",
        rule: ChallengeRule::Happiness {
            offer_at_or_below: 55,
            min_houses: 3,
            goal_above: 75,
        },
    },
    Challenge {
        id: ChallengeId::WasteManagement,
        title: "Waste Management Matters!",
        description: "The village keeps growing. To stay clean and healthy it needs a recycling center.",
        reward: "Recycling is in place! Air and water are cleaner and residents more aware.",
        rule: ChallengeRule::WasteManagement { min_houses: 10 },
    },
];

/// UI overlays that keep a new challenge from being offered while open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overlays {
    pub welcome_open: bool,
    pub dashboard_open: bool,
    pub info_open: bool,
}

impl Overlays {
    pub fn blocks_selection(&self) -> bool {
        self.welcome_open || self.dashboard_open || self.info_open
    }
}

/// One-shot payloads for the host's blocking alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    ChallengeOffered {
        id: ChallengeId,
        title: String,
        description: String,
        reward: String,
    },
    ChallengeCompleted {
        id: ChallengeId,
        title: String,
        reward: String,
    },
}

impl Notification {
    fn offered(challenge: &Challenge) -> Self {
        Notification::ChallengeOffered {
            id: challenge.id,
            title: challenge.title.to_string(),
            description: challenge.description.to_string(),
            reward: challenge.reward.to_string(),
        }
    }

    fn completed(challenge: &Challenge) -> Self {
        Notification::ChallengeCompleted {
            id: challenge.id,
            title: challenge.title.to_string(),
            reward: challenge.reward.to_string(),
        }
    }
}

/// Marks the active challenge completed if its goal now holds.
pub fn complete_active(state: &mut GameState) -> Option<Notification> {
    let id = state.current_challenge?;
    let challenge = id.challenge();
    if state.is_completed(id) || !challenge.rule.achieved(state) {
        return None;
    }
    state.completed_challenge_ids.push(id);
    state.current_challenge = None;
    state.acknowledged = Some(Acknowledgement {
        challenge: id,
        turn: state.current_turn,
    });
    Some(Notification::completed(challenge))
}

/// Offers the first eligible challenge whose trigger holds, if nothing is showing.
pub fn select_next(state: &mut GameState, overlays: Overlays) -> Option<Notification> {
    if state.current_challenge.is_some() || overlays.blocks_selection() {
        return None;
    }
    let challenge = CHALLENGES.iter().find(|challenge| {
        !state.is_completed(challenge.id)
            && !state.is_acknowledged(challenge.id)
            && challenge.rule.triggered(state)
    })?;
    state.current_challenge = Some(challenge.id);
    Some(Notification::offered(challenge))
}

/// Completion check, then selection unless something was just completed.
pub fn evaluate(state: &mut GameState, overlays: Overlays) -> Option<Notification> {
    match complete_active(state) {
        Some(completed) => Some(completed),
        None => select_next(state, overlays),
    }
}

/// Dismisses the active challenge for the rest of the current turn.
pub fn close_active(state: &mut GameState) -> Option<ChallengeId> {
    let id = state.current_challenge.take()?;
    state.acknowledged = Some(Acknowledgement {
        challenge: id,
        turn: state.current_turn,
    });
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::BASELINE;
    use crate::state::GridPosition;

    fn state_with(kinds: &[BuildingKind]) -> GameState {
        let mut state = GameState::new();
        for (index, kind) in kinds.iter().enumerate() {
            state.push_building(*kind, GridPosition::new(index as i32 * 2, 0));
        }
        state
    }

    #[test]
    fn table_order_matches_ids() {
        for (index, id) in ChallengeId::ALL.into_iter().enumerate() {
            assert_eq!(CHALLENGES[index].id, id);
            assert_eq!(id.challenge().id, id);
        }
    }

    #[test]
    fn energy_offer_and_goal_are_disjoint() {
        let mut state = state_with(&[BuildingKind::CommunityGarden; 3]);
        let rule = ChallengeId::Energy.challenge().rule;
        assert!(rule.triggered(&state));
        assert!(!rule.achieved(&state));
        state.indicators.energy_balance = 11;
        assert!(!rule.triggered(&state));
        assert!(rule.achieved(&state));
    }

    #[test]
    fn waste_goal_is_presence_only() {
        let state = state_with(&[BuildingKind::WasteCollection]);
        assert!(ChallengeId::WasteManagement
            .challenge()
            .rule
            .achieved(&state));
    }

    #[test]
    fn missing_buildings_make_goals_false() {
        let mut state = GameState::new();
        state.indicators.water_quality = 90;
        state.indicators.community_happiness = 90;
        assert!(!ChallengeId::CleanWater.challenge().rule.achieved(&state));
        assert!(!ChallengeId::Happiness.challenge().rule.achieved(&state));
    }

    #[test]
    fn overlays_block_selection() {
        let mut state = state_with(&[BuildingKind::CommunityGarden; 3]);
        let blocked = Overlays {
            dashboard_open: true,
            ..Overlays::default()
        };
        assert_eq!(select_next(&mut state, blocked), None);
        assert_eq!(state.current_challenge, None);

        let offered = select_next(&mut state, Overlays::default());
        assert!(matches!(
            offered,
            Some(Notification::ChallengeOffered {
                id: ChallengeId::Energy,
                ..
            })
        ));
        assert_eq!(state.current_challenge, Some(ChallengeId::Energy));
    }

    #[test]
    fn active_challenge_blocks_a_second_offer() {
        let mut state = state_with(&[BuildingKind::CommunityGarden; 3]);
        state.current_challenge = Some(ChallengeId::WasteManagement);
        assert_eq!(select_next(&mut state, Overlays::default()), None);
        assert_eq!(state.current_challenge, Some(ChallengeId::WasteManagement));
    }

    #[test]
    fn closing_suppresses_only_for_the_current_turn() {
        let mut state = state_with(&[BuildingKind::CommunityGarden; 3]);
        select_next(&mut state, Overlays::default());
        assert_eq!(close_active(&mut state), Some(ChallengeId::Energy));
        assert_eq!(select_next(&mut state, Overlays::default()), None);

        state.current_turn += 1;
        assert!(select_next(&mut state, Overlays::default()).is_some());
        assert_eq!(state.current_challenge, Some(ChallengeId::Energy));
    }

    #[test]
    fn completion_moves_id_to_completed_set() {
        let mut state = state_with(&[BuildingKind::CommunityGarden; 3]);
        select_next(&mut state, Overlays::default());
        state.indicators = crate::indicators::IndicatorSnapshot {
            energy_balance: 15,
            ..BASELINE
        };
        let note = evaluate(&mut state, Overlays::default());
        assert!(matches!(
            note,
            Some(Notification::ChallengeCompleted {
                id: ChallengeId::Energy,
                ..
            })
        ));
        assert_eq!(state.current_challenge, None);
        assert_eq!(state.completed_challenge_ids, vec![ChallengeId::Energy]);
        assert!(state.is_acknowledged(ChallengeId::Energy));
    }

    #[test]
    fn completed_challenges_are_never_offered_again() {
        let mut state = state_with(&[BuildingKind::CommunityGarden; 3]);
        state.completed_challenge_ids.push(ChallengeId::Energy);
        state.current_turn = 7;
        assert_eq!(select_next(&mut state, Overlays::default()), None);
    }
}
