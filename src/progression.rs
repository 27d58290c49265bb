use std::collections::BTreeSet;

use crate::catalog::BuildingKind;
use crate::config::Rules;
use crate::indicators::IndicatorSnapshot;
use crate::state::PlacedBuilding;

/// Building counts the unlock conditions look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Census {
    pub total: usize,
    pub houses: usize,
    pub community_centers: usize,
}

impl Census {
    pub fn of(buildings: &[PlacedBuilding]) -> Self {
        buildings.iter().fold(Census::default(), |mut census, building| {
            census.total += 1;
            match building.kind {
                BuildingKind::House => census.houses += 1,
                BuildingKind::CommunityCenter => census.community_centers += 1,
                _ => {}
            }
            census
        })
    }

    /// Buildings that count toward terrain expansion.
    pub fn strategic(&self) -> usize {
        self.houses + self.community_centers
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockCondition {
    MinBuildings(usize),
    MinHouses(usize),
    MinPopulation(i32),
    /// At least one house, and either dirty water or a crowded village.
    WaterStress {
        water_below: i32,
        min_population: i32,
    },
    LowBiodiversity {
        below: i32,
        min_buildings: usize,
    },
    LowHappiness {
        below: i32,
        min_houses: usize,
    },
}

impl UnlockCondition {
    pub fn holds(&self, census: &Census, indicators: &IndicatorSnapshot) -> bool {
        match *self {
            UnlockCondition::MinBuildings(min) => census.total >= min,
            UnlockCondition::MinHouses(min) => census.houses >= min,
            UnlockCondition::MinPopulation(min) => indicators.population >= min,
            UnlockCondition::WaterStress {
                water_below,
                min_population,
            } => {
                census.houses >= 1
                    && (indicators.water_quality < water_below
                        || indicators.population >= min_population)
            }
            UnlockCondition::LowBiodiversity {
                below,
                min_buildings,
            } => indicators.biodiversity < below && census.total >= min_buildings,
            UnlockCondition::LowHappiness { below, min_houses } => {
                indicators.community_happiness < below && census.houses >= min_houses
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UnlockRule {
    pub kind: BuildingKind,
    pub condition: UnlockCondition,
}

pub const UNLOCK_RULES: &[UnlockRule] = &[
    UnlockRule {
        kind: BuildingKind::SolarArray,
        condition: UnlockCondition::MinBuildings(2),
    },
    UnlockRule {
        kind: BuildingKind::WaterTreatment,
        condition: UnlockCondition::WaterStress {
            water_below: 45,
            min_population: 8,
        },
    },
    UnlockRule {
        kind: BuildingKind::WasteCollection,
        condition: UnlockCondition::MinHouses(3),
    },
    UnlockRule {
        kind: BuildingKind::Reforestation,
        condition: UnlockCondition::LowBiodiversity {
            below: 50,
            min_buildings: 4,
        },
    },
    UnlockRule {
        kind: BuildingKind::CommunityCenter,
        condition: UnlockCondition::LowHappiness {
            below: 60,
            min_houses: 3,
        },
    },
    UnlockRule {
        kind: BuildingKind::School,
        condition: UnlockCondition::MinPopulation(12),
    },
    UnlockRule {
        kind: BuildingKind::HealthPost,
        condition: UnlockCondition::MinPopulation(8),
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unlocks {
    pub available: BTreeSet<BuildingKind>,
    pub terrain: u32,
    /// Kinds added by this call, in rule-table order.
    pub newly_available: Vec<BuildingKind>,
}

/// Grows the available set and terrain radius; neither ever shrinks.
///
/// Every rule sees `previous_available` as it was on entry, so a kind unlocked
/// here cannot satisfy another rule in the same call.
pub fn derive_unlocks(
    buildings: &[PlacedBuilding],
    indicators: &IndicatorSnapshot,
    previous_available: &BTreeSet<BuildingKind>,
    previous_terrain: u32,
    rules: &Rules,
) -> Unlocks {
    let census = Census::of(buildings);

    let newly_available: Vec<BuildingKind> = UNLOCK_RULES
        .iter()
        .filter(|rule| !previous_available.contains(&rule.kind))
        .filter(|rule| rule.condition.holds(&census, indicators))
        .map(|rule| rule.kind)
        .collect();

    let mut available = previous_available.clone();
    available.extend(newly_available.iter().copied());

    let rings = census.strategic() / rules.terrain_unlock_threshold.max(1);
    let terrain = previous_terrain.max(u32::try_from(rings).unwrap_or(u32::MAX));

    Unlocks {
        available,
        terrain,
        newly_available,
    }
}
