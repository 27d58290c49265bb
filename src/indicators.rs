use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{BuildingKind, Catalog};
use crate::config::Rules;
use crate::state::PlacedBuilding;

pub const LEVEL_MIN: i32 = 0;
pub const LEVEL_MAX: i32 = 100;
pub const ENERGY_MIN: i32 = -1000;
pub const ENERGY_MAX: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    AirQuality,
    WaterQuality,
    CommunityHappiness,
    Biodiversity,
    EnergyBalance,
    FoodSupply,
    Population,
}

impl Indicator {
    pub const ALL: [Indicator; 7] = [
        Indicator::AirQuality,
        Indicator::WaterQuality,
        Indicator::CommunityHappiness,
        Indicator::Biodiversity,
        Indicator::EnergyBalance,
        Indicator::FoodSupply,
        Indicator::Population,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Indicator::AirQuality => "air_quality",
            Indicator::WaterQuality => "water_quality",
            Indicator::CommunityHappiness => "community_happiness",
            Indicator::Biodiversity => "biodiversity",
            Indicator::EnergyBalance => "energy_balance",
            Indicator::FoodSupply => "food_supply",
            Indicator::Population => "population",
        }
    }

    /// Inclusive clamp range, `None` for population.
    pub fn bounds(self) -> Option<(i32, i32)> {
        match self {
            Indicator::EnergyBalance => Some((ENERGY_MIN, ENERGY_MAX)),
            Indicator::Population => None,
            _ => Some((LEVEL_MIN, LEVEL_MAX)),
        }
    }

    pub fn info(self) -> &'static IndicatorInfo {
        match self {
            Indicator::AirQuality => &AIR_QUALITY_INFO,
            Indicator::WaterQuality => &WATER_QUALITY_INFO,
            Indicator::CommunityHappiness => &HAPPINESS_INFO,
            Indicator::Biodiversity => &BIODIVERSITY_INFO,
            Indicator::EnergyBalance => &ENERGY_INFO,
            Indicator::FoodSupply => &FOOD_INFO,
            Indicator::Population => &POPULATION_INFO,
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub air_quality: i32,
    pub water_quality: i32,
    pub community_happiness: i32,
    pub biodiversity: i32,
    pub energy_balance: i32,
    pub food_supply: i32,
    pub population: i32,
}

/// Values of a settlement with no buildings.
pub const BASELINE: IndicatorSnapshot = IndicatorSnapshot {
    air_quality: 50,
    water_quality: 50,
    community_happiness: 50,
    biodiversity: 30,
    energy_balance: 0,
    food_supply: 20,
    population: 0,
};

impl Default for IndicatorSnapshot {
    fn default() -> Self {
        BASELINE
    }
}

impl IndicatorSnapshot {
    pub fn get(&self, indicator: Indicator) -> i32 {
        match indicator {
            Indicator::AirQuality => self.air_quality,
            Indicator::WaterQuality => self.water_quality,
            Indicator::CommunityHappiness => self.community_happiness,
            Indicator::Biodiversity => self.biodiversity,
            Indicator::EnergyBalance => self.energy_balance,
            Indicator::FoodSupply => self.food_supply,
            Indicator::Population => self.population,
        }
    }

    fn slot_mut(&mut self, indicator: Indicator) -> &mut i32 {
        match indicator {
            Indicator::AirQuality => &mut self.air_quality,
            Indicator::WaterQuality => &mut self.water_quality,
            Indicator::CommunityHappiness => &mut self.community_happiness,
            Indicator::Biodiversity => &mut self.biodiversity,
            Indicator::EnergyBalance => &mut self.energy_balance,
            Indicator::FoodSupply => &mut self.food_supply,
            Indicator::Population => &mut self.population,
        }
    }
}

/// Rebuilds the whole snapshot from the placed buildings.
///
/// Every contribution is additive, so the result depends only on the multiset
/// of kinds and never on placement order. Sums are accumulated wide and clamped
/// once at the end.
pub fn recompute(
    buildings: &[PlacedBuilding],
    catalog: &Catalog,
    rules: &Rules,
) -> IndicatorSnapshot {
    let mut totals = Indicator::ALL.map(|indicator| i64::from(BASELINE.get(indicator)));

    for building in buildings {
        let definition = catalog.definition_of(building.kind);
        for (indicator, delta) in definition.effects.deltas() {
            totals[indicator as usize] += i64::from(delta);
        }
        if building.kind == BuildingKind::House {
            totals[Indicator::Population as usize] += i64::from(rules.population_per_house);
        }
    }

    let mut snapshot = BASELINE;
    for indicator in Indicator::ALL {
        let total = totals[indicator as usize];
        let value = match indicator.bounds() {
            Some((min, max)) => total.clamp(i64::from(min), i64::from(max)),
            None => total.clamp(0, i64::from(i32::MAX)),
        };
        *snapshot.slot_mut(indicator) = value as i32;
    }
    snapshot
}

/// Help-panel text for one indicator.
#[derive(Debug, Serialize)]
pub struct IndicatorInfo {
    pub title: &'static str,
    pub explanation: &'static str,
    pub how_to_improve: &'static str,
    pub helped_by: &'static [BuildingKind],
    pub what_worsens: Option<&'static str>,
    pub hurt_by: &'static [BuildingKind],
}

static AIR_QUALITY_INFO: IndicatorInfo = IndicatorInfo {
    title: "Air Quality",
    explanation: "How clean the village air is. Clean air keeps residents and the ecosystem healthy; burning fuel and heavy industry degrade it.",
    how_to_improve: "Plant reforestation areas and build clean energy such as solar arrays.",
    helped_by: &[BuildingKind::Reforestation, BuildingKind::SolarArray],
    what_worsens: Some("Polluting industry and heavy use of non-renewable energy."),
    hurt_by: &[],
};

static WATER_QUALITY_INFO: IndicatorInfo = IndicatorInfo {
    title: "Water Quality",
    explanation: "How clean the river and other water bodies are. Pure water is vital for drinking, farming and aquatic life.",
    how_to_improve: "Build water treatment plants. Well-kept community gardens also help filter surface water.",
    helped_by: &[BuildingKind::WaterTreatment, BuildingKind::CommunityGarden],
    what_worsens: Some("Buildings without sewage treatment and waste dumped near the river."),
    hurt_by: &[],
};

static HAPPINESS_INFO: IndicatorInfo = IndicatorInfo {
    title: "Community Happiness",
    explanation: "The general contentment of residents: good housing, food, leisure, culture and a healthy environment all count.",
    how_to_improve: "Build houses, community centers, gardens, schools and health posts, and keep basic needs covered.",
    helped_by: &[
        BuildingKind::House,
        BuildingKind::CommunityCenter,
        BuildingKind::CommunityGarden,
        BuildingKind::Reforestation,
        BuildingKind::School,
        BuildingKind::HealthPost,
    ],
    what_worsens: Some("Housing shortages, food scarcity, pollution and a lack of shared spaces."),
    hurt_by: &[],
};

static BIODIVERSITY_INFO: IndicatorInfo = IndicatorInfo {
    title: "Biodiversity",
    explanation: "The variety of plant and animal life. Diverse ecosystems are more resilient.",
    how_to_improve: "Create reforestation areas and community gardens, and protect air and water quality.",
    helped_by: &[BuildingKind::Reforestation, BuildingKind::CommunityGarden],
    what_worsens: Some("Clearing native vegetation without planning, and pollution."),
    hurt_by: &[],
};

static ENERGY_INFO: IndicatorInfo = IndicatorInfo {
    title: "Energy Balance",
    explanation: "Energy produced minus energy consumed. A positive balance from renewables is the goal.",
    how_to_improve: "Install solar arrays before adding consumers.",
    helped_by: &[BuildingKind::SolarArray],
    what_worsens: Some("Adding buildings that consume energy without matching generation."),
    hurt_by: &[
        BuildingKind::House,
        BuildingKind::WaterTreatment,
        BuildingKind::WasteCollection,
        BuildingKind::CommunityCenter,
        BuildingKind::School,
        BuildingKind::HealthPost,
    ],
};

static FOOD_INFO: IndicatorInfo = IndicatorInfo {
    title: "Food Supply",
    explanation: "How much food the village grows for itself.",
    how_to_improve: "Develop community gardens.",
    helped_by: &[BuildingKind::CommunityGarden],
    what_worsens: Some("A growing population without more food production."),
    hurt_by: &[],
};

static POPULATION_INFO: IndicatorInfo = IndicatorInfo {
    title: "Population",
    explanation: "Everyone living in the village. Growth brings new challenges and new options.",
    how_to_improve: "Population grows with every sustainable house.",
    helped_by: &[BuildingKind::House],
    what_worsens: None,
    hurt_by: &[],
};
