use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::indicators::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    House,
    CommunityGarden,
    SolarArray,
    WaterTreatment,
    WasteCollection,
    Reforestation,
    CommunityCenter,
    School,
    HealthPost,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 9] = [
        BuildingKind::House,
        BuildingKind::CommunityGarden,
        BuildingKind::SolarArray,
        BuildingKind::WaterTreatment,
        BuildingKind::WasteCollection,
        BuildingKind::Reforestation,
        BuildingKind::CommunityCenter,
        BuildingKind::School,
        BuildingKind::HealthPost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BuildingKind::House => "house",
            BuildingKind::CommunityGarden => "community_garden",
            BuildingKind::SolarArray => "solar_array",
            BuildingKind::WaterTreatment => "water_treatment",
            BuildingKind::WasteCollection => "waste_collection",
            BuildingKind::Reforestation => "reforestation",
            BuildingKind::CommunityCenter => "community_center",
            BuildingKind::School => "school",
            BuildingKind::HealthPost => "health_post",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown building kind '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for BuildingKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        BuildingKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| UnknownKind(value.to_string()))
    }
}

/// Kinds a fresh settlement can build before any unlock fires.
pub const INITIAL_AVAILABLE: [BuildingKind; 2] =
    [BuildingKind::House, BuildingKind::CommunityGarden];

/// Signed per-building deltas. Energy and food are flows, the rest are levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EffectVector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_quality: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_quality: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_happiness: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biodiversity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food: Option<i32>,
}

impl EffectVector {
    pub const NONE: EffectVector = EffectVector {
        air_quality: None,
        water_quality: None,
        community_happiness: None,
        biodiversity: None,
        energy: None,
        food: None,
    };

    /// Non-zero deltas paired with the indicator they move.
    pub fn deltas(&self) -> impl Iterator<Item = (Indicator, i32)> {
        [
            (Indicator::AirQuality, self.air_quality),
            (Indicator::WaterQuality, self.water_quality),
            (Indicator::CommunityHappiness, self.community_happiness),
            (Indicator::Biodiversity, self.biodiversity),
            (Indicator::EnergyBalance, self.energy),
            (Indicator::FoodSupply, self.food),
        ]
        .into_iter()
        .filter_map(|(indicator, delta)| match delta {
            Some(value) if value != 0 => Some((indicator, value)),
            _ => None,
        })
    }

    pub fn energy(&self) -> i32 {
        self.energy.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildingDefinition {
    pub kind: BuildingKind,
    pub name: String,
    pub description: String,
    pub effects: EffectVector,
}

struct BuiltinDefinition {
    kind: BuildingKind,
    name: &'static str,
    description: &'static str,
    effects: EffectVector,
}

const BUILTIN: &[BuiltinDefinition] = &[
    BuiltinDefinition {
        kind: BuildingKind::House,
        name: "Sustainable House",
        description: "Eco-friendly housing that keeps its footprint small and its residents well.",
        effects: EffectVector {
            community_happiness: Some(5),
            energy: Some(-1),
            biodiversity: Some(1),
            ..EffectVector::NONE
        },
    },
    BuiltinDefinition {
        kind: BuildingKind::CommunityGarden,
        name: "Community Garden",
        description: "Grows fresh food locally, strengthens neighbourly ties and shelters wildlife.",
        effects: EffectVector {
            food: Some(10),
            community_happiness: Some(3),
            biodiversity: Some(5),
            water_quality: Some(2),
            ..EffectVector::NONE
        },
    },
    BuiltinDefinition {
        kind: BuildingKind::SolarArray,
        name: "Solar Panel Array",
        description: "Clean power from the sun that also cuts air pollution.",
        effects: EffectVector {
            energy: Some(15),
            air_quality: Some(5),
            ..EffectVector::NONE
        },
    },
    BuiltinDefinition {
        kind: BuildingKind::WaterTreatment,
        name: "Water Treatment Plant",
        description: "Purifies water for reuse and protects the river ecosystem.",
        effects: EffectVector {
            water_quality: Some(20),
            energy: Some(-2),
            ..EffectVector::NONE
        },
    },
    BuiltinDefinition {
        kind: BuildingKind::WasteCollection,
        name: "Recycling Center",
        description: "Sorts waste for recycling and composting.",
        effects: EffectVector {
            air_quality: Some(3),
            water_quality: Some(3),
            community_happiness: Some(2),
            energy: Some(-1),
            ..EffectVector::NONE
        },
    },
    BuiltinDefinition {
        kind: BuildingKind::Reforestation,
        name: "Reforestation Area",
        description: "Native trees that raise biodiversity, clean the air and add green space.",
        effects: EffectVector {
            biodiversity: Some(15),
            air_quality: Some(8),
            community_happiness: Some(3),
            ..EffectVector::NONE
        },
    },
    BuiltinDefinition {
        kind: BuildingKind::CommunityCenter,
        name: "Community Center",
        description: "A place for meetings, learning and culture.",
        effects: EffectVector {
            community_happiness: Some(10),
            energy: Some(-1),
            ..EffectVector::NONE
        },
    },
    BuiltinDefinition {
        kind: BuildingKind::School,
        name: "School",
        description: "Education for every resident, and a happier village for it.",
        effects: EffectVector {
            community_happiness: Some(8),
            energy: Some(-2),
            ..EffectVector::NONE
        },
    },
    BuiltinDefinition {
        kind: BuildingKind::HealthPost,
        name: "Health Post",
        description: "Basic health care close to home.",
        effects: EffectVector {
            community_happiness: Some(10),
            energy: Some(-2),
            ..EffectVector::NONE
        },
    },
];

/// Largest magnitude a single effect delta may carry.
pub const MAX_EFFECT_MAGNITUDE: i32 = 1000;

/// Replacement text or effects for one kind, as written in a scenario file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefinitionOverride {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub effects: Option<EffectVector>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("building '{0}' has an empty display name")]
    EmptyName(BuildingKind),
    #[error("building '{kind}' moves {indicator} by {delta}, beyond the allowed +/-{MAX_EFFECT_MAGNITUDE}")]
    EffectOutOfRange {
        kind: BuildingKind,
        indicator: Indicator,
        delta: i32,
    },
}

/// Static registry of building definitions, one per kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    definitions: Vec<BuildingDefinition>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub fn builtin() -> Self {
        // BUILTIN is declared in `BuildingKind::ALL` order, so `kind.index()` addresses it.
        let definitions = BUILTIN
            .iter()
            .map(|builtin| BuildingDefinition {
                kind: builtin.kind,
                name: builtin.name.to_string(),
                description: builtin.description.to_string(),
                effects: builtin.effects,
            })
            .collect();
        Self { definitions }
    }

    /// Builtin catalog with scenario overrides applied and validated.
    pub fn with_overrides(
        overrides: &BTreeMap<BuildingKind, DefinitionOverride>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::builtin();
        for (kind, patch) in overrides {
            let definition = &mut catalog.definitions[kind.index()];
            if let Some(name) = &patch.name {
                definition.name = name.clone();
            }
            if let Some(description) = &patch.description {
                definition.description = description.clone();
            }
            if let Some(effects) = patch.effects {
                definition.effects = effects;
            }
        }
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        for definition in &self.definitions {
            if definition.name.trim().is_empty() {
                return Err(CatalogError::EmptyName(definition.kind));
            }
            if let Some((indicator, delta)) = definition
                .effects
                .deltas()
                .find(|(_, delta)| delta.abs() > MAX_EFFECT_MAGNITUDE)
            {
                return Err(CatalogError::EffectOutOfRange {
                    kind: definition.kind,
                    indicator,
                    delta,
                });
            }
        }
        Ok(())
    }

    pub fn definition_of(&self, kind: BuildingKind) -> &BuildingDefinition {
        &self.definitions[kind.index()]
    }

    pub fn definitions(&self) -> impl Iterator<Item = &BuildingDefinition> {
        self.definitions.iter()
    }
}
