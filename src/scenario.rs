use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    catalog::{BuildingKind, Catalog, DefinitionOverride},
    config::Rules,
    engine::{Engine, EngineBuilder, Intent},
};

fn default_snapshot_interval_turns() -> u32 {
    5
}

/// A scripted settlement: tunables, catalog overrides and a list of intents.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub rules: Rules,
    #[serde(default)]
    pub catalog: BTreeMap<BuildingKind, DefinitionOverride>,
    #[serde(default)]
    pub script: Vec<Intent>,
    #[serde(default = "default_snapshot_interval_turns")]
    pub snapshot_interval_turns: u32,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "sandbox".to_string(),
            description: None,
            seed: 0,
            rules: Rules::default(),
            catalog: BTreeMap::new(),
            script: Vec::new(),
            snapshot_interval_turns: default_snapshot_interval_turns(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// Validates rules and catalog overrides, then assembles the engine.
    pub fn build_engine(&self) -> Result<Engine> {
        self.rules
            .validate()
            .with_context(|| format!("Invalid rules in scenario '{}'", self.name))?;
        let catalog = Catalog::with_overrides(&self.catalog)
            .with_context(|| format!("Invalid catalog in scenario '{}'", self.name))?;
        Ok(EngineBuilder::new()
            .with_rules(self.rules.clone())
            .with_catalog(catalog)
            .build())
    }
}
