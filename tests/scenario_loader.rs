use std::path::PathBuf;

use tempfile::tempdir;
use vila_verde::{
    challenges::ChallengeId, snapshot::SnapshotWriter, BuildingKind, ScenarioLoader, Session,
};

fn scenario_loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from("scenarios").join(name)
}

#[test]
fn starter_village_script_plays_through() {
    let scenario = scenario_loader()
        .load(scenario_path("starter_village.yaml"))
        .expect("scenario should load");
    assert_eq!(scenario.name, "starter_village");

    let mut session = Session::new(scenario.build_engine().expect("engine builds"));
    for intent in &scenario.script {
        session.apply(intent.clone()).expect("scripted intent applies");
    }

    let state = session.state();
    assert_eq!(state.current_turn, 7);
    assert_eq!(state.completed_challenge_ids, vec![ChallengeId::Energy]);
    assert!(state.has(BuildingKind::WaterTreatment));
    assert!(state.is_available(BuildingKind::HealthPost));
    assert_eq!(state.unlocked_terrain_areas, 1);
    assert_eq!(state.selected_building_for_info, None);
    assert_eq!(session.log().len(), scenario.script.len());
}

#[test]
fn happiness_drill_overrides_catalog() {
    let scenario = scenario_loader()
        .load(scenario_path("happiness_drill.yaml"))
        .expect("scenario should load");
    let engine = scenario.build_engine().expect("engine builds");
    let house = engine.catalog().definition_of(BuildingKind::House);
    assert_eq!(house.effects.energy(), 5);
    assert_eq!(house.name, "Sustainable House");
    assert_eq!(
        engine
            .catalog()
            .definition_of(BuildingKind::CommunityCenter)
            .description,
        "A square for festivals that lifts the whole village."
    );

    let mut session = Session::new(engine);
    for intent in &scenario.script {
        session.apply(intent.clone()).expect("scripted intent applies");
    }
    assert_eq!(
        session.state().completed_challenge_ids,
        vec![ChallengeId::Happiness]
    );
}

#[test]
fn snapshots_follow_scenario_interval() {
    let scenario = scenario_loader()
        .load(scenario_path("starter_village.yaml"))
        .expect("scenario should load");
    let temp = tempdir().expect("tempdir");
    let mut writer = SnapshotWriter::new(temp.path(), scenario.snapshot_interval_turns);

    let mut session = Session::new(scenario.build_engine().expect("engine builds"));
    let mut written = Vec::new();
    for intent in &scenario.script {
        session.apply(intent.clone()).expect("scripted intent applies");
        if let Some(path) = writer
            .maybe_write(&scenario.name, session.state())
            .expect("snapshot writes")
        {
            written.push(path);
        }
    }

    let names: Vec<String> = written
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect();
    // the inspect and close-panel steps stay on turn 7
    assert_eq!(
        names,
        vec!["turn_000002.json", "turn_000004.json", "turn_000006.json"]
    );
}

#[test]
fn missing_file_reports_its_path() {
    let err = scenario_loader()
        .load(scenario_path("does_not_exist.yaml"))
        .unwrap_err();
    assert!(err.to_string().contains("does_not_exist.yaml"));
}
