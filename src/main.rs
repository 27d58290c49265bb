use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vila_verde::{
    history,
    indicators::Indicator,
    planner::RandomPlanner,
    scenario::{Scenario, ScenarioLoader},
    snapshot::SnapshotWriter,
    web::{self, WebServerConfig},
    Session,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Vila Verde settlement simulation")]
struct Cli {
    /// Tracing filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a scenario's scripted intents
    Run {
        #[arg(long, default_value = "scenarios/starter_village.yaml")]
        scenario: PathBuf,

        /// Directory for turn snapshots (none written when omitted)
        #[arg(long)]
        snapshot_dir: Option<PathBuf>,
    },
    /// Let a seeded random planner play
    Autoplay {
        /// Number of intents to attempt
        #[arg(long, default_value_t = 50)]
        turns: u32,

        /// Planner seed (defaults to the scenario seed)
        #[arg(long)]
        seed: Option<u64>,

        /// Scenario providing rules and catalog overrides
        #[arg(long)]
        scenario: Option<PathBuf>,
    },
    /// Serve the JSON API and event stream
    Serve {
        #[arg(long, default_value = "scenarios/starter_village.yaml")]
        scenario: PathBuf,

        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let loader = ScenarioLoader::new(".");
    match cli.command {
        Command::Run {
            scenario,
            snapshot_dir,
        } => run_script(loader.load(&scenario)?, snapshot_dir),
        Command::Autoplay {
            turns,
            seed,
            scenario,
        } => {
            let scenario = match scenario {
                Some(path) => loader.load(&path)?,
                None => Scenario::default(),
            };
            autoplay(scenario, turns, seed)
        }
        Command::Serve {
            scenario,
            host,
            port,
        } => {
            let scenario = loader.load(&scenario)?;
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(web::run(WebServerConfig {
                scenario,
                host,
                port,
            }))
        }
    }
}

fn run_script(scenario: Scenario, snapshot_dir: Option<PathBuf>) -> Result<()> {
    let mut session = Session::new(scenario.build_engine()?);
    let mut writer =
        snapshot_dir.map(|dir| SnapshotWriter::new(dir, scenario.snapshot_interval_turns));

    for (step, intent) in scenario.script.iter().enumerate() {
        if let Err(err) = session.apply(intent.clone()) {
            warn!(step, error = %err, "Scripted intent rejected");
            continue;
        }
        if let Some(writer) = writer.as_mut() {
            if let Some(path) = writer.maybe_write(&scenario.name, session.state())? {
                info!(path = %path.display(), "Snapshot written");
            }
        }
    }

    print_summary(&scenario.name, &session);
    Ok(())
}

fn autoplay(scenario: Scenario, attempts: u32, seed: Option<u64>) -> Result<()> {
    let mut session = Session::new(scenario.build_engine()?);
    let mut planner = RandomPlanner::new(seed.unwrap_or(scenario.seed));
    let mut rejected = 0u32;

    for _ in 0..attempts {
        let intent = planner.next_intent(session.state(), session.engine().rules());
        if session.apply(intent).is_err() {
            rejected += 1;
        }
    }

    info!(attempts, rejected, "Autoplay finished");
    print_summary(&scenario.name, &session);
    Ok(())
}

fn print_summary(name: &str, session: &Session) {
    let state = session.state();
    println!(
        "Scenario '{}' finished at turn {} with {} buildings.",
        name,
        state.current_turn,
        state.building_count()
    );
    for indicator in Indicator::ALL {
        let trend = history::trend(&state.history, indicator);
        println!(
            "  {:<22} {:>5} {}",
            indicator.info().title,
            state.indicators.get(indicator),
            trend.arrow()
        );
    }
    let completed: Vec<&str> = state
        .completed_challenge_ids
        .iter()
        .map(|id| id.challenge().title)
        .collect();
    if !completed.is_empty() {
        println!("  Challenges completed: {}", completed.join(", "));
    }
}
