use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

use airspace_sim::config::{Difficulty, SimulationConfig};
use airspace_sim::scenario::Scenario;
use airspace_sim::simulation::{Game, RunOptions, Simulator};

#[derive(Parser)]
#[command(name = "airspace-sim")]
#[command(about = "Headless air traffic control simulator", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a match with the automatic tower
    Run {
        /// Scenario JSON file (defaults to the built-in classic layout)
        #[arg(short, long)]
        scenario: Option<String>,

        #[arg(short, long, default_value = "easy")]
        difficulty: String,

        #[arg(long)]
        seed: Option<u64>,

        /// Simulated seconds to run for
        #[arg(long, default_value = "300")]
        duration: f64,

        #[arg(long)]
        tick_rate: Option<f64>,

        #[arg(long)]
        max_aircraft: Option<usize>,

        /// Print a JSON snapshot line every simulated second
        #[arg(long)]
        snapshots: bool,

        /// Pace ticks against the wall clock
        #[arg(long)]
        realtime: bool,
    },

    /// Print the planned route between two entry/exit points
    Route {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        #[arg(short, long)]
        scenario: Option<String>,
    },
}

fn load_scenario(path: Option<&str>, hangar_size: usize) -> Result<Scenario> {
    match path {
        Some(path) => Scenario::load(path, hangar_size),
        None => Scenario::classic(hangar_size).context("Failed to build classic scenario"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            difficulty,
            seed,
            duration,
            tick_rate,
            max_aircraft,
            snapshots,
            realtime,
        } => {
            let difficulty: Difficulty = difficulty.parse()?;

            let mut config = SimulationConfig::default();
            if let Some(rate) = tick_rate {
                config.tick_rate = rate;
            }
            if let Some(max) = max_aircraft {
                config.max_aircraft = max;
            }

            let scenario = load_scenario(scenario.as_deref(), config.hangar_size)?;
            info!("{}", scenario.statistics());

            let seed = seed.unwrap_or_else(rand::random);
            let options = RunOptions {
                tick_rate: config.tick_rate,
                duration: Some(duration),
                realtime,
                snapshots,
            };
            let game = Game::new(scenario, difficulty, config, seed)?;
            let mut simulator = Simulator::new(game, options);

            let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
            ctrlc::set_handler(move || {
                let _ = shutdown_tx.send(());
            })
            .context("Failed to install Ctrl-C handler")?;

            let stats = simulator.run(shutdown_rx).await?;
            info!("{}", stats);
        }

        Commands::Route { from, to, scenario } => {
            let scenario = load_scenario(scenario.as_deref(), SimulationConfig::default().hangar_size)?;
            let plan = scenario.plan_route(&from, &to)?;

            println!("{} -> {}", plan.origin_name(), plan.destination_name());
            for (stage, waypoint) in plan.route().iter().enumerate() {
                println!("  {:>2}. {} {}", stage, waypoint.name(), waypoint.location());
            }
            println!("Total distance: {:.1}", plan.total_distance());
        }
    }

    Ok(())
}
