use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};
use tracing::{debug, error, info};

use super::game::Game;
use super::snapshot::GameSnapshot;

/// Runner settings
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub tick_rate: f64,
    /// Simulated seconds to run for. `None` runs until game over or shutdown.
    pub duration: Option<f64>,
    /// Pace ticks against the wall clock instead of running flat out.
    pub realtime: bool,
    /// Emit a JSON snapshot line once per simulated second.
    pub snapshots: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            tick_rate: 30.0,
            duration: Some(300.0),
            realtime: false,
            snapshots: false,
        }
    }
}

/// Main simulation controller
pub struct Simulator {
    game: Game,
    options: RunOptions,
    started_at: DateTime<Utc>,
    ticks: u64,
    crashes: u32,
    running: bool,
}

impl Simulator {
    pub fn new(game: Game, options: RunOptions) -> Self {
        Self {
            game,
            options,
            started_at: Utc::now(),
            ticks: 0,
            crashes: 0,
            running: false,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Start the main simulation loop
    pub async fn run(&mut self, shutdown: broadcast::Receiver<()>) -> Result<SimulatorStats> {
        if !(self.options.tick_rate.is_finite() && self.options.tick_rate > 0.0) {
            anyhow::bail!("Tick rate must be positive, got {}", self.options.tick_rate);
        }
        info!(
            "[SIMULATOR] Starting {} match at {} Hz{}",
            self.game.difficulty(),
            self.options.tick_rate,
            if self.options.realtime { " (realtime)" } else { "" }
        );
        self.started_at = Utc::now();
        self.running = true;

        let dt = 1.0 / self.options.tick_rate;
        let snapshot_every = self.options.tick_rate.round().max(1.0) as u64;

        let mut ticker = interval(Duration::from_secs_f64(dt));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut shutdown_rx = shutdown;

        while !self.is_complete() {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("[SIMULATOR] Shutdown signal received");
                    break;
                }
                _ = Self::pace(&mut ticker, self.options.realtime) => {
                    self.step(dt);

                    if self.options.snapshots && self.ticks % snapshot_every == 0 {
                        let snapshot = GameSnapshot::capture(&self.game, self.started_at);
                        println!("{}", snapshot.to_json_line()?);
                    }
                    if self.ticks % (snapshot_every * 10) == 0 {
                        debug!(
                            "[SIMULATOR] t={:.0}s: {} aircraft, score {}",
                            self.game.elapsed(),
                            self.game.aircraft().len(),
                            self.game.score()
                        );
                    }
                }
            }
        }

        self.running = false;
        let stats = self.statistics();
        info!("[SIMULATOR] Simulation loop stopped");
        Ok(stats)
    }

    async fn pace(ticker: &mut Interval, realtime: bool) {
        if realtime {
            ticker.tick().await;
        } else {
            tokio::task::yield_now().await;
        }
    }

    /// One synchronous tick of the match.
    pub fn step(&mut self, dt: f64) {
        self.ticks += 1;
        let report = self.game.tick(dt);

        if let Some((a, b)) = report.crash {
            self.crashes += 1;
            error!(
                "[SIMULATOR] Crash between {} and {} at t={:.1}s",
                a,
                b,
                self.game.elapsed()
            );
        }
        for name in &report.spawned {
            debug!("[SIMULATOR] Spawned {}", name);
        }
    }

    fn is_complete(&self) -> bool {
        if self.game.is_game_over() {
            return true;
        }
        match self.options.duration {
            Some(limit) => self.game.elapsed() >= limit,
            None => false,
        }
    }

    /// Get simulation statistics
    pub fn statistics(&self) -> SimulatorStats {
        let stats = self.game.stats();
        SimulatorStats {
            running: self.running,
            scenario_name: self.game.scenario_name().to_string(),
            started_at: self.started_at,
            ticks: self.ticks,
            simulated_seconds: self.game.elapsed(),
            score: self.game.score(),
            lives: self.game.lives(),
            spawned: stats.spawned,
            landed: stats.landed,
            cleared: stats.cleared,
            crashes: self.crashes,
            lost: stats.lost,
            game_over: self.game.is_game_over(),
        }
    }
}

/// Statistics about the running simulator
#[derive(Debug, Clone)]
pub struct SimulatorStats {
    pub running: bool,
    pub scenario_name: String,
    pub started_at: DateTime<Utc>,
    pub ticks: u64,
    pub simulated_seconds: f64,
    pub score: i64,
    pub lives: u32,
    pub spawned: u32,
    pub landed: u32,
    pub cleared: u32,
    pub crashes: u32,
    pub lost: u32,
    pub game_over: bool,
}

impl std::fmt::Display for SimulatorStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Simulator Status:")?;
        writeln!(f, "  Scenario: {}", self.scenario_name)?;
        writeln!(f, "  Started: {}", self.started_at.to_rfc3339())?;
        writeln!(f, "  Running: {}", self.running)?;
        writeln!(f, "  Ticks: {} ({:.1}s simulated)", self.ticks, self.simulated_seconds)?;
        writeln!(f, "  Score: {}", self.score)?;
        writeln!(f, "  Lives: {}", self.lives)?;
        writeln!(
            f,
            "  Flights: {} spawned, {} landed, {} cleared, {} lost",
            self.spawned, self.landed, self.cleared, self.lost
        )?;
        writeln!(f, "  Crashes: {}", self.crashes)?;
        writeln!(f, "  Game Over: {}", self.game_over)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, SimulationConfig};
    use crate::scenario::Scenario;

    #[tokio::test]
    async fn test_runs_for_duration() -> Result<()> {
        let game = Game::new(Scenario::classic(3)?, Difficulty::Easy, SimulationConfig::default(), 5)?;
        let mut simulator = Simulator::new(
            game,
            RunOptions {
                tick_rate: 10.0,
                duration: Some(20.0),
                realtime: false,
                snapshots: false,
            },
        );

        let (_tx, rx) = broadcast::channel(1);
        let stats = simulator.run(rx).await?;
        assert!(stats.simulated_seconds >= 20.0 - 1e-9);
        assert!(stats.ticks >= 200);
        assert!(stats.spawned > 0);
        assert!(!stats.running);
        Ok(())
    }

    #[tokio::test]
    async fn test_stops_on_shutdown() -> Result<()> {
        let game = Game::new(Scenario::classic(3)?, Difficulty::Easy, SimulationConfig::default(), 5)?;
        let mut simulator = Simulator::new(
            game,
            RunOptions {
                duration: None,
                ..RunOptions::default()
            },
        );

        let (tx, rx) = broadcast::channel(1);
        tx.send(())?;
        let stats = simulator.run(rx).await?;
        assert!(!stats.game_over);
        assert!(stats.ticks <= 1);
        Ok(())
    }
}
