pub mod ai_controller;
pub mod game;
pub mod simulator;
pub mod snapshot;
pub mod spawner;

pub use ai_controller::AiController;
pub use game::{Command, Game, GameStats, TickReport};
pub use simulator::{RunOptions, Simulator, SimulatorStats};
pub use snapshot::GameSnapshot;
pub use spawner::Spawner;
