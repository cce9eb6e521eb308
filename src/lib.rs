use std::path::Path;

use crate::domain::simulator::simulator::{Simulator, SimulatorOptions};
use crate::domain::statistics::statistics::StatisticsSummary;
use crate::error::Result;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Loads a simulation configuration and runs every seed.
///
/// # Returns
/// One statistics summary per seed, in seed order.
pub fn run_simulation(config_path: impl AsRef<Path>, options: SimulatorOptions) -> Result<Vec<StatisticsSummary>> {
    let simulator = Simulator::from_file(config_path, options)?;
    log::info!("Simulator constructed successfully, running {} seed(s).", simulator.get_options().seeds);

    simulator.run()
}
