use rand::SeedableRng;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::thread;
use std::time::Instant;

use crate::api::simulation_dto::SimulationDto;
use crate::domain::network::physical_topology::PhysicalTopology;
use crate::domain::rsa::rsa_type::rsa_from_dto;
use crate::domain::simulator::control_plane::ControlPlane;
use crate::domain::simulator::event_scheduler::EventScheduler;
use crate::domain::simulator::simulation_runner::SimulationRunner;
use crate::domain::simulator::traffic_generator::TrafficGenerator;
use crate::domain::statistics::statistics::{SimulationStatistics, StatisticsSummary};
use crate::domain::statistics::tracer::Tracer;
use crate::domain::virtual_topology::virtual_topology::VirtualTopology;
use crate::error::{Error, Result};
use crate::loader::parser::parse_json_file;

/// Run level switches, usually taken from the command line.
#[derive(Debug, Clone)]
pub struct SimulatorOptions {
    /// Seeds `1..=seeds` are simulated, one run per seed.
    pub seeds: u64,

    /// Overrides `traffic.load` when set.
    pub forced_load: Option<f64>,

    /// Writes trace files even if the configuration does not enable them.
    pub trace: bool,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self { seeds: 1, forced_load: None, trace: false }
    }
}

/// Multi-seed driver.
///
/// Every seed gets a complete simulation of its own (topologies, scheduler,
/// traffic, sinks and control plane), so the seeds run in parallel on scoped
/// threads without sharing any state.
#[derive(Debug)]
pub struct Simulator {
    config: SimulationDto,
    name: String,
    options: SimulatorOptions,
}

impl Simulator {
    /// Validates the configuration once up front, so that configuration errors are
    /// reported before any thread is started.
    pub fn new(config: SimulationDto, name: impl Into<String>, options: SimulatorOptions) -> Result<Self> {
        if options.seeds == 0 {
            return Err(Error::ConfigurationError("At least one seed has to be simulated".to_string()));
        }

        rsa_from_dto(&config.rsa)?;
        PhysicalTopology::try_from(&config.physical_topology)?;
        let traffic = TrafficGenerator::try_from(&config.traffic)?;
        if let Some(load) = options.forced_load {
            traffic.with_load(load)?;
        }

        Ok(Self { config, name: name.into(), options })
    }

    pub fn from_file(path: impl AsRef<Path>, options: SimulatorOptions) -> Result<Self> {
        let config: SimulationDto = parse_json_file(path.as_ref())?;
        log::info!("Simulation configuration '{}' parsed successfully.", path.as_ref().display());

        let name = path.as_ref().file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_else(|| "simulation".to_string());

        Self::new(config, name, options)
    }

    pub fn get_options(&self) -> &SimulatorOptions {
        &self.options
    }

    /// Runs all seeds in parallel.
    ///
    /// # Returns
    /// One summary per seed in seed order, or the first error of any run.
    pub fn run(&self) -> Result<Vec<StatisticsSummary>> {
        let results: Vec<Result<StatisticsSummary>> = thread::scope(|scope| {
            let handles: Vec<_> = (1..=self.options.seeds).map(|seed| (seed, scope.spawn(move || self.run_seed(seed)))).collect();

            handles
                .into_iter()
                .map(|(seed, handle)| handle.join().unwrap_or_else(|_| Err(Error::SimulationError(format!("run for seed {} panicked", seed)))))
                .collect()
        });

        results.into_iter().collect()
    }

    /// Builds and runs the complete simulation for one seed.
    pub fn run_seed(&self, seed: u64) -> Result<StatisticsSummary> {
        let begin = Instant::now();

        let pt = PhysicalTopology::try_from(&self.config.physical_topology)?;
        let num_nodes = pt.get_num_nodes();

        let mut traffic = TrafficGenerator::try_from(&self.config.traffic)?;
        if let Some(load) = self.options.forced_load {
            traffic = traffic.with_load(load)?;
        }

        let tracer = match self.trace_path(seed, traffic.get_load()) {
            Some(path) => Tracer::to_file(path)?,
            None => Tracer::disabled(),
        }
        .shared();
        let statistics = Rc::new(RefCell::new(SimulationStatistics::new()));

        let vt = VirtualTopology::new(pt, tracer.clone());
        let rsa = rsa_from_dto(&self.config.rsa)?;
        let mut cp = ControlPlane::new(vt, rsa, &self.config.traffic, statistics.clone(), tracer.clone())?;

        let mut events = EventScheduler::new();
        let mut rng = StdRng::seed_from_u64(seed);
        traffic.generate(num_nodes, &mut rng, &mut events)?;

        log::info!("{} -> Load {}: running simulation number {}.", self.name, traffic.get_load(), seed);
        let handled = SimulationRunner::new(&mut cp, &mut events).run()?;
        tracer.borrow_mut().finish()?;

        let summary = statistics.borrow().summary(seed, traffic.get_load());
        log::info!(
            "Seed {} finished: {} events in {:.3} s, blocking probability {:.4}.",
            seed,
            handled,
            begin.elapsed().as_secs_f64(),
            summary.blocking_probability
        );

        Ok(summary)
    }

    /// `<file>_seed<n>.trace`, with `_Load_<load>` inserted when the load is forced.
    fn trace_path(&self, seed: u64, load: f64) -> Option<PathBuf> {
        if !(self.options.trace || self.config.trace.enabled) {
            return None;
        }

        let base = match &self.config.trace.file {
            Some(file) => PathBuf::from(file).with_extension(""),
            None => PathBuf::from(&self.name),
        };
        let mut file_name = base.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_else(|| self.name.clone());
        if self.options.forced_load.is_some() {
            file_name.push_str(&format!("_Load_{}", load));
        }
        file_name.push_str(&format!("_seed{}.trace", seed));

        Some(base.with_file_name(file_name))
    }
}
