use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

use crate::domain::flow::Flow;
use crate::domain::simulator::event::Event;
use crate::domain::virtual_topology::light_path::LightPath;
use crate::error::Result;

/// Write-only sink for aggregate statistics. Called by the control plane exactly
/// once per event and per admission decision.
pub trait StatisticsSink: std::fmt::Debug {
    fn add_event(&mut self, event: &Event) -> Result<()>;

    fn accept_flow(&mut self, flow: &Flow, light_path: &LightPath) -> Result<()>;

    fn block_flow(&mut self, flow: &Flow) -> Result<()>;

    /// Network-wide fragmentation index measured after an admission decision.
    fn sample_fragmentation(&mut self, fragmentation: f64) -> Result<()>;
}

pub type SharedStatisticsSink = Rc<RefCell<dyn StatisticsSink>>;

/// Result of one simulation run. One CSV row per seed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    pub seed: u64,
    pub load: f64,
    pub arrivals: u64,
    pub departures: u64,
    pub accepted: u64,
    pub blocked: u64,
    pub blocking_probability: f64,
    pub bandwidth_blocking_ratio: f64,
    pub mean_fragmentation: f64,
}

/// Counters of one simulation run.
#[derive(Debug, Default, Clone)]
pub struct SimulationStatistics {
    arrivals: u64,
    departures: u64,
    accepted: u64,
    blocked: u64,
    requested_bandwidth: f64,
    blocked_bandwidth: f64,
    fragmentation_sum: f64,
    fragmentation_samples: u64,
}

impl SimulationStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_arrivals(&self) -> u64 {
        self.arrivals
    }

    pub fn get_departures(&self) -> u64 {
        self.departures
    }

    pub fn get_accepted(&self) -> u64 {
        self.accepted
    }

    pub fn get_blocked(&self) -> u64 {
        self.blocked
    }

    /// Blocked flows over decided flows. 0.0 before the first decision.
    pub fn blocking_probability(&self) -> f64 {
        let decided = self.accepted + self.blocked;
        if decided == 0 {
            return 0.0;
        }
        self.blocked as f64 / decided as f64
    }

    /// Blocked bandwidth over requested bandwidth.
    pub fn bandwidth_blocking_ratio(&self) -> f64 {
        if self.requested_bandwidth <= 0.0 {
            return 0.0;
        }
        self.blocked_bandwidth / self.requested_bandwidth
    }

    pub fn mean_fragmentation(&self) -> f64 {
        if self.fragmentation_samples == 0 {
            return 0.0;
        }
        self.fragmentation_sum / self.fragmentation_samples as f64
    }

    pub fn summary(&self, seed: u64, load: f64) -> StatisticsSummary {
        StatisticsSummary {
            seed,
            load,
            arrivals: self.arrivals,
            departures: self.departures,
            accepted: self.accepted,
            blocked: self.blocked,
            blocking_probability: self.blocking_probability(),
            bandwidth_blocking_ratio: self.bandwidth_blocking_ratio(),
            mean_fragmentation: self.mean_fragmentation(),
        }
    }
}

impl StatisticsSink for SimulationStatistics {
    fn add_event(&mut self, event: &Event) -> Result<()> {
        if event.is_arrival() {
            self.arrivals += 1;
        } else {
            self.departures += 1;
        }
        Ok(())
    }

    fn accept_flow(&mut self, flow: &Flow, _light_path: &LightPath) -> Result<()> {
        self.accepted += 1;
        self.requested_bandwidth += flow.get_rate();
        Ok(())
    }

    fn block_flow(&mut self, flow: &Flow) -> Result<()> {
        self.blocked += 1;
        self.requested_bandwidth += flow.get_rate();
        self.blocked_bandwidth += flow.get_rate();
        Ok(())
    }

    fn sample_fragmentation(&mut self, fragmentation: f64) -> Result<()> {
        self.fragmentation_sum += fragmentation;
        self.fragmentation_samples += 1;
        Ok(())
    }
}

/// Writes one row per summary, with a header row.
pub fn write_summaries_csv<W: std::io::Write>(writer: W, summaries: &[StatisticsSummary]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for summary in summaries {
        csv_writer.serialize(summary)?;
    }
    csv_writer.flush()?;
    Ok(())
}
