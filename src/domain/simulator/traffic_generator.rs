use rand::Rng;
use rand::rngs::StdRng;

use crate::api::simulation_dto::{CallTypeDto, TrafficDto};
use crate::domain::flow::Flow;
use crate::domain::simulator::event::Event;
use crate::domain::simulator::event_scheduler::EventScheduler;
use crate::domain::utils::id::{FlowId, NodeId};
use crate::error::{Error, Result};

/// Poisson traffic source.
///
/// Inter-arrival times are exponential with rate `load / mean holding time`, so the
/// offered load in Erlang matches the configuration. Each flow draws its call type by
/// weight and its holding time from an exponential distribution around the mean of
/// that call type.
#[derive(Debug, Clone)]
pub struct TrafficGenerator {
    calls: usize,
    load: f64,
    call_types: Vec<CallTypeDto>,
    total_weight: u32,
    mean_holding_time: f64,
}

impl TryFrom<&TrafficDto> for TrafficGenerator {
    type Error = Error;

    fn try_from(dto: &TrafficDto) -> Result<Self> {
        if dto.call_types.is_empty() {
            return Err(Error::ConfigurationError("traffic.callTypes must not be empty".to_string()));
        }
        for call_type in dto.call_types.iter() {
            if !(call_type.rate > 0.0) || !(call_type.holding_time > 0.0) {
                return Err(Error::ConfigurationError(format!(
                    "Call type with rate {} and holding time {} is invalid, both must be positive",
                    call_type.rate, call_type.holding_time
                )));
            }
            if let Some(max_rate) = dto.max_rate {
                if call_type.rate > max_rate {
                    return Err(Error::ConfigurationError(format!("Call type rate {} exceeds traffic.maxRate {}", call_type.rate, max_rate)));
                }
            }
        }

        let total_weight: u32 = dto.call_types.iter().map(|call_type| call_type.weight).sum();
        if total_weight == 0 {
            return Err(Error::ConfigurationError("The call type weights sum up to zero".to_string()));
        }

        let mean_holding_time =
            dto.call_types.iter().map(|call_type| call_type.holding_time * call_type.weight as f64).sum::<f64>() / total_weight as f64;

        let generator = Self { calls: dto.calls, load: dto.load, call_types: dto.call_types.clone(), total_weight, mean_holding_time };
        generator.check_load()?;

        Ok(generator)
    }
}

impl TrafficGenerator {
    /// Replaces the configured load, used by `--load`.
    pub fn with_load(mut self, load: f64) -> Result<Self> {
        self.load = load;
        self.check_load()?;
        Ok(self)
    }

    pub fn get_load(&self) -> f64 {
        self.load
    }

    pub fn get_calls(&self) -> usize {
        self.calls
    }

    pub fn get_mean_holding_time(&self) -> f64 {
        self.mean_holding_time
    }

    /// Schedules one arrival and one departure per call.
    ///
    /// Source and destination are drawn uniformly among distinct nodes.
    pub fn generate(&self, num_nodes: usize, rng: &mut StdRng, scheduler: &mut EventScheduler) -> Result<()> {
        if num_nodes < 2 {
            return Err(Error::ConfigurationError(format!("Traffic needs at least two nodes, the topology has {}", num_nodes)));
        }

        let arrival_rate = self.load / self.mean_holding_time;
        let mut time = 0.0;

        for id in 0..self.calls {
            time += exponential(rng, arrival_rate);

            let call_type = self.pick_call_type(rng);
            let holding_time = exponential(rng, 1.0 / call_type.holding_time);

            let source = rng.random_range(0..num_nodes);
            let mut destination = rng.random_range(0..num_nodes - 1);
            if destination >= source {
                destination += 1;
            }

            let flow = Flow::new(FlowId::new(id), NodeId::new(source), NodeId::new(destination), call_type.rate, holding_time)?;
            scheduler.schedule(Event::arrival(time, flow));
            scheduler.schedule(Event::departure(time + holding_time, FlowId::new(id)));
        }

        log::info!("Generated {} calls at {} Erlang (last arrival at {:.3}).", self.calls, self.load, time);

        Ok(())
    }

    fn pick_call_type(&self, rng: &mut StdRng) -> &CallTypeDto {
        let mut ticket = rng.random_range(0..self.total_weight);
        for call_type in self.call_types.iter() {
            if ticket < call_type.weight {
                return call_type;
            }
            ticket -= call_type.weight;
        }
        // Unreachable while the weights sum to `total_weight`.
        &self.call_types[self.call_types.len() - 1]
    }

    fn check_load(&self) -> Result<()> {
        if !(self.load > 0.0) {
            return Err(Error::ConfigurationError(format!("Load must be positive, got {}", self.load)));
        }
        Ok(())
    }
}

/// Exponentially distributed sample with the given rate.
fn exponential(rng: &mut StdRng, rate: f64) -> f64 {
    let uniform: f64 = rng.random();
    -(1.0 - uniform).ln() / rate
}
