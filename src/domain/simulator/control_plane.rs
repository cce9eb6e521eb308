use std::collections::HashMap;

use crate::api::simulation_dto::TrafficDto;
use crate::domain::flow::Flow;
use crate::domain::rsa::rsa_trait::{ControlPlaneForRsa, Rsa};
use crate::domain::simulator::event::{Event, EventKind};
use crate::domain::statistics::statistics::SharedStatisticsSink;
use crate::domain::statistics::tracer::SharedTraceSink;
use crate::domain::utils::id::FlowId;
use crate::domain::virtual_topology::light_path::LightPath;
use crate::domain::virtual_topology::virtual_topology::VirtualTopology;
use crate::error::{Error, Result};

/// Admission state of a flow.
///
/// `Pending -> Accepted | Blocked` on arrival, `Accepted -> Released` on departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Pending,
    Accepted,
    Blocked,
    Released,
}

/// Decision bookkeeping handed to the RSA strategy during an arrival.
#[derive(Debug)]
pub struct FlowLedger {
    states: HashMap<FlowId, FlowState>,
    statistics: SharedStatisticsSink,
    tracer: SharedTraceSink,
}

impl FlowLedger {
    fn new(statistics: SharedStatisticsSink, tracer: SharedTraceSink) -> Self {
        Self { states: HashMap::new(), statistics, tracer }
    }

    fn get_state(&self, flow_id: FlowId) -> Option<FlowState> {
        self.states.get(&flow_id).copied()
    }

    /// Moves a pending flow to its decided state.
    fn decide(&mut self, flow_id: FlowId, decision: FlowState) -> Result<()> {
        match self.states.get_mut(&flow_id) {
            Some(state) if *state == FlowState::Pending => {
                *state = decision;
                Ok(())
            }
            Some(state) => Err(Error::FlowContractViolation {
                flow_id,
                reason: format!("cannot move from {:?} to {:?}", state, decision),
            }),
            None => Err(Error::FlowContractViolation { flow_id, reason: "decision for a flow that never arrived".to_string() }),
        }
    }
}

impl ControlPlaneForRsa for FlowLedger {
    fn accept_flow(&mut self, flow: &Flow, light_path: &LightPath) -> Result<()> {
        self.decide(flow.get_id(), FlowState::Accepted)?;
        self.tracer.borrow_mut().accept_flow(flow, light_path)?;
        self.statistics.borrow_mut().accept_flow(flow, light_path)?;
        Ok(())
    }

    fn block_flow(&mut self, flow: &Flow) -> Result<()> {
        self.decide(flow.get_id(), FlowState::Blocked)?;
        self.tracer.borrow_mut().block_flow(flow)?;
        self.statistics.borrow_mut().block_flow(flow)?;
        Ok(())
    }
}

/// Dispatches simulation events to the RSA strategy and keeps the flow state machine.
///
/// The control plane owns the virtual topology for the whole run, so every spectrum
/// mutation happens inside one of its handlers.
#[derive(Debug)]
pub struct ControlPlane {
    vt: VirtualTopology,
    rsa: Box<dyn Rsa>,
    ledger: FlowLedger,

    /// Accepted flows not yet departed.
    active_flows: HashMap<FlowId, Flow>,
}

impl ControlPlane {
    pub fn new(
        vt: VirtualTopology,
        mut rsa: Box<dyn Rsa>,
        traffic: &TrafficDto,
        statistics: SharedStatisticsSink,
        tracer: SharedTraceSink,
    ) -> Result<Self> {
        rsa.simulation_interface(vt.physical_topology(), traffic)?;
        log::info!("Control plane ready with RSA module {}.", rsa.name());

        Ok(Self { vt, rsa, ledger: FlowLedger::new(statistics, tracer), active_flows: HashMap::new() })
    }

    /// Notifies the sinks about `event` and handles it.
    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        self.ledger.tracer.borrow_mut().add_event(&event)?;
        self.ledger.statistics.borrow_mut().add_event(&event)?;

        match event.kind {
            EventKind::Arrival(flow) => self.flow_arrival(flow),
            EventKind::Departure(flow_id) => self.flow_departure(flow_id),
        }
    }

    /// Lets the RSA strategy decide on `flow`.
    ///
    /// # Returns
    /// `Err(FlowContractViolation)` if the flow id was already seen or the strategy
    /// returned without accepting or blocking the flow.
    pub fn flow_arrival(&mut self, mut flow: Flow) -> Result<()> {
        let flow_id = flow.get_id();
        if let Some(state) = self.ledger.get_state(flow_id) {
            return Err(Error::FlowContractViolation { flow_id, reason: format!("arrived again while {:?}", state) });
        }
        self.ledger.states.insert(flow_id, FlowState::Pending);

        self.rsa.flow_arrival(&mut flow, &mut self.vt, &mut self.ledger)?;

        match self.ledger.get_state(flow_id) {
            Some(FlowState::Accepted) => {
                self.active_flows.insert(flow_id, flow);
            }
            Some(FlowState::Blocked) => {}
            state => {
                return Err(Error::FlowContractViolation {
                    flow_id,
                    reason: format!("RSA module {} returned in state {:?} without a decision", self.rsa.name(), state),
                });
            }
        }

        let fragmentation = self.vt.physical_topology().fragmentation_index();
        self.ledger.statistics.borrow_mut().sample_fragmentation(fragmentation)?;

        Ok(())
    }

    /// Releases the resources of a departing flow. Departures of blocked flows are
    /// ignored.
    ///
    /// # Returns
    /// `Err(FlowContractViolation)` if the flow never arrived, is still pending or
    /// already departed.
    pub fn flow_departure(&mut self, flow_id: FlowId) -> Result<()> {
        match self.ledger.get_state(flow_id) {
            Some(FlowState::Accepted) => {
                let mut flow = self.active_flows.remove(&flow_id).ok_or_else(|| Error::FlowContractViolation {
                    flow_id,
                    reason: "accepted flow is missing from the active flows".to_string(),
                })?;
                self.rsa.flow_departure(&mut flow, &mut self.vt)?;
                self.ledger.states.insert(flow_id, FlowState::Released);
                Ok(())
            }
            Some(FlowState::Blocked) => Ok(()),
            state => Err(Error::FlowContractViolation { flow_id, reason: format!("departed while {:?}", state) }),
        }
    }

    pub fn get_flow_state(&self, flow_id: FlowId) -> Option<FlowState> {
        self.ledger.get_state(flow_id)
    }

    pub fn get_active_flow(&self, flow_id: FlowId) -> Option<&Flow> {
        self.active_flows.get(&flow_id)
    }

    pub fn get_num_active_flows(&self) -> usize {
        self.active_flows.len()
    }

    pub fn virtual_topology(&self) -> &VirtualTopology {
        &self.vt
    }
}
