mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use flexgrid_sim::api::simulation_dto::TrafficDto;
use flexgrid_sim::domain::flow::Flow;
use flexgrid_sim::domain::network::physical_topology::PhysicalTopology;
use flexgrid_sim::domain::rsa::fipp::Fipp;
use flexgrid_sim::domain::rsa::rsa_trait::{ControlPlaneForRsa, Rsa};
use flexgrid_sim::domain::simulator::control_plane::{ControlPlane, FlowState};
use flexgrid_sim::domain::simulator::event::Event;
use flexgrid_sim::domain::statistics::statistics::SimulationStatistics;
use flexgrid_sim::domain::statistics::tracer::Tracer;
use flexgrid_sim::domain::utils::id::FlowId;
use flexgrid_sim::domain::virtual_topology::virtual_topology::VirtualTopology;
use flexgrid_sim::error::{Error, Result};

/// What a [`ScriptedRsa`] does on arrival.
#[derive(Debug, Clone, Copy)]
enum Script {
    Nothing,
    Block,
    BlockTwice,
}

#[derive(Debug)]
struct ScriptedRsa {
    script: Script,
}

impl Rsa for ScriptedRsa {
    fn simulation_interface(&mut self, _pt: &PhysicalTopology, _traffic: &TrafficDto) -> Result<()> {
        Ok(())
    }

    fn flow_arrival(&mut self, flow: &mut Flow, _vt: &mut VirtualTopology, cp: &mut dyn ControlPlaneForRsa) -> Result<()> {
        match self.script {
            Script::Nothing => Ok(()),
            Script::Block => cp.block_flow(flow),
            Script::BlockTwice => {
                cp.block_flow(flow)?;
                cp.block_flow(flow)
            }
        }
    }

    fn name(&self) -> &'static str {
        "Scripted"
    }
}

fn control_plane(rsa: Box<dyn Rsa>) -> (ControlPlane, Rc<RefCell<SimulationStatistics>>) {
    let tracer = Tracer::disabled().shared();
    let statistics = Rc::new(RefCell::new(SimulationStatistics::new()));
    let vt = VirtualTopology::new(PhysicalTopology::try_from(&ring_dto()).unwrap(), tracer.clone());
    let cp = ControlPlane::new(vt, rsa, &traffic_dto(), statistics.clone(), tracer).unwrap();
    (cp, statistics)
}

#[test]
fn test_accept_and_release() {
    // Setup
    let (mut cp, statistics) = control_plane(Box::new(Fipp::new(5)));

    // Execution
    cp.handle_event(Event::arrival(0.0, flow(0, 0, 2, 2))).unwrap();
    assert_eq!(cp.get_flow_state(FlowId::new(0)), Some(FlowState::Accepted));
    assert_eq!(cp.get_num_active_flows(), 1);
    assert_eq!(cp.virtual_topology().get_num_light_paths(), 1);

    cp.handle_event(Event::departure(1.0, FlowId::new(0))).unwrap();

    // Verification
    assert_eq!(cp.get_flow_state(FlowId::new(0)), Some(FlowState::Released));
    assert_eq!(cp.virtual_topology().get_num_light_paths(), 0);
    assert_eq!(cp.virtual_topology().get_num_p_cycles(), 0);

    let summary = statistics.borrow().summary(1, 10.0);
    assert_eq!(summary.arrivals, 1);
    assert_eq!(summary.departures, 1);
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.blocked, 0);
}

#[test]
fn test_blocked_departure_is_a_no_op() {
    let (mut cp, statistics) = control_plane(Box::new(ScriptedRsa { script: Script::Block }));

    cp.handle_event(Event::arrival(0.0, flow(0, 0, 1, 1))).unwrap();
    cp.handle_event(Event::departure(1.0, FlowId::new(0))).unwrap();

    assert_eq!(cp.get_flow_state(FlowId::new(0)), Some(FlowState::Blocked));
    assert_eq!(statistics.borrow().get_blocked(), 1);
    assert_eq!(statistics.borrow().get_departures(), 1);
}

#[test]
fn test_strategy_must_decide() {
    let (mut cp, _) = control_plane(Box::new(ScriptedRsa { script: Script::Nothing }));

    let result = cp.flow_arrival(flow(0, 0, 1, 1));

    assert!(matches!(result, Err(Error::FlowContractViolation { .. })));
}

#[test]
fn test_flow_cannot_be_decided_twice() {
    let (mut cp, statistics) = control_plane(Box::new(ScriptedRsa { script: Script::BlockTwice }));

    let result = cp.flow_arrival(flow(0, 0, 1, 1));

    assert!(matches!(result, Err(Error::FlowContractViolation { .. })));
    assert_eq!(statistics.borrow().get_blocked(), 1);
}

#[test]
fn test_departure_before_acceptance_is_rejected() {
    let (mut cp, _) = control_plane(Box::new(Fipp::new(5)));

    assert!(matches!(cp.flow_departure(FlowId::new(3)), Err(Error::FlowContractViolation { .. })));

    cp.flow_arrival(flow(3, 0, 2, 1)).unwrap();
    cp.flow_departure(FlowId::new(3)).unwrap();
    assert!(matches!(cp.flow_departure(FlowId::new(3)), Err(Error::FlowContractViolation { .. })));
}

#[test]
fn test_duplicate_arrival_is_rejected() {
    let (mut cp, _) = control_plane(Box::new(Fipp::new(5)));

    cp.flow_arrival(flow(0, 0, 2, 1)).unwrap();

    assert!(matches!(cp.flow_arrival(flow(0, 1, 3, 1)), Err(Error::FlowContractViolation { .. })));
}
