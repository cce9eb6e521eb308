#![allow(dead_code)]

use flexgrid_sim::api::simulation_dto::{CallTypeDto, LinkDto, PhysicalTopologyDto, TrafficDto};
use flexgrid_sim::domain::flow::Flow;
use flexgrid_sim::domain::network::physical_topology::PhysicalTopology;
use flexgrid_sim::domain::network::slot::Slot;
use flexgrid_sim::domain::rsa::rsa_trait::ControlPlaneForRsa;
use flexgrid_sim::domain::statistics::tracer::Tracer;
use flexgrid_sim::domain::utils::id::{FlowId, LightPathId, LinkId, NodeId};
use flexgrid_sim::domain::virtual_topology::light_path::LightPath;
use flexgrid_sim::domain::virtual_topology::virtual_topology::VirtualTopology;
use flexgrid_sim::error::Result;

pub const SLOT_CAPACITY: f64 = 12.5;
pub const SLOTS: usize = 8;

pub fn n(id: usize) -> NodeId {
    NodeId::new(id)
}

/// Ring 0-1-2-3-0, one core with eight slots, bidirectional links.
/// The path 0-1-2 weighs 2, the path 0-3-2 weighs 4.
pub fn ring_dto() -> PhysicalTopologyDto {
    PhysicalTopologyDto {
        nodes: 4,
        cores: 1,
        slots: SLOTS,
        slot_capacity: SLOT_CAPACITY,
        links: vec![
            LinkDto { source: 0, destination: 1, weight: 1.0, bidirectional: true },
            LinkDto { source: 1, destination: 2, weight: 1.0, bidirectional: true },
            LinkDto { source: 2, destination: 3, weight: 2.0, bidirectional: true },
            LinkDto { source: 3, destination: 0, weight: 2.0, bidirectional: true },
        ],
    }
}

pub fn ring_vt() -> VirtualTopology {
    let pt = PhysicalTopology::try_from(&ring_dto()).unwrap();
    VirtualTopology::new(pt, Tracer::disabled().shared())
}

pub fn link(vt: &VirtualTopology, source: usize, destination: usize) -> LinkId {
    vt.physical_topology().get_link_id(n(source), n(destination)).unwrap()
}

/// Occupies `slots` of core 0 on the link `source -> destination` with a lightpath.
pub fn occupy(vt: &mut VirtualTopology, source: usize, destination: usize, slots: std::ops::Range<usize>) -> LightPathId {
    let link = link(vt, source, destination);
    let slot_list: Vec<Slot> = slots.map(|slot| Slot::new(0, slot)).collect();
    vt.create_light_path(&[link], &slot_list, 0, None).unwrap().unwrap()
}

/// Flow whose rate needs exactly `demand` slots.
pub fn flow(id: usize, source: usize, destination: usize, demand: usize) -> Flow {
    Flow::new(FlowId::new(id), n(source), n(destination), demand as f64 * SLOT_CAPACITY, 1.0).unwrap()
}

/// Records the decisions of an RSA module.
#[derive(Debug, Default)]
pub struct RecordingControlPlane {
    pub accepted: Vec<(FlowId, LightPathId)>,
    pub blocked: Vec<FlowId>,
}

impl RecordingControlPlane {
    pub fn decisions(&self) -> usize {
        self.accepted.len() + self.blocked.len()
    }
}

impl ControlPlaneForRsa for RecordingControlPlane {
    fn accept_flow(&mut self, flow: &Flow, light_path: &LightPath) -> Result<()> {
        self.accepted.push((flow.get_id(), light_path.get_id()));
        Ok(())
    }

    fn block_flow(&mut self, flow: &Flow) -> Result<()> {
        self.blocked.push(flow.get_id());
        Ok(())
    }
}

pub fn traffic_dto() -> TrafficDto {
    TrafficDto { calls: 10, load: 10.0, max_rate: None, call_types: vec![CallTypeDto { rate: 25.0, holding_time: 1.0, weight: 1 }] }
}
