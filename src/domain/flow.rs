use std::fmt;

use crate::domain::network::slot::Slot;
use crate::domain::utils::id::{FlowId, LightPathId, LinkId, NodeId};
use crate::error::{Error, Result};

/// A traffic demand between two nodes.
///
/// Created by the traffic generator, filled in by the RSA strategy that accepts it
/// (links, slots and the lightpaths carrying it) and dropped after its departure.
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    id: FlowId,
    source: NodeId,
    destination: NodeId,

    /// Requested bandwidth, same unit as the slot capacity of the topology.
    rate: f64,

    /// Holding time of the flow once accepted.
    duration: f64,

    links: Vec<LinkId>,
    slot_list: Vec<Slot>,
    light_paths: Vec<LightPathId>,
}

impl Flow {
    pub fn new(id: FlowId, source: NodeId, destination: NodeId, rate: f64, duration: f64) -> Result<Self> {
        if source == destination {
            return Err(Error::InvalidArgument(format!("Flow {} starts and ends at node {}", id, source)));
        }
        if !(rate > 0.0) {
            return Err(Error::InvalidArgument(format!("Flow {} requests a non-positive rate {}", id, rate)));
        }
        if !(duration >= 0.0) {
            return Err(Error::InvalidArgument(format!("Flow {} has a negative duration {}", id, duration)));
        }

        Ok(Self { id, source, destination, rate, duration, links: Vec::new(), slot_list: Vec::new(), light_paths: Vec::new() })
    }

    pub fn get_id(&self) -> FlowId {
        self.id
    }

    pub fn get_source(&self) -> NodeId {
        self.source
    }

    pub fn get_destination(&self) -> NodeId {
        self.destination
    }

    pub fn get_rate(&self) -> f64 {
        self.rate
    }

    pub fn get_duration(&self) -> f64 {
        self.duration
    }

    pub fn get_links(&self) -> &[LinkId] {
        &self.links
    }

    pub fn set_links(&mut self, links: Vec<LinkId>) {
        self.links = links;
    }

    pub fn get_slot_list(&self) -> &[Slot] {
        &self.slot_list
    }

    pub fn set_slot_list(&mut self, slot_list: Vec<Slot>) {
        self.slot_list = slot_list;
    }

    /// Lightpaths established for this flow; the first one carries the working traffic.
    pub fn get_light_paths(&self) -> &[LightPathId] {
        &self.light_paths
    }

    pub fn add_light_path(&mut self, id: LightPathId) {
        self.light_paths.push(id);
    }

    pub fn take_light_paths(&mut self) -> Vec<LightPathId> {
        std::mem::take(&mut self.light_paths)
    }

    /// Number of slots needed to carry the rate, always rounded up.
    pub fn demand_in_slots(&self, slot_capacity: f64) -> usize {
        (self.rate / slot_capacity).ceil() as usize
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {} {}", self.id, self.source, self.destination, self.rate, self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demand_is_rounded_up() {
        let flow = Flow::new(FlowId::new(0), NodeId::new(0), NodeId::new(1), 26.0, 1.0).unwrap();
        assert_eq!(flow.demand_in_slots(12.5), 3);

        let exact = Flow::new(FlowId::new(1), NodeId::new(0), NodeId::new(1), 25.0, 1.0).unwrap();
        assert_eq!(exact.demand_in_slots(12.5), 2);
    }

    #[test]
    fn test_rejects_invalid_flows() {
        assert!(Flow::new(FlowId::new(0), NodeId::new(1), NodeId::new(1), 10.0, 1.0).is_err());
        assert!(Flow::new(FlowId::new(0), NodeId::new(0), NodeId::new(1), 0.0, 1.0).is_err());
        assert!(Flow::new(FlowId::new(0), NodeId::new(0), NodeId::new(1), 10.0, -1.0).is_err());
    }
}
