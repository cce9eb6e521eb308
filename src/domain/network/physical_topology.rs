use bimap::BiMap;
use std::collections::BTreeMap;

use crate::api::simulation_dto::PhysicalTopologyDto;
use crate::domain::network::connected_component::ConnectedComponent;
use crate::domain::network::graph::WeightedGraph;
use crate::domain::network::slot::Slot;
use crate::domain::network::spectrum::SpectrumGrid;
use crate::domain::utils::id::{LinkId, NodeId};
use crate::error::{Error, Result};

/// A directed fiber between two nodes.
#[derive(Debug, Clone)]
pub struct PhysicalLink {
    pub id: LinkId,
    pub source: NodeId,
    pub destination: NodeId,
    pub weight: f64,

    /// Working spectrum, one row per core.
    pub spectrum: SpectrumGrid,

    /// Spectrum set aside for shared protection (p-cycles).
    pub sharing_spectrum: SpectrumGrid,
}

/// Models the physical layer of the elastic optical network.
///
/// The `PhysicalTopology` owns:
/// * **Links**: directed multi-core fibers with a working and a sharing spectrum grid.
/// * **Addressing**: a bidirectional map between link ids and `(source, destination)` pairs.
/// * **Routing views**: a weighted graph (configured link weights) and a hop-count graph.
#[derive(Debug, Clone)]
pub struct PhysicalTopology {
    num_nodes: usize,
    cores: usize,
    slots: usize,

    /// Bandwidth carried by one slot, in the same unit as the flow rates.
    slot_capacity: f64,

    links: BTreeMap<LinkId, PhysicalLink>,
    link_index: BiMap<LinkId, (NodeId, NodeId)>,
    weighted_graph: WeightedGraph,
    graph: WeightedGraph,
}

impl TryFrom<&PhysicalTopologyDto> for PhysicalTopology {
    type Error = Error;

    fn try_from(dto: &PhysicalTopologyDto) -> Result<Self> {
        let mut topology = PhysicalTopology::new(dto.nodes, dto.cores, dto.slots, dto.slot_capacity)?;

        for link in dto.links.iter() {
            let source = NodeId::new(link.source);
            let destination = NodeId::new(link.destination);

            topology.add_link(source, destination, link.weight)?;
            if link.bidirectional && topology.get_link_id(destination, source).is_none() {
                topology.add_link(destination, source, link.weight)?;
            }
        }

        if topology.links.is_empty() {
            log::warn!("EmptyPhysicalTopology: the configured topology has no links, every flow will be blocked.");
        }

        Ok(topology)
    }
}

impl PhysicalTopology {
    pub fn new(num_nodes: usize, cores: usize, slots: usize, slot_capacity: f64) -> Result<Self> {
        if cores == 0 || slots == 0 {
            return Err(Error::ConfigurationError(format!("A link needs at least one core and one slot, got {} cores and {} slots", cores, slots)));
        }
        if !(slot_capacity > 0.0) {
            return Err(Error::ConfigurationError(format!("Slot capacity must be positive, got {}", slot_capacity)));
        }

        let mut weighted_graph = WeightedGraph::new();
        let mut graph = WeightedGraph::new();
        for node in 0..num_nodes {
            weighted_graph.add_node(NodeId::new(node));
            graph.add_node(NodeId::new(node));
        }

        Ok(Self {
            num_nodes,
            cores,
            slots,
            slot_capacity,
            links: BTreeMap::new(),
            link_index: BiMap::new(),
            weighted_graph,
            graph,
        })
    }

    /// Adds a directed link and returns its id. Link ids are assigned in insertion order.
    pub fn add_link(&mut self, source: NodeId, destination: NodeId, weight: f64) -> Result<LinkId> {
        if source.index() >= self.num_nodes || destination.index() >= self.num_nodes {
            return Err(Error::ConfigurationError(format!(
                "Link {} -> {} references a node outside of 0..{}",
                source, destination, self.num_nodes
            )));
        }
        if source == destination {
            return Err(Error::ConfigurationError(format!("Link {} -> {} is a self loop", source, destination)));
        }
        if !(weight >= 0.0) {
            return Err(Error::ConfigurationError(format!("Link {} -> {} has negative weight {}", source, destination, weight)));
        }
        if self.link_index.contains_right(&(source, destination)) {
            return Err(Error::ConfigurationError(format!("Link {} -> {} is defined twice", source, destination)));
        }

        let id = LinkId::new(self.links.len());
        self.links.insert(
            id,
            PhysicalLink {
                id,
                source,
                destination,
                weight,
                spectrum: SpectrumGrid::all_free(self.cores, self.slots),
                sharing_spectrum: SpectrumGrid::all_free(self.cores, self.slots),
            },
        );
        self.link_index.insert(id, (source, destination));
        self.weighted_graph.add_edge(source, destination, weight);
        self.graph.add_edge(source, destination, 1.0);

        Ok(id)
    }

    pub fn get_num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn get_num_links(&self) -> usize {
        self.links.len()
    }

    pub fn get_num_slots(&self) -> usize {
        self.slots
    }

    pub fn get_cores(&self) -> usize {
        self.cores
    }

    pub fn get_slot_capacity(&self) -> f64 {
        self.slot_capacity
    }

    pub fn get_link_id(&self, source: NodeId, destination: NodeId) -> Option<LinkId> {
        self.link_index.get_by_right(&(source, destination)).copied()
    }

    pub fn get_src_link(&self, link: LinkId) -> Option<NodeId> {
        self.link_index.get_by_left(&link).map(|(source, _)| *source)
    }

    pub fn get_dst_link(&self, link: LinkId) -> Option<NodeId> {
        self.link_index.get_by_left(&link).map(|(_, destination)| *destination)
    }

    /// Graph weighted with the configured link weights.
    pub fn get_weighted_graph(&self) -> &WeightedGraph {
        &self.weighted_graph
    }

    /// Same links as [`PhysicalTopology::get_weighted_graph`], every edge weighted 1 (hop count).
    pub fn get_graph(&self) -> &WeightedGraph {
        &self.graph
    }

    pub fn get_spectrum(&self, source: NodeId, destination: NodeId) -> Result<&SpectrumGrid> {
        Ok(&self.link_between(source, destination)?.spectrum)
    }

    pub fn get_sharing_spectrum(&self, source: NodeId, destination: NodeId) -> Result<&SpectrumGrid> {
        Ok(&self.link_between(source, destination)?.sharing_spectrum)
    }

    pub fn are_slots_available(&self, source: NodeId, destination: NodeId, slot_list: &[Slot]) -> Result<bool> {
        Ok(self.get_spectrum(source, destination)?.are_free(slot_list))
    }

    pub fn reserve_slots(&mut self, source: NodeId, destination: NodeId, slot_list: &[Slot]) -> Result<()> {
        self.link_between_mut(source, destination)?.spectrum.reserve(slot_list)
    }

    pub fn release_slots(&mut self, source: NodeId, destination: NodeId, slot_list: &[Slot]) -> Result<()> {
        self.link_between_mut(source, destination)?.spectrum.release(slot_list)
    }

    pub fn reserve_sharing_slots(&mut self, source: NodeId, destination: NodeId, slot_list: &[Slot]) -> Result<()> {
        self.link_between_mut(source, destination)?.sharing_spectrum.reserve(slot_list)
    }

    pub fn release_sharing_slots(&mut self, source: NodeId, destination: NodeId, slot_list: &[Slot]) -> Result<()> {
        self.link_between_mut(source, destination)?.sharing_spectrum.release(slot_list)
    }

    /// Mean external fragmentation of the working spectrum over all links.
    pub fn fragmentation_index(&self) -> f64 {
        if self.links.is_empty() {
            return 0.0;
        }
        let cc = ConnectedComponent::new();
        let sum: f64 = self.links.values().map(|link| cc.fragmentation_index(&link.spectrum)).sum();

        sum / self.links.len() as f64
    }

    fn link_between(&self, source: NodeId, destination: NodeId) -> Result<&PhysicalLink> {
        self.get_link_id(source, destination)
            .and_then(|id| self.links.get(&id))
            .ok_or_else(|| Error::InvalidArgument(format!("There is no link {} -> {}", source, destination)))
    }

    fn link_between_mut(&mut self, source: NodeId, destination: NodeId) -> Result<&mut PhysicalLink> {
        let id = self
            .get_link_id(source, destination)
            .ok_or_else(|| Error::InvalidArgument(format!("There is no link {} -> {}", source, destination)))?;

        self.links.get_mut(&id).ok_or_else(|| Error::InvalidArgument(format!("Link {} is not registered", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::simulation_dto::LinkDto;

    fn dto() -> PhysicalTopologyDto {
        PhysicalTopologyDto {
            nodes: 3,
            cores: 2,
            slots: 8,
            slot_capacity: 12.5,
            links: vec![
                LinkDto { source: 0, destination: 1, weight: 1.0, bidirectional: true },
                LinkDto { source: 1, destination: 2, weight: 2.0, bidirectional: false },
            ],
        }
    }

    #[test]
    fn test_from_dto_adds_reverse_links() {
        let pt = PhysicalTopology::try_from(&dto()).unwrap();

        assert_eq!(pt.get_num_links(), 3);
        let id = pt.get_link_id(NodeId::new(1), NodeId::new(0)).unwrap();
        assert_eq!(pt.get_src_link(id), Some(NodeId::new(1)));
        assert_eq!(pt.get_dst_link(id), Some(NodeId::new(0)));
        assert!(pt.get_link_id(NodeId::new(2), NodeId::new(1)).is_none());
        assert_eq!(pt.get_weighted_graph().edge_weight(NodeId::new(1), NodeId::new(2)), Some(2.0));
        assert_eq!(pt.get_graph().edge_weight(NodeId::new(1), NodeId::new(2)), Some(1.0));
    }

    #[test]
    fn test_rejects_unknown_nodes() {
        let mut bad = dto();
        bad.links.push(LinkDto { source: 0, destination: 9, weight: 1.0, bidirectional: true });
        assert!(matches!(PhysicalTopology::try_from(&bad), Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_working_and_sharing_spectrum_are_independent() {
        let mut pt = PhysicalTopology::try_from(&dto()).unwrap();
        let (a, b) = (NodeId::new(0), NodeId::new(1));
        let slots = [Slot::new(1, 3), Slot::new(1, 4)];

        pt.reserve_sharing_slots(a, b, &slots).unwrap();
        assert!(pt.are_slots_available(a, b, &slots).unwrap());
        assert!(!pt.get_sharing_spectrum(a, b).unwrap().are_free(&slots));

        pt.reserve_slots(a, b, &slots).unwrap();
        assert!(!pt.are_slots_available(a, b, &slots).unwrap());

        pt.release_slots(a, b, &slots).unwrap();
        pt.release_sharing_slots(a, b, &slots).unwrap();
        assert_eq!(pt.get_spectrum(a, b).unwrap(), &SpectrumGrid::all_free(2, 8));
        assert_eq!(pt.get_sharing_spectrum(a, b).unwrap(), &SpectrumGrid::all_free(2, 8));
    }

    #[test]
    fn test_missing_link_is_invalid_argument() {
        let pt = PhysicalTopology::try_from(&dto()).unwrap();
        assert!(matches!(pt.get_spectrum(NodeId::new(0), NodeId::new(2)), Err(Error::InvalidArgument(_))));
    }
}
