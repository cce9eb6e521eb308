use crate::api::simulation_dto::TrafficDto;
use crate::domain::flow::Flow;
use crate::domain::network::connected_component::ConnectedComponent;
use crate::domain::network::graph::{Path, WeightedGraph};
use crate::domain::network::physical_topology::PhysicalTopology;
use crate::domain::network::slot::Slot;
use crate::domain::rsa::rsa_trait::{ControlPlaneForRsa, Rsa, accept_on_primary, establish_light_path};
use crate::domain::rsa::spectrum_assignment::{FitPolicy, SpectrumPlane, image_along, path_links, path_regions};
use crate::domain::utils::id::{LinkId, NodeId};
use crate::domain::virtual_topology::p_cycle::{PCycle, PCycleId};
use crate::domain::virtual_topology::virtual_topology::VirtualTopology;
use crate::error::Result;

/// Failure Independent Path Protecting p-cycles.
///
/// The primary path is the first of the k shortest paths with a fitting region
/// (first-fit). Protection comes from an existing p-cycle when one covers both
/// endpoints, stays link-disjoint and holds enough shared slots. Otherwise a new
/// p-cycle is built from the primary and a backup path found in the residual graph.
#[derive(Debug)]
pub struct Fipp {
    k_paths: usize,
    graph: WeightedGraph,
}

impl Fipp {
    pub fn new(k_paths: usize) -> Self {
        Self { k_paths, graph: WeightedGraph::new() }
    }

    /// First candidate with a fitting region in its working spectrum.
    fn find_working_path(&self, pt: &PhysicalTopology, flow: &Flow, demand: usize) -> Result<Option<(Path, Vec<Slot>)>> {
        for path in self.graph.k_shortest_paths(flow.get_source(), flow.get_destination(), self.k_paths) {
            let regions = path_regions(pt, &path, SpectrumPlane::Working)?;
            if let Some(slot_list) = FitPolicy::FirstFit.select(&regions, demand) {
                return Ok(Some((path, slot_list)));
            }
        }
        Ok(None)
    }

    fn find_reusable_p_cycle(vt: &VirtualTopology, flow: &Flow, links: &[LinkId], demand: usize) -> Option<PCycleId> {
        vt.get_p_cycles()
            .find(|(_, cycle)| {
                cycle.p_cycle_contains_flow(flow.get_source(), flow.get_destination())
                    && cycle.can_add_links_disjoint(links)
                    && cycle.has_sufficient_slots(demand)
            })
            .map(|(id, _)| id)
    }

    /// Hop-count graph without the primary's links (both directions) and without
    /// any link touching an intermediate node of the primary.
    fn residual_graph(pt: &PhysicalTopology, primary: &Path) -> WeightedGraph {
        let mut residual = pt.get_graph().clone();

        for (source, destination) in primary.edges() {
            residual.remove_edge(source, destination);
            residual.remove_edge(destination, source);
        }

        if primary.nodes.len() > 2 {
            for node in &primary.nodes[1..primary.nodes.len() - 1] {
                residual.remove_incident_edges(*node);
            }
        }

        residual
    }

    /// Edges of the cycle formed by the primary and a backup path, without duplicates.
    fn cycle_edges(primary: &Path, backup: &Path) -> Vec<(NodeId, NodeId)> {
        let mut edges: Vec<(NodeId, NodeId)> = Vec::new();
        for edge in primary.edges().chain(backup.edges()) {
            if !edges.contains(&edge) {
                edges.push(edge);
            }
        }
        edges
    }

    /// Builds and registers a new p-cycle over `primary` and one of the backups.
    ///
    /// # Returns
    /// The id of the registered cycle, or `None` if no backup leaves enough shared
    /// spectrum on the union of both paths.
    fn create_p_cycle(&self, vt: &mut VirtualTopology, flow: &Flow, primary: &Path, demand: usize) -> Result<Option<PCycleId>> {
        let residual = Self::residual_graph(vt.physical_topology(), primary);
        if !residual.has_path(flow.get_source(), flow.get_destination()) {
            log::debug!("NoBackupPath: flow {} has no path disjoint from its primary.", flow.get_id());
            return Ok(None);
        }

        for backup in residual.k_shortest_paths(flow.get_source(), flow.get_destination(), self.k_paths) {
            let edges = Self::cycle_edges(primary, &backup);
            let image = image_along(vt.physical_topology(), edges.iter().copied(), SpectrumPlane::Sharing)?;
            let regions = ConnectedComponent::new().list_of_regions(&image);

            let Some(shared_slots) = FitPolicy::FirstFit.select(&regions, demand) else {
                continue;
            };

            if let Some(id) = vt.add_p_cycle(PCycle::new(edges, shared_slots)?)? {
                return Ok(Some(id));
            }
        }

        Ok(None)
    }
}

impl Rsa for Fipp {
    fn simulation_interface(&mut self, pt: &PhysicalTopology, traffic: &TrafficDto) -> Result<()> {
        self.graph = pt.get_weighted_graph().clone();
        log::debug!("FIPP ready: {} links, k = {}, {} call type(s).", pt.get_num_links(), self.k_paths, traffic.call_types.len());
        Ok(())
    }

    fn flow_arrival(&mut self, flow: &mut Flow, vt: &mut VirtualTopology, cp: &mut dyn ControlPlaneForRsa) -> Result<()> {
        let demand = flow.demand_in_slots(vt.physical_topology().get_slot_capacity());

        let Some((primary, slot_list)) = self.find_working_path(vt.physical_topology(), flow, demand)? else {
            log::debug!("Blocked: flow {} has no working path for {} slot(s).", flow.get_id(), demand);
            return cp.block_flow(flow);
        };
        let links = path_links(vt.physical_topology(), &primary)?;

        if let Some(p_cycle) = Self::find_reusable_p_cycle(vt, flow, &links, demand) {
            if establish_light_path(flow, vt, &links, &slot_list, Some(p_cycle))?.is_some() {
                log::debug!("Accepted: flow {} protected by existing p-cycle {:?}.", flow.get_id(), p_cycle);
                return accept_on_primary(flow, vt, cp);
            }
        } else if let Some(p_cycle) = self.create_p_cycle(vt, flow, &primary, demand)? {
            if establish_light_path(flow, vt, &links, &slot_list, Some(p_cycle))?.is_some() {
                log::debug!("Accepted: flow {} protected by new p-cycle {:?}.", flow.get_id(), p_cycle);
                return accept_on_primary(flow, vt, cp);
            }
            vt.remove_p_cycle(p_cycle)?;
        }

        log::debug!("Blocked: flow {} cannot be protected.", flow.get_id());
        cp.block_flow(flow)
    }

    fn name(&self) -> &'static str {
        "FIPP"
    }
}
