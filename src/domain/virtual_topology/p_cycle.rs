use slotmap::new_key_type;
use std::collections::BTreeSet;

use crate::domain::network::slot::Slot;
use crate::domain::utils::id::{LightPathId, LinkId, NodeId};
use crate::error::{Error, Result};

new_key_type! {
    /// Opaque handle of a p-cycle registered in a virtual topology.
    pub struct PCycleId;
}

/// A lightpath protected by a p-cycle together with the links it occupies.
#[derive(Debug, Clone, PartialEq)]
struct ProtectedLightPath {
    id: LightPathId,
    links: BTreeSet<LinkId>,
}

/// A pre-configured protection cycle.
///
/// The cycle holds one flow's worth of shared slots on every cycle edge. All
/// lightpaths it protects draw from that single pool after a failure, so they
/// must be pairwise link-disjoint: a single link failure may then hit at most one
/// of them.
#[derive(Debug, Clone)]
pub struct PCycle {
    cycle_links: Vec<(NodeId, NodeId)>,
    nodes: BTreeSet<NodeId>,

    /// Shared slots held on every cycle edge (sharing grid).
    slot_list: Vec<Slot>,

    /// Capacity of the shared pool in slots.
    reserved_slots: usize,

    protected_light_paths: Vec<ProtectedLightPath>,
}

impl PCycle {
    pub fn new(cycle_links: Vec<(NodeId, NodeId)>, slot_list: Vec<Slot>) -> Result<Self> {
        if cycle_links.is_empty() {
            return Err(Error::InvalidArgument("A p-cycle needs at least one edge".to_string()));
        }

        let nodes = cycle_links.iter().flat_map(|(source, destination)| [*source, *destination]).collect();
        let reserved_slots = slot_list.len();

        Ok(Self { cycle_links, nodes, slot_list, reserved_slots, protected_light_paths: Vec::new() })
    }

    pub fn get_cycle_links(&self) -> &[(NodeId, NodeId)] {
        &self.cycle_links
    }

    pub fn get_slot_list(&self) -> &[Slot] {
        &self.slot_list
    }

    pub fn get_reserved_slots(&self) -> usize {
        self.reserved_slots
    }

    /// True iff both endpoints are nodes of the cycle. Says nothing about capacity.
    pub fn p_cycle_contains_flow(&self, source: NodeId, destination: NodeId) -> bool {
        self.nodes.contains(&source) && self.nodes.contains(&destination)
    }

    /// True iff at least one edge of the path is an edge of the cycle.
    pub fn can_protect(&self, path_edges: &[(NodeId, NodeId)]) -> bool {
        path_edges.iter().any(|edge| self.cycle_links.contains(edge))
    }

    /// True iff `new_links` shares no link with any lightpath already protected.
    pub fn can_add_links_disjoint(&self, new_links: &[LinkId]) -> bool {
        self.protected_light_paths.iter().all(|protected| new_links.iter().all(|link| !protected.links.contains(link)))
    }

    /// Places a lightpath under the protection of this cycle.
    ///
    /// # Returns
    /// `false` if the lightpath is already protected here or overlaps a protected
    /// lightpath; the cycle is left unchanged in that case.
    pub fn add_protected_lightpath(&mut self, id: LightPathId, links: &[LinkId]) -> bool {
        if self.protects(id) || !self.can_add_links_disjoint(links) {
            return false;
        }

        self.protected_light_paths.push(ProtectedLightPath { id, links: links.iter().copied().collect() });
        true
    }

    /// Removes a lightpath by id. Returns whether it was protected here.
    pub fn remove_protected_lightpath(&mut self, id: LightPathId) -> bool {
        let before = self.protected_light_paths.len();
        self.protected_light_paths.retain(|protected| protected.id != id);
        before != self.protected_light_paths.len()
    }

    pub fn protects(&self, id: LightPathId) -> bool {
        self.protected_light_paths.iter().any(|protected| protected.id == id)
    }

    pub fn has_sufficient_slots(&self, required: usize) -> bool {
        self.reserved_slots >= required
    }

    /// Ids of every protected lightpath, in protection order.
    pub fn get_all_lp(&self) -> Vec<LightPathId> {
        self.protected_light_paths.iter().map(|protected| protected.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.protected_light_paths.is_empty()
    }
}
