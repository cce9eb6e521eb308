use std::fmt;

use crate::domain::network::slot::Slot;
use crate::domain::utils::id::{LightPathId, LinkId, NodeId};
use crate::domain::virtual_topology::p_cycle::PCycleId;
use crate::error::{Error, Result};

/// An established optical connection: an ordered list of links with the same slot
/// set reserved on each of them.
#[derive(Debug, Clone, PartialEq)]
pub struct LightPath {
    id: LightPathId,
    source: NodeId,
    destination: NodeId,
    links: Vec<LinkId>,
    slot_list: Vec<Slot>,
    modulation_level: usize,

    /// P-cycle protecting this lightpath, if any.
    p_cycle: Option<PCycleId>,
}

impl LightPath {
    pub fn new(
        id: LightPathId,
        source: NodeId,
        destination: NodeId,
        links: Vec<LinkId>,
        slot_list: Vec<Slot>,
        modulation_level: usize,
        p_cycle: Option<PCycleId>,
    ) -> Result<Self> {
        if links.is_empty() {
            return Err(Error::InvalidArgument(format!("LightPath {} needs at least one link", id)));
        }

        Ok(Self { id, source, destination, links, slot_list, modulation_level, p_cycle })
    }

    pub fn get_id(&self) -> LightPathId {
        self.id
    }

    pub fn get_source(&self) -> NodeId {
        self.source
    }

    pub fn get_destination(&self) -> NodeId {
        self.destination
    }

    pub fn get_links(&self) -> &[LinkId] {
        &self.links
    }

    pub fn get_slot_list(&self) -> &[Slot] {
        &self.slot_list
    }

    pub fn get_modulation_level(&self) -> usize {
        self.modulation_level
    }

    pub fn get_hops(&self) -> usize {
        self.links.len()
    }

    pub fn get_p_cycle(&self) -> Option<PCycleId> {
        self.p_cycle
    }

    pub(crate) fn set_p_cycle(&mut self, p_cycle: Option<PCycleId>) {
        self.p_cycle = p_cycle;
    }

    /// Compact form used in trace files: `<id> <src> <dst> l1-l2-...-`.
    pub fn to_trace(&self) -> String {
        let links: String = self.links.iter().map(|link| format!("{}-", link)).collect();
        format!("{} {} {} {}", self.id, self.source, self.destination, links)
    }
}

impl fmt::Display for LightPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LightPath {} ({} -> {}) over {} link(s) using ", self.id, self.source, self.destination, self.links.len())?;
        for slot in &self.slot_list {
            write!(f, "{}", slot)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_link_list_is_rejected() {
        let result = LightPath::new(LightPathId::new(0), NodeId::new(0), NodeId::new(1), Vec::new(), vec![Slot::new(0, 0)], 0, None);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_hops_and_trace() {
        let lp = LightPath::new(LightPathId::new(7), NodeId::new(3), NodeId::new(1), vec![LinkId::new(4)], vec![Slot::new(0, 2)], 1, None).unwrap();
        assert_eq!(lp.get_hops(), 1);
        assert_eq!(lp.to_trace(), "7 3 1 4-");
    }
}
