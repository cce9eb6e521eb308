use slotmap::SlotMap;
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::network::physical_topology::PhysicalTopology;
use crate::domain::network::slot::Slot;
use crate::domain::statistics::tracer::SharedTraceSink;
use crate::domain::utils::id::{LightPathId, LinkId, NodeId};
use crate::domain::virtual_topology::light_path::LightPath;
use crate::domain::virtual_topology::p_cycle::{PCycle, PCycleId};
use crate::error::{Error, Result};

/// Logical layer on top of the physical topology.
///
/// The `VirtualTopology` is the only component that reserves or releases spectrum.
/// It owns:
/// * **LightPaths**: established connections, indexed by id and by their
///   `(source, destination)` pair (a multigraph, several lightpaths may join the
///   same pair).
/// * **PCycles**: active protection cycles and their shared reservations.
/// * **Id allocation**: lightpath ids grow monotonically and are never reused.
#[derive(Debug)]
pub struct VirtualTopology {
    pt: PhysicalTopology,
    next_light_path_id: usize,
    light_paths: BTreeMap<LightPathId, LightPath>,
    light_path_graph: BTreeMap<(NodeId, NodeId), Vec<LightPathId>>,
    p_cycles: SlotMap<PCycleId, PCycle>,
    tracer: SharedTraceSink,
}

impl VirtualTopology {
    pub fn new(pt: PhysicalTopology, tracer: SharedTraceSink) -> Self {
        Self {
            pt,
            next_light_path_id: 0,
            light_paths: BTreeMap::new(),
            light_path_graph: BTreeMap::new(),
            p_cycles: SlotMap::with_key(),
            tracer,
        }
    }

    pub fn physical_topology(&self) -> &PhysicalTopology {
        &self.pt
    }

    /// Establishes a lightpath over `links`, reserving `slot_list` on every link.
    ///
    /// With `p_cycle` set, the new lightpath is placed under the protection of that
    /// cycle, which must exist and must stay link-disjoint.
    ///
    /// # Returns
    /// * `Ok(Some(id))` if the lightpath was established.
    /// * `Ok(None)` if the requested slots are not free on every link.
    /// * `Err(InvalidArgument)` for an empty link list, an unknown or repeated link, an
    ///   unknown p-cycle, or a lightpath that would break the disjointness of the p-cycle.
    ///   Nothing is reserved in that case.
    pub fn create_light_path(
        &mut self,
        links: &[LinkId],
        slot_list: &[Slot],
        modulation_level: usize,
        p_cycle: Option<PCycleId>,
    ) -> Result<Option<LightPathId>> {
        if links.is_empty() {
            return Err(Error::InvalidArgument("Cannot create a lightpath without links".to_string()));
        }

        let hops = self.resolve_links(links)?;
        let distinct: BTreeSet<&LinkId> = links.iter().collect();
        if distinct.len() != links.len() {
            return Err(Error::InvalidArgument("A lightpath cannot use the same link twice".to_string()));
        }

        if let Some(p_cycle_id) = p_cycle {
            let cycle = self
                .p_cycles
                .get(p_cycle_id)
                .ok_or_else(|| Error::InvalidArgument(format!("P-cycle {:?} is not registered", p_cycle_id)))?;
            if !cycle.can_add_links_disjoint(links) {
                return Err(Error::InvalidArgument(format!("P-cycle {:?} already protects a lightpath sharing a link with the new one", p_cycle_id)));
            }
        }

        for (source, destination) in hops.iter() {
            if !self.pt.are_slots_available(*source, *destination, slot_list)? {
                log::debug!("SpectrumUnavailable: slots are occupied on link {} -> {}, no lightpath created.", source, destination);
                return Ok(None);
            }
        }

        let id = LightPathId::new(self.next_light_path_id);
        let source = hops[0].0;
        let destination = hops[hops.len() - 1].1;
        let light_path = LightPath::new(id, source, destination, links.to_vec(), slot_list.to_vec(), modulation_level, p_cycle)?;
        self.next_light_path_id += 1;

        for (source, destination) in hops.iter() {
            self.pt.reserve_slots(*source, *destination, slot_list)?;
        }

        if let Some(p_cycle_id) = p_cycle {
            if let Some(cycle) = self.p_cycles.get_mut(p_cycle_id) {
                cycle.add_protected_lightpath(id, links);
            }
        }
        self.light_path_graph.entry((source, destination)).or_default().push(id);
        log::debug!("Created {}", light_path);
        self.light_paths.insert(id, light_path);

        // Registered before the sink sees it.
        if let Some(light_path) = self.light_paths.get(&id) {
            self.tracer.borrow_mut().create_light_path(light_path)?;
        }

        Ok(Some(id))
    }

    /// Tears down a lightpath and returns its spectrum.
    ///
    /// If the lightpath was the last one protected by its p-cycle, the p-cycle is
    /// destroyed as well and its shared slots are released.
    ///
    /// # Returns
    /// `false` if no lightpath with this id exists.
    pub fn remove_light_path(&mut self, id: LightPathId) -> Result<bool> {
        let Some(light_path) = self.light_paths.remove(&id) else {
            return Ok(false);
        };

        if let Some(p_cycle_id) = light_path.get_p_cycle() {
            let now_empty = match self.p_cycles.get_mut(p_cycle_id) {
                Some(cycle) => {
                    cycle.remove_protected_lightpath(id);
                    cycle.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.remove_p_cycle(p_cycle_id)?;
            }
        }

        for (source, destination) in self.resolve_links(light_path.get_links())? {
            self.pt.release_slots(source, destination, light_path.get_slot_list())?;
        }

        let key = (light_path.get_source(), light_path.get_destination());
        if let Some(ids) = self.light_path_graph.get_mut(&key) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.light_path_graph.remove(&key);
            }
        }

        self.tracer.borrow_mut().remove_light_path(&light_path)?;
        log::debug!("Removed {}", light_path);

        Ok(true)
    }

    /// Registers a p-cycle and reserves its shared slots on every cycle edge.
    ///
    /// # Returns
    /// `Ok(None)` if the shared slots are not free on every edge; nothing is
    /// reserved in that case.
    pub fn add_p_cycle(&mut self, p_cycle: PCycle) -> Result<Option<PCycleId>> {
        for (source, destination) in p_cycle.get_cycle_links() {
            if !self.pt.get_sharing_spectrum(*source, *destination)?.are_free(p_cycle.get_slot_list()) {
                log::debug!("SharingSpectrumUnavailable: shared slots are occupied on link {} -> {}, no p-cycle created.", source, destination);
                return Ok(None);
            }
        }

        for (source, destination) in p_cycle.get_cycle_links() {
            self.pt.reserve_sharing_slots(*source, *destination, p_cycle.get_slot_list())?;
        }

        let edges = p_cycle.get_cycle_links().len();
        let reserved = p_cycle.get_reserved_slots();
        let id = self.p_cycles.insert(p_cycle);
        log::debug!("Created p-cycle {:?} over {} edge(s) sharing {} slot(s).", id, edges, reserved);

        Ok(Some(id))
    }

    /// Destroys a p-cycle and releases its shared slots. Lightpaths still protected
    /// by it lose their protection.
    ///
    /// # Returns
    /// `false` if no p-cycle with this id exists.
    pub fn remove_p_cycle(&mut self, id: PCycleId) -> Result<bool> {
        let Some(p_cycle) = self.p_cycles.remove(id) else {
            return Ok(false);
        };

        for light_path_id in p_cycle.get_all_lp() {
            log::warn!("UnprotectedLightPath: p-cycle {:?} removed while still protecting lightpath {}.", id, light_path_id);
            if let Some(light_path) = self.light_paths.get_mut(&light_path_id) {
                light_path.set_p_cycle(None);
            }
        }

        for (source, destination) in p_cycle.get_cycle_links() {
            self.pt.release_sharing_slots(*source, *destination, p_cycle.get_slot_list())?;
        }
        log::debug!("Removed p-cycle {:?}.", id);

        Ok(true)
    }

    pub fn get_p_cycle(&self, id: PCycleId) -> Option<&PCycle> {
        self.p_cycles.get(id)
    }

    pub fn get_p_cycles(&self) -> impl Iterator<Item = (PCycleId, &PCycle)> {
        self.p_cycles.iter()
    }

    pub fn get_num_p_cycles(&self) -> usize {
        self.p_cycles.len()
    }

    pub fn get_light_path(&self, id: LightPathId) -> Option<&LightPath> {
        self.light_paths.get(&id)
    }

    pub fn get_all_light_paths(&self) -> impl Iterator<Item = &LightPath> {
        self.light_paths.values()
    }

    pub fn get_num_light_paths(&self) -> usize {
        self.light_paths.len()
    }

    /// Ids of the lightpaths from `source` to `destination`, oldest first.
    pub fn get_light_paths_between(&self, source: NodeId, destination: NodeId) -> &[LightPathId] {
        self.light_path_graph.get(&(source, destination)).map(|ids| ids.as_slice()).unwrap_or(&[])
    }

    fn resolve_links(&self, links: &[LinkId]) -> Result<Vec<(NodeId, NodeId)>> {
        links
            .iter()
            .map(|link| match (self.pt.get_src_link(*link), self.pt.get_dst_link(*link)) {
                (Some(source), Some(destination)) => Ok((source, destination)),
                _ => Err(Error::InvalidArgument(format!("Link {} does not exist", link))),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::network::spectrum::SpectrumGrid;
    use crate::domain::flow::Flow;
    use crate::domain::simulator::event::Event;
    use crate::domain::statistics::tracer::{TraceSink, Tracer};
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    /// Sink whose disk is full as soon as a lightpath is created.
    #[derive(Debug)]
    struct FullDiskTracer;

    impl TraceSink for FullDiskTracer {
        fn add_event(&mut self, _: &Event) -> Result<()> {
            Ok(())
        }

        fn accept_flow(&mut self, _: &Flow, _: &LightPath) -> Result<()> {
            Ok(())
        }

        fn block_flow(&mut self, _: &Flow) -> Result<()> {
            Ok(())
        }

        fn create_light_path(&mut self, _: &LightPath) -> Result<()> {
            Err(io::Error::other("disk full").into())
        }

        fn remove_light_path(&mut self, _: &LightPath) -> Result<()> {
            Ok(())
        }
    }

    fn n(id: usize) -> NodeId {
        NodeId::new(id)
    }

    /// Line 0 -> 1 -> 2 with one core and eight slots.
    fn line() -> (VirtualTopology, LinkId, LinkId) {
        let mut pt = PhysicalTopology::new(3, 1, 8, 12.5).unwrap();
        let first = pt.add_link(n(0), n(1), 1.0).unwrap();
        let second = pt.add_link(n(1), n(2), 1.0).unwrap();
        (VirtualTopology::new(pt, Tracer::disabled().shared()), first, second)
    }

    #[test]
    fn test_create_and_remove_restore_spectrum() {
        let (mut vt, first, second) = line();
        let slots = [Slot::new(0, 2), Slot::new(0, 3)];

        let id = vt.create_light_path(&[first, second], &slots, 0, None).unwrap().unwrap();
        assert_eq!(id, LightPathId::new(0));
        assert!(!vt.physical_topology().are_slots_available(n(0), n(1), &slots).unwrap());
        assert_eq!(vt.get_light_paths_between(n(0), n(2)), &[id]);

        assert!(vt.remove_light_path(id).unwrap());
        assert_eq!(vt.physical_topology().get_spectrum(n(0), n(1)).unwrap(), &SpectrumGrid::all_free(1, 8));
        assert_eq!(vt.physical_topology().get_spectrum(n(1), n(2)).unwrap(), &SpectrumGrid::all_free(1, 8));
        assert!(vt.get_light_paths_between(n(0), n(2)).is_empty());
    }

    #[test]
    fn test_occupied_spectrum_is_not_an_error() {
        let (mut vt, first, second) = line();
        let slots = [Slot::new(0, 0)];

        assert!(vt.create_light_path(&[second], &slots, 0, None).unwrap().is_some());
        assert_eq!(vt.create_light_path(&[first, second], &slots, 0, None).unwrap(), None);
        // The free first link must not have been touched by the failed attempt.
        assert!(vt.physical_topology().are_slots_available(n(0), n(1), &slots).unwrap());
    }

    #[test]
    fn test_ids_are_never_reused() {
        let (mut vt, first, _) = line();

        let a = vt.create_light_path(&[first], &[Slot::new(0, 0)], 0, None).unwrap().unwrap();
        vt.remove_light_path(a).unwrap();
        let b = vt.create_light_path(&[first], &[Slot::new(0, 0)], 0, None).unwrap().unwrap();

        assert!(b > a);
    }

    #[test]
    fn test_invalid_requests() {
        let (mut vt, _, _) = line();

        assert!(matches!(vt.create_light_path(&[], &[Slot::new(0, 0)], 0, None), Err(Error::InvalidArgument(_))));
        assert!(matches!(vt.create_light_path(&[LinkId::new(42)], &[Slot::new(0, 0)], 0, None), Err(Error::InvalidArgument(_))));
        assert!(!vt.remove_light_path(LightPathId::new(42)).unwrap());
    }

    #[test]
    fn test_last_protected_lightpath_destroys_p_cycle() {
        let (mut vt, first, second) = line();
        let shared = vec![Slot::new(0, 5)];
        let cycle = PCycle::new(vec![(n(0), n(1)), (n(1), n(2))], shared.clone()).unwrap();

        let cycle_id = vt.add_p_cycle(cycle).unwrap().unwrap();
        assert!(!vt.physical_topology().get_sharing_spectrum(n(0), n(1)).unwrap().are_free(&shared));

        let a = vt.create_light_path(&[first], &[Slot::new(0, 0)], 0, Some(cycle_id)).unwrap().unwrap();
        let b = vt.create_light_path(&[second], &[Slot::new(0, 0)], 0, Some(cycle_id)).unwrap().unwrap();
        assert!(matches!(vt.create_light_path(&[first], &[Slot::new(0, 1)], 0, Some(cycle_id)), Err(Error::InvalidArgument(_))));

        vt.remove_light_path(a).unwrap();
        assert_eq!(vt.get_num_p_cycles(), 1);

        vt.remove_light_path(b).unwrap();
        assert!(vt.get_p_cycle(cycle_id).is_none());
        assert_eq!(vt.physical_topology().get_sharing_spectrum(n(0), n(1)).unwrap(), &SpectrumGrid::all_free(1, 8));
        assert_eq!(vt.physical_topology().get_sharing_spectrum(n(1), n(2)).unwrap(), &SpectrumGrid::all_free(1, 8));
    }

    #[test]
    fn test_repeated_link_is_rejected_before_reserving() {
        let (mut vt, first, second) = line();
        let slots = [Slot::new(0, 4)];

        let result = vt.create_light_path(&[first, second, first], &slots, 0, None);

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(vt.physical_topology().get_spectrum(n(0), n(1)).unwrap(), &SpectrumGrid::all_free(1, 8));
        assert_eq!(vt.physical_topology().get_spectrum(n(1), n(2)).unwrap(), &SpectrumGrid::all_free(1, 8));
        assert_eq!(vt.get_num_light_paths(), 0);
    }

    #[test]
    fn test_failing_sink_leaves_lightpath_registered() {
        // Setup
        let mut pt = PhysicalTopology::new(2, 1, 8, 12.5).unwrap();
        let only = pt.add_link(n(0), n(1), 1.0).unwrap();
        let tracer: Rc<RefCell<dyn TraceSink>> = Rc::new(RefCell::new(FullDiskTracer));
        let mut vt = VirtualTopology::new(pt, tracer);
        let slots = [Slot::new(0, 0)];

        // Execution
        let result = vt.create_light_path(&[only], &slots, 0, None);

        // Verification: the error surfaces, the bookkeeping stays complete
        assert!(matches!(result, Err(Error::IoError(_))));
        let id = LightPathId::new(0);
        assert!(vt.get_light_path(id).is_some());
        assert_eq!(vt.get_light_paths_between(n(0), n(1)), &[id]);

        assert!(vt.remove_light_path(id).unwrap());
        assert_eq!(vt.physical_topology().get_spectrum(n(0), n(1)).unwrap(), &SpectrumGrid::all_free(1, 8));
    }

    #[test]
    fn test_removing_unknown_p_cycle_is_a_no_op() {
        // Setup: a cycle that died with its only lightpath, and a live one
        let (mut vt, first, second) = line();
        let stale = vt.add_p_cycle(PCycle::new(vec![(n(0), n(1))], vec![Slot::new(0, 7)]).unwrap()).unwrap().unwrap();
        let lp = vt.create_light_path(&[second], &[Slot::new(0, 0)], 0, Some(stale)).unwrap().unwrap();
        vt.remove_light_path(lp).unwrap();
        assert!(vt.get_p_cycle(stale).is_none());

        let live = vt.add_p_cycle(PCycle::new(vec![(n(0), n(1)), (n(1), n(2))], vec![Slot::new(0, 6)]).unwrap()).unwrap().unwrap();
        vt.create_light_path(&[first], &[Slot::new(0, 0)], 0, Some(live)).unwrap().unwrap();
        let before_first = vt.physical_topology().get_sharing_spectrum(n(0), n(1)).unwrap().clone();
        let before_second = vt.physical_topology().get_sharing_spectrum(n(1), n(2)).unwrap().clone();

        // Execution
        let removed = vt.remove_p_cycle(stale).unwrap();

        // Verification
        assert!(!removed);
        assert_eq!(vt.get_num_p_cycles(), 1);
        assert_eq!(vt.physical_topology().get_sharing_spectrum(n(0), n(1)).unwrap(), &before_first);
        assert_eq!(vt.physical_topology().get_sharing_spectrum(n(1), n(2)).unwrap(), &before_second);
        assert!(!before_first.are_free(&[Slot::new(0, 6)]));
    }
}
