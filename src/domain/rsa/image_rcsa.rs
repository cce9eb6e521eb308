use crate::api::simulation_dto::TrafficDto;
use crate::domain::flow::Flow;
use crate::domain::network::connected_component::Regions;
use crate::domain::network::graph::{Path, WeightedGraph};
use crate::domain::network::physical_topology::PhysicalTopology;
use crate::domain::rsa::rsa_trait::{ControlPlaneForRsa, Rsa, accept_on_primary, establish_light_path};
use crate::domain::rsa::spectrum_assignment::{FitPolicy, SpectrumPlane, best_fit_leftover, is_usable, path_links, path_regions};
use crate::domain::virtual_topology::virtual_topology::VirtualTopology;
use crate::error::{Error, Result};

/// A candidate path together with the free regions of its working spectrum.
#[derive(Debug)]
struct UsablePath {
    path: Path,
    regions: Regions,
}

/// Image based routing, core and spectrum assignment with dedicated 1+1 protection.
///
/// Every pair of usable candidates that shares no link is a protection pair; the pair
/// with the smallest combined weight wins. Within the pair, the path whose best-fit
/// region leaves the smaller leftover becomes the primary, the lighter one on a tie.
#[derive(Debug)]
pub struct ImageRcsa {
    k_paths: usize,

    /// Also establish a lightpath on the backup path.
    reserve_backup: bool,

    graph: WeightedGraph,
}

impl ImageRcsa {
    pub fn new(k_paths: usize, reserve_backup: bool) -> Self {
        Self { k_paths, reserve_backup, graph: WeightedGraph::new() }
    }

    fn usable_paths(&self, pt: &PhysicalTopology, flow: &Flow, demand: usize) -> Result<Vec<UsablePath>> {
        let mut usable = Vec::new();
        for path in self.graph.k_shortest_paths(flow.get_source(), flow.get_destination(), self.k_paths) {
            let regions = path_regions(pt, &path, SpectrumPlane::Working)?;
            if is_usable(&regions, demand) {
                usable.push(UsablePath { path, regions });
            }
        }
        Ok(usable)
    }

    /// Link-disjoint pair of minimal combined weight, lighter path first. On equal
    /// weight the earlier pair is kept.
    fn best_pair(candidates: &[UsablePath]) -> Option<(&UsablePath, &UsablePath)> {
        let mut best: Option<(&UsablePath, &UsablePath)> = None;
        let mut best_weight = f64::INFINITY;

        for i in 0..candidates.len() {
            for j in (i + 1)..candidates.len() {
                let (lighter, heavier) = (&candidates[i], &candidates[j]);
                if lighter.path.shares_edge_with(&heavier.path) {
                    continue;
                }

                let weight = lighter.path.weight + heavier.path.weight;
                if weight < best_weight {
                    best_weight = weight;
                    best = Some((lighter, heavier));
                }
            }
        }

        best
    }

    /// Orders a protection pair as `(primary, backup)` by best-fit leftover, then by
    /// path weight. `lighter` is kept as primary on a full tie.
    fn order_by_fit<'a>(lighter: &'a UsablePath, heavier: &'a UsablePath, demand: usize) -> (&'a UsablePath, &'a UsablePath) {
        let key = |candidate: &UsablePath| (best_fit_leftover(&candidate.regions, demand).unwrap_or(usize::MAX), candidate.path.weight);
        let (lighter_key, heavier_key) = (key(lighter), key(heavier));

        if heavier_key.0 < lighter_key.0 || (heavier_key.0 == lighter_key.0 && heavier_key.1 < lighter_key.1) {
            (heavier, lighter)
        } else {
            (lighter, heavier)
        }
    }
}

impl Rsa for ImageRcsa {
    fn simulation_interface(&mut self, pt: &PhysicalTopology, traffic: &TrafficDto) -> Result<()> {
        self.graph = pt.get_weighted_graph().clone();
        log::debug!(
            "ImageRCSA ready: {} links, k = {}, backup reservation {}, {} call type(s).",
            pt.get_num_links(),
            self.k_paths,
            if self.reserve_backup { "on" } else { "off" },
            traffic.call_types.len()
        );
        Ok(())
    }

    fn flow_arrival(&mut self, flow: &mut Flow, vt: &mut VirtualTopology, cp: &mut dyn ControlPlaneForRsa) -> Result<()> {
        let demand = flow.demand_in_slots(vt.physical_topology().get_slot_capacity());

        let candidates = self.usable_paths(vt.physical_topology(), flow, demand)?;
        if candidates.len() < 2 {
            log::debug!("Blocked: flow {} has {} usable path(s), two are needed.", flow.get_id(), candidates.len());
            return cp.block_flow(flow);
        }

        let Some((first, second)) = Self::best_pair(&candidates) else {
            log::debug!("Blocked: flow {} has no link-disjoint path pair.", flow.get_id());
            return cp.block_flow(flow);
        };
        let (primary, backup) = Self::order_by_fit(first, second, demand);

        let Some(primary_slots) = FitPolicy::BestFit.select(&primary.regions, demand) else {
            return cp.block_flow(flow);
        };
        // Both paths are link-disjoint, so the backup slots stay free once the primary is reserved.
        let backup_slots = if self.reserve_backup {
            let Some(slot_list) = FitPolicy::BestFit.select(&backup.regions, demand) else {
                return cp.block_flow(flow);
            };
            Some(slot_list)
        } else {
            None
        };

        let primary_links = path_links(vt.physical_topology(), &primary.path)?;
        if establish_light_path(flow, vt, &primary_links, &primary_slots, None)?.is_none() {
            return cp.block_flow(flow);
        }

        if let Some(slot_list) = backup_slots {
            let backup_links = path_links(vt.physical_topology(), &backup.path)?;
            if establish_light_path(flow, vt, &backup_links, &slot_list, None)?.is_none() {
                return Err(Error::FlowContractViolation {
                    flow_id: flow.get_id(),
                    reason: "backup spectrum was taken while establishing the primary".to_string(),
                });
            }
        }

        log::debug!("Accepted: flow {} on {} hop(s) with a disjoint backup of {} hop(s).", flow.get_id(), primary.path.hops(), backup.path.hops());
        accept_on_primary(flow, vt, cp)
    }

    fn name(&self) -> &'static str {
        "ImageRCSA"
    }
}
