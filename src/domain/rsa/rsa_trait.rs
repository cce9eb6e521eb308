use std::fmt::Debug;

use crate::api::simulation_dto::TrafficDto;
use crate::domain::flow::Flow;
use crate::domain::network::physical_topology::PhysicalTopology;
use crate::domain::network::slot::Slot;
use crate::domain::utils::id::{LightPathId, LinkId};
use crate::domain::virtual_topology::light_path::LightPath;
use crate::domain::virtual_topology::p_cycle::PCycleId;
use crate::domain::virtual_topology::virtual_topology::VirtualTopology;
use crate::error::{Error, Result};

/// Callbacks an RSA strategy uses to report its admission decision.
///
/// Every call of [`Rsa::flow_arrival`] must end with exactly one of them.
pub trait ControlPlaneForRsa {
    fn accept_flow(&mut self, flow: &Flow, light_path: &LightPath) -> Result<()>;

    fn block_flow(&mut self, flow: &Flow) -> Result<()>;
}

/// Routing and spectrum assignment strategy.
pub trait Rsa: Debug {
    /// One-time wiring before the first event. Only stores what the strategy needs.
    fn simulation_interface(&mut self, pt: &PhysicalTopology, traffic: &TrafficDto) -> Result<()>;

    /// Decides on a new flow and reports the outcome through `cp`.
    ///
    /// Running out of paths or spectrum is a block, never an error. Errors are
    /// reserved for contract violations and failing sinks.
    fn flow_arrival(&mut self, flow: &mut Flow, vt: &mut VirtualTopology, cp: &mut dyn ControlPlaneForRsa) -> Result<()>;

    /// Releases every lightpath held by an accepted flow, together with its part in
    /// any p-cycle.
    fn flow_departure(&mut self, flow: &mut Flow, vt: &mut VirtualTopology) -> Result<()> {
        for light_path_id in flow.take_light_paths() {
            if !vt.remove_light_path(light_path_id)? {
                log::warn!("UnknownLightPath: flow {} referenced lightpath {} which no longer exists.", flow.get_id(), light_path_id);
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str;
}

/// Establishes a lightpath for `flow` and records links, slots and lightpath id on it.
///
/// # Returns
/// The new lightpath id, or `None` if the spectrum was no longer available.
pub(crate) fn establish_light_path(
    flow: &mut Flow,
    vt: &mut VirtualTopology,
    links: &[LinkId],
    slot_list: &[Slot],
    p_cycle: Option<PCycleId>,
) -> Result<Option<LightPathId>> {
    let Some(id) = vt.create_light_path(links, slot_list, 0, p_cycle)? else {
        return Ok(None);
    };

    if flow.get_light_paths().is_empty() {
        flow.set_links(links.to_vec());
        flow.set_slot_list(slot_list.to_vec());
    }
    flow.add_light_path(id);

    Ok(Some(id))
}

/// Reports the acceptance of `flow` carried by its first lightpath.
pub(crate) fn accept_on_primary(flow: &Flow, vt: &VirtualTopology, cp: &mut dyn ControlPlaneForRsa) -> Result<()> {
    let primary = flow
        .get_light_paths()
        .first()
        .and_then(|id| vt.get_light_path(*id))
        .ok_or_else(|| Error::FlowContractViolation { flow_id: flow.get_id(), reason: "accepted without an established lightpath".to_string() })?;

    cp.accept_flow(flow, primary)
}
