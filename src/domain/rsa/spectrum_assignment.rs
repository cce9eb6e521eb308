use crate::domain::network::connected_component::{ConnectedComponent, Regions};
use crate::domain::network::graph::Path;
use crate::domain::network::physical_topology::PhysicalTopology;
use crate::domain::network::slot::Slot;
use crate::domain::network::spectrum::SpectrumGrid;
use crate::domain::utils::id::{LinkId, NodeId};
use crate::error::{Error, Result};

/// Which grid of a link to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumPlane {
    Working,
    /// Capacity set aside for p-cycles.
    Sharing,
}

/// How a region is picked among those large enough for the demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitPolicy {
    /// First region in discovery order.
    FirstFit,
    /// Region with the smallest leftover, ties broken by discovery order.
    BestFit,
}

impl FitPolicy {
    /// Picks a region for `demand` slots.
    ///
    /// # Returns
    /// The first `demand` slots of the chosen region, or `None` if no region is large
    /// enough.
    pub fn select(&self, regions: &Regions, demand: usize) -> Option<Vec<Slot>> {
        let mut fitting = regions.values().filter(|region| region.len() >= demand);

        let region = match self {
            FitPolicy::FirstFit => fitting.next(),
            // min_by_key keeps the first minimum, which is the discovery order tie break.
            FitPolicy::BestFit => fitting.min_by_key(|region| region.len() - demand),
        }?;

        Some(region[..demand].to_vec())
    }
}

/// Path-wide free mask: a slot is free only if it is free on every given edge.
pub fn image_along(pt: &PhysicalTopology, edges: impl IntoIterator<Item = (NodeId, NodeId)>, plane: SpectrumPlane) -> Result<SpectrumGrid> {
    let mut image = SpectrumGrid::all_free(pt.get_cores(), pt.get_num_slots());

    for (source, destination) in edges {
        let grid = match plane {
            SpectrumPlane::Working => pt.get_spectrum(source, destination)?,
            SpectrumPlane::Sharing => pt.get_sharing_spectrum(source, destination)?,
        };
        image.and_assign(grid)?;
    }

    Ok(image)
}

/// Free regions of the path-wide mask of `path`.
pub fn path_regions(pt: &PhysicalTopology, path: &Path, plane: SpectrumPlane) -> Result<Regions> {
    let image = image_along(pt, path.edges(), plane)?;
    Ok(ConnectedComponent::new().list_of_regions(&image))
}

/// Smallest `region length - demand` over the regions that can carry `demand`.
pub fn best_fit_leftover(regions: &Regions, demand: usize) -> Option<usize> {
    regions.values().filter(|region| region.len() >= demand).map(|region| region.len() - demand).min()
}

/// True iff at least one region can carry `demand` slots.
pub fn is_usable(regions: &Regions, demand: usize) -> bool {
    regions.values().any(|region| region.len() >= demand)
}

/// Link ids along `path`, in travel order.
pub fn path_links(pt: &PhysicalTopology, path: &Path) -> Result<Vec<LinkId>> {
    path.edges()
        .map(|(source, destination)| {
            pt.get_link_id(source, destination)
                .ok_or_else(|| Error::InvalidArgument(format!("There is no link {} -> {}", source, destination)))
        })
        .collect()
}
