use std::collections::BTreeMap;

use crate::domain::network::slot::Slot;
use crate::domain::network::spectrum::SpectrumGrid;

const FRAGMENTATION_POWER: f64 = 2.0;

/// Opaque identifier of a free region. Ids grow in discovery order: core by core,
/// and within a core from the lowest slot index upwards.
pub type RegionId = usize;

/// Free regions of a spectrum image, keyed by discovery order.
pub type Regions = BTreeMap<RegionId, Vec<Slot>>;

/// Scans spectrum images for maximal runs of free slots.
///
/// Contiguity is a per-core property: two free slots on different cores never
/// belong to the same region, even when they share the same slot index.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConnectedComponent;

impl ConnectedComponent {
    pub fn new() -> Self {
        ConnectedComponent
    }

    /// Returns every maximal run of free slots of `grid`.
    ///
    /// # Returns
    /// A map from region id to the ordered slots of the run. The map is empty if the
    /// grid has no free slot at all.
    pub fn list_of_regions(&self, grid: &SpectrumGrid) -> Regions {
        let mut regions = Regions::new();
        let mut next_region_id: RegionId = 0;

        for core in 0..grid.cores() {
            let mut current: Vec<Slot> = Vec::new();

            for (slot, free) in grid.row(core).iter().enumerate() {
                if *free {
                    current.push(Slot::new(core, slot));
                } else if !current.is_empty() {
                    regions.insert(next_region_id, std::mem::take(&mut current));
                    next_region_id += 1;
                }
            }

            if !current.is_empty() {
                regions.insert(next_region_id, current);
                next_region_id += 1;
            }
        }

        regions
    }

    /// Computes the **external fragmentation index** of a spectrum image.
    ///
    /// For every core with free capacity the index is `1 - Σ len² / (Σ len)²` over its
    /// free runs, so a single free run scores **0.0** and many small runs approach
    /// **1.0**. The result is the mean over those cores.
    ///
    /// # Returns
    /// **0.0** if the grid is completely free or completely occupied.
    pub fn fragmentation_index(&self, grid: &SpectrumGrid) -> f64 {
        let regions = self.list_of_regions(grid);

        let mut quad_sum_per_core: Vec<f64> = vec![0.0; grid.cores()];
        let mut sum_per_core: Vec<f64> = vec![0.0; grid.cores()];

        for region in regions.values() {
            let Some(first) = region.first() else { continue };
            let len = region.len() as f64;
            quad_sum_per_core[first.core] += len.powf(FRAGMENTATION_POWER);
            sum_per_core[first.core] += len;
        }

        let core_fragmentation: Vec<f64> = quad_sum_per_core
            .iter()
            .zip(sum_per_core.iter())
            .filter(|(_, sum)| **sum > 0.0)
            .map(|(quad_sum, sum)| 1.0 - quad_sum / sum.powf(FRAGMENTATION_POWER))
            .collect();

        // No free block
        if core_fragmentation.is_empty() {
            return 0.0;
        }

        core_fragmentation.iter().sum::<f64>() / core_fragmentation.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    fn grid(rows: &[&str]) -> SpectrumGrid {
        SpectrumGrid::from_rows(rows.iter().map(|row| row.chars().map(|c| c == '1').collect()).collect()).unwrap()
    }

    #[test]
    fn test_regions_follow_discovery_order() {
        let regions = ConnectedComponent::new().list_of_regions(&grid(&["11011100", "00000011"]));

        let as_pairs: Vec<Vec<(usize, usize)>> = regions.values().map(|r| r.iter().map(|s| (s.core, s.slot)).collect()).collect();

        assert_eq!(as_pairs, vec![vec![(0, 0), (0, 1)], vec![(0, 3), (0, 4), (0, 5)], vec![(1, 6), (1, 7)]]);
        assert_eq!(regions.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_runs_do_not_span_cores() {
        let regions = ConnectedComponent::new().list_of_regions(&grid(&["0011", "1100"]));
        assert_eq!(regions.len(), 2);
        assert!(regions.values().all(|r| r.iter().all(|s| s.core == r[0].core)));
    }

    #[test]
    fn test_fully_occupied_grid_has_no_region() {
        assert!(ConnectedComponent::new().list_of_regions(&grid(&["0000", "0000"])).is_empty());
    }

    #[test]
    fn test_regions_partition_free_cells() {
        let mut rng = StdRng::seed_from_u64(42);
        let cc = ConnectedComponent::new();

        for _ in 0..100 {
            let rows: Vec<Vec<bool>> = (0..3).map(|_| (0..20).map(|_| rng.random_bool(0.6)).collect()).collect();
            let g = SpectrumGrid::from_rows(rows).unwrap();
            let regions = cc.list_of_regions(&g);

            let mut seen = HashSet::new();
            for region in regions.values() {
                for window in region.windows(2) {
                    assert_eq!(window[0].core, window[1].core);
                    assert_eq!(window[0].slot + 1, window[1].slot);
                }
                // maximal: neighbours outside the run are occupied or out of range
                let first = region[0];
                let last = region[region.len() - 1];
                assert_ne!(first.slot.checked_sub(1).and_then(|s| g.is_free(first.core, s)), Some(true));
                assert_ne!(g.is_free(last.core, last.slot + 1), Some(true));

                for s in region {
                    assert!(seen.insert(*s), "slot {} appears in two regions", s);
                }
            }
            assert_eq!(seen.len(), g.free_count());
        }
    }

    #[test]
    fn test_fragmentation_index() {
        let cc = ConnectedComponent::new();
        assert_eq!(cc.fragmentation_index(&grid(&["11111111"])), 0.0);
        assert_eq!(cc.fragmentation_index(&grid(&["00000000"])), 0.0);

        // two runs of 2: 1 - 8/16
        let index = cc.fragmentation_index(&grid(&["11001100"]));
        assert!((index - 0.5).abs() < 1e-9, "got {}", index);
    }
}
