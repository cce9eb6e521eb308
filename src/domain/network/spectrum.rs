use crate::domain::network::slot::Slot;
use crate::error::{Error, Result};

/// Occupancy image of one link: `cores` rows of `slots` cells, `true` meaning free.
///
/// The grid is stored row major, so each core's slots are contiguous in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpectrumGrid {
    cores: usize,
    slots: usize,
    cells: Vec<bool>,
}

impl SpectrumGrid {
    /// Creates a grid where every slot on every core is free.
    pub fn all_free(cores: usize, slots: usize) -> Self {
        Self { cores, slots, cells: vec![true; cores * slots] }
    }

    pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self> {
        let cores = rows.len();
        let slots = rows.first().map(|row| row.len()).unwrap_or(0);

        if rows.iter().any(|row| row.len() != slots) {
            return Err(Error::InvalidArgument("Every core of a spectrum grid needs the same number of slots".to_string()));
        }

        Ok(Self { cores, slots, cells: rows.into_iter().flatten().collect() })
    }

    pub fn cores(&self) -> usize {
        self.cores
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.cores, self.slots)
    }

    /// Returns `None` for coordinates outside the grid.
    pub fn is_free(&self, core: usize, slot: usize) -> Option<bool> {
        if core >= self.cores || slot >= self.slots {
            return None;
        }
        self.cells.get(core * self.slots + slot).copied()
    }

    pub fn row(&self, core: usize) -> &[bool] {
        let start = core * self.slots;
        &self.cells[start..start + self.slots]
    }

    /// True iff every slot in `slot_list` lies inside the grid and is free.
    pub fn are_free(&self, slot_list: &[Slot]) -> bool {
        slot_list.iter().all(|s| self.is_free(s.core, s.slot) == Some(true))
    }

    pub fn free_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }

    /// Marks all slots as occupied. Fails without touching the grid if one of them is
    /// outside the grid or already occupied.
    pub fn reserve(&mut self, slot_list: &[Slot]) -> Result<()> {
        if !self.are_free(slot_list) {
            return Err(Error::InvalidArgument(format!("Slots {} are not all free on this link", format_slots(slot_list))));
        }
        for s in slot_list {
            self.cells[s.core * self.slots + s.slot] = false;
        }
        Ok(())
    }

    /// Marks all slots as free again. Releasing an already free slot is a no-op.
    pub fn release(&mut self, slot_list: &[Slot]) -> Result<()> {
        if let Some(outside) = slot_list.iter().find(|s| s.core >= self.cores || s.slot >= self.slots) {
            return Err(Error::InvalidArgument(format!("Slot {} is outside of a {}x{} grid", outside, self.cores, self.slots)));
        }
        for s in slot_list {
            self.cells[s.core * self.slots + s.slot] = true;
        }
        Ok(())
    }

    /// Elementwise AND of two equally shaped grids. A slot is free in the result only if
    /// it is free in both inputs, which turns the continuity check along a path into a
    /// single mask.
    pub fn image_and(&self, other: &SpectrumGrid) -> Result<SpectrumGrid> {
        if self.shape() != other.shape() {
            return Err(Error::InvalidArgument(format!(
                "Cannot intersect a {:?} spectrum grid with a {:?} spectrum grid",
                self.shape(),
                other.shape()
            )));
        }

        let cells = self.cells.iter().zip(other.cells.iter()).map(|(a, b)| *a && *b).collect();

        Ok(SpectrumGrid { cores: self.cores, slots: self.slots, cells })
    }

    /// In-place variant of [`SpectrumGrid::image_and`], used while folding masks along a path.
    pub fn and_assign(&mut self, other: &SpectrumGrid) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::InvalidArgument(format!(
                "Cannot intersect a {:?} spectrum grid with a {:?} spectrum grid",
                self.shape(),
                other.shape()
            )));
        }
        for (cell, other_cell) in self.cells.iter_mut().zip(other.cells.iter()) {
            *cell = *cell && *other_cell;
        }
        Ok(())
    }
}

pub(crate) fn format_slots(slot_list: &[Slot]) -> String {
    slot_list.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" ")
}
