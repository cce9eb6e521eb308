use std::fmt;

/// One unit of spectrum on one fiber core of a link.
///
/// Slots are plain values: a lightpath holds the same list of slots on every link
/// it traverses (spectrum continuity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    pub core: usize,
    pub slot: usize,
}

impl Slot {
    pub fn new(core: usize, slot: usize) -> Self {
        Slot { core, slot }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.core, self.slot)
    }
}
