use std::fmt;
use std::marker::PhantomData;

/// Typed index. The tag only exists at compile time, so a `NodeId` can never be
/// passed where a `LinkId` is expected.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct Id<T> {
    pub id: usize,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub const fn new(id: usize) -> Self {
        Id { id, _marker: PhantomData }
    }

    pub fn index(&self) -> usize {
        self.id
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<T> From<usize> for Id<T> {
    fn from(id: usize) -> Self {
        Id::new(id)
    }
}

impl<T> From<Id<T>> for usize {
    fn from(id_wrapper: Id<T>) -> Self {
        id_wrapper.id
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full_name = std::any::type_name::<T>();
        let clean_name = full_name.split("::").last().unwrap_or(full_name);
        let display_name = clean_name.replace("Tag", "Id");

        write!(f, "{}: {}", display_name, self.id)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct NodeTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct LinkTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct FlowTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct LightPathTag;

pub type NodeId = Id<NodeTag>;
pub type LinkId = Id<LinkTag>;
pub type FlowId = Id<FlowTag>;
pub type LightPathId = Id<LightPathTag>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_names_the_id_kind() {
        assert_eq!(format!("{:?}", NodeId::new(3)), "NodeId: 3");
        assert_eq!(format!("{:?}", LightPathId::new(0)), "LightPathId: 0");
        assert_eq!(LinkId::new(7).to_string(), "7");
    }
}
