pub mod connected_component;
pub mod graph;
pub mod physical_topology;
pub mod slot;
pub mod spectrum;
