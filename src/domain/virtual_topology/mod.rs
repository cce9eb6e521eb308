pub mod light_path;
pub mod p_cycle;
pub mod virtual_topology;
