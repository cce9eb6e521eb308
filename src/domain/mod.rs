pub mod flow;
pub mod network;
pub mod rsa;
pub mod simulator;
pub mod statistics;
pub mod utils;
pub mod virtual_topology;
