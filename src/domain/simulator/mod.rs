pub mod control_plane;
pub mod event;
pub mod event_scheduler;
pub mod simulation_runner;
pub mod simulator;
pub mod traffic_generator;
