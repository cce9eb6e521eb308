pub mod statistics;
pub mod tracer;
