use thiserror::Error;

use crate::domain::utils::id::FlowId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse simulation configuration JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to write statistics: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IllegalArgument: {0}")]
    InvalidArgument(String),

    #[error("Failed to build simulation from configuration: {0}")]
    ConfigurationError(String),

    #[error("Unknown RSA module '{0}', expected one of FIPP, ImageRCSA")]
    UnknownRsaModule(String),

    #[error("Simulation run failed: {0}")]
    SimulationError(String),

    #[error("Flow {flow_id} violated the admission contract: {reason}")]
    FlowContractViolation { flow_id: FlowId, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
