use serde::Deserialize;

fn default_k_paths() -> usize {
    5
}

fn default_true() -> bool {
    true
}

/// Root of a simulation configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationDto {
    pub rsa: RsaDto,
    #[serde(default)]
    pub trace: TraceDto,
    pub traffic: TrafficDto,
    pub physical_topology: PhysicalTopologyDto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsaDto {
    /// `FIPP` or `ImageRCSA`.
    pub module: String,
    #[serde(default = "default_k_paths")]
    pub k_paths: usize,
    /// Only read by ImageRCSA: also reserve spectrum on the dedicated backup path.
    #[serde(default)]
    pub reserve_backup: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceDto {
    pub enabled: bool,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficDto {
    /// Number of flows generated per run.
    pub calls: usize,
    /// Offered load in Erlang.
    pub load: f64,
    pub max_rate: Option<f64>,
    pub call_types: Vec<CallTypeDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTypeDto {
    pub rate: f64,
    pub holding_time: f64,
    pub weight: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalTopologyDto {
    pub nodes: usize,
    pub cores: usize,
    pub slots: usize,
    pub slot_capacity: f64,
    pub links: Vec<LinkDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDto {
    pub source: usize,
    pub destination: usize,
    pub weight: f64,
    #[serde(default = "default_true")]
    pub bidirectional: bool,
}
