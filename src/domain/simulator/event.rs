use std::fmt;

use crate::domain::flow::Flow;
use crate::domain::utils::id::FlowId;

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A new demand asks for admission.
    Arrival(Flow),

    /// The holding time of a flow is over. Carries only the id, the control plane
    /// keeps the accepted flow itself.
    Departure(FlowId),
}

/// A timestamped simulation event. Only the logical order of the timestamps matters.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub time: f64,
    pub kind: EventKind,
}

impl Event {
    pub fn arrival(time: f64, flow: Flow) -> Self {
        Self { time, kind: EventKind::Arrival(flow) }
    }

    pub fn departure(time: f64, flow_id: FlowId) -> Self {
        Self { time, kind: EventKind::Departure(flow_id) }
    }

    pub fn flow_id(&self) -> FlowId {
        match &self.kind {
            EventKind::Arrival(flow) => flow.get_id(),
            EventKind::Departure(flow_id) => *flow_id,
        }
    }

    pub fn is_arrival(&self) -> bool {
        matches!(self.kind, EventKind::Arrival(_))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EventKind::Arrival(flow) => write!(f, "a {} {}", self.time, flow),
            EventKind::Departure(flow_id) => write!(f, "d {} {}", self.time, flow_id),
        }
    }
}
