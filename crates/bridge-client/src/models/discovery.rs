use serde::{Deserialize, Serialize};

/// Read-only record describing one routable agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub username: String,
    /// Service the agent is currently backed by.
    pub service_id: String,
    pub service_type: String,
}

/// Read-only record describing one backing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AgentsResponse {
    pub agents: Vec<AgentInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ServicesResponse {
    pub services: Vec<ServiceInfo>,
}
