use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Protocols offered for port mappings, in display order.
pub const PROTOCOLS: [&str; 2] = ["TCP", "UDP"];

#[derive(Serialize, Deserialize, Debug)]
pub struct KubectlList<T> {
    pub items: Vec<T>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Namespace {
    pub metadata: Metadata,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Metadata {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReplicaSet {
    pub metadata: Metadata,
    #[serde(default)]
    pub status: ReplicaSetStatus,
}
impl Display for ReplicaSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}/{} ready)",
            self.metadata.name, self.status.ready_replicas, self.status.replicas
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaSetStatus {
    #[serde(default)]
    pub replicas: u32,
    #[serde(default)]
    pub ready_replicas: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub port: Option<u16>,
    pub target_port: Option<u16>,
    pub protocol: String,
}
impl PortMapping {
    pub fn empty(protocol: &str) -> Self {
        Self {
            port: None,
            target_port: None,
            protocol: protocol.to_owned(),
        }
    }

    /// True only when both ports are set and non-zero. Rows with a single port are
    /// treated like untouched rows and left out of the payload.
    pub fn is_filled(&self) -> bool {
        self.port.is_some_and(|p| p != 0) && self.target_port.is_some_and(|p| p != 0)
    }

    pub fn is_blank(&self) -> bool {
        self.port.is_none() && self.target_port.is_none()
    }

    /// Some input was given but the row will still be left out of the payload.
    pub fn is_partial(&self) -> bool {
        !self.is_blank() && !self.is_filled()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeploymentLabel {
    pub key: String,
    pub value: String,
}

/// Payload accepted by the app deployment endpoint. Field names and nullability are part
/// of the server contract.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    pub container_image: String,
    pub container_command: Option<String>,
    pub container_command_args: Option<String>,
    pub is_external: bool,
    pub name: String,
    pub description: Option<String>,
    pub port_mappings: Vec<PortMapping>,
    pub replicas: u32,
    pub namespace: Option<String>,
    pub labels: Vec<DeploymentLabel>,
}
