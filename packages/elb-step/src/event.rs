//! The load-balancer event carried in and out of the step.

use std::fmt;

use serde::{Deserialize, Serialize};
use workflow_step::{null_as_default, Envelope};

/// A listener mapping from the balancer port to the instance port.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Port {
    #[serde(deserialize_with = "null_as_default")]
    pub from_port: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub to_port: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub protocol: String,
    /// TLS certificate id for HTTPS/SSL listeners.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_cert: Option<String>,
}

/// Request to create or delete a load balancer.
///
/// Field order is the canonical wire order. Missing and `null` fields decode
/// to their zero value; validation decides whether that is acceptable.
#[derive(Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElbEvent {
    #[serde(rename = "_uuid", deserialize_with = "null_as_default")]
    pub uuid: String,
    #[serde(rename = "_batch_id", deserialize_with = "null_as_default")]
    pub batch_id: String,
    #[serde(rename = "_type", deserialize_with = "null_as_default")]
    pub provider_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub vpc_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub datacenter_region: String,
    #[serde(deserialize_with = "null_as_default")]
    pub datacenter_secret: String,
    #[serde(deserialize_with = "null_as_default")]
    pub datacenter_token: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_private: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub ports: Vec<Port>,
    #[serde(deserialize_with = "null_as_default")]
    pub network_aws_ids: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub instance_aws_ids: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub security_group_aws_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope for ElbEvent {
    fn operation_id(&self) -> &str {
        &self.uuid
    }

    fn batch_id(&self) -> &str {
        &self.batch_id
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn attach_error(&mut self, message: String) {
        self.error = Some(message);
    }

    fn clear_error(&mut self) {
        self.error = None;
    }
}

// Credentials stay out of logs.
impl fmt::Debug for ElbEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElbEvent")
            .field("uuid", &self.uuid)
            .field("batch_id", &self.batch_id)
            .field("provider_type", &self.provider_type)
            .field("vpc_id", &self.vpc_id)
            .field("datacenter_region", &self.datacenter_region)
            .field("datacenter_secret", &"<redacted>")
            .field("datacenter_token", &"<redacted>")
            .field("name", &self.name)
            .field("is_private", &self.is_private)
            .field("ports", &self.ports)
            .field("network_aws_ids", &self.network_aws_ids)
            .field("instance_aws_ids", &self.instance_aws_ids)
            .field("security_group_aws_ids", &self.security_group_aws_ids)
            .field("error", &self.error)
            .finish()
    }
}
