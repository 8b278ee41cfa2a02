//! The two instantiations of the step: create and delete.
//!
//! Both share the datacenter and name checks. Create appends listener checks,
//! delete ignores ports entirely.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use workflow_step::{Subjects, Validator};

use crate::event::ElbEvent;

pub const VPC_INVALID: &str = "Datacenter VPC ID invalid";
pub const REGION_INVALID: &str = "Datacenter Region invalid";
pub const CREDENTIALS_INVALID: &str = "Datacenter credentials invalid";
pub const NAME_INVALID: &str = "ELB name is invalid";
pub const PORTS_MISSING: &str = "ELB must contain at least one port";
pub const PORT_OUT_OF_RANGE: &str = "ELB port is out of range [1 - 65535]";
pub const PROTOCOL_INVALID: &str = "ELB protocol is invalid";

/// Listener protocols classic load balancers accept.
pub const PROTOCOLS: [&str; 4] = ["HTTP", "HTTPS", "TCP", "SSL"];

#[derive(Debug, Error)]
#[error("unknown ELB operation '{0}', expected 'create' or 'delete'")]
pub struct UnknownOperation(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElbOperation {
    Create,
    Delete,
}

impl ElbOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElbOperation::Create => "create",
            ElbOperation::Delete => "delete",
        }
    }

    /// Subjects for this operation, e.g. `elb.delete.aws`.
    pub fn subjects(&self, resource: &str, provider: &str) -> Subjects {
        Subjects::new(resource, self.as_str(), provider)
    }

    /// Ordered validation rules for this operation.
    pub fn validator(&self) -> Validator<ElbEvent> {
        match self {
            ElbOperation::Create => common_checks().extend(listener_checks()),
            ElbOperation::Delete => common_checks(),
        }
    }
}

impl fmt::Display for ElbOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElbOperation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(ElbOperation::Create),
            "delete" => Ok(ElbOperation::Delete),
            other => Err(UnknownOperation(other.to_string())),
        }
    }
}

/// Checks every instantiation runs, in this order.
pub fn common_checks() -> Validator<ElbEvent> {
    Validator::new()
        .require(VPC_INVALID, |e: &ElbEvent| !e.vpc_id.is_empty())
        .require(REGION_INVALID, |e: &ElbEvent| !e.datacenter_region.is_empty())
        // Secret and token share one message.
        .require(CREDENTIALS_INVALID, |e: &ElbEvent| !e.datacenter_secret.is_empty())
        .require(CREDENTIALS_INVALID, |e: &ElbEvent| !e.datacenter_token.is_empty())
        .require(NAME_INVALID, |e: &ElbEvent| !e.name.is_empty())
}

fn listener_checks() -> Validator<ElbEvent> {
    Validator::new()
        .require(PORTS_MISSING, |e: &ElbEvent| !e.ports.is_empty())
        .require(PORT_OUT_OF_RANGE, |e: &ElbEvent| {
            e.ports
                .iter()
                .all(|p| (1..=65535).contains(&p.from_port) && (1..=65535).contains(&p.to_port))
        })
        .require(PROTOCOL_INVALID, |e: &ElbEvent| {
            e.ports
                .iter()
                .all(|p| PROTOCOLS.iter().any(|known| known.eq_ignore_ascii_case(&p.protocol)))
        })
}
