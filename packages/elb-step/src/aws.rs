//! AWS classic load balancer executor.
//!
//! One SDK client (and HTTP connector) serves every event. Each event carries
//! its own datacenter region and credentials, which are applied as a per-request
//! config override: the secret is the access key id and the token is the secret
//! access key.

use async_trait::async_trait;
use aws_sdk_elasticloadbalancing::config::{self, BehaviorVersion, Credentials, Region};
use aws_sdk_elasticloadbalancing::error::DisplayErrorContext;
use aws_sdk_elasticloadbalancing::types::{Instance, Listener};
use aws_sdk_elasticloadbalancing::{Client, Config};
use tracing::{debug, info};
use workflow_step::{ActionError, Executor};

use crate::event::{ElbEvent, Port};
use crate::operation::ElbOperation;

const CREDENTIALS_PROVIDER: &str = "elb-step-event";

/// Scheme for load balancers reachable only from inside the VPC.
const INTERNAL_SCHEME: &str = "internal";

/// Performs the create or delete call against the ELB API.
#[derive(Debug, Clone)]
pub struct AwsElbExecutor {
    operation: ElbOperation,
    client: Client,
}

impl AwsElbExecutor {
    pub fn new(operation: ElbOperation) -> Self {
        let config = Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .build();
        Self {
            operation,
            client: Client::from_conf(config),
        }
    }

    async fn create(&self, event: &ElbEvent) -> Result<(), ActionError> {
        let listeners = event
            .ports
            .iter()
            .map(listener)
            .collect::<Result<Vec<_>, _>>()?;

        let mut request = self
            .client
            .create_load_balancer()
            .load_balancer_name(&event.name)
            .set_listeners(Some(listeners))
            .set_subnets(Some(event.network_aws_ids.clone()))
            .set_security_groups(Some(event.security_group_aws_ids.clone()));
        if event.is_private {
            request = request.scheme(INTERNAL_SCHEME);
        }

        let output = request
            .customize()
            .config_override(event_config(event))
            .send()
            .await
            .map_err(sdk_error)?;
        debug!(
            name = %event.name,
            dns_name = output.dns_name().unwrap_or_default(),
            "load balancer created"
        );

        if event.instance_aws_ids.is_empty() {
            return Ok(());
        }

        let instances = event
            .instance_aws_ids
            .iter()
            .map(|id| Instance::builder().instance_id(id).build())
            .collect::<Vec<_>>();

        self.client
            .register_instances_with_load_balancer()
            .load_balancer_name(&event.name)
            .set_instances(Some(instances))
            .customize()
            .config_override(event_config(event))
            .send()
            .await
            .map_err(sdk_error)?;

        Ok(())
    }

    async fn delete(&self, event: &ElbEvent) -> Result<(), ActionError> {
        self.client
            .delete_load_balancer()
            .load_balancer_name(&event.name)
            .customize()
            .config_override(event_config(event))
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }
}

#[async_trait]
impl Executor<ElbEvent> for AwsElbExecutor {
    async fn execute(&self, event: &ElbEvent) -> Result<(), ActionError> {
        info!(
            operation_id = %event.uuid,
            operation = %self.operation,
            name = %event.name,
            region = %event.datacenter_region,
            "calling ELB API"
        );

        match self.operation {
            ElbOperation::Create => self.create(event).await,
            ElbOperation::Delete => self.delete(event).await,
        }
    }
}

/// Region and static credentials taken from the event.
fn event_config(event: &ElbEvent) -> config::Builder {
    let credentials = Credentials::new(
        event.datacenter_secret.clone(),
        event.datacenter_token.clone(),
        None,
        None,
        CREDENTIALS_PROVIDER,
    );
    Config::builder()
        .region(Region::new(event.datacenter_region.clone()))
        .credentials_provider(credentials)
}

/// Listener for a port mapping; the instance side uses the same protocol.
fn listener(port: &Port) -> Result<Listener, ActionError> {
    let protocol = port.protocol.to_ascii_uppercase();
    Listener::builder()
        .protocol(&protocol)
        .load_balancer_port(port_number(port.from_port)?)
        .instance_protocol(&protocol)
        .instance_port(port_number(port.to_port)?)
        .set_ssl_certificate_id(port.ssl_cert.clone())
        .build()
        .map_err(|e| ActionError::new(e.to_string()))
}

fn port_number(port: i64) -> Result<i32, ActionError> {
    i32::try_from(port).map_err(|_| ActionError::new(format!("port {} does not fit a listener", port)))
}

fn sdk_error<E>(err: E) -> ActionError
where
    E: std::error::Error,
{
    ActionError::new(DisplayErrorContext(err).to_string())
}
