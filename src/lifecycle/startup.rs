//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn validated configuration into registrations
//! - Build the health service the monitor and endpoint share
//!
//! # Design Decisions
//! - Fail fast: the first setup error aborts startup
//! - One client registry per service

use crate::config::{AppConfig, CheckConfig, CheckKind};
use crate::health::{HealthCheckService, HealthChecksBuilder, ProbeClients, SetupError};

/// Register every configured check on `builder`.
pub fn register_checks(config: &AppConfig, builder: &mut HealthChecksBuilder) -> Result<(), SetupError> {
    for check in &config.checks {
        register_check(check, builder)?;
        tracing::info!(
            name = check.effective_name(),
            kind = ?check.kind,
            "Health check configured"
        );
    }
    Ok(())
}

fn register_check(check: &CheckConfig, builder: &mut HealthChecksBuilder) -> Result<(), SetupError> {
    let options = check.registration_options();
    let conn = check.connection_string.as_str();

    match check.kind {
        CheckKind::EventHub => {
            builder.add_azure_event_hub(conn, check.event_hub_name.as_deref(), options)?;
        }
        CheckKind::Queue => {
            builder.add_azure_service_bus_queue(conn, required(check.queue_name.as_deref()), options)?;
        }
        CheckKind::Topic => {
            builder.add_azure_service_bus_topic(conn, required(check.topic_name.as_deref()), options)?;
        }
        CheckKind::Subscription => {
            builder.add_azure_service_bus_subscription(
                conn,
                required(check.topic_name.as_deref()),
                required(check.subscription_name.as_deref()),
                options,
            )?;
        }
    }
    Ok(())
}

/// Missing names become empty so the probe constructor reports them.
fn required(value: Option<&str>) -> &str {
    value.unwrap_or_default()
}

/// Build the service for `config` over `clients`.
pub fn build_service(config: &AppConfig, clients: ProbeClients) -> Result<HealthCheckService, SetupError> {
    let mut builder = HealthChecksBuilder::new(clients);
    register_checks(config, &mut builder)?;
    Ok(builder.build())
}
