//! End-to-end probes against a local HTTP backend speaking the REST surface.

use std::sync::{Arc, Mutex};

use messaging_health::azure::ClientError;
use messaging_health::health::{
    HealthCheck, HealthCheckContext, HealthChecksBuilder, HealthStatus, ProbeClients, RegistrationOptions,
    ResourceHealthCheck,
};

mod common;

fn no_proxy_clients() -> ProbeClients {
    ProbeClients::rest(reqwest::Client::builder().no_proxy().build().unwrap())
}

#[tokio::test]
async fn test_event_hub_probe_healthy() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_backend = seen.clone();
    let addr = common::start_programmable_backend(move |head| {
        let seen = seen_backend.clone();
        async move {
            seen.lock().unwrap().push(head);
            (200, common::atom_entry("myhub"))
        }
    })
    .await;

    let conn = common::emulator_connection_string(addr);
    let probe = ResourceHealthCheck::event_hub_with_name(&conn, "myhub", no_proxy_clients()).unwrap();

    let result = probe
        .check_health(&HealthCheckContext::new("hub", HealthStatus::Unhealthy))
        .await;
    assert!(result.is_healthy(), "unexpected result: {:?}", result);

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let head = &requests[0];
    assert!(head.starts_with("GET /myhub?api-version=2014-01 HTTP/1.1"), "{}", head);
    let auth = head
        .lines()
        .find(|l| l.to_ascii_lowercase().starts_with("authorization:"))
        .expect("authorization header");
    assert!(auth.contains("SharedAccessSignature sr="));
    assert!(auth.contains("skn=RootManageSharedAccessKey"));
}

#[tokio::test]
async fn test_subscription_path_and_missing_entity() {
    let paths = Arc::new(Mutex::new(Vec::new()));
    let paths_backend = paths.clone();
    let addr = common::start_programmable_backend(move |head| {
        let paths = paths_backend.clone();
        async move {
            let path = head.split_whitespace().nth(1).unwrap_or_default().to_string();
            paths.lock().unwrap().push(path);
            (200, common::atom_empty_feed())
        }
    })
    .await;

    let conn = common::emulator_connection_string(addr);
    let probe = ResourceHealthCheck::subscription(&conn, "events", "audit", no_proxy_clients()).unwrap();

    let result = probe
        .check_health(&HealthCheckContext::new("sub", HealthStatus::Degraded))
        .await;
    assert_eq!(result.status, HealthStatus::Degraded);
    assert!(matches!(result.client_error(), Some(ClientError::EntityNotFound { .. })));
    assert_eq!(
        paths.lock().unwrap().as_slice(),
        ["/events/Subscriptions/audit?api-version=2021-05".to_string()]
    );
}

#[tokio::test]
async fn test_error_status_reported() {
    let addr = common::start_programmable_backend(|_| async { (401, "<Error><Code>401</Code></Error>".to_string()) }).await;

    let conn = common::emulator_connection_string(addr);
    let probe = ResourceHealthCheck::queue(&conn, "orders", no_proxy_clients()).unwrap();

    let result = probe
        .check_health(&HealthCheckContext::new("queue", HealthStatus::Unhealthy))
        .await;
    match result.client_error() {
        Some(ClientError::Status { status, body }) => {
            assert_eq!(*status, 401);
            assert!(body.contains("<Code>401</Code>"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_entity_scoped_connection_string() {
    let paths = Arc::new(Mutex::new(Vec::new()));
    let paths_backend = paths.clone();
    let addr = common::start_programmable_backend(move |head| {
        let paths = paths_backend.clone();
        async move {
            let path = head.split_whitespace().nth(1).unwrap_or_default().to_string();
            paths.lock().unwrap().push(path);
            (200, common::atom_entry("orders"))
        }
    })
    .await;

    // Policies scoped to one entity hand out strings that already name it.
    let conn = format!("{};EntityPath=orders", common::emulator_connection_string(addr));
    let probe = ResourceHealthCheck::queue(&conn, "orders", no_proxy_clients()).unwrap();

    let result = probe
        .check_health(&HealthCheckContext::new("queue", HealthStatus::Unhealthy))
        .await;
    assert!(result.is_healthy(), "unexpected result: {:?}", result);
    assert_eq!(
        paths.lock().unwrap().as_slice(),
        ["/orders?api-version=2021-05".to_string()]
    );
}

#[tokio::test]
async fn test_unreachable_namespace_unhealthy() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let conn = common::emulator_connection_string(addr);
    let probe = ResourceHealthCheck::topic(&conn, "events", no_proxy_clients()).unwrap();

    let result = probe
        .check_health(&HealthCheckContext::new("topic", HealthStatus::Unhealthy))
        .await;
    assert_eq!(result.status, HealthStatus::Unhealthy);
    assert!(matches!(result.client_error(), Some(ClientError::Request(_))));
}

#[tokio::test]
async fn test_service_report_over_backend() {
    let addr = common::start_programmable_backend(|head| async move {
        if head.starts_with("GET /orders") {
            (200, common::atom_entry("orders"))
        } else {
            (500, "boom".to_string())
        }
    })
    .await;
    let conn = common::emulator_connection_string(addr);

    let mut builder = HealthChecksBuilder::new(no_proxy_clients());
    builder
        .add_azure_service_bus_queue(&conn, "orders", RegistrationOptions::default())
        .unwrap()
        .add_azure_service_bus_topic(
            &conn,
            "events",
            RegistrationOptions {
                failure_status: Some(HealthStatus::Degraded),
                ..Default::default()
            },
        )
        .unwrap();
    let service = builder.build();

    let report = service.check_health().await;
    assert_eq!(report.status, HealthStatus::Degraded);
    assert_eq!(report.entries["azurequeue"].status, HealthStatus::Healthy);
    let topic = &report.entries["azuretopic"];
    assert_eq!(topic.status, HealthStatus::Degraded);
    assert!(topic.error.as_deref().unwrap_or_default().contains("HTTP 500"));
}
