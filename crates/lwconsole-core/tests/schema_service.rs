use std::sync::Arc;

use anyhow::{Result, anyhow};
use lwconsole_config::{ConsoleConfig, RootDnResolution};
use lwconsole_core::{ConsoleServices, HttpTransport, SIGNED_OUT_MARKER, TransportError};
use lwconsole_test_support::fixtures::{
    SAMPLE_HOST, SAMPLE_TOKEN, raw_session, record_for, sample_record, signed_in_session,
};
use lwconsole_test_support::mocks::RecordingTransport;

fn services_with(transport: Arc<RecordingTransport>) -> Result<ConsoleServices> {
    let session = signed_in_session(&sample_record())?;
    let transport: Arc<dyn HttpTransport> = transport;
    Ok(ConsoleServices::with_parts(
        &ConsoleConfig::default(),
        session,
        transport,
    ))
}

#[tokio::test]
async fn concurrent_awaiters_share_one_request() -> Result<()> {
    let transport = Arc::new(RecordingTransport::gated());
    let services = services_with(transport.clone())?;

    let fetch = services.schema.get_schema("dc=example,dc=com")?;
    let first = tokio::spawn(fetch.clone());
    let second = tokio::spawn(fetch);

    while transport.started() == 0 {
        tokio::task::yield_now().await;
    }
    transport.release();

    let first = first.await??;
    let second = second.await??;

    assert_eq!(transport.started(), 1);
    assert_eq!(transport.requests().len(), 1);
    assert!(Arc::ptr_eq(&first, &second));
    Ok(())
}

#[tokio::test]
async fn request_targets_api_port_with_bearer_header() -> Result<()> {
    let transport = Arc::new(RecordingTransport::new());
    let services = services_with(transport.clone())?;

    let fetch = services.schema.get_schema("dc=test,dc=com")?;
    assert_eq!(
        fetch.url(),
        format!(
            "https://{SAMPLE_HOST}:7478/v1/vmdir/ldap\
             ?dn=cn%3Ddc%3Dtest%2Cdc%3Dcom%2Ccn%3Dschemacontext"
        )
    );
    let response = fetch.await?;
    assert_eq!(response.status, 200);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, fetch_url_for("dc=test,dc=com"));
    assert_eq!(requests[0].authorization, format!("Bearer {SAMPLE_TOKEN}"));

    let listing = services
        .schema
        .listing()
        .ok_or_else(|| anyhow!("listing not recorded"))?;
    assert_eq!(listing.body["result"][0]["dn"], "cn=schemacontext");
    Ok(())
}

fn fetch_url_for(root_dn: &str) -> String {
    lwconsole_core::schema_url(SAMPLE_HOST, 7478, root_dn)
}

#[tokio::test]
async fn status_failure_yields_status_message() -> Result<()> {
    let transport = Arc::new(RecordingTransport::new());
    transport.push_failure(TransportError::Http {
        status: 404,
        status_text: "Not Found".to_string(),
    });
    let services = services_with(transport)?;

    let outcome = services.schema.get_schema("dc=test,dc=com")?.await;
    let error = outcome.err().ok_or_else(|| anyhow!("expected failure"))?;
    assert_eq!(error.message(), "404 - Not Found");
    Ok(())
}

#[tokio::test]
async fn message_failure_takes_priority() -> Result<()> {
    let transport = Arc::new(RecordingTransport::new());
    transport.push_failure(TransportError::Network {
        message: "timeout".to_string(),
    });
    let services = services_with(transport)?;

    let outcome = services.schema.get_schema("dc=test,dc=com")?.await;
    let error = outcome.err().ok_or_else(|| anyhow!("expected failure"))?;
    assert_eq!(error.message(), "timeout");
    Ok(())
}

#[tokio::test]
async fn failure_keeps_previous_listing() -> Result<()> {
    let transport = Arc::new(RecordingTransport::new());
    let services = services_with(transport.clone())?;

    let first = services.schema.get_schema("dc=example,dc=com")?.await?;
    transport.push_failure(TransportError::Unknown);
    let outcome = services.schema.get_schema("dc=example,dc=com")?.await;

    assert_eq!(
        outcome.err().map(|err| err.message().to_string()).as_deref(),
        Some("Server error")
    );
    let listing = services
        .schema
        .listing()
        .ok_or_else(|| anyhow!("listing cleared"))?;
    assert!(Arc::ptr_eq(&listing, &first));
    assert_eq!(transport.requests().len(), 2);
    Ok(())
}

#[test]
fn header_is_memoized_across_session_changes() -> Result<()> {
    let services = services_with(Arc::new(RecordingTransport::new()))?;

    let first = services.auth.get_auth_header()?;
    services
        .session
        .sign_in(&record_for("other.example.com", "other.org", "rotated"))?;
    let second = services.auth.get_auth_header()?;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(services.auth.post_server()?, SAMPLE_HOST);
    assert_eq!(services.auth.token()?, "rotated");
    Ok(())
}

#[test]
fn root_dn_query_follows_constructed_username() {
    let services = ConsoleServices::with_parts(
        &ConsoleConfig {
            root_dn_resolution: RootDnResolution::Memoized,
            ..ConsoleConfig::default()
        },
        raw_session(SIGNED_OUT_MARKER),
        Arc::new(RecordingTransport::new()),
    );

    services.auth.construct_root_dn_query("user@example.com");
    assert_eq!(services.auth.root_dn().ok().as_deref(), Some("example.com"));
    assert_eq!(
        services.auth.root_dn_query().as_deref(),
        Some("dc=example,dc=com")
    );
}

#[test]
fn logout_always_leaves_marker() -> Result<()> {
    for session in [
        signed_in_session(&sample_record())?,
        raw_session("{\"server\":"),
        raw_session(SIGNED_OUT_MARKER),
    ] {
        let services = ConsoleServices::with_parts(
            &ConsoleConfig::default(),
            session,
            Arc::new(RecordingTransport::new()),
        );
        let intent = services.auth.logout("idp.example.com")?;
        assert!(intent.url.starts_with("https://idp.example.com/openidconnect/logout/"));
        assert_eq!(services.session.raw()?.as_deref(), Some(SIGNED_OUT_MARKER));
    }
    Ok(())
}
