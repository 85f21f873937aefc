//! HTTP transport seam and its reqwest implementation.
//!
//! # Design
//! - Transport failures are tagged at the source so callers never sniff shapes.
//! - Non-2xx responses are failures; the body of an error response is dropped.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::auth::AuthHeader;
use crate::error::{ConsoleError, ConsoleResult};

/// Header carrying the per-process request identifier.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// Successful directory response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded JSON body (`Null` when the body was empty).
    pub body: Value,
}

/// Failure reported by an [`HttpTransport`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request never produced a response (connect failure, timeout, reset).
    #[error("{message}")]
    Network {
        /// Transport-level description.
        message: String,
    },
    /// The server answered with a non-success status.
    #[error("{status} - {status_text}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Reason phrase for the status.
        status_text: String,
    },
    /// The response body could not be decoded.
    #[error("{message}")]
    Decode {
        /// Decoder description.
        message: String,
    },
    /// Anything the transport could not classify.
    #[error("Server error")]
    Unknown,
}

/// Outbound HTTP seam used by the console services.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET carrying `header`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] describing why no usable response arrived.
    async fn get(&self, url: &Url, header: &AuthHeader) -> Result<HttpResponse, TransportError>;
}

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Wrap an existing client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client with the console's timeout, certificate policy, and
    /// request identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::HttpClient`] if the client cannot be built, or
    /// [`ConsoleError::InvalidRequestId`] for an unusable request identifier.
    pub fn with_settings(
        timeout: Duration,
        accept_invalid_certs: bool,
        request_id: &str,
    ) -> ConsoleResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(request_id).map_err(|_| {
            ConsoleError::InvalidRequestId {
                value: request_id.to_string(),
            }
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .default_headers(default_headers)
            .build()
            .map_err(|source| ConsoleError::HttpClient { source })?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url, header: &AuthHeader) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, header.value())
            .send()
            .await
            .map_err(|err| classify_send_error(&err))?;

        let status = response.status();
        debug!(%url, status = status.as_u16(), "directory responded");
        if !status.is_success() {
            return Err(TransportError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| classify_send_error(&err))?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|err| TransportError::Decode {
                message: format!("failed to parse directory response: {err}"),
            })?
        };

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn classify_send_error(err: &reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Network {
            message: "timeout".to_string(),
        }
    } else if let Some(status) = err.status() {
        TransportError::Http {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        }
    } else if err.is_connect() || err.is_request() || err.is_body() {
        TransportError::Network {
            message: err.to_string(),
        }
    } else {
        TransportError::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use serde_json::json;

    fn url_for(server: &MockServer, path: &str) -> Result<Url> {
        Ok(format!("{}{path}", server.base_url()).parse()?)
    }

    #[tokio::test]
    async fn get_sends_bearer_header_and_decodes_json() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/vmdir/ldap")
                .header("authorization", "Bearer tok")
                .header_exists(HEADER_REQUEST_ID);
            then.status(200)
                .json_body(json!({ "result": [{ "dn": "cn=schemacontext" }] }));
        });

        let transport = ReqwestTransport::with_settings(Duration::from_secs(5), false, "req-1")?;
        let response = transport
            .get(&url_for(&server, "/v1/vmdir/ldap")?, &AuthHeader::bearer("tok"))
            .await?;

        mock.assert();
        assert_eq!(response.status, 200);
        assert_eq!(response.body["result"][0]["dn"], "cn=schemacontext");
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_becomes_http_error() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/v1/vmdir/ldap");
            then.status(404).body("missing");
        });

        let transport = ReqwestTransport::new(Client::new());
        let err = transport
            .get(&url_for(&server, "/v1/vmdir/ldap")?, &AuthHeader::bearer("tok"))
            .await
            .err();

        assert_eq!(
            err,
            Some(TransportError::Http {
                status: 404,
                status_text: "Not Found".to_string(),
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn invalid_json_becomes_decode_error() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/v1/vmdir/ldap");
            then.status(200).body("<html>");
        });

        let transport = ReqwestTransport::new(Client::new());
        let err = transport
            .get(&url_for(&server, "/v1/vmdir/ldap")?, &AuthHeader::bearer("tok"))
            .await
            .err();

        assert!(matches!(err, Some(TransportError::Decode { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn empty_body_decodes_to_null() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/v1/vmdir/ldap");
            then.status(204);
        });

        let transport = ReqwestTransport::new(Client::new());
        let response = transport
            .get(&url_for(&server, "/v1/vmdir/ldap")?, &AuthHeader::bearer("tok"))
            .await?;
        assert_eq!(response.status, 204);
        assert_eq!(response.body, Value::Null);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_host_becomes_network_error() -> Result<()> {
        let transport = ReqwestTransport::new(Client::new());
        let err = transport
            .get(
                &"http://127.0.0.1:9/v1/vmdir/ldap".parse()?,
                &AuthHeader::bearer("tok"),
            )
            .await
            .err();
        assert!(matches!(err, Some(TransportError::Network { .. })));
        Ok(())
    }

    #[test]
    fn request_id_must_be_header_safe() {
        let result = ReqwestTransport::with_settings(Duration::from_secs(1), false, "bad\nid");
        assert!(matches!(result, Err(ConsoleError::InvalidRequestId { .. })));
    }
}
