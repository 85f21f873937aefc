//! Directory schema retrieval.
//!
//! # Design
//! - `get_schema` resolves session context eagerly so session faults surface
//!   at the call site, then hands back a lazy [`SchemaFetch`].
//! - A `SchemaFetch` wraps one request in a shared future: every clone awaits
//!   the same GET. Separate `get_schema` calls never share.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};
use std::task::{Context, Poll};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use reqwest::Url;
use tracing::debug;

use crate::auth::AuthService;
use crate::dn;
use crate::error::{ConsoleError, ConsoleResult, RequestError};
use crate::transport::{HttpResponse, HttpTransport};

/// REST path of the LDAP search endpoint.
pub const LDAP_PATH: &str = "/v1/vmdir/ldap";

type SchemaOutcome = Result<Arc<HttpResponse>, RequestError>;
type ListingSlot = Arc<RwLock<Option<Arc<HttpResponse>>>>;

/// Build the schema lookup URL for `root_dn` on `server:api_port`.
///
/// The DN clause is percent-encoded except for RFC 3986 unreserved
/// characters, so `!'()*` are escaped as well.
#[must_use]
pub fn schema_url(server: &str, api_port: u16, root_dn: &str) -> String {
    format!(
        "https://{server}:{api_port}{LDAP_PATH}?dn={}",
        urlencoding::encode(&dn::schema_dn(root_dn))
    )
}

/// Handle to one in-flight schema request.
///
/// The request starts when the handle (or any clone) is first polled. All
/// clones resolve to the same response `Arc` or the same error.
#[derive(Clone)]
#[must_use = "the schema request is not sent until the fetch is awaited"]
pub struct SchemaFetch {
    url: String,
    inner: Shared<BoxFuture<'static, SchemaOutcome>>,
}

impl SchemaFetch {
    /// URL this fetch requests.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for SchemaFetch {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SchemaFetch")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl Future for SchemaFetch {
    type Output = SchemaOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

/// Fetches schema metadata for directory roots.
pub struct VmdirSchemaService {
    auth: Arc<AuthService>,
    transport: Arc<dyn HttpTransport>,
    api_port: u16,
    listing: ListingSlot,
}

impl fmt::Debug for VmdirSchemaService {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("VmdirSchemaService")
            .field("api_port", &self.api_port)
            .field("has_listing", &self.listing().is_some())
            .finish_non_exhaustive()
    }
}

impl VmdirSchemaService {
    /// Create a service issuing requests through `transport`.
    #[must_use]
    pub fn new(auth: Arc<AuthService>, transport: Arc<dyn HttpTransport>, api_port: u16) -> Self {
        Self {
            auth,
            transport,
            api_port,
            listing: Arc::new(RwLock::new(None)),
        }
    }

    /// Start a schema lookup for `root_dn`.
    ///
    /// Every call builds a new request, even for a root DN fetched before.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Session`] when the session cannot supply the
    /// server or header, and [`ConsoleError::InvalidUrl`] when the server
    /// name does not form a valid URL. Transport failures are delivered
    /// through the returned [`SchemaFetch`].
    pub fn get_schema(&self, root_dn: &str) -> ConsoleResult<SchemaFetch> {
        let server = self.auth.post_server()?;
        let header = self.auth.get_auth_header()?;
        let raw = schema_url(&server, self.api_port, root_dn);
        debug!(root_dn, url = %raw, "requesting directory schema");

        let url = Url::parse(&raw).map_err(|source| ConsoleError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;
        let transport = Arc::clone(&self.transport);
        let listing = Arc::clone(&self.listing);

        let request = async move {
            match transport.get(&url, &header).await {
                Ok(response) => {
                    let response = Arc::new(response);
                    *listing.write().unwrap_or_else(PoisonError::into_inner) =
                        Some(Arc::clone(&response));
                    Ok(response)
                }
                Err(err) => Err(AuthService::handle_error(&err)),
            }
        };

        Ok(SchemaFetch {
            url: raw,
            inner: request.boxed().shared(),
        })
    }

    /// Last successful response, if any request has completed.
    #[must_use]
    pub fn listing(&self) -> Option<Arc<HttpResponse>> {
        self.listing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
