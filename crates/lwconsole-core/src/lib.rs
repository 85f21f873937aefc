#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(unused, dead_code, unreachable_pub)]

//! Client services for the Lightwave directory console.
//!
//! Layout:
//! - `session.rs`: session record, store trait, memory and file stores
//! - `auth.rs`: `AuthService` (bearer header, root DN context, logout intent)
//! - `dn.rs`: DN and logout URL helpers
//! - `transport.rs`: `HttpTransport` seam and the reqwest implementation
//! - `schema.rs`: `VmdirSchemaService` and its shared fetch handle
//! - `services.rs`: wiring from a `ConsoleConfig`
//! - `error.rs`: request error normalisation and the crate error type

pub mod auth;
pub mod dn;
pub mod error;
pub mod schema;
pub mod services;
pub mod session;
pub mod transport;

pub use auth::{AuthHeader, AuthService, LogoutIntent};
pub use error::{ConsoleError, ConsoleResult, RequestError, normalize_message};
pub use schema::{SchemaFetch, VmdirSchemaService, schema_url};
pub use services::ConsoleServices;
pub use session::{
    FileSessionStore, MemorySessionStore, SIGNED_OUT_MARKER, ServerEndpoint, SessionContext,
    SessionError, SessionRecord, SessionResult, SessionStore, TokenSet,
};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};
