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

//! File and environment backed configuration for the directory console.
//!
//! Layout: `model.rs` (typed settings), `validate.rs` (field parsing and
//! validation), `loader.rs` (file + `LWCONSOLE_*` overrides), `error.rs`.

pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ENV_PREFIX, load, load_from_file};
pub use model::{ConsoleConfig, DEFAULT_API_PORT, LogoutSettings, RootDnResolution};
