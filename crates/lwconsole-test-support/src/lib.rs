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

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (session records and seeded contexts), mocks.rs (fake transports).

pub mod fixtures;
pub mod mocks;
