//! Command handlers.

pub(crate) mod schema;
pub(crate) mod session;
