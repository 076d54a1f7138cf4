//! Database models for the Titik Kasir POS platform
//!
//! Re-exports the domain vocabulary from the shared crate; row types live
//! next to the services that query them.

pub use shared::models::*;
