//! Shared driver plumbing.

#[cfg(feature = "postgres")]
pub mod tls;

#[cfg(feature = "postgres")]
pub use tls::{make_connector, SslMode};
