//! Quote source backed by the FCS API `latest` endpoint.

pub mod client;
pub mod errors;
pub mod mapper;
pub mod types;

pub use client::FcsClient;
pub use errors::QuoteError;
pub use types::*;
