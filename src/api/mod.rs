//! REST client for the clinic backend.

mod client;
mod envelope;
mod error;

pub use client::{ApiClient, LoginGrant};
pub use error::ApiError;
