//! Client-side core of the clinic app: session lifecycle, the in-memory
//! domain cache and the REST client that feeds both.

pub mod api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod logging;
pub mod mvi;
pub mod session;
pub mod storage;
pub mod store;

pub use store::{ClinicStore, CreatedDoctor, StoreError};
