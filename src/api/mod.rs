pub mod client;
pub mod error;
pub mod models;

pub use client::{ApiClient, Backend, PROVIDER_HEADER};
pub use error::ApiError;
