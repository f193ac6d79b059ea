pub mod client;
pub mod error;

pub use client::ApiClient;
pub use cookai_api;
pub use error::ApiError;
pub use reqwest::StatusCode;
