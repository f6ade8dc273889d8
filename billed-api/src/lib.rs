//! billed-api: HTTP client for the billing REST API

pub mod client;

pub use client::{ClientError, HttpStore};
