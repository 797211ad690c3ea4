//! HTTP implementation of the ShopIntel backend services.
//!
//! [`ApiClient`] talks to the REST API described by [`ClientConfig`] and
//! implements every service trait of `shopintel::services`.
//!
//! [`ClientConfig`]: shopintel::ClientConfig

mod client;
mod failure;
mod wire;

pub use client::ApiClient;
pub use failure::ApiFailure;
