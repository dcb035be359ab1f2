//! NanoCanvas Remote
//!
//! HTTP client for the image and video generation service.

mod client;
mod config;
mod error;

pub use client::{HttpGenerationClient, UsageEvent, UsageOperation, UsageStatus};
pub use config::{RemoteConfig, RemoteTimeouts};
pub use error::RemoteError;
