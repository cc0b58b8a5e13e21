//! Network communication layer for the key-checkout kiosk
//!
//! This crate provides the [`StatusClient`] contract between the
//! reconciliation engine and the authority server, an HTTP implementation,
//! and a scripted mock.
//!
//! # Components
//!
//! - **HttpStatusClient**: reqwest client for the key status and event endpoints
//! - **MockStatusClient**: scripted responses plus an optional simulated server
//!
//! # Example
//!
//! ```no_run
//! use keybox_network::{HttpStatusClient, HttpStatusClientConfig, StatusClient};
//! use keybox_core::{ApiKey, DeviceId};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpStatusClientConfig::new(
//!     "http://127.0.0.1:3000".parse()?,
//!     DeviceId::new("esp32-matik-registration")?,
//!     ApiKey::new("device-secret")?,
//! )
//! .with_timeout(Duration::from_millis(3000));
//!
//! let mut client = HttpStatusClient::new(config)?;
//! let key_taken = client.fetch_key_state().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod mock;
pub mod wire;

pub use client::{HttpStatusClient, HttpStatusClientConfig, StatusClient};
pub use error::{NetworkError, Result};
pub use mock::{MockStatusClient, StatusCall};
