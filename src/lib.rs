//! Rust library for discovering Roku media devices on the local network
//!
//! This library implements the discovery half of a smart-home gateway
//! integration for Roku media players. It supports:
//!
//! - Discovery via SSDP (M-SEARCH for the `roku:ecp` service type)
//! - A device registry with idempotent, success-gated registration
//! - One-way device-added notifications to a host device manager
//! - Adapter registration with a host platform from a typed manifest
//! - Real-time update subscriptions for newly registered devices
//!
//! Device control (sending remote commands, playing media) and persistence
//! of discovered devices are out of scope.
//!
//! # Quick Start
//!
//! ```no_run
//! use roku_adapter::{
//!     AdapterManager, DeviceHandler, DiscoveredDevice, Manifest, RokuAdapter,
//! };
//! use std::sync::Arc;
//!
//! struct Gateway;
//!
//! impl AdapterManager for Gateway {
//!     fn add_adapter(&self, id: &str, name: &str) {
//!         println!("Adapter registered: {} ({})", id, name);
//!     }
//! }
//!
//! impl DeviceHandler for Gateway {
//!     fn handle_device_added(&self, device: &DiscoveredDevice) {
//!         println!("Device added: {} at {}", device.id, device.address());
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = Arc::new(Gateway);
//!     let manifest = Manifest::from_json(r#"{"id": "roku-adapter", "name": "Roku"}"#)?;
//!
//!     let mut adapter = RokuAdapter::new(gateway.as_ref(), gateway.clone(), &manifest);
//!     adapter.start().await?;
//!
//!     // Wait for devices to answer the search
//!     tokio::time::sleep(tokio::time::Duration::from_secs(3)).await;
//!
//!     for device in adapter.devices() {
//!         println!("Found {} at {}", device.id, device.address());
//!     }
//!
//!     adapter.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The library is organized into several layers:
//!
//! - **Adapter**: host integration seams and adapter registration
//! - **Discovery**: SSDP search session management
//! - **Registry**: the device collection and registration rules
//! - **Ssdp**: M-SEARCH framing and response parsing over UDP multicast
//! - **Types**: device records, key derivation, and the manifest

mod adapter;
mod discovery;
mod error;
mod registry;
mod ssdp;
mod subscription;
mod types;

// Public exports
pub use adapter::{AdapterManager, RokuAdapter};
pub use discovery::Discovery;
pub use error::{Result, RokuError};
pub use registry::{DeviceHandler, DeviceRegistry};
pub use ssdp::{
    build_search, parse_response, SearchResponse, SsdpClient, ROKU_SERVICE_TYPE,
    SSDP_MULTICAST_ADDR, SSDP_PORT,
};
pub use subscription::UpdateReceiver;
pub use types::{device_key, DeviceId, DiscoveredDevice, Manifest};
