use crate::error::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Device identifier
pub type DeviceId = String;

/// Derive the registry key for a device from its IP address
///
/// The key is a pure function of the address: the same address always maps
/// to the same key, and distinct addresses map to distinct keys.
pub fn device_key(ip: &str) -> DeviceId {
    format!("roku{}", ip)
}

/// A Roku device found on the local network
///
/// Created on the first discovery response from a given address and never
/// mutated afterwards. Records live for the lifetime of the process; there
/// is no removal or expiry path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    /// Registry key derived from the IP address
    pub id: DeviceId,

    /// IP address the discovery response was sent from
    pub ip: String,

    /// Port the discovery response was sent from
    pub port: u16,

    /// Device UUID parsed from the response's USN header, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usn: Option<Uuid>,

    /// Control URL from the response's LOCATION header, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl DiscoveredDevice {
    /// The device's network address as `ip:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }

    /// The device's control URL, as advertised in its LOCATION header
    pub fn base_url(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

/// Add-on manifest supplied by the host platform
///
/// Carries the adapter identity the host wants this integration to register
/// under. Loading the manifest from disk is the host's job; callers hand the
/// parsed document (or its raw JSON) to [`RokuAdapter`](crate::RokuAdapter).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Unique adapter identifier
    #[serde(default)]
    pub id: Option<String>,

    /// Human-readable adapter name
    pub name: String,
}

impl Manifest {
    /// Parse a manifest from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
