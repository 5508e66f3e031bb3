use crate::ssdp::SearchResponse;
use crate::types::{device_key, DeviceId, DiscoveredDevice};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Host device-management collaborator
///
/// The registry announces each newly created device record through this
/// trait so the host platform can expose it to end users and automations.
/// The notification is one-way; no return value is consumed.
pub trait DeviceHandler: Send + Sync {
    /// Called exactly once per newly discovered device
    fn handle_device_added(&self, device: &DiscoveredDevice);
}

/// Registry of devices discovered during this session
///
/// Owns the device collection and mediates creation of new records. The
/// only state transition per device key is absent to present: duplicate
/// responses are no-ops and nothing ever removes a record.
pub struct DeviceRegistry {
    devices: Mutex<BTreeMap<DeviceId, DiscoveredDevice>>,
    handler: Arc<dyn DeviceHandler>,
}

impl DeviceRegistry {
    /// Create an empty registry reporting to the given handler
    pub fn new(handler: Arc<dyn DeviceHandler>) -> Self {
        Self {
            devices: Mutex::new(BTreeMap::new()),
            handler,
        }
    }

    /// Apply one discovery response to the registry
    ///
    /// Non-success responses are ignored. For a success response the key is
    /// derived from the sender address; if no device with that key exists a
    /// record is created and announced to the handler, and the new key is
    /// returned. A response for an already-known key does nothing, even if
    /// the sender port changed — the first-seen record is kept.
    pub fn observe_response(&self, response: &SearchResponse) -> Option<DeviceId> {
        if !response.is_success() {
            tracing::debug!(
                "Ignoring discovery response from {} with status {}",
                response.sender,
                response.status
            );
            return None;
        }

        let ip = response.sender.ip().to_string();
        let id = device_key(&ip);

        let device = {
            let mut devices = self.devices.lock().unwrap();
            if let Some(existing) = devices.get(&id) {
                if existing.port != response.sender.port() {
                    tracing::debug!(
                        "Device {} answered from port {} but was first seen on port {}, keeping first-seen record",
                        id,
                        response.sender.port(),
                        existing.port
                    );
                }
                return None;
            }

            let device = DiscoveredDevice {
                id: id.clone(),
                ip,
                port: response.sender.port(),
                usn: response.device_uuid(),
                location: response.location().map(str::to_string),
            };
            devices.insert(id.clone(), device.clone());
            device
        };

        tracing::info!("Discovered Roku device {} at {}", id, device.address());

        // Notify outside the lock
        self.handler.handle_device_added(&device);
        Some(id)
    }

    /// Get a snapshot of the current device collection
    pub fn devices(&self) -> Vec<DiscoveredDevice> {
        let devices = self.devices.lock().unwrap();
        devices.values().cloned().collect()
    }

    /// Number of devices discovered so far
    pub fn device_count(&self) -> usize {
        let devices = self.devices.lock().unwrap();
        devices.len()
    }

    /// Look up a device by its registry key
    pub fn get(&self, id: &str) -> Option<DiscoveredDevice> {
        let devices = self.devices.lock().unwrap();
        devices.get(id).cloned()
    }
}
