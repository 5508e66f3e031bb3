use crate::discovery::Discovery;
use crate::error::Result;
use crate::registry::DeviceHandler;
use crate::subscription::UpdateReceiver;
use crate::types::{DiscoveredDevice, Manifest};
use std::sync::Arc;

/// Fallback adapter identifier used when the manifest does not carry one
const DEFAULT_ADAPTER_ID: &str = "roku-unknown";

/// Host adapter-registration collaborator
///
/// On startup the adapter registers itself through this trait, supplying a
/// unique identifier and a human-readable name sourced from the manifest.
pub trait AdapterManager: Send + Sync {
    /// Register an adapter under the given identifier and display name
    fn add_adapter(&self, id: &str, name: &str);
}

/// Gateway adapter exposing discovered Roku devices to the host platform
///
/// A plain struct composed over the host seams rather than a subclass of
/// anything host-provided: [`AdapterManager`] receives the registration,
/// [`DeviceHandler`] receives device-added notifications, and the adapter
/// itself owns the discovery session.
pub struct RokuAdapter {
    id: String,
    name: String,
    discovery: Discovery,
}

impl RokuAdapter {
    /// Create the adapter and register it with the host
    ///
    /// The adapter identifier comes from the manifest when present and falls
    /// back to `roku-unknown` otherwise. Registration happens exactly once,
    /// here.
    pub fn new(
        manager: &dyn AdapterManager,
        handler: Arc<dyn DeviceHandler>,
        manifest: &Manifest,
    ) -> Self {
        let id = manifest
            .id
            .clone()
            .unwrap_or_else(|| DEFAULT_ADAPTER_ID.to_string());
        let name = manifest.name.clone();

        manager.add_adapter(&id, &name);
        tracing::info!("Registered adapter {} ({})", id, name);

        Self {
            id,
            name,
            discovery: Discovery::new(handler),
        }
    }

    /// The adapter's unique identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The adapter's human-readable name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start discovering devices
    pub async fn start(&mut self) -> Result<()> {
        self.discovery.start().await
    }

    /// Stop the discovery session, keeping the device collection
    pub async fn stop(&mut self) {
        self.discovery.stop().await
    }

    /// Get a snapshot of currently discovered devices
    pub fn devices(&self) -> Vec<DiscoveredDevice> {
        self.discovery.devices()
    }

    /// Get the number of discovered devices
    pub fn device_count(&self) -> usize {
        self.discovery.device_count()
    }

    /// Subscribe to device-registration updates
    pub fn subscribe_updates(&self) -> UpdateReceiver {
        self.discovery.subscribe_updates()
    }

    /// Access the underlying discovery session
    pub fn discovery_mut(&mut self) -> &mut Discovery {
        &mut self.discovery
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingManager {
        registered: Mutex<Vec<(String, String)>>,
    }

    impl RecordingManager {
        fn new() -> Self {
            Self {
                registered: Mutex::new(Vec::new()),
            }
        }
    }

    impl AdapterManager for RecordingManager {
        fn add_adapter(&self, id: &str, name: &str) {
            self.registered
                .lock()
                .unwrap()
                .push((id.to_string(), name.to_string()));
        }
    }

    struct NullHandler;

    impl DeviceHandler for NullHandler {
        fn handle_device_added(&self, _device: &DiscoveredDevice) {}
    }

    #[test]
    fn registers_with_manifest_identity() {
        let manager = RecordingManager::new();
        let manifest = Manifest {
            id: Some("roku-adapter".to_string()),
            name: "Roku".to_string(),
        };

        let adapter = RokuAdapter::new(&manager, Arc::new(NullHandler), &manifest);

        assert_eq!(adapter.id(), "roku-adapter");
        assert_eq!(adapter.name(), "Roku");
        let registered = manager.registered.lock().unwrap();
        assert_eq!(
            *registered,
            vec![("roku-adapter".to_string(), "Roku".to_string())]
        );
    }

    #[test]
    fn falls_back_to_default_adapter_id() {
        let manager = RecordingManager::new();
        let manifest = Manifest {
            id: None,
            name: "Roku".to_string(),
        };

        let adapter = RokuAdapter::new(&manager, Arc::new(NullHandler), &manifest);

        assert_eq!(adapter.id(), "roku-unknown");
    }

    #[test]
    fn starts_with_no_devices() {
        let manager = RecordingManager::new();
        let manifest = Manifest {
            id: None,
            name: "Roku".to_string(),
        };

        let adapter = RokuAdapter::new(&manager, Arc::new(NullHandler), &manifest);

        assert_eq!(adapter.device_count(), 0);
        assert!(adapter.devices().is_empty());
    }
}
