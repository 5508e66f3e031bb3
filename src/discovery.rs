use crate::error::Result;
use crate::registry::{DeviceHandler, DeviceRegistry};
use crate::ssdp::{SsdpClient, ROKU_SERVICE_TYPE, SSDP_MULTICAST_ADDR, SSDP_PORT};
use crate::subscription::UpdateReceiver;
use crate::types::{DeviceId, DiscoveredDevice};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Discovery manager for Roku devices
///
/// Runs one SSDP search session at a time in a background task and maintains
/// the set of devices seen so far. Starting a new session replaces the
/// previous one; the device collection is preserved across restarts of the
/// session and dies with the process.
///
/// # Example
///
/// ```no_run
/// use roku_adapter::{DeviceHandler, Discovery, DiscoveredDevice};
/// use std::sync::Arc;
///
/// struct PrintHandler;
///
/// impl DeviceHandler for PrintHandler {
///     fn handle_device_added(&self, device: &DiscoveredDevice) {
///         println!("New device: {} at {}", device.id, device.address());
///     }
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut discovery = Discovery::new(Arc::new(PrintHandler));
///     discovery.start().await?;
///
///     // Give devices a moment to answer
///     tokio::time::sleep(tokio::time::Duration::from_secs(3)).await;
///
///     for device in discovery.devices() {
///         println!("Found {} at {}", device.id, device.address());
///     }
///
///     discovery.stop().await;
///     Ok(())
/// }
/// ```
pub struct Discovery {
    registry: Arc<DeviceRegistry>,
    update_tx: Arc<broadcast::Sender<DeviceId>>,
    search_target: String,
    stop_tx: Option<broadcast::Sender<()>>,
    task_handle: Option<tokio::task::JoinHandle<()>>,
}

impl Discovery {
    /// Create a new Discovery manager reporting new devices to `handler`
    pub fn new(handler: Arc<dyn DeviceHandler>) -> Self {
        let (update_tx, _) = broadcast::channel(100);
        Self {
            registry: Arc::new(DeviceRegistry::new(handler)),
            update_tx: Arc::new(update_tx),
            search_target: format!("{}:{}", SSDP_MULTICAST_ADDR, SSDP_PORT),
            stop_tx: None,
            task_handle: None,
        }
    }

    /// Address the M-SEARCH is sent to
    ///
    /// Defaults to the SSDP multicast group. Overridable so tests can point
    /// a session at a loopback responder.
    pub fn set_search_target(&mut self, target: impl Into<String>) {
        self.search_target = target.into();
    }

    /// Subscribe to device updates
    ///
    /// The receiver yields the key of each newly registered device.
    pub fn subscribe_updates(&self) -> UpdateReceiver {
        UpdateReceiver::new(self.update_tx.subscribe())
    }

    /// Get a snapshot of currently discovered devices
    pub fn devices(&self) -> Vec<DiscoveredDevice> {
        self.registry.devices()
    }

    /// Get the number of discovered devices
    pub fn device_count(&self) -> usize {
        self.registry.device_count()
    }

    /// Look up a discovered device by its registry key
    pub fn device(&self, id: &str) -> Option<DiscoveredDevice> {
        self.registry.get(id)
    }

    /// Start a discovery session
    ///
    /// If a session is already running it is stopped first; the existing
    /// device collection is preserved. The search request is sent once and
    /// the session then listens until [`stop`](Self::stop) is called — there
    /// is no retry and no timeout. Bind or send failures are returned to the
    /// caller.
    pub async fn start(&mut self) -> Result<()> {
        // Stop existing session if running
        self.stop().await;

        let client = SsdpClient::bind().await?;
        tracing::debug!("Discovery socket bound to {}", client.local_addr()?);
        let mut responses = client
            .search_at(ROKU_SERVICE_TYPE, &self.search_target)
            .await?;

        let (stop_tx, _) = broadcast::channel(1);
        self.stop_tx = Some(stop_tx.clone());

        let registry = self.registry.clone();
        let update_tx = self.update_tx.clone();

        let handle = tokio::spawn(async move {
            let mut stop_rx = stop_tx.subscribe();

            loop {
                tokio::select! {
                    _ = stop_rx.recv() => {
                        tracing::info!("Discovery stopped by user");
                        break;
                    }
                    response = responses.recv() => {
                        match response {
                            Some(response) => {
                                if let Some(id) = registry.observe_response(&response) {
                                    let _ = update_tx.send(id);
                                }
                            }
                            None => {
                                tracing::info!("Discovery response channel closed");
                                break;
                            }
                        }
                    }
                }
            }
        });

        self.task_handle = Some(handle);
        Ok(())
    }

    /// Stop the discovery session
    ///
    /// The device collection is preserved and can be accessed after stopping.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.task_handle.take() {
            // Give it a moment to stop gracefully
            let _ = tokio::time::timeout(Duration::from_millis(500), handle).await;
        }
    }
}
