use roku_adapter::{AdapterManager, DeviceHandler, DiscoveredDevice, Manifest, RokuAdapter};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::UdpSocket;

const OK_REPLY: &str = "HTTP/1.1 200 OK\r\n\
ST: roku:ecp\r\n\
USN: uuid:29600007-2990-1000-8000-001122334455::roku:ecp\r\n\
LOCATION: http://127.0.0.1:8060/\r\n\
\r\n";

const NOT_FOUND_REPLY: &str = "HTTP/1.1 404 Not Found\r\n\
ST: roku:ecp\r\n\
\r\n";

struct RecordingGateway {
    added: Mutex<Vec<String>>,
}

impl RecordingGateway {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            added: Mutex::new(Vec::new()),
        })
    }

    fn added(&self) -> Vec<String> {
        self.added.lock().unwrap().clone()
    }
}

impl AdapterManager for RecordingGateway {
    fn add_adapter(&self, _id: &str, _name: &str) {}
}

impl DeviceHandler for RecordingGateway {
    fn handle_device_added(&self, device: &DiscoveredDevice) {
        self.added.lock().unwrap().push(device.id.clone());
    }
}

/// Answer every M-SEARCH on a loopback socket with `reply`, twice
///
/// The duplicate answer exercises idempotent registration downstream.
async fn fake_roku(reply: &'static str) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut buf = vec![0u8; 1536];
        while let Ok((len, requester)) = socket.recv_from(&mut buf).await {
            let request = String::from_utf8_lossy(&buf[..len]);
            if !request.starts_with("M-SEARCH") {
                continue;
            }
            for _ in 0..2 {
                let _ = socket.send_to(reply.as_bytes(), requester).await;
            }
        }
    });

    (addr, handle)
}

fn test_adapter(gateway: &Arc<RecordingGateway>, target: SocketAddr) -> RokuAdapter {
    let manifest = Manifest::from_json(r#"{"id": "roku-adapter", "name": "Roku"}"#).unwrap();
    let mut adapter = RokuAdapter::new(gateway.as_ref(), gateway.clone(), &manifest);
    adapter.discovery_mut().set_search_target(target.to_string());
    adapter
}

#[tokio::test]
async fn discovers_loopback_responder_exactly_once() {
    let (addr, responder) = fake_roku(OK_REPLY).await;
    let gateway = RecordingGateway::new();
    let mut adapter = test_adapter(&gateway, addr);

    let mut updates = adapter.subscribe_updates();
    adapter.start().await.unwrap();

    let id = tokio::time::timeout(Duration::from_secs(5), updates.recv())
        .await
        .expect("no device registered within 5s")
        .unwrap();
    assert_eq!(id, "roku127.0.0.1");

    // Let the duplicate answer arrive as well
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(adapter.device_count(), 1);
    let device = &adapter.devices()[0];
    assert_eq!(device.ip, "127.0.0.1");
    assert_eq!(device.port, addr.port());
    assert_eq!(
        device.usn.map(|u| u.to_string()),
        Some("29600007-2990-1000-8000-001122334455".to_string())
    );
    assert_eq!(device.base_url(), Some("http://127.0.0.1:8060/"));
    assert_eq!(gateway.added(), vec!["roku127.0.0.1".to_string()]);

    adapter.stop().await;
    responder.abort();
}

#[tokio::test]
async fn non_success_responder_registers_nothing() {
    let (addr, responder) = fake_roku(NOT_FOUND_REPLY).await;
    let gateway = RecordingGateway::new();
    let mut adapter = test_adapter(&gateway, addr);

    adapter.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(adapter.device_count(), 0);
    assert!(gateway.added().is_empty());

    adapter.stop().await;
    responder.abort();
}

#[tokio::test]
async fn restarting_discovery_keeps_known_devices() {
    let (addr, responder) = fake_roku(OK_REPLY).await;
    let gateway = RecordingGateway::new();
    let mut adapter = test_adapter(&gateway, addr);

    let mut updates = adapter.subscribe_updates();
    adapter.start().await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), updates.recv())
        .await
        .expect("no device registered within 5s")
        .unwrap();

    // A new session re-sends the search; the existing record must survive
    // and the duplicate discovery must not re-announce the device.
    adapter.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(adapter.device_count(), 1);
    assert_eq!(gateway.added().len(), 1);

    adapter.stop().await;
    responder.abort();
}
