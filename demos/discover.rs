use roku_adapter::{AdapterManager, DeviceHandler, DiscoveredDevice, Manifest, RokuAdapter};
use std::sync::Arc;
use std::time::Duration;

struct ConsoleGateway;

impl AdapterManager for ConsoleGateway {
    fn add_adapter(&self, id: &str, name: &str) {
        println!("Adapter registered: {} ({})", id, name);
    }
}

impl DeviceHandler for ConsoleGateway {
    fn handle_device_added(&self, device: &DiscoveredDevice) {
        println!("Device added: {} at {}", device.id, device.address());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let gateway = Arc::new(ConsoleGateway);
    let manifest = Manifest::from_json(r#"{"id": "roku-adapter", "name": "Roku"}"#)?;

    let mut adapter = RokuAdapter::new(gateway.as_ref(), gateway.clone(), &manifest);
    let mut updates = adapter.subscribe_updates();

    adapter.start().await?;
    println!("Searching for Roku devices, press Ctrl-C to quit early...");

    let listen_window = tokio::time::sleep(Duration::from_secs(10));
    tokio::pin!(listen_window);

    loop {
        tokio::select! {
            _ = &mut listen_window => break,
            _ = tokio::signal::ctrl_c() => break,
            update = updates.recv() => {
                match update {
                    Ok(id) => println!("Update: {} registered", id),
                    Err(_) => break,
                }
            }
        }
    }

    let devices = adapter.devices();
    println!("Discovered {} device(s):", devices.len());
    for device in devices {
        match device.usn {
            Some(usn) => println!("  {} at {} (uuid {})", device.id, device.address(), usn),
            None => println!("  {} at {}", device.id, device.address()),
        }
    }

    adapter.stop().await;
    Ok(())
}
