use crate::error::{Result, RokuError};
use crate::types::DeviceId;
use tokio::sync::broadcast;

/// Receiver for device-registration updates
///
/// Yields the registry key of each device as it is added. Duplicate and
/// non-success discovery responses never produce an update.
pub struct UpdateReceiver {
    rx: broadcast::Receiver<DeviceId>,
}

impl UpdateReceiver {
    /// Create a new update receiver
    pub(crate) fn new(rx: broadcast::Receiver<DeviceId>) -> Self {
        Self { rx }
    }

    /// Receive the next device update
    pub async fn recv(&mut self) -> Result<DeviceId> {
        self.rx.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => RokuError::ChannelClosed,
            broadcast::error::RecvError::Lagged(n) => {
                RokuError::ChannelError(format!("Lagged by {} messages", n))
            }
        })
    }

    /// Try to receive a device update without blocking
    ///
    /// Returns `None` if no update is pending.
    pub fn try_recv(&mut self) -> Result<Option<DeviceId>> {
        match self.rx.try_recv() {
            Ok(id) => Ok(Some(id)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Closed) => Err(RokuError::ChannelClosed),
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                Err(RokuError::ChannelError(format!("Lagged by {} messages", n)))
            }
        }
    }
}
