pub mod interface;
pub mod protocol;

pub use interface::SerialInterface;
pub use protocol::ServoProtocol;

use serde::{Deserialize, Serialize};

/// An available serial port as shown in the connection dropdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortInfo {
    pub device: String,
    pub description: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    #[error("Port not found: {0}")]
    PortNotFound(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Communication timeout")]
    Timeout,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialport error: {0}")]
    SerialportError(#[from] serialport::Error),
}

pub type Result<T> = std::result::Result<T, SerialError>;

/// Transport seam between the controller and the wire protocol.
///
/// `ServoProtocol` is the real implementation; tests script a mock so the
/// state machine can be driven without hardware.
#[async_trait::async_trait]
pub trait ServoLink: Send {
    /// Send a position command and wait for the acknowledgement line.
    /// `Ok(true)` means the board acknowledged; `Ok(false)` means it
    /// answered with something other than the ACK marker.
    async fn send_position(&mut self, position: u8) -> Result<bool>;

    /// Release the underlying channel.
    fn close(&mut self);
}
