use std::time::Instant;

use tokio::sync::Mutex;

use crate::serial::{interface, PortInfo, SerialInterface, ServoLink, ServoProtocol};
use super::{ConnectOutcome, PositionOutcome, Status, VibrationWindow};

/// Highest position encodable in the 4-bit command.
pub const MAX_POSITION: u8 = 15;

/// Session state behind the control endpoints.
///
/// Owns the single serial connection, the last acknowledged position and
/// the vibration window. All endpoint handlers share one instance; the
/// internal mutex serializes every operation, so a connect cannot overlap
/// a position change.
pub struct ServoController {
    session: Mutex<Session>,
}

struct Session {
    link: Option<Box<dyn ServoLink>>,
    port: Option<String>,
    position: u8,
    vibration: VibrationWindow,
}

impl ServoController {
    pub fn new() -> Self {
        Self {
            session: Mutex::new(Session {
                link: None,
                port: None,
                position: 0,
                vibration: VibrationWindow::default(),
            }),
        }
    }

    /// Build a controller that is already connected through the given
    /// link. Used by tests to drive the state machine without hardware.
    pub fn with_link(link: Box<dyn ServoLink>, port: &str) -> Self {
        Self {
            session: Mutex::new(Session {
                link: Some(link),
                port: Some(port.to_string()),
                position: 0,
                vibration: VibrationWindow::default(),
            }),
        }
    }

    /// Enumerate the serial ports currently available on the system.
    pub fn list_ports(&self) -> Vec<PortInfo> {
        interface::list_ports()
    }

    /// Connect to the named port, or auto-detect the board when the
    /// sentinel `"auto"` is requested.
    pub async fn connect(&self, requested: &str) -> ConnectOutcome {
        let port = if requested == "auto" {
            let ports = interface::list_ports();
            match interface::find_default_port(&ports) {
                Some(found) => found.to_string(),
                None => {
                    log::warn!("Auto-detect found no known controller among {} ports", ports.len());
                    return ConnectOutcome {
                        success: false,
                        port: None,
                        message: Some("Arduino not found".to_string()),
                    };
                }
            }
        } else {
            requested.to_string()
        };

        let mut serial_interface = SerialInterface::new();
        log::info!("Attempting to connect to port: {}", port);

        match serial_interface.connect(&port).await {
            Ok(()) => {
                let mut session = self.session.lock().await;
                // Replace any previous connection.
                if let Some(mut old_link) = session.link.take() {
                    old_link.close();
                }
                session.link = Some(Box::new(ServoProtocol::new(serial_interface)));
                session.port = Some(port.clone());
                ConnectOutcome {
                    success: true,
                    port: Some(port),
                    message: None,
                }
            }
            Err(e) => {
                log::error!("Connection to {} failed: {}", port, e);
                ConnectOutcome {
                    success: false,
                    port: Some(port),
                    message: None,
                }
            }
        }
    }

    /// Close the connection if one exists. Always succeeds; disconnecting
    /// while already disconnected is a no-op.
    pub async fn disconnect(&self) {
        let mut session = self.session.lock().await;
        if let Some(mut link) = session.link.take() {
            link.close();
        }
        session.port = None;
    }

    /// Send a position command to the board and update session state on
    /// acknowledgement.
    pub async fn set_position(&self, position: u8) -> PositionOutcome {
        self.set_position_at(position, Instant::now()).await
    }

    /// Clock-injected variant of [`set_position`](Self::set_position).
    pub async fn set_position_at(&self, position: u8, now: Instant) -> PositionOutcome {
        let mut session = self.session.lock().await;

        if position > MAX_POSITION {
            log::warn!("Rejecting out-of-range position {}", position);
            return PositionOutcome {
                success: false,
                position,
                is_vibrating: session.vibration.is_active(),
            };
        }

        let acked = match session.link.as_mut() {
            Some(link) => match link.send_position(position).await {
                Ok(acked) => acked,
                Err(e) => {
                    // Transport errors stop here; the browser only ever
                    // sees a failure boolean. A failed send does not tear
                    // down the connection.
                    log::error!("Error sending command: {}", e);
                    false
                }
            },
            None => false,
        };

        if acked {
            session.position = position;
            session.vibration.start(now);
        }

        PositionOutcome {
            success: acked,
            position,
            is_vibrating: session.vibration.is_active(),
        }
    }

    /// Report connection, position and vibration state, expiring the
    /// vibration window first.
    pub async fn status(&self) -> Status {
        self.status_at(Instant::now()).await
    }

    /// Clock-injected variant of [`status`](Self::status).
    pub async fn status_at(&self, now: Instant) -> Status {
        let mut session = self.session.lock().await;
        session.vibration.expire(now);
        Status {
            connected: session.link.is_some(),
            position: session.position,
            is_vibrating: session.vibration.is_active(),
        }
    }

    /// Name of the currently connected port, if any.
    pub async fn connected_port(&self) -> Option<String> {
        let session = self.session.lock().await;
        session.port.clone()
    }
}

impl Default for ServoController {
    fn default() -> Self {
        Self::new()
    }
}
