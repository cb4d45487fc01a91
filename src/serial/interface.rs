use std::time::Duration;
use serialport::{SerialPort, SerialPortType};
use tokio::time::timeout;

use super::{PortInfo, Result, SerialError};

pub const BAUD_RATE: u32 = 9600;
/// Read timeout on the underlying port.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);
/// Wait after opening the port for the Arduino's auto-reset to finish.
pub const OPEN_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Description substrings that identify an Arduino Nano or compatible
/// clone (CH340 UART bridge, generic CDC device). Case-sensitive.
pub const KNOWN_DEVICE_MARKERS: &[&str] = &["Arduino", "CH340", "USB Serial"];

/// Enumerate the serial ports currently present on the system.
///
/// Enumeration problems degrade to an empty list; the panel should keep
/// working with an empty dropdown rather than error out.
pub fn list_ports() -> Vec<PortInfo> {
    let ports = match serialport::available_ports() {
        Ok(ports) => ports,
        Err(e) => {
            log::warn!("Failed to enumerate serial ports: {}", e);
            return Vec::new();
        }
    };

    ports
        .into_iter()
        .map(|port| PortInfo {
            device: port.port_name,
            description: describe_port_type(&port.port_type),
        })
        .collect()
}

/// Pick the first enumerated port whose description contains one of the
/// known device markers. Returns `None` if nothing looks like the board.
pub fn find_default_port(ports: &[PortInfo]) -> Option<&str> {
    ports
        .iter()
        .find(|port| {
            KNOWN_DEVICE_MARKERS
                .iter()
                .any(|marker| port.description.contains(marker))
        })
        .map(|port| port.device.as_str())
}

fn describe_port_type(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb_info) => usb_info
            .product
            .clone()
            .or_else(|| usb_info.manufacturer.clone())
            .unwrap_or_else(|| "USB Serial Device".to_string()),
        SerialPortType::BluetoothPort => "Bluetooth device".to_string(),
        SerialPortType::PciPort => "PCI device".to_string(),
        SerialPortType::Unknown => "Unknown device".to_string(),
    }
}

pub struct SerialInterface {
    port: Option<Box<dyn SerialPort>>,
    port_name: Option<String>,
}

impl SerialInterface {
    pub fn new() -> Self {
        Self {
            port: None,
            port_name: None,
        }
    }

    /// Open the named port at the fixed baud rate and wait out the
    /// board's power-on reset before reporting ready.
    pub async fn connect(&mut self, port_name: &str) -> Result<()> {
        let port = serialport::new(port_name, BAUD_RATE)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| SerialError::ConnectionFailed(e.to_string()))?;

        self.port = Some(port);
        self.port_name = Some(port_name.to_string());

        // Opening the port toggles DTR and resets the Nano; give the
        // sketch time to come back up before the first command.
        tokio::time::sleep(OPEN_SETTLE_DELAY).await;

        log::info!("Connected to servo controller on {}", port_name);
        Ok(())
    }

    /// Disconnect from the current device.
    pub fn disconnect(&mut self) {
        if let Some(name) = &self.port_name {
            log::info!("Disconnecting from {}", name);
        }
        self.port = None;
        self.port_name = None;
    }

    /// Check if currently connected.
    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    /// Send data to the connected device.
    pub async fn send_data(&mut self, data: &[u8]) -> Result<usize> {
        let port = self
            .port
            .as_mut()
            .ok_or(SerialError::ConnectionFailed("Not connected".to_string()))?;

        let bytes_written = port.write(data).map_err(SerialError::IoError)?;
        port.flush().map_err(SerialError::IoError)?;

        Ok(bytes_written)
    }

    /// Read one newline-terminated response line, polling the port until
    /// data shows up or `timeout_ms` elapses.
    pub async fn read_line(&mut self, timeout_ms: u64) -> Result<String> {
        let port = self
            .port
            .as_mut()
            .ok_or(SerialError::ConnectionFailed("Not connected".to_string()))?;

        let read_operation = async {
            let mut line = Vec::new();
            let mut byte = [0u8; 1];

            loop {
                match port.bytes_to_read() {
                    Ok(0) => {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                    Ok(_) => match port.read(&mut byte) {
                        Ok(0) => {}
                        Ok(_) => {
                            if byte[0] == b'\n' {
                                return Ok(line);
                            }
                            line.push(byte[0]);
                        }
                        Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {}
                        Err(e) => return Err(SerialError::IoError(e)),
                    },
                    Err(e) => return Err(SerialError::SerialportError(e)),
                }
            }
        };

        let line: Vec<u8> = timeout(Duration::from_millis(timeout_ms), read_operation)
            .await
            .map_err(|_| SerialError::Timeout)??;

        Ok(String::from_utf8_lossy(&line).trim().to_string())
    }
}

impl Default for SerialInterface {
    fn default() -> Self {
        Self::new()
    }
}
