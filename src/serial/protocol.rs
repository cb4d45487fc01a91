use std::time::Duration;

use super::{Result, SerialError, SerialInterface, ServoLink};

/// Single-letter prefix for a binary position command.
pub const COMMAND_PREFIX: char = 'B';
/// A response line starting with this marker means the command was taken.
pub const ACK_MARKER: &str = "OK";
/// Wait after writing a command before reading the reply.
pub const RESPONSE_SETTLE_DELAY: Duration = Duration::from_millis(100);
/// How long to wait for the acknowledgement line.
pub const RESPONSE_TIMEOUT_MS: u64 = 1000;

/// Servo command protocol implementation.
///
/// The sketch on the board speaks a one-line text protocol: the host
/// sends `B` plus the position as four binary digits, the board answers
/// with a line starting with `OK`. That is the whole exchange; failures
/// carry no structure beyond "the line did not start with OK".
pub struct ServoProtocol {
    interface: SerialInterface,
}

/// Format a position as a zero-padded 4-digit binary string, e.g. 5 → "0101".
pub fn format_position(position: u8) -> String {
    format!("{:04b}", position)
}

/// Build the full command line (without the trailing newline), e.g. 5 → "B0101".
pub fn encode_command(position: u8) -> String {
    format!("{}{}", COMMAND_PREFIX, format_position(position))
}

/// Whether a response line acknowledges the command.
pub fn is_ack(response: &str) -> bool {
    response.starts_with(ACK_MARKER)
}

impl ServoProtocol {
    pub fn new(interface: SerialInterface) -> Self {
        Self { interface }
    }

    async fn exchange(&mut self, position: u8) -> Result<bool> {
        if !self.interface.is_connected() {
            return Err(SerialError::ConnectionFailed(
                "Device not connected".to_string(),
            ));
        }

        let command = format!("{}\n", encode_command(position));
        self.interface.send_data(command.as_bytes()).await?;

        // Give the sketch a moment to move the servo and print its reply.
        tokio::time::sleep(RESPONSE_SETTLE_DELAY).await;

        let response = self.interface.read_line(RESPONSE_TIMEOUT_MS).await?;
        log::debug!("Sent {:?}, got {:?}", command.trim(), response);

        Ok(is_ack(&response))
    }
}

#[async_trait::async_trait]
impl ServoLink for ServoProtocol {
    async fn send_position(&mut self, position: u8) -> Result<bool> {
        self.exchange(position).await
    }

    fn close(&mut self) {
        self.interface.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_formats_to_four_binary_digits() {
        assert_eq!(format_position(0), "0000");
        assert_eq!(format_position(5), "0101");
        assert_eq!(format_position(10), "1010");
        assert_eq!(format_position(15), "1111");
    }

    #[test]
    fn every_position_round_trips() {
        for position in 0..=15u8 {
            let binary = format_position(position);
            assert_eq!(binary.len(), 4, "position {} not 4 digits", position);
            let parsed = u8::from_str_radix(&binary, 2).unwrap();
            assert_eq!(parsed, position);
        }
    }

    #[test]
    fn command_carries_prefix() {
        assert_eq!(encode_command(5), "B0101");
        assert_eq!(encode_command(0), "B0000");
    }

    #[test]
    fn ack_recognition_is_a_prefix_check() {
        assert!(is_ack("OK"));
        assert!(is_ack("OK:B0101"));
        assert!(!is_ack("ERR"));
        assert!(!is_ack(""));
        assert!(!is_ack("ok"));
    }
}
