use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use servo_panel::serial::{Result, SerialError, ServoLink};

/// Outcome a [`ScriptedLink`] produces for every send.
#[derive(Clone, Copy)]
pub enum LinkScript {
    /// Board answers with the ACK marker.
    Ack,
    /// Board answers with something else (e.g. "ERR").
    Nak,
    /// Transport blows up mid-exchange.
    Fail,
}

/// A servo link with a scripted response, standing in for real hardware.
pub struct ScriptedLink {
    script: LinkScript,
    pub sent: Arc<Mutex<Vec<u8>>>,
    pub closed: Arc<AtomicBool>,
}

impl ScriptedLink {
    pub fn new(script: LinkScript) -> Self {
        Self {
            script,
            sent: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait::async_trait]
impl ServoLink for ScriptedLink {
    async fn send_position(&mut self, position: u8) -> Result<bool> {
        match self.script {
            LinkScript::Ack => {
                self.sent.lock().unwrap().push(position);
                Ok(true)
            }
            LinkScript::Nak => Ok(false),
            LinkScript::Fail => Err(SerialError::Timeout),
        }
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
