//! In-memory transport whose connect and send results are scripted.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::socket::{Connection, Transport};

/// Result of one scripted send attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Accept the whole payload.
    Complete,
    /// Report only this many bytes as sent.
    Partial(usize),
    /// Fail with an I/O error of this kind.
    Fail(io::ErrorKind),
}

#[derive(Debug, Default)]
struct Script {
    connect_failures: usize,
    fail_closes: bool,
    outcomes: VecDeque<SendOutcome>,
    delivered: Vec<Vec<u8>>,
    connects: usize,
    send_attempts: usize,
    closes: usize,
}

/// Transport recording every interaction for later inspection.
///
/// Clones share the same script, so a test can keep one handle while the
/// client owns another. Sends complete unless an outcome was queued with
/// [`push_outcome`](Self::push_outcome).
#[derive(Clone, Debug, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` connect attempts fail.
    pub fn fail_next_connects(&self, count: usize) {
        self.script.lock().connect_failures = count;
    }

    /// Make every close report an error.
    pub fn fail_closes(&self) {
        self.script.lock().fail_closes = true;
    }

    pub fn push_outcome(&self, outcome: SendOutcome) {
        self.script.lock().outcomes.push_back(outcome);
    }

    /// Payloads accepted in full, in delivery order.
    pub fn delivered(&self) -> Vec<Vec<u8>> {
        self.script.lock().delivered.clone()
    }

    /// Delivered payloads decoded as JSON.
    pub fn delivered_json(&self) -> Vec<serde_json::Value> {
        self.script
            .lock()
            .delivered
            .iter()
            .filter_map(|payload| serde_json::from_slice(payload).ok())
            .collect()
    }

    pub fn connects(&self) -> usize {
        self.script.lock().connects
    }

    pub fn send_attempts(&self) -> usize {
        self.script.lock().send_attempts
    }

    pub fn closes(&self) -> usize {
        self.script.lock().closes
    }
}

/// Connection handed out by [`ScriptedTransport`].
#[derive(Debug)]
pub struct ScriptedConnection {
    script: Arc<Mutex<Script>>,
}

impl Transport for ScriptedTransport {
    type Connection = ScriptedConnection;

    fn connect(&self) -> io::Result<ScriptedConnection> {
        let mut script = self.script.lock();
        script.connects += 1;
        if script.connect_failures > 0 {
            script.connect_failures -= 1;
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "scripted connect failure",
            ));
        }
        Ok(ScriptedConnection {
            script: Arc::clone(&self.script),
        })
    }

    fn describe(&self) -> String {
        "scripted".to_owned()
    }
}

impl Connection for ScriptedConnection {
    fn send(&mut self, payload: &[u8]) -> io::Result<usize> {
        let mut script = self.script.lock();
        script.send_attempts += 1;
        match script.outcomes.pop_front().unwrap_or(SendOutcome::Complete) {
            SendOutcome::Complete => {
                script.delivered.push(payload.to_vec());
                Ok(payload.len())
            }
            SendOutcome::Partial(sent) => Ok(sent.min(payload.len())),
            SendOutcome::Fail(kind) => Err(io::Error::new(kind, "scripted send failure")),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        let mut script = self.script.lock();
        script.closes += 1;
        if script.fail_closes {
            return Err(io::Error::other("scripted close failure"));
        }
        Ok(())
    }
}
