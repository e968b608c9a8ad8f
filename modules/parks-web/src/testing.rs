// Mailer double for tests: records every message instead of sending it.

use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::notifier::{Mailer, OutgoingMail};

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails, as an unreachable relay would.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        if self.fail {
            bail!("connection refused");
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}
