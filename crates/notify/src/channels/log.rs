//! Log channel: writes every notification to the tracing subscriber.
//!
//! Always enabled, so a monitor with no webhooks configured still surfaces
//! alerts on stderr.

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::error::ChannelError;
use crate::events::NotifyEvent;
use crate::NotifyChannel;
use vitals::Severity;

#[derive(Debug, Default, Clone, Copy)]
pub struct LogChannel;

impl LogChannel {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyChannel for LogChannel {
    fn name(&self) -> &'static str {
        "log"
    }

    fn enabled(&self) -> bool {
        true
    }

    async fn send(&self, event: &NotifyEvent) -> Result<(), ChannelError> {
        let title = event.title();
        let body = event.body();
        let tag = event.tag();

        match event.severity() {
            Severity::Critical => error!(tag = %tag, title = %title, "{body}"),
            Severity::Warning => warn!(tag = %tag, title = %title, "{body}"),
            Severity::Info => info!(tag = %tag, title = %title, "{body}"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_log_channel_always_succeeds() {
        let channel = LogChannel::new();
        assert!(channel.enabled());

        let event = NotifyEvent::StepGoalReached {
            steps: 10_000,
            goal: 10_000,
            timestamp: Utc::now(),
        };
        assert!(channel.send(&event).await.is_ok());
    }
}
