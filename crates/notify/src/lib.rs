//! Health alert notifications for the Stride monitor.
//!
//! This crate turns rule advisories into notifications and keeps a sustained
//! out-of-range reading from producing one notification per tick.
//!
//! # Usage
//!
//! ```no_run
//! use notify::{AlertGate, Notifier, NotifyEvent};
//! use vitals::{evaluate, BiometricSnapshot};
//!
//! # async fn run() {
//! let notifier = Notifier::from_env();
//! let mut gate = AlertGate::new();
//!
//! let snapshot = BiometricSnapshot::new(50.0, 72.0, 120.0, 80.0, 98.6, chrono::Utc::now());
//! let evaluation = evaluate(&snapshot, None);
//!
//! // Only the first tick of an episode gets through
//! for advisory in gate.observe(&evaluation.advisories) {
//!     notifier.notify(NotifyEvent::health_alert(&advisory, snapshot.captured_at));
//! }
//! # }
//! ```
//!
//! # Configuration
//!
//! - `SLACK_WEBHOOK_URL`: Slack webhook URL (enables the Slack channel)
//! - `NOTIFY_DISABLED`: Set to "true" to disable all notifications
//!
//! The log channel is always present, so alerts reach stderr even with no
//! webhook configured.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod error;
pub mod events;
pub mod gate;

pub use channels::log::LogChannel;
pub use channels::slack::SlackChannel;
pub use channels::NotifyChannel;
pub use error::ChannelError;
pub use events::NotifyEvent;
pub use gate::{AlertGate, DeliveryState, StepGoalLatch};
pub use vitals::Severity;

use std::sync::Arc;
use tracing::{debug, error, info};

/// Environment variable to disable all notifications.
const ENV_NOTIFY_DISABLED: &str = "NOTIFY_DISABLED";

/// Central notification dispatcher.
///
/// Dispatches each event to every enabled channel without blocking the
/// caller.
pub struct Notifier {
    channels: Vec<Arc<dyn NotifyChannel>>,
    disabled: bool,
}

impl Notifier {
    /// Create a new notifier from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let disabled = std::env::var(ENV_NOTIFY_DISABLED)
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        if disabled {
            info!("Notifications disabled via NOTIFY_DISABLED");
            return Self::disabled();
        }

        let mut channels: Vec<Arc<dyn NotifyChannel>> = vec![Arc::new(LogChannel::new())];

        let slack = SlackChannel::from_env();
        if slack.enabled() {
            info!("Slack notifications enabled");
            channels.push(Arc::new(slack));
        }

        info!(
            channel_count = channels.len(),
            "Notification system initialized"
        );

        Self {
            channels,
            disabled: false,
        }
    }

    /// Create a notifier with specific channels.
    #[must_use]
    pub fn with_channels(channels: Vec<Arc<dyn NotifyChannel>>) -> Self {
        Self {
            channels,
            disabled: false,
        }
    }

    /// Create a disabled notifier.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            channels: vec![],
            disabled: true,
        }
    }

    #[must_use]
    pub fn has_channels(&self) -> bool {
        !self.disabled && !self.channels.is_empty()
    }

    #[must_use]
    pub fn channel_count(&self) -> usize {
        if self.disabled {
            0
        } else {
            self.channels.len()
        }
    }

    /// Send a notification to all enabled channels (fire-and-forget).
    ///
    /// Spawns one task per channel and returns immediately. Must be called
    /// from within a tokio runtime. Errors are logged, never returned.
    pub fn notify(&self, event: NotifyEvent) {
        if !self.has_channels() {
            debug!("No active channels, skipping event");
            return;
        }

        let event = Arc::new(event);

        for channel in &self.channels {
            let channel = Arc::clone(channel);
            let event = Arc::clone(&event);

            tokio::spawn(async move {
                let channel_name = channel.name();

                if !channel.enabled() {
                    debug!(channel = channel_name, "Channel disabled, skipping");
                    return;
                }

                match channel.send(&event).await {
                    Ok(()) => debug!(channel = channel_name, "Notification sent"),
                    Err(e) => error!(
                        channel = channel_name,
                        error = %e,
                        "Failed to send notification"
                    ),
                }
            });
        }
    }

    /// Send a notification and wait for every channel to finish.
    ///
    /// Channels are driven concurrently; results come back in channel order.
    pub async fn notify_and_wait(
        &self,
        event: NotifyEvent,
    ) -> Vec<(String, Result<(), ChannelError>)> {
        if !self.has_channels() {
            return vec![];
        }

        let sends = self
            .channels
            .iter()
            .filter(|channel| channel.enabled())
            .map(|channel| {
                let event = &event;
                async move { (channel.name().to_string(), channel.send(event).await) }
            });

        futures::future::join_all(sends).await
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::from_env()
    }
}
