//! In-process trigger bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use patchwork_domain::automation::Trigger;

use crate::ports::TriggerPublisher;

/// Fan-out of device triggers to every running module.
///
/// Publishing succeeds even when no module is subscribed
/// (the trigger is simply dropped).
pub struct InProcessTriggerBus {
    sender: broadcast::Sender<Trigger>,
}

impl InProcessTriggerBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to triggers published *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Trigger> {
        self.sender.subscribe()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InProcessTriggerBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl TriggerPublisher for InProcessTriggerBus {
    fn publish(&self, trigger: Trigger) -> impl Future<Output = usize> + Send {
        let reached = self.sender.send(trigger).unwrap_or(0);
        tracing::debug!(%trigger, reached, "trigger published");
        async move { reached }
    }
}
