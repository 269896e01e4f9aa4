//! Trigger port — delivers device events from the host into the core.

use std::future::Future;

use patchwork_domain::automation::Trigger;

/// Publishes device triggers to every subscribed module.
pub trait TriggerPublisher {
    /// Publish a trigger. Returns the number of subscribers it reached.
    fn publish(&self, trigger: Trigger) -> impl Future<Output = usize> + Send;
}

impl<T: TriggerPublisher + Send + Sync> TriggerPublisher for std::sync::Arc<T> {
    fn publish(&self, trigger: Trigger) -> impl Future<Output = usize> + Send {
        (**self).publish(trigger)
    }
}
