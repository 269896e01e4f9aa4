//! Device settings port — reads a device setting value.

use std::future::Future;

use patchwork_domain::error::ExecutionError;
use patchwork_domain::settings::SettingsNamespace;

/// Reads device settings, with or without elevation depending on the
/// implementation and on what the setting demands.
pub trait DeviceSettingsReader: Send + Sync {
    /// Current value of `namespace/key`, `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecutionError`] when the value cannot be read at all.
    fn read(
        &self,
        namespace: SettingsNamespace,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, ExecutionError>> + Send;
}

impl<T: DeviceSettingsReader> DeviceSettingsReader for std::sync::Arc<T> {
    fn read(
        &self,
        namespace: SettingsNamespace,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, ExecutionError>> + Send {
        (**self).read(namespace, key)
    }
}
