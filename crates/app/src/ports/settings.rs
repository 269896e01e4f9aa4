//! Settings port — persisted user preferences and automation lists.
//!
//! Format and storage belong to the adapter. The core only needs atomic
//! get/set of booleans and of a module's automation list.

use std::future::Future;

use patchwork_domain::automation::Automation;
use patchwork_domain::error::PatchworkError;
use patchwork_domain::id::ModuleId;

/// Preference selecting the root backend over the privileged service.
pub const USE_ROOT_KEY: &str = "use_root";

/// Preference enabling every automation module.
pub const AUTOMATIONS_ENABLED_KEY: &str = "automations_enabled";

/// Key-value preference store.
pub trait SettingsStore: Send + Sync {
    /// Read a boolean preference. `None` when it was never written.
    fn get_bool(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<bool>, PatchworkError>> + Send;

    /// Write a boolean preference.
    fn set_bool(
        &self,
        key: &str,
        value: bool,
    ) -> impl Future<Output = Result<(), PatchworkError>> + Send;

    /// Read the automation list persisted for a module. Empty when none.
    fn automations(
        &self,
        module: &ModuleId,
    ) -> impl Future<Output = Result<Vec<Automation>, PatchworkError>> + Send;

    /// Replace the automation list persisted for a module.
    fn set_automations(
        &self,
        module: &ModuleId,
        automations: &[Automation],
    ) -> impl Future<Output = Result<(), PatchworkError>> + Send;
}

impl<T: SettingsStore> SettingsStore for std::sync::Arc<T> {
    fn get_bool(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<bool>, PatchworkError>> + Send {
        (**self).get_bool(key)
    }

    fn set_bool(
        &self,
        key: &str,
        value: bool,
    ) -> impl Future<Output = Result<(), PatchworkError>> + Send {
        (**self).set_bool(key, value)
    }

    fn automations(
        &self,
        module: &ModuleId,
    ) -> impl Future<Output = Result<Vec<Automation>, PatchworkError>> + Send {
        (**self).automations(module)
    }

    fn set_automations(
        &self,
        module: &ModuleId,
        automations: &[Automation],
    ) -> impl Future<Output = Result<(), PatchworkError>> + Send {
        (**self).set_automations(module, automations)
    }
}
