//! Module registry — owns every automation module and drives its lifecycle.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use patchwork_domain::automation::Automation;
use patchwork_domain::error::{NotFoundError, PatchworkError, ValidationError};
use patchwork_domain::id::ModuleId;
use patchwork_domain::module::ModuleStatus;

use crate::module::AutomationModule;
use crate::ports::settings::AUTOMATIONS_ENABLED_KEY;
use crate::ports::SettingsStore;

/// Holds modules keyed by id and the global enabled flag.
///
/// The flag is explicit state set through [`set_global_enabled`](Self::set_global_enabled);
/// nothing else starts or stops a registered module.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<ModuleId, Arc<dyn AutomationModule>>,
    enabled: AtomicBool,
}

impl ModuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module. It is started right away when the registry is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateModule`] when the id is taken.
    pub async fn register(
        &mut self,
        module: Arc<dyn AutomationModule>,
    ) -> Result<(), ValidationError> {
        let id = module.id().clone();
        if self.modules.contains_key(&id) {
            return Err(ValidationError::DuplicateModule(id.to_string()));
        }
        if self.is_enabled() {
            module.start().await;
        }
        tracing::debug!(module = %id, "module registered");
        self.modules.insert(id, module);
        Ok(())
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Start every module when `enabled`, stop every module otherwise.
    pub async fn set_global_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        for module in self.modules.values() {
            if enabled {
                module.start().await;
            } else {
                module.stop().await;
            }
        }
        tracing::info!(enabled, modules = self.modules.len(), "automations toggled");
    }

    /// Replace the automations of the named module.
    ///
    /// Unknown ids are ignored so stale configuration naming a removed
    /// module stays harmless.
    pub fn update_automations(&self, module: &ModuleId, automations: Vec<Automation>) {
        match self.modules.get(module) {
            Some(target) => target.update_automations(automations),
            None => tracing::debug!(%module, "ignoring automations for unknown module"),
        }
    }

    /// Check `automations` against the named module before handing them over.
    ///
    /// # Errors
    ///
    /// - [`NotFoundError`] when no module has this id
    /// - [`ValidationError`] when an automation breaks a domain invariant or
    ///   fires on a trigger the module never reacts to
    pub fn check_automations(
        &self,
        module: &ModuleId,
        automations: &[Automation],
    ) -> Result<(), PatchworkError> {
        let target = self.modules.get(module).ok_or_else(|| NotFoundError {
            entity: "Module",
            id: module.to_string(),
        })?;
        automations
            .iter()
            .enumerate()
            .try_for_each(|(index, automation)| admit(target.as_ref(), index, automation))
    }

    #[must_use]
    pub fn get(&self, module: &ModuleId) -> Option<&Arc<dyn AutomationModule>> {
        self.modules.get(module)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ModuleId> {
        self.modules.keys()
    }

    #[must_use]
    pub fn statuses(&self) -> Vec<ModuleStatus> {
        self.modules.values().map(|module| module.status()).collect()
    }

    /// Load every registered module's automations from `store`.
    ///
    /// Persisted automations the module would reject are skipped with a
    /// warning; the rest are kept.
    ///
    /// # Errors
    ///
    /// Returns the first storage error; modules loaded before it keep
    /// their new list.
    pub async fn reload<S: SettingsStore>(&self, store: &S) -> Result<(), PatchworkError> {
        for (id, module) in &self.modules {
            let persisted = store.automations(id).await?;
            let mut automations = Vec::with_capacity(persisted.len());
            for (index, automation) in persisted.into_iter().enumerate() {
                match admit(module.as_ref(), index, &automation) {
                    Ok(()) => automations.push(automation),
                    Err(err) => tracing::warn!(
                        module = %id,
                        automation = %automation.name,
                        error = ?err,
                        "skipping persisted automation"
                    ),
                }
            }
            module.update_automations(automations);
        }
        Ok(())
    }

    /// Apply the persisted global flag. Never written means disabled.
    ///
    /// # Errors
    ///
    /// Returns the storage error when the flag cannot be read.
    pub async fn apply_persisted_enabled<S: SettingsStore>(
        &self,
        store: &S,
    ) -> Result<bool, PatchworkError> {
        let enabled = store
            .get_bool(AUTOMATIONS_ENABLED_KEY)
            .await?
            .unwrap_or(false);
        self.set_global_enabled(enabled).await;
        Ok(enabled)
    }
}

fn admit(
    module: &dyn AutomationModule,
    index: usize,
    automation: &Automation,
) -> Result<(), PatchworkError> {
    automation.validate()?;
    if let Some(expected) = module.trigger()
        && automation.trigger != expected
    {
        return Err(ValidationError::TriggerMismatch {
            index,
            expected,
            actual: automation.trigger,
        }
        .into());
    }
    Ok(())
}
