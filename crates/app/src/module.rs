//! Automation modules — a trigger source plus the automations it drives.
//!
//! A module subscribes to the [`InProcessTriggerBus`] while running. On each
//! firing of its trigger it snapshots the held automation list and runs
//! every responding automation through the [`ExecutorSet`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::task::{JoinHandle, JoinSet};

use patchwork_domain::automation::{Automation, Trigger};
use patchwork_domain::id::ModuleId;
use patchwork_domain::module::{AutomationReport, Lifecycle, ModuleStatus};
use patchwork_domain::time::{now, Timestamp};

use crate::executors::ExecutorSet;
use crate::trigger_bus::InProcessTriggerBus;

/// Lifecycle contract every module honours.
///
/// Only the [`ModuleRegistry`](crate::registry::ModuleRegistry) drives these
/// transitions. `start` and `stop` are idempotent.
#[async_trait]
pub trait AutomationModule: Send + Sync {
    fn id(&self) -> &ModuleId;

    fn lifecycle(&self) -> Lifecycle;

    /// The only trigger this module reacts to, if it is bound to one.
    fn trigger(&self) -> Option<Trigger>;

    /// Subscribe to the trigger source. No-op when already running.
    async fn start(&self);

    /// Unsubscribe and cancel any firing in progress. No-op when stopped.
    async fn stop(&self);

    /// Replace the automation list. The lifecycle is left unchanged.
    fn update_automations(&self, automations: Vec<Automation>);

    fn automations(&self) -> Vec<Automation>;

    fn status(&self) -> ModuleStatus;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct Shared {
    automations: RwLock<Arc<Vec<Automation>>>,
    last_fired: Mutex<Option<Timestamp>>,
    last_reports: Mutex<Vec<AutomationReport>>,
}

impl Shared {
    fn snapshot(&self) -> Arc<Vec<Automation>> {
        self.automations
            .read()
            .map_or_else(|poisoned| poisoned.into_inner().clone(), |g| g.clone())
    }
}

/// A module driven by a single device [`Trigger`].
pub struct TriggeredModule {
    id: ModuleId,
    trigger: Trigger,
    bus: Arc<InProcessTriggerBus>,
    executors: Arc<ExecutorSet>,
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TriggeredModule {
    #[must_use]
    pub fn new(
        id: ModuleId,
        trigger: Trigger,
        bus: Arc<InProcessTriggerBus>,
        executors: Arc<ExecutorSet>,
    ) -> Self {
        Self {
            id,
            trigger,
            bus,
            executors,
            shared: Arc::default(),
            task: Mutex::new(None),
        }
    }

    /// A module named after its trigger, e.g. `screen_off`.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in triggers; the `Result` comes from
    /// [`ModuleId::new`].
    pub fn for_trigger(
        trigger: Trigger,
        bus: Arc<InProcessTriggerBus>,
        executors: Arc<ExecutorSet>,
    ) -> Result<Self, patchwork_domain::error::ValidationError> {
        let id = ModuleId::new(trigger.as_str())?;
        Ok(Self::new(id, trigger, bus, executors))
    }
}

#[async_trait]
impl AutomationModule for TriggeredModule {
    fn id(&self) -> &ModuleId {
        &self.id
    }

    fn lifecycle(&self) -> Lifecycle {
        match lock(&self.task).as_ref() {
            Some(handle) if !handle.is_finished() => Lifecycle::Running,
            _ => Lifecycle::Stopped,
        }
    }

    fn trigger(&self) -> Option<Trigger> {
        Some(self.trigger)
    }

    async fn start(&self) {
        let mut task = lock(&self.task);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            tracing::debug!(module = %self.id, "module already running");
            return;
        }
        let receiver = self.bus.subscribe();
        *task = Some(tokio::spawn(listen(
            self.id.clone(),
            self.trigger,
            receiver,
            self.executors.clone(),
            self.shared.clone(),
        )));
        tracing::info!(module = %self.id, trigger = %self.trigger, "module started");
    }

    async fn stop(&self) {
        let handle = lock(&self.task).take();
        let Some(handle) = handle else {
            tracing::debug!(module = %self.id, "module already stopped");
            return;
        };
        handle.abort();
        if let Err(err) = handle.await
            && !err.is_cancelled()
        {
            tracing::error!(module = %self.id, error = %err, "module task failed");
        }
        tracing::info!(module = %self.id, "module stopped");
    }

    fn update_automations(&self, automations: Vec<Automation>) {
        let count = automations.len();
        let mut guard = self
            .shared
            .automations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(automations);
        tracing::info!(module = %self.id, count, "automations replaced");
    }

    fn automations(&self) -> Vec<Automation> {
        self.shared.snapshot().as_ref().clone()
    }

    fn status(&self) -> ModuleStatus {
        ModuleStatus {
            id: self.id.clone(),
            lifecycle: self.lifecycle(),
            automations: self.shared.snapshot().len(),
            last_fired: *lock(&self.shared.last_fired),
            last_reports: lock(&self.shared.last_reports).clone(),
        }
    }
}

impl Drop for TriggeredModule {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.task).take() {
            handle.abort();
        }
    }
}

async fn listen(
    id: ModuleId,
    trigger: Trigger,
    mut receiver: Receiver<Trigger>,
    executors: Arc<ExecutorSet>,
    shared: Arc<Shared>,
) {
    loop {
        match receiver.recv().await {
            Ok(fired) if fired == trigger => fire(&id, trigger, &executors, &shared).await,
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(module = %id, skipped, "module fell behind the trigger bus");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn fire(id: &ModuleId, trigger: Trigger, executors: &Arc<ExecutorSet>, shared: &Shared) {
    let automations = shared.snapshot();
    *lock(&shared.last_fired) = Some(now());

    let mut runs = JoinSet::new();
    for automation in automations.iter().filter(|a| a.responds_to(trigger)) {
        let executors = executors.clone();
        let automation = automation.clone();
        runs.spawn(async move { run_automation(&executors, &automation).await });
    }
    tracing::debug!(module = %id, %trigger, running = runs.len(), "trigger fired");

    let mut reports = Vec::with_capacity(runs.len());
    while let Some(joined) = runs.join_next().await {
        match joined {
            Ok(report) => reports.push(report),
            Err(err) => tracing::error!(module = %id, error = %err, "automation task failed"),
        }
    }
    *lock(&shared.last_reports) = reports;
}

/// Run an automation's actions in declaration order.
///
/// The first failing action aborts the rest of this automation only; the
/// report records how many actions completed before it.
pub async fn run_automation(executors: &ExecutorSet, automation: &Automation) -> AutomationReport {
    let total = automation.actions.len();
    let mut completed = 0;
    let mut failure = None;
    for action in &automation.actions {
        match executors.execute(action).await {
            Ok(()) => completed += 1,
            Err(err) => {
                tracing::warn!(
                    automation = %automation.name,
                    step = completed,
                    error = %err,
                    cause = %err.source,
                    hint = ?err.source.user_hint(),
                    "automation aborted"
                );
                failure = Some(err);
                break;
            }
        }
    }
    if failure.is_none() {
        tracing::info!(automation = %automation.name, actions = total, "automation completed");
    }
    AutomationReport {
        automation_id: automation.id,
        automation_name: automation.name.clone(),
        completed,
        total,
        failure,
        finished_at: now(),
    }
}
