//! Hand-written test doubles shared by the app-layer tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::Mutex;

use patchwork_domain::automation::Automation;
use patchwork_domain::backend::{CommandOutcome, UnavailableReason};
use patchwork_domain::error::{PatchworkError, ProgrammerError};
use patchwork_domain::id::ModuleId;

use crate::ports::privilege::check_argv;
use crate::ports::{PrivilegeBackend, ProcessHandle, SettingsStore};

/// A privilege backend that records every call and interprets
/// `settings put|get` against an in-memory table.
pub(crate) struct StubBackend {
    available: AtomicBool,
    permitted: AtomicBool,
    exit_code: AtomicI32,
    calls: Mutex<Vec<String>>,
    spawned: Mutex<Vec<Vec<String>>>,
    device: Mutex<HashMap<String, String>>,
    failing: Mutex<Vec<String>>,
}

impl StubBackend {
    pub(crate) fn ready() -> Self {
        Self {
            available: AtomicBool::new(true),
            permitted: AtomicBool::new(true),
            exit_code: AtomicI32::new(0),
            calls: Mutex::default(),
            spawned: Mutex::default(),
            device: Mutex::default(),
            failing: Mutex::default(),
        }
    }

    pub(crate) fn missing() -> Self {
        let stub = Self::ready();
        stub.set_available(false);
        stub
    }

    pub(crate) fn set_available(&self, value: bool) {
        self.available.store(value, Ordering::SeqCst);
    }

    pub(crate) fn set_permitted(&self, value: bool) {
        self.permitted.store(value, Ordering::SeqCst);
    }

    pub(crate) fn set_exit_code(&self, code: i32) {
        self.exit_code.store(code, Ordering::SeqCst);
    }

    /// Make every command containing `needle` fail with exit code 1.
    pub(crate) fn fail_on(&self, needle: &str) {
        self.failing.lock().unwrap().push(needle.to_string());
    }

    pub(crate) fn put_device_setting(&self, namespace: &str, key: &str, value: &str) {
        self.device
            .lock()
            .unwrap()
            .insert(format!("{namespace}/{key}"), value.to_string());
    }

    pub(crate) fn device_setting(&self, namespace: &str, key: &str) -> Option<String> {
        self.device
            .lock()
            .unwrap()
            .get(&format!("{namespace}/{key}"))
            .cloned()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn spawned(&self) -> Vec<Vec<String>> {
        self.spawned.lock().unwrap().clone()
    }

    fn interpret(&self, command: &str) -> CommandOutcome {
        let words: Vec<&str> = command.split_whitespace().collect();
        let mut device = self.device.lock().unwrap();
        match words.as_slice() {
            ["settings", "put", namespace, key, value] => {
                device.insert(format!("{namespace}/{key}"), (*value).to_string());
                CommandOutcome::success("")
            }
            ["settings", "get", namespace, key] => {
                let value = device
                    .get(&format!("{namespace}/{key}"))
                    .cloned()
                    .unwrap_or_else(|| "null".to_string());
                CommandOutcome::success(format!("{value}\n"))
            }
            _ => CommandOutcome::success(""),
        }
    }
}

impl PrivilegeBackend for StubBackend {
    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn has_permission(&self) -> bool {
        self.available.load(Ordering::SeqCst) && self.permitted.load(Ordering::SeqCst)
    }

    async fn run(&self, command: &str) -> CommandOutcome {
        self.calls.lock().unwrap().push(command.to_string());
        if !self.available.load(Ordering::SeqCst) {
            return CommandOutcome::unavailable(UnavailableReason::NotInstalled);
        }
        if !self.permitted.load(Ordering::SeqCst) {
            return CommandOutcome::unavailable(UnavailableReason::PermissionDenied);
        }
        let failing = self
            .failing
            .lock()
            .unwrap()
            .iter()
            .any(|needle| command.contains(needle.as_str()));
        if failing {
            return CommandOutcome::failure(Some(1), "stub failure");
        }
        let code = self.exit_code.load(Ordering::SeqCst);
        if code != 0 {
            return CommandOutcome::failure(Some(code), "");
        }
        self.interpret(command)
    }

    async fn spawn(&self, argv: &[String]) -> Result<Option<ProcessHandle>, ProgrammerError> {
        check_argv(argv)?;
        self.spawned.lock().unwrap().push(argv.to_vec());
        Ok(None)
    }
}

/// In-memory [`SettingsStore`].
#[derive(Default)]
pub(crate) struct MemorySettings {
    flags: Mutex<HashMap<String, bool>>,
    automations: Mutex<HashMap<ModuleId, Vec<Automation>>>,
    broken: AtomicBool,
    reads: AtomicUsize,
}

impl MemorySettings {
    pub(crate) fn with(key: &str, value: bool) -> Self {
        let store = Self::default();
        store.flags.lock().unwrap().insert(key.to_string(), value);
        store
    }

    /// Number of `get_bool` calls so far.
    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Make every subsequent read fail.
    pub(crate) fn break_reads(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub(crate) fn put_automations(&self, module: &ModuleId, automations: Vec<Automation>) {
        self.automations
            .lock()
            .unwrap()
            .insert(module.clone(), automations);
    }

    fn check(&self) -> Result<(), PatchworkError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(PatchworkError::Storage("store unavailable".into()));
        }
        Ok(())
    }
}

impl SettingsStore for MemorySettings {
    async fn get_bool(&self, key: &str) -> Result<Option<bool>, PatchworkError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.flags.lock().unwrap().get(key).copied())
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<(), PatchworkError> {
        self.flags.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn automations(&self, module: &ModuleId) -> Result<Vec<Automation>, PatchworkError> {
        self.check()?;
        Ok(self
            .automations
            .lock()
            .unwrap()
            .get(module)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_automations(
        &self,
        module: &ModuleId,
        automations: &[Automation],
    ) -> Result<(), PatchworkError> {
        self.put_automations(module, automations.to_vec());
        Ok(())
    }
}
