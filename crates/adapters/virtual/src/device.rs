//! Simulated device — settings tables, system properties and an activity log.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use patchwork_domain::backend::CommandOutcome;
use patchwork_domain::settings::SettingsNamespace;

use crate::shell;

#[derive(Default)]
struct State {
    settings: BTreeMap<(SettingsNamespace, String), String>,
    properties: BTreeMap<String, String>,
    launched: Vec<String>,
}

/// In-memory stand-in for the parts of a device the actions touch.
#[derive(Default)]
pub struct VirtualDevice {
    state: Mutex<State>,
}

impl VirtualDevice {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn setting(&self, namespace: SettingsNamespace, key: &str) -> Option<String> {
        self.lock()
            .settings
            .get(&(namespace, key.to_string()))
            .cloned()
    }

    pub fn put_setting(&self, namespace: SettingsNamespace, key: &str, value: &str) {
        self.lock()
            .settings
            .insert((namespace, key.to_string()), value.to_string());
    }

    #[must_use]
    pub fn property(&self, key: &str) -> Option<String> {
        self.lock().properties.get(key).cloned()
    }

    /// Components started with `am start`, oldest first.
    #[must_use]
    pub fn launched(&self) -> Vec<String> {
        self.lock().launched.clone()
    }

    /// Interpret one command line.
    pub(crate) fn execute(&self, line: &str) -> CommandOutcome {
        let Some(words) = shell::split(line) else {
            return CommandOutcome::failure(Some(2), "syntax error: unterminated quoted string\n");
        };
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        let mut state = self.lock();
        match words.as_slice() {
            [] | ["true"] => CommandOutcome::success(""),
            ["false"] => CommandOutcome::failure(Some(1), ""),
            ["id"] => CommandOutcome::success("uid=2000(shell) gid=2000(shell)\n"),
            ["settings", verb, namespace, key, rest @ ..] => {
                let Ok(namespace) = namespace.parse::<SettingsNamespace>() else {
                    return CommandOutcome::failure(Some(255), format!("Invalid namespace '{namespace}'\n"));
                };
                let entry = (namespace, (*key).to_string());
                match (*verb, rest) {
                    ("get", []) => {
                        let value = state.settings.get(&entry).map_or("null", String::as_str);
                        CommandOutcome::success(format!("{value}\n"))
                    }
                    ("put", [value]) => {
                        state.settings.insert(entry, (*value).to_string());
                        CommandOutcome::success("")
                    }
                    ("delete", []) => {
                        let deleted = usize::from(state.settings.remove(&entry).is_some());
                        CommandOutcome::success(format!("Deleted {deleted} rows\n"))
                    }
                    _ => usage("settings"),
                }
            }
            ["setprop", key, value] => {
                state
                    .properties
                    .insert((*key).to_string(), (*value).to_string());
                CommandOutcome::success("")
            }
            ["getprop", key] => {
                let value = state.properties.get(*key).map_or("", String::as_str);
                CommandOutcome::success(format!("{value}\n"))
            }
            ["am", "start", "-n", component] => {
                if !component.contains('/') {
                    return CommandOutcome::failure(
                        Some(1),
                        format!("Error: Bad component name: {component}\n"),
                    );
                }
                state.launched.push((*component).to_string());
                CommandOutcome::success(format!("Starting: Intent {{ cmp={component} }}\n"))
            }
            [program, ..] => CommandOutcome::failure(Some(127), format!("{program}: not found\n")),
        }
    }
}

fn usage(program: &str) -> CommandOutcome {
    CommandOutcome::failure(Some(255), format!("{program}: invalid arguments\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_round_trip_setting_through_commands() {
        let device = VirtualDevice::default();

        assert!(device.execute("settings put system master_mono 1").is_success());
        assert_eq!(
            device.execute("settings get system master_mono"),
            CommandOutcome::success("1\n")
        );
        assert_eq!(
            device.setting(SettingsNamespace::System, "master_mono").as_deref(),
            Some("1")
        );
    }

    #[test]
    fn should_print_null_for_unset_setting() {
        let device = VirtualDevice::default();
        assert_eq!(
            device.execute("settings get secure adb_enabled"),
            CommandOutcome::success("null\n")
        );
    }

    #[test]
    fn should_delete_setting() {
        let device = VirtualDevice::default();
        device.put_setting(SettingsNamespace::Global, "airplane_mode_on", "1");

        let outcome = device.execute("settings delete global airplane_mode_on");

        assert_eq!(outcome, CommandOutcome::success("Deleted 1 rows\n"));
        assert_eq!(device.setting(SettingsNamespace::Global, "airplane_mode_on"), None);
    }

    #[test]
    fn should_reject_unknown_namespace() {
        let device = VirtualDevice::default();
        let outcome = device.execute("settings get vendor thing");
        assert!(matches!(outcome, CommandOutcome::Failure { code: Some(255), .. }));
    }

    #[test]
    fn should_store_quoted_property_value() {
        let device = VirtualDevice::default();

        device.execute("setprop debug.label 'hello world'");

        assert_eq!(device.property("debug.label").as_deref(), Some("hello world"));
        assert_eq!(
            device.execute("getprop debug.label"),
            CommandOutcome::success("hello world\n")
        );
    }

    #[test]
    fn should_record_launched_component() {
        let device = VirtualDevice::default();

        let outcome = device.execute("am start -n com.example/.MainActivity");

        assert!(outcome.is_success());
        assert_eq!(device.launched(), vec!["com.example/.MainActivity".to_string()]);
    }

    #[test]
    fn should_fail_with_127_for_unknown_program() {
        let device = VirtualDevice::default();
        assert_eq!(
            device.execute("reboot"),
            CommandOutcome::failure(Some(127), "reboot: not found\n")
        );
    }
}
