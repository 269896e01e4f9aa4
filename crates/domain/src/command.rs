//! Shell command text for privileged operations.
//!
//! `run` takes a single shell-syntax string, so any argument that is not a
//! plain token gets single-quoted here before it reaches the elevated shell.

use std::borrow::Cow;

use crate::settings::SettingsNamespace;

/// Quote `arg` for a POSIX shell. Plain tokens are returned unchanged.
#[must_use]
pub fn quote(arg: &str) -> Cow<'_, str> {
    let plain = !arg.is_empty()
        && arg.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(b, b'_' | b'-' | b'.' | b'/' | b':' | b',' | b'=' | b'@' | b'%' | b'+')
        });
    if plain {
        Cow::Borrowed(arg)
    } else {
        Cow::Owned(format!("'{}'", arg.replace('\'', r"'\''")))
    }
}

/// Join a literal argv into one shell string, quoting every argument.
#[must_use]
pub fn join(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| quote(arg.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[must_use]
pub fn settings_put(namespace: SettingsNamespace, key: &str, value: &str) -> String {
    format!("settings put {namespace} {} {}", quote(key), quote(value))
}

#[must_use]
pub fn settings_get(namespace: SettingsNamespace, key: &str) -> String {
    format!("settings get {namespace} {}", quote(key))
}

#[must_use]
pub fn start_component(component: &str) -> String {
    format!("am start -n {}", quote(component))
}

#[must_use]
pub fn set_property(key: &str, value: &str) -> String {
    format!("setprop {} {}", quote(key), quote(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_leave_plain_tokens_unquoted() {
        assert_eq!(quote("master_mono"), "master_mono");
        assert_eq!(quote("com.example/.Main"), "com.example/.Main");
    }

    #[test]
    fn should_quote_tokens_with_spaces() {
        assert_eq!(quote("hello world"), "'hello world'");
    }

    #[test]
    fn should_escape_embedded_single_quotes() {
        assert_eq!(quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn should_quote_empty_argument() {
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn should_quote_shell_metacharacters() {
        assert_eq!(quote("a;rm -rf /"), "'a;rm -rf /'");
        assert_eq!(quote("$(id)"), "'$(id)'");
    }

    #[test]
    fn should_join_argv_with_quoting() {
        let argv = vec!["echo".to_string(), "a b".to_string(), "c".to_string()];
        assert_eq!(join(&argv), "echo 'a b' c");
    }

    #[test]
    fn should_build_settings_put_command() {
        assert_eq!(
            settings_put(SettingsNamespace::System, "master_mono", "1"),
            "settings put system master_mono 1"
        );
    }

    #[test]
    fn should_build_settings_get_command() {
        assert_eq!(
            settings_get(SettingsNamespace::Global, "adb_enabled"),
            "settings get global adb_enabled"
        );
    }

    #[test]
    fn should_build_component_and_property_commands() {
        assert_eq!(
            start_component("com.google.android.apps.maps/.MinModeActivity"),
            "am start -n com.google.android.apps.maps/.MinModeActivity"
        );
        assert_eq!(set_property("debug.hwui.profile", "true"), "setprop debug.hwui.profile true");
    }
}
