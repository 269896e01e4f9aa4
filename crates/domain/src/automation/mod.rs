//! Automation — trigger → ordered actions.
//!
//! Each automation has a [`Trigger`] that determines when it activates and
//! one or more [`Action`]s executed in declaration order. Automations belong
//! to exactly one module and are replaced wholesale on update.

mod action;
mod trigger;

pub use action::{Action, ActionKind};
pub use trigger::Trigger;

use serde::{Deserialize, Serialize};

use crate::error::{PatchworkError, ValidationError};
use crate::id::AutomationId;

/// A rule that reacts to a trigger by executing actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Automation {
    pub id: AutomationId,
    pub name: String,
    pub enabled: bool,
    pub trigger: Trigger,
    pub actions: Vec<Action>,
}

impl Automation {
    /// Create a builder for constructing an [`Automation`].
    #[must_use]
    pub fn builder() -> AutomationBuilder {
        AutomationBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PatchworkError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `actions` is empty ([`ValidationError::NoActions`])
    /// - an action has malformed fields ([`ValidationError::InvalidAction`])
    pub fn validate(&self) -> Result<(), PatchworkError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.actions.is_empty() {
            return Err(ValidationError::NoActions.into());
        }
        for (index, action) in self.actions.iter().enumerate() {
            action
                .check()
                .map_err(|reason| ValidationError::InvalidAction { index, reason })?;
        }
        Ok(())
    }

    /// Whether this automation should run when `trigger` fires.
    #[must_use]
    pub fn responds_to(&self, trigger: Trigger) -> bool {
        self.enabled && self.trigger == trigger
    }
}

/// Step-by-step builder for [`Automation`].
#[derive(Debug, Default)]
pub struct AutomationBuilder {
    id: Option<AutomationId>,
    name: Option<String>,
    enabled: Option<bool>,
    trigger: Option<Trigger>,
    actions: Vec<Action>,
}

impl AutomationBuilder {
    #[must_use]
    pub fn id(mut self, id: AutomationId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Consume the builder, validate, and return an [`Automation`].
    ///
    /// The trigger defaults to [`Trigger::ScreenOff`].
    ///
    /// # Errors
    ///
    /// Returns [`PatchworkError::Validation`] if required fields are missing or invalid.
    pub fn build(self) -> Result<Automation, PatchworkError> {
        let automation = Automation {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            enabled: self.enabled.unwrap_or(true),
            trigger: self.trigger.unwrap_or(Trigger::ScreenOff),
            actions: self.actions,
        };
        automation.validate()?;
        Ok(automation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsNamespace;

    fn mono_on() -> Action {
        Action::WriteSetting {
            namespace: SettingsNamespace::System,
            key: "master_mono".to_string(),
            value: "1".to_string(),
        }
    }

    fn valid_automation() -> Automation {
        Automation::builder()
            .name("Mono audio when screen goes off")
            .trigger(Trigger::ScreenOff)
            .action(mono_on())
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_valid_automation_when_required_fields_provided() {
        let auto = valid_automation();
        assert_eq!(auto.name, "Mono audio when screen goes off");
        assert!(auto.enabled);
        assert_eq!(auto.trigger, Trigger::ScreenOff);
        assert_eq!(auto.actions.len(), 1);
    }

    #[test]
    fn should_build_disabled_automation_when_enabled_is_false() {
        let auto = Automation::builder()
            .name("Disabled rule")
            .enabled(false)
            .action(mono_on())
            .build()
            .unwrap();
        assert!(!auto.enabled);
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        let result = Automation::builder().action(mono_on()).build();
        assert!(matches!(
            result,
            Err(PatchworkError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_return_validation_error_when_actions_is_empty() {
        let result = Automation::builder().name("No actions").build();
        assert!(matches!(
            result,
            Err(PatchworkError::Validation(ValidationError::NoActions))
        ));
    }

    #[test]
    fn should_report_index_of_invalid_action() {
        let result = Automation::builder()
            .name("Broken")
            .action(mono_on())
            .action(Action::Shell {
                command: "  ".to_string(),
            })
            .build();
        assert!(matches!(
            result,
            Err(PatchworkError::Validation(ValidationError::InvalidAction { index: 1, .. }))
        ));
    }

    #[test]
    fn should_keep_actions_in_declaration_order() {
        let auto = Automation::builder()
            .name("Ordered")
            .action(mono_on())
            .action(Action::Delay { millis: 5 })
            .action(Action::LaunchComponent {
                component: "com.example/.Main".to_string(),
            })
            .build()
            .unwrap();
        let kinds: Vec<ActionKind> = auto.actions.iter().map(Action::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActionKind::WriteSetting,
                ActionKind::Delay,
                ActionKind::LaunchComponent
            ]
        );
    }

    #[test]
    fn should_respond_only_to_its_trigger_when_enabled() {
        let mut auto = valid_automation();
        assert!(auto.responds_to(Trigger::ScreenOff));
        assert!(!auto.responds_to(Trigger::ScreenOn));
        auto.enabled = false;
        assert!(!auto.responds_to(Trigger::ScreenOff));
    }

    #[test]
    fn should_roundtrip_automation_through_serde_json() {
        let auto = valid_automation();
        let json = serde_json::to_string(&auto).unwrap();
        let parsed: Automation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, auto);
    }
}
