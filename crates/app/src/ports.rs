//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod device_settings;
pub mod privilege;
pub mod settings;
pub mod trigger;

pub use device_settings::DeviceSettingsReader;
pub use privilege::{PrivilegeBackend, ProcessHandle};
pub use settings::SettingsStore;
pub use trigger::TriggerPublisher;
