//! Per-session command configuration

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use crate::commands::CommandKind;

/// Key holding the implicit wait of element lookups, in milliseconds
pub const IMPLICIT_WAIT: &str = "implicit_wait";

/// Configuration values keyed by command, scoped to one session
#[derive(Debug, Default)]
pub struct SessionSettings {
    entries: RwLock<HashMap<CommandKind, Map<String, Value>>>,
}

impl SessionSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<K: Into<String>>(&self, command: CommandKind, key: K, value: Value) {
        let mut entries = self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.entry(command).or_default().insert(key.into(), value);
    }

    pub fn get(&self, command: CommandKind, key: &str) -> Option<Value> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&command)
            .and_then(|settings| settings.get(key))
            .cloned()
    }

    /// All values configured for `command`
    pub fn for_command(&self, command: CommandKind) -> Map<String, Value> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&command)
            .cloned()
            .unwrap_or_default()
    }

    /// Implicit wait of `command`; zero when unset
    pub fn implicit_wait(&self, command: CommandKind) -> Duration {
        self.get(command, IMPLICIT_WAIT)
            .and_then(|v| v.as_u64())
            .map(Duration::from_millis)
            .unwrap_or(Duration::ZERO)
    }
}
