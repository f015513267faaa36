//! Command requests
//!
//! A request is the command kind, the path parameters of the route it came in
//! on and the JSON payload.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::Error;

/// Commands understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    NewSession,
    DeleteSession,
    GetCapabilities,
    GetTitle,
    GetWindowHandles,
    IsEqual,
    Submit,
    SetConfiguration,
    SetImplicitWaitTimeout,
    SwitchToFrame,
    FindElement,
    FindElements,
    FindChildElement,
    FindChildElements,
}

static COMMAND_NAMES: phf::Map<&'static str, CommandKind> = phf::phf_map! {
    "NEW_SESSION" => CommandKind::NewSession,
    "DELETE_SESSION" => CommandKind::DeleteSession,
    "GET_SESSION" => CommandKind::GetCapabilities,
    "TITLE" => CommandKind::GetTitle,
    "WINDOW_HANDLES" => CommandKind::GetWindowHandles,
    "EQUAL" => CommandKind::IsEqual,
    "SUBMIT" => CommandKind::Submit,
    "CONFIGURE" => CommandKind::SetConfiguration,
    "IMPLICIT_WAIT" => CommandKind::SetImplicitWaitTimeout,
    "FRAME" => CommandKind::SwitchToFrame,
    "ELEMENT" => CommandKind::FindElement,
    "ELEMENTS" => CommandKind::FindElements,
    "ELEMENT_ROOT" => CommandKind::FindChildElement,
    "ELEMENTS_ROOT" => CommandKind::FindChildElements,
};

impl CommandKind {
    /// Every command kind
    pub const ALL: [CommandKind; 14] = [
        CommandKind::NewSession,
        CommandKind::DeleteSession,
        CommandKind::GetCapabilities,
        CommandKind::GetTitle,
        CommandKind::GetWindowHandles,
        CommandKind::IsEqual,
        CommandKind::Submit,
        CommandKind::SetConfiguration,
        CommandKind::SetImplicitWaitTimeout,
        CommandKind::SwitchToFrame,
        CommandKind::FindElement,
        CommandKind::FindElements,
        CommandKind::FindChildElement,
        CommandKind::FindChildElements,
    ];

    /// Commands whose lookups honour the implicit wait
    pub const ELEMENT_LOOKUPS: [CommandKind; 4] = [
        CommandKind::FindElement,
        CommandKind::FindElements,
        CommandKind::FindChildElement,
        CommandKind::FindChildElements,
    ];

    /// Parse a wire name such as `"TITLE"`
    pub fn from_name(name: &str) -> Result<Self, Error> {
        COMMAND_NAMES
            .get(name.trim().to_ascii_uppercase().as_str())
            .copied()
            .ok_or_else(|| Error::unknown_command(name))
    }

    pub fn name(&self) -> &'static str {
        COMMAND_NAMES
            .entries()
            .find(|(_, kind)| *kind == self)
            .map(|(name, _)| *name)
            .unwrap_or("UNKNOWN")
    }

    /// Whether the command runs against an existing session
    pub fn needs_session(&self) -> bool {
        !matches!(self, CommandKind::NewSession)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One command invocation
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub kind: CommandKind,
    /// Path parameters (`sessionId`, `reference`, `other`, `command`, ...)
    pub params: HashMap<String, String>,
    /// JSON body; `Null` when the request had none
    pub payload: Value,
}

impl CommandRequest {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            params: HashMap::new(),
            payload: Value::Null,
        }
    }

    pub fn with_param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn session_id(&self) -> Option<&str> {
        self.params.get("sessionId").map(String::as_str)
    }

    /// Required path parameter
    pub fn param(&self, name: &str) -> Result<&str, Error> {
        self.params
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::invalid_argument(format!("Missing path parameter {}", name)))
    }

    /// Payload field, `None` when absent
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// Required string payload field
    pub fn string_field(&self, name: &str) -> Result<&str, Error> {
        self.field(name)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid_argument(format!("Missing string field {}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_names() {
        assert_eq!(CommandKind::from_name("TITLE").unwrap(), CommandKind::GetTitle);
        assert_eq!(CommandKind::from_name("elements").unwrap(), CommandKind::FindElements);
        assert!(matches!(CommandKind::from_name("SCREENSHOT"), Err(Error::UnknownCommand(_))));

        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_name(kind.name()).unwrap(), kind);
        }
    }

    #[test]
    fn test_request_accessors() {
        let request = CommandRequest::new(CommandKind::IsEqual)
            .with_param("sessionId", "s-1")
            .with_param("reference", "4")
            .with_payload(json!({ "using": "css selector", "value": "a" }));

        assert_eq!(request.session_id(), Some("s-1"));
        assert_eq!(request.param("reference").unwrap(), "4");
        assert!(matches!(request.param("other"), Err(Error::InvalidArgument(_))));
        assert_eq!(request.string_field("using").unwrap(), "css selector");
        assert!(request.string_field("missing").is_err());
    }
}
