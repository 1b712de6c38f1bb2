//! Inbound and outbound message shapes.
//!
//! Every frame is a UTF-8 JSON object with a string `type` field. Inbound
//! frames decode into the closed [`ClientMessage`] variant set; the relay
//! replies with [`ServerMessage`]s.
//!
//! Decoding is fallible and never panics: anything that is not a JSON
//! object with a string `type`, or a known message whose fields carry the
//! wrong JSON types, yields a [`DecodeError`]. Objects whose `type` is not
//! one of `hello`, `state` or `command` decode to
//! [`ClientMessage::Unrecognized`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::enums::Role;
use crate::state::{PomodoroState, StateUpdate};

/// A frame that could not be decoded into a [`ClientMessage`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The text is not JSON, or a known message has ill-typed fields.
    #[error("malformed message: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The JSON value is not an object.
    #[error("message is not a JSON object")]
    NotAnObject,

    /// The object has no string `type` field.
    #[error("message has no string `type` field")]
    MissingType,
}

/// A message sent by a client to the relay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Identify the connection as a given role.
    Hello {
        /// The declared role (`client` on the wire).
        #[serde(default, deserialize_with = "role_from_client")]
        client: Role,
    },
    /// Overwrite the present fields of the shared state.
    State(StateUpdate),
    /// A control command to forward to every browser client.
    Command {
        /// Opaque command payload, relayed verbatim.
        #[serde(default)]
        cmd: Value,
    },
    /// An object with a `type` the relay does not handle.
    #[serde(other)]
    Unrecognized,
}

impl ClientMessage {
    /// Decode a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the text is not a JSON object with a
    /// string `type`, or if a known message carries ill-typed fields.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(text)?;
        let Some(object) = value.as_object() else {
            return Err(DecodeError::NotAnObject);
        };
        if !object.get("type").is_some_and(Value::is_string) {
            return Err(DecodeError::MissingType);
        }
        Ok(Self::deserialize(value)?)
    }

    /// The wire `type` of this message, for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Hello { .. } => "hello",
            Self::State(_) => "state",
            Self::Command { .. } => "command",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// Deserialize the `client` field of a `hello`, mapping names to roles.
fn role_from_client<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    let client = Option::<String>::deserialize(deserializer)?;
    Ok(client.as_deref().map_or(Role::Unknown, Role::from_client))
}

/// A message sent by the relay to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// A full snapshot of the shared state (all five fields).
    State(PomodoroState),
    /// A command relayed from another client.
    Command {
        /// The command payload, copied verbatim from the triggering message.
        cmd: Value,
    },
}

impl ServerMessage {
    /// Serialize to the JSON text sent over the wire.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::enums::Phase;

    fn state_update(text: &str) -> StateUpdate {
        match ClientMessage::decode(text).unwrap() {
            ClientMessage::State(update) => Some(update),
            _ => None,
        }
        .unwrap()
    }

    #[test]
    fn decode_hello_roles() {
        let gnome = ClientMessage::decode(r#"{"type":"hello","client":"gnome"}"#).unwrap();
        assert_eq!(gnome, ClientMessage::Hello { client: Role::Gnome });

        let browser = ClientMessage::decode(r#"{"type":"hello","client":"browser"}"#).unwrap();
        assert_eq!(browser, ClientMessage::Hello { client: Role::Browser });
    }

    #[test]
    fn decode_hello_without_client_is_unknown() {
        let msg = ClientMessage::decode(r#"{"type":"hello"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Hello { client: Role::Unknown });
    }

    #[test]
    fn decode_hello_with_unrecognized_client() {
        let msg = ClientMessage::decode(r#"{"type":"hello","client":"kde"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Hello { client: Role::Unknown });
    }

    #[test]
    fn decode_partial_state() {
        let update = state_update(r#"{"type":"state","timer":"24:59"}"#);
        assert_eq!(update.timer.as_deref(), Some("24:59"));
        assert!(update.task.is_none());
        assert!(update.phase.is_none());
        assert!(update.running.is_none());
        assert!(update.logged_in.is_none());
    }

    #[test]
    fn decode_full_state_from_content_script() {
        let text = r#"{"type":"state","timer":"12:34","task":"Read","phase":"break","running":true,"loggedIn":true}"#;
        let update = state_update(text);
        assert_eq!(update.phase, Some(Phase::Break));
        assert_eq!(update.logged_in, Some(true));
    }

    #[test]
    fn decode_state_ignores_extra_fields() {
        let update = state_update(r#"{"type":"state","task":"Plan","volume":11}"#);
        assert_eq!(update.task.as_deref(), Some("Plan"));
    }

    #[test]
    fn decode_state_with_wrong_field_type_is_malformed() {
        assert!(ClientMessage::decode(r#"{"type":"state","running":"yes"}"#).is_err());
        assert!(ClientMessage::decode(r#"{"type":"state","phase":"lunch"}"#).is_err());
    }

    #[test]
    fn decode_command_keeps_payload_verbatim() {
        let msg = ClientMessage::decode(r#"{"type":"command","cmd":"start"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Command { cmd: json!("start") });

        let nested =
            ClientMessage::decode(r#"{"type":"command","cmd":{"skip":[1,2]}}"#).unwrap();
        assert_eq!(nested, ClientMessage::Command { cmd: json!({"skip": [1, 2]}) });
    }

    #[test]
    fn command_reencodes_key_order_and_big_numbers_unchanged() {
        let cmd = r#"{"zeta":1,"alpha":{"y":2,"x":3},"id":123456789012345678901234567890,"ratio":0.10}"#;
        let text = format!(r#"{{"type":"command","cmd":{cmd}}}"#);
        let cmd = match ClientMessage::decode(&text).unwrap() {
            ClientMessage::Command { cmd } => Some(cmd),
            _ => None,
        }
        .unwrap();
        assert_eq!(
            ServerMessage::Command { cmd }.to_json().unwrap(),
            text
        );
    }

    #[test]
    fn decode_command_without_cmd_is_null() {
        let msg = ClientMessage::decode(r#"{"type":"command"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Command { cmd: Value::Null });
    }

    #[test]
    fn decode_unknown_type_is_unrecognized() {
        let msg = ClientMessage::decode(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Unrecognized);
        assert_eq!(msg.kind(), "unrecognized");
    }

    #[test]
    fn decode_rejects_non_json_and_missing_type() {
        assert!(ClientMessage::decode("not json at all").is_err());
        assert!(ClientMessage::decode("").is_err());
        assert!(ClientMessage::decode("[1,2,3]").is_err());
        assert!(ClientMessage::decode(r#"{"timer":"01:00"}"#).is_err());
        assert!(ClientMessage::decode(r#"{"type":"state","timer":5}"#).is_err());
    }

    #[test]
    fn decode_distinguishes_shape_errors() {
        assert!(matches!(
            ClientMessage::decode(r#"["hello"]"#),
            Err(DecodeError::NotAnObject)
        ));
        assert!(matches!(
            ClientMessage::decode(r#"{"type":0}"#),
            Err(DecodeError::MissingType)
        ));
        assert!(matches!(
            ClientMessage::decode(r#"{"client":"gnome"}"#),
            Err(DecodeError::MissingType)
        ));
        assert!(matches!(
            ClientMessage::decode("{"),
            Err(DecodeError::Json { .. })
        ));
    }

    #[test]
    fn snapshot_has_all_five_fields() {
        let msg = ServerMessage::State(PomodoroState::default());
        let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "state",
                "timer": "--:--",
                "task": "",
                "phase": "paused",
                "running": false,
                "loggedIn": false,
            })
        );
    }

    #[test]
    fn command_relay_shape() {
        let msg = ServerMessage::Command { cmd: json!("pause") };
        let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(value, json!({"type": "command", "cmd": "pause"}));
    }
}
