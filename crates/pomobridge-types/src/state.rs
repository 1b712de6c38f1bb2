//! The shared pomodoro state record and partial updates to it.
//!
//! [`PomodoroState`] is the single process-wide truth the relay holds. The
//! browser extension pushes [`StateUpdate`]s; every field present in an
//! update overwrites the corresponding field, absent fields are left alone.

use serde::{Deserialize, Serialize};

use crate::enums::Phase;

/// Placeholder timer text shown before any state has been received.
pub const NO_TIMER: &str = "--:--";

/// Full pomodoro state as relayed to clients.
///
/// Serializes with the wire field names `timer`, `task`, `phase`,
/// `running` and `loggedIn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroState {
    /// Timer display string (e.g. `24:59`).
    pub timer: String,
    /// Free-text name of the current task.
    pub task: String,
    /// Current phase of the cycle.
    pub phase: Phase,
    /// Whether the timer is counting down.
    pub running: bool,
    /// Whether the user is signed in on the tracker website.
    pub logged_in: bool,
}

impl Default for PomodoroState {
    fn default() -> Self {
        Self {
            timer: NO_TIMER.to_owned(),
            task: String::new(),
            phase: Phase::Paused,
            running: false,
            logged_in: false,
        }
    }
}

impl PomodoroState {
    /// Overwrite every field present in `update`.
    ///
    /// Returns `true` if any field value actually changed.
    pub fn apply(&mut self, update: &StateUpdate) -> bool {
        if update.is_empty() {
            return false;
        }
        let before = self.clone();
        if let Some(timer) = &update.timer {
            self.timer.clone_from(timer);
        }
        if let Some(task) = &update.task {
            self.task.clone_from(task);
        }
        if let Some(phase) = update.phase {
            self.phase = phase;
        }
        if let Some(running) = update.running {
            self.running = running;
        }
        if let Some(logged_in) = update.logged_in {
            self.logged_in = logged_in;
        }
        *self != before
    }
}

/// A partial state update carried by an inbound `state` message.
///
/// Unknown fields are ignored during deserialization; a JSON `null` for a
/// known field is treated the same as an absent field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateUpdate {
    /// New timer display string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<String>,
    /// New task name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    /// New phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    /// New running flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running: Option<bool>,
    /// New logged-in flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_in: Option<bool>,
}

impl StateUpdate {
    /// Whether the update carries none of the known fields.
    pub const fn is_empty(&self) -> bool {
        self.timer.is_none()
            && self.task.is_none()
            && self.phase.is_none()
            && self.running.is_none()
            && self.logged_in.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn working_state() -> PomodoroState {
        PomodoroState {
            timer: "25:00".to_owned(),
            task: "Write".to_owned(),
            phase: Phase::Work,
            running: true,
            logged_in: true,
        }
    }

    #[test]
    fn default_state_matches_placeholder() {
        let state = PomodoroState::default();
        assert_eq!(state.timer, "--:--");
        assert_eq!(state.task, "");
        assert_eq!(state.phase, Phase::Paused);
        assert!(!state.running);
        assert!(!state.logged_in);
    }

    #[test]
    fn apply_timer_only_leaves_other_fields() {
        let mut state = working_state();
        let update = StateUpdate {
            timer: Some("24:59".to_owned()),
            ..StateUpdate::default()
        };
        assert!(state.apply(&update));
        assert_eq!(
            state,
            PomodoroState {
                timer: "24:59".to_owned(),
                ..working_state()
            }
        );
    }

    #[test]
    fn apply_every_field() {
        let mut state = PomodoroState::default();
        let update = StateUpdate {
            timer: Some("05:00".to_owned()),
            task: Some("Stretch".to_owned()),
            phase: Some(Phase::Break),
            running: Some(true),
            logged_in: Some(true),
        };
        assert!(state.apply(&update));
        assert_eq!(state.timer, "05:00");
        assert_eq!(state.task, "Stretch");
        assert_eq!(state.phase, Phase::Break);
        assert!(state.running);
        assert!(state.logged_in);
    }

    #[test]
    fn apply_empty_update_is_noop() {
        let mut state = working_state();
        let update = StateUpdate::default();
        assert!(update.is_empty());
        assert!(!state.apply(&update));
        assert_eq!(state, working_state());
    }

    #[test]
    fn apply_identical_values_reports_unchanged() {
        let mut state = working_state();
        let update = StateUpdate {
            task: Some("Write".to_owned()),
            running: Some(true),
            ..StateUpdate::default()
        };
        assert!(!state.apply(&update));
    }

    #[test]
    fn state_serializes_logged_in_in_camel_case() {
        let json = serde_json::to_value(working_state()).unwrap_or_default();
        assert_eq!(json.get("loggedIn"), Some(&serde_json::Value::Bool(true)));
        assert!(json.get("logged_in").is_none());
        assert_eq!(json.get("phase"), Some(&serde_json::json!("work")));
    }

    #[test]
    fn update_ignores_unknown_fields_and_nulls() {
        let update: Result<StateUpdate, _> =
            serde_json::from_str(r#"{"timer":null,"task":"Read","colour":"red"}"#);
        let update = update.unwrap_or_default();
        assert_eq!(update.timer, None);
        assert_eq!(update.task.as_deref(), Some("Read"));
    }
}
