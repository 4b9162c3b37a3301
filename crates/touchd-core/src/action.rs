//! Action identifiers and the button-to-action map.
//!
//! The KVM service owns the configuration; this daemon only fetches it.
//! The settings payload is a JSON object mapping a button key (legend
//! name or sensor index, see [`Button`]) to an action identifier string.
//! `"switch_next_host"` is the only action this front end understands;
//! any other value, including an absent key, means "no action" and is
//! kept verbatim so logs can show what was configured.

use std::collections::HashMap;

use crate::button::Button;
use crate::error::SettingsResult;

/// An action this front end knows how to forward to the KVM service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Ask the service to switch input to the next connected host.
    SwitchNextHost,
}

impl Action {
    /// Settings-payload identifier for [`Action::SwitchNextHost`].
    pub const SWITCH_NEXT_HOST: &'static str = "switch_next_host";

    /// Parses an action identifier; unknown identifiers are no action.
    pub fn parse(value: &str) -> Option<Action> {
        if value == Self::SWITCH_NEXT_HOST {
            Some(Action::SwitchNextHost)
        } else {
            None
        }
    }
}

/// The button-to-action mapping fetched from the KVM service.
///
/// Loaded wholesale from the settings payload each time a session is
/// (re)established and replaced, never mutated in place, so readers can
/// work from a snapshot without locking. Entries for unknown buttons or
/// unknown actions are retained but never dispatch anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionMap {
    entries: HashMap<String, String>,
}

impl ActionMap {
    /// An empty map; every button is a no-op.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses the JSON settings payload returned by the service.
    ///
    /// The payload must be a JSON object with string values, e.g.
    /// `{"A": "switch_next_host", "B": "noop"}`.
    pub fn parse(payload: &str) -> SettingsResult<Self> {
        let entries: HashMap<String, String> = serde_json::from_str(payload)?;
        Ok(Self { entries })
    }

    /// The recognized action configured for a pad, if any.
    ///
    /// Keys are matched by legend name or sensor index; a configured but
    /// unrecognized action identifier resolves to `None` like a missing
    /// entry.
    pub fn action_for(&self, button: Button) -> Option<Action> {
        self.entries
            .iter()
            .find(|(key, _)| button.matches_key(key))
            .and_then(|(_, value)| Action::parse(value))
    }

    /// Raw configured identifier for a pad, recognized or not.
    ///
    /// Used for logging what the service configured on no-op pads.
    pub fn configured_value(&self, button: Button) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| button.matches_key(key))
            .map(|(_, value)| value.as_str())
    }

    /// Number of configured entries, recognized or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the service returned no mapping at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse_recognized() {
        assert_eq!(
            Action::parse("switch_next_host"),
            Some(Action::SwitchNextHost)
        );
    }

    #[test]
    fn test_action_parse_unrecognized() {
        assert_eq!(Action::parse("noop"), None);
        assert_eq!(Action::parse(""), None);
        assert_eq!(Action::parse("Switch_Next_Host"), None);
    }

    #[test]
    fn test_parse_typical_payload() {
        let map = ActionMap::parse(r#"{"A": "switch_next_host", "B": "noop"}"#).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.action_for(Button::A), Some(Action::SwitchNextHost));
        assert_eq!(map.action_for(Button::B), None);
        assert_eq!(map.configured_value(Button::B), Some("noop"));
    }

    #[test]
    fn test_parse_empty_object() {
        let map = ActionMap::parse("{}").unwrap();
        assert!(map.is_empty());
        for button in Button::ALL {
            assert_eq!(map.action_for(button), None);
        }
    }

    #[test]
    fn test_parse_index_keyed_payload() {
        // Newer service builds key by sensor index instead of legend.
        let map = ActionMap::parse(r#"{"5": "switch_next_host"}"#).unwrap();
        assert_eq!(map.action_for(Button::Enter), Some(Action::SwitchNextHost));
        assert_eq!(map.action_for(Button::Back), None);
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(ActionMap::parse("not json").is_err());
        assert!(ActionMap::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_non_object_payloads() {
        assert!(ActionMap::parse(r#"["A", "B"]"#).is_err());
        assert!(ActionMap::parse(r#""switch_next_host""#).is_err());
        assert!(ActionMap::parse(r#"{"A": 1}"#).is_err());
    }

    #[test]
    fn test_unknown_button_keys_are_inert() {
        let map = ActionMap::parse(r#"{"F": "switch_next_host"}"#).unwrap();
        assert_eq!(map.len(), 1);
        for button in Button::ALL {
            assert_eq!(map.action_for(button), None);
        }
    }

    #[test]
    fn test_missing_entry_is_none() {
        let map = ActionMap::parse(r#"{"A": "switch_next_host"}"#).unwrap();
        assert_eq!(map.action_for(Button::Enter), None);
        assert_eq!(map.configured_value(Button::Enter), None);
    }
}
