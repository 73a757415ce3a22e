use egui::Key;
use serde::{Deserialize, Serialize};

use std::collections::HashMap;
use std::fmt;
use std::fs;

#[derive(Hash, Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Action {
    ConfirmSample,
    ClearSelection,
    ToggleShowSettings,
    ToggleShowStats,
}

impl Action {
    pub fn all() -> [Action; 4] {
        [
            Action::ConfirmSample,
            Action::ClearSelection,
            Action::ToggleShowSettings,
            Action::ToggleShowStats,
        ]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Action::ConfirmSample => write!(f, "Confirm sample"),
            Action::ClearSelection => write!(f, "Clear selection"),
            Action::ToggleShowSettings => write!(f, "Toggle settings panel"),
            Action::ToggleShowStats => write!(f, "Toggle fit statistics"),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct KeyBindings {
    bindings: HashMap<Action, Key>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(Action::ConfirmSample, Key::Enter);
        bindings.insert(Action::ClearSelection, Key::Escape);
        bindings.insert(Action::ToggleShowSettings, Key::F1);
        bindings.insert(Action::ToggleShowStats, Key::F2);
        Self { bindings }
    }
}

impl KeyBindings {
    pub fn set(&mut self, action: Action, new_key: Key) {
        self.bindings.retain(|_, &mut k| k != new_key);
        self.bindings.insert(action, new_key);
    }
    pub fn remove(&mut self, action: &Action) {
        self.bindings.remove(action);
    }
    pub fn key_for(&self, action: Action) -> Option<Key> {
        self.bindings.get(&action).copied()
    }

    pub fn action_triggered(&self, action: Action, input: &egui::InputState) -> bool {
        if let Some(&key) = self.bindings.get(&action) {
            input.key_pressed(key)
        } else {
            false
        }
    }

    pub fn save_to_file(&self, path: &str) -> std::io::Result<()> {
        let data = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, data)
    }

    pub fn load_from_file(path: &str) -> std::io::Result<Self> {
        let content = fs::read_to_string(path)?;
        let parsed: Self = serde_json::from_str(&content).map_err(std::io::Error::other)?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, KeyBindings};
    use egui::Key;

    #[test]
    fn test_defaults() {
        let kb = KeyBindings::default();
        assert_eq!(kb.key_for(Action::ConfirmSample), Some(Key::Enter));
        assert_eq!(kb.key_for(Action::ClearSelection), Some(Key::Escape));
    }

    #[test]
    fn test_rebind_steals_key() {
        let mut kb = KeyBindings::default();
        kb.set(Action::ToggleShowStats, Key::Enter);

        assert_eq!(kb.key_for(Action::ToggleShowStats), Some(Key::Enter));
        assert_eq!(kb.key_for(Action::ConfirmSample), None);
    }

    #[test]
    fn test_remove() {
        let mut kb = KeyBindings::default();
        kb.remove(&Action::ToggleShowSettings);
        assert_eq!(kb.key_for(Action::ToggleShowSettings), None);
    }
}
