// Keyboard shortcut map: key sequences in, session actions out.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    NewTab,
    CloseTab,
    Refresh,
}

const MODIFIERS: &[&str] = &["Ctrl", "Alt", "Shift", "Meta"];

/// Canonical form of a key sequence: modifiers in a fixed order, then the
/// key, joined by `+`. Returns `None` for sequences without a key.
pub fn normalize_sequence(sequence: &str) -> Option<String> {
    let mut modifiers = Vec::new();
    let mut key = None;
    for part in sequence.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        match MODIFIERS.iter().find(|m| m.eq_ignore_ascii_case(part)) {
            Some(m) => modifiers.push(*m),
            None if part.eq_ignore_ascii_case("control") => modifiers.push("Ctrl"),
            None => key = Some(part.to_ascii_uppercase()),
        }
    }
    let key = key?;
    modifiers.sort_by_key(|m| MODIFIERS.iter().position(|x| x == m));
    modifiers.dedup();
    modifiers.push(key.as_str());
    Some(modifiers.join("+"))
}

#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<String, Action>,
}

impl Default for Keymap {
    fn default() -> Self {
        let mut keymap = Self {
            bindings: HashMap::new(),
        };
        keymap.bind("Ctrl+T", Action::NewTab);
        keymap.bind("Ctrl+W", Action::CloseTab);
        keymap.bind("F5", Action::Refresh);
        keymap
    }
}

impl Keymap {
    /// Binds `sequence` to `action`, replacing any previous binding.
    pub fn bind(&mut self, sequence: &str, action: Action) -> bool {
        match normalize_sequence(sequence) {
            Some(key) => {
                self.bindings.insert(key, action);
                true
            }
            None => {
                log::warn!("[Shortcuts] Ignoring binding without a key: {:?}", sequence);
                false
            }
        }
    }

    pub fn lookup(&self, sequence: &str) -> Option<Action> {
        self.bindings.get(&normalize_sequence(sequence)?).copied()
    }
}
