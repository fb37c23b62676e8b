// libs/navigation-cell/src/frame.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Instruction for redrawing a screen the user navigated away from.
///
/// The stack never interprets a frame. `screen` names the screen to redraw
/// and `arguments` carries whatever that screen needs (user id, selected
/// patient, ...), so the owner of the screen decides how to restore it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationFrame {
    pub screen: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl NavigationFrame {
    pub fn new(screen: impl Into<String>) -> Self {
        Self {
            screen: screen.into(),
            arguments: Map::new(),
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn argument(&self, key: &str) -> Option<&Value> {
        self.arguments.get(key)
    }
}

impl fmt::Display for NavigationFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.screen)
    }
}
