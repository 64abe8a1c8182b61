//! Key names and their navigator bindings.
//!
//! Keys are identified by DOM-style names (`"ArrowLeft"`, `"f"`, `" "`), so
//! any front end can translate its own events into them.

use crate::types::NavAction;

pub const ARROW_LEFT: &str = "ArrowLeft";
pub const ARROW_RIGHT: &str = "ArrowRight";

/// Which keys drive the navigator. Everything else is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    pub retreat: String,
    pub advance: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            retreat: ARROW_LEFT.into(),
            advance: ARROW_RIGHT.into(),
        }
    }
}

impl KeyBindings {
    pub fn resolve(&self, key: &str) -> Option<NavAction> {
        if key == self.retreat {
            Some(NavAction::Retreat)
        } else if key == self.advance {
            Some(NavAction::Advance)
        } else {
            None
        }
    }

    /// `(key, action)` pairs, one per bound action.
    pub fn pairs(&self) -> [(&str, NavAction); 2] {
        [
            (self.retreat.as_str(), NavAction::Retreat),
            (self.advance.as_str(), NavAction::Advance),
        ]
    }
}
