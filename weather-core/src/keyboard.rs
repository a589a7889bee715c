use crate::{callback, model::Period};

pub const LOCATION_BUTTON_LABEL: &str = "send location";

/// Keyboard attached to an outgoing message, independent of the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// One-shot reply keyboard with a single button that shares the device location.
    RequestLocation { label: String },

    /// Inline buttons, one per row.
    Inline(Vec<InlineButton>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    /// Opaque payload handed back on press.
    pub data: String,
}

pub fn location_request() -> Keyboard {
    Keyboard::RequestLocation {
        label: LOCATION_BUTTON_LABEL.to_string(),
    }
}

/// `current` / `today` / `tomorrow` buttons, each carrying the city in its payload.
pub fn period_choice(city: &str) -> Keyboard {
    let buttons = Period::all()
        .iter()
        .map(|period| InlineButton {
            label: period.as_str().to_string(),
            data: callback::encode(*period, city),
        })
        .collect();

    Keyboard::Inline(buttons)
}
