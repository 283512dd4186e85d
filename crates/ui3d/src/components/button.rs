//! Clickable panel button

/// Button state for visual feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    /// Not interacted with
    #[default]
    Normal,
    /// Pointer is over the button
    Hover,
    /// Trigger went down on the button and has not been released
    Pressed,
    /// Button ignores input
    Disabled,
}

/// Color scheme for button states (RGBA8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonColors {
    /// Normal state color
    pub normal: [u8; 4],
    /// Hover state color
    pub hover: [u8; 4],
    /// Pressed state color
    pub pressed: [u8; 4],
    /// Disabled state color
    pub disabled: [u8; 4],
}

impl Default for ButtonColors {
    fn default() -> Self {
        Self {
            normal: [70, 74, 82, 255],
            hover: [96, 112, 140, 255],
            pressed: [60, 120, 200, 255],
            disabled: [50, 50, 50, 128],
        }
    }
}

/// Button drawn on the panel
#[derive(Debug, Clone, PartialEq)]
pub struct PanelButton {
    /// Label shown to the user
    pub label: String,

    /// Current state
    pub state: ButtonState,

    /// Colors per state
    pub colors: ButtonColors,

    /// Whether the button is drawn and hit-testable
    pub visible: bool,

    /// Id reported when the button is activated
    pub callback_id: Option<u32>,
}

impl PanelButton {
    /// Create a button
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            state: ButtonState::Normal,
            colors: ButtonColors::default(),
            visible: true,
            callback_id: None,
        }
    }

    /// Builder: set color scheme
    pub fn with_colors(mut self, colors: ButtonColors) -> Self {
        self.colors = colors;
        self
    }

    /// Builder: set callback id
    pub fn with_callback(mut self, id: u32) -> Self {
        self.callback_id = Some(id);
        self
    }

    /// Update state
    pub fn set_state(&mut self, state: ButtonState) {
        self.state = state;
    }

    /// Color for the current state
    pub fn current_color(&self) -> [u8; 4] {
        match self.state {
            ButtonState::Normal => self.colors.normal,
            ButtonState::Hover => self.colors.hover,
            ButtonState::Pressed => self.colors.pressed,
            ButtonState::Disabled => self.colors.disabled,
        }
    }

    /// Check if the button reacts to input
    pub fn is_interactable(&self) -> bool {
        self.visible && self.state != ButtonState::Disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_creation() {
        let button = PanelButton::new("Record");
        assert_eq!(button.label, "Record");
        assert_eq!(button.state, ButtonState::Normal);
        assert!(button.is_interactable());
    }

    #[test]
    fn test_button_states() {
        let mut button = PanelButton::new("Test");

        button.set_state(ButtonState::Hover);
        assert!(button.is_interactable());
        assert_eq!(button.current_color(), button.colors.hover);

        button.set_state(ButtonState::Disabled);
        assert!(!button.is_interactable());
    }

    #[test]
    fn test_hidden_button_is_inert() {
        let mut button = PanelButton::new("Test").with_callback(7);
        button.visible = false;
        assert!(!button.is_interactable());
        assert_eq!(button.callback_id, Some(7));
    }
}
