//! Keyboard mapping
//!
//! Turns `KeyboardEvent.key` strings into game intents. Which intents
//! apply in which screen is decided by [`crate::app::App`].

/// Movement axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// What a pressed key asks for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    /// Set velocity on `axis` to `sign * speed`
    Move { axis: Axis, sign: f32 },
    Fire,
    TogglePause,
    /// Dismiss the game-over screen
    Confirm,
}

/// Map a key-down to an action
pub fn key_down_action(key: &str) -> Option<KeyAction> {
    let action = match key {
        "ArrowLeft" | "a" => KeyAction::Move {
            axis: Axis::Horizontal,
            sign: -1.0,
        },
        "ArrowRight" | "d" => KeyAction::Move {
            axis: Axis::Horizontal,
            sign: 1.0,
        },
        "ArrowUp" | "w" => KeyAction::Move {
            axis: Axis::Vertical,
            sign: -1.0,
        },
        "ArrowDown" | "s" => KeyAction::Move {
            axis: Axis::Vertical,
            sign: 1.0,
        },
        " " => KeyAction::Fire,
        "p" => KeyAction::TogglePause,
        "Enter" => KeyAction::Confirm,
        _ => return None,
    };
    Some(action)
}

/// Map a key-up to the axis whose velocity it zeroes
pub fn key_up_axis(key: &str) -> Option<Axis> {
    match key {
        "ArrowLeft" | "a" | "ArrowRight" | "d" => Some(Axis::Horizontal),
        "ArrowUp" | "w" | "ArrowDown" | "s" => Some(Axis::Vertical),
        _ => None,
    }
}
