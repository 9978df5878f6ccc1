//! Maps raw input (keys, taps, swipes) to reader commands.

use crate::navigation::SCROLL_STEP_PX;
use crate::preferences::{FlipDirection, Preferences, ReadingMode};

/// Fraction of the container width treated as a page-turn zone on each side.
const TAP_EDGE_FRACTION: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    A,
    D,
    F,
    H,
    S,
    Space,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key(Key),
    /// Tap at horizontal offset `x` inside a container `width` wide.
    Tap { x: f32, width: f32 },
    SwipeLeft,
    SwipeRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Prev,
    ScrollBy { dx: i32, dy: i32 },
    ToggleUi,
    ToggleFullscreen,
    ToggleSettings,
    ToggleAutoPlay,
    CloseSettings,
}

/// Translate an input event under the current preferences.
pub fn route(event: InputEvent, prefs: &Preferences) -> Command {
    let rtl = prefs.flip_direction == FlipDirection::Rtl;
    // In right-to-left reading the left side advances.
    let (left, right) = if rtl {
        (Command::Next, Command::Prev)
    } else {
        (Command::Prev, Command::Next)
    };
    let vertical_scroll = prefs.reading_mode == ReadingMode::ScrollVertical;

    match event {
        InputEvent::Key(Key::ArrowLeft | Key::A) => left,
        InputEvent::Key(Key::ArrowRight | Key::D) => right,
        InputEvent::Key(Key::ArrowUp) if vertical_scroll => Command::ScrollBy {
            dx: 0,
            dy: -SCROLL_STEP_PX,
        },
        InputEvent::Key(Key::ArrowDown) if vertical_scroll => Command::ScrollBy {
            dx: 0,
            dy: SCROLL_STEP_PX,
        },
        InputEvent::Key(Key::ArrowUp) => Command::Prev,
        InputEvent::Key(Key::ArrowDown) => Command::Next,
        InputEvent::Key(Key::F) => Command::ToggleFullscreen,
        InputEvent::Key(Key::H) => Command::ToggleUi,
        InputEvent::Key(Key::S) => Command::ToggleSettings,
        InputEvent::Key(Key::Space) => Command::ToggleAutoPlay,
        InputEvent::Key(Key::Escape) => Command::CloseSettings,
        InputEvent::Tap { x, width } => {
            if x < width * TAP_EDGE_FRACTION {
                left
            } else if x > width * (1.0 - TAP_EDGE_FRACTION) {
                right
            } else {
                Command::ToggleUi
            }
        }
        InputEvent::SwipeLeft => right,
        InputEvent::SwipeRight => left,
    }
}
