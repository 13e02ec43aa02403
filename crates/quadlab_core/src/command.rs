//! Discrete viewer commands and the key bindings that produce them.
//!
//! The windowing layer translates platform key codes into `Key`, and only for
//! the initial press (auto-repeat is dropped there). Everything after that is
//! platform independent.

use std::fmt;

use crate::time::ScrubDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    F5,
    F6,
    Space,
    Q,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Re-read config, then texture, then shaders.
    Reload,
    Screenshot,
    TogglePause,
    /// Only has an effect while paused.
    ScrubTime(ScrubDirection),
    Quit,
}

impl Command {
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::F5 => Some(Self::Reload),
            Key::F6 => Some(Self::Screenshot),
            Key::Space => Some(Self::TogglePause),
            Key::Q => Some(Self::Quit),
            Key::Left => Some(Self::ScrubTime(ScrubDirection::Backward)),
            Key::Right => Some(Self::ScrubTime(ScrubDirection::Forward)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reload => f.write_str("reload"),
            Self::Screenshot => f.write_str("screenshot"),
            Self::TogglePause => f.write_str("toggle pause"),
            Self::ScrubTime(ScrubDirection::Backward) => f.write_str("scrub backward"),
            Self::ScrubTime(ScrubDirection::Forward) => f.write_str("scrub forward"),
            Self::Quit => f.write_str("quit"),
        }
    }
}
