//! User and host inputs that drive the controller.

use std::str::FromStr;

use crate::error::SimulateError;

/// Key that stops the loop, matched case-insensitively.
pub const STOP_KEY: char = 'l';

/// Something the page (or a terminal standing in for it) can feed the
/// controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Touch/press start on the swipe area. Starts the loop from stopped.
    Press,
    /// Click on the stop button. Always stops.
    StopButton,
    /// A key press. Stops when it is [`STOP_KEY`], ignored otherwise.
    Key(char),
    /// The host's visibility signal.
    Visibility {
        /// `true` when the page moved to the background.
        hidden: bool,
    },
}

impl Input {
    /// Whether this key press is the stop key.
    #[must_use]
    pub fn is_stop_key(key: char) -> bool {
        key.eq_ignore_ascii_case(&STOP_KEY)
    }
}

/// Parses the line-oriented terminal protocol used by `simulate`.
///
/// Words are case-insensitive: `press`/`touch`, `stop`, `hide`, `show`,
/// `key <c>`, or any single character as a key press.
impl FromStr for Input {
    type Err = SimulateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let mut chars = line.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Self::Key(c));
        }

        let lower = line.to_ascii_lowercase();
        match lower.as_str() {
            "press" | "touch" => Ok(Self::Press),
            "stop" => Ok(Self::StopButton),
            "hide" => Ok(Self::Visibility { hidden: true }),
            "show" => Ok(Self::Visibility { hidden: false }),
            _ => {
                if let Some(rest) = lower.strip_prefix("key ") {
                    // Keep the original case of the key itself.
                    let key = line[line.len() - rest.len()..].trim();
                    let mut key_chars = key.chars();
                    if let (Some(c), None) = (key_chars.next(), key_chars.next()) {
                        return Ok(Self::Key(c));
                    }
                }
                Err(SimulateError::UnknownInput(line.to_string()))
            }
        }
    }
}
