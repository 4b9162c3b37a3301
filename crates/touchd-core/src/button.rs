//! Button identifiers for the Touch pHAT panel.
//!
//! The panel exposes six capacitive pads. Each pad has a legend printed
//! on the board (`Back`, `A`..`D`, `Enter`) and a CAP1166 sensor input
//! index (0-5). Older service builds key their settings by legend name,
//! newer ones by sensor index, so both forms resolve to a `Button`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// One of the six capacitive pads on the Touch pHAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    /// Leftmost pad, sensor input 0.
    Back,
    /// Pad A, sensor input 1.
    A,
    /// Pad B, sensor input 2.
    B,
    /// Pad C, sensor input 3.
    C,
    /// Pad D, sensor input 4.
    D,
    /// Rightmost pad, sensor input 5.
    Enter,
}

impl Button {
    /// All pads in sensor-input order.
    pub const ALL: [Button; 6] = [
        Button::Back,
        Button::A,
        Button::B,
        Button::C,
        Button::D,
        Button::Enter,
    ];

    /// The legend printed next to the pad on the board.
    pub fn name(&self) -> &'static str {
        match self {
            Button::Back => "Back",
            Button::A => "A",
            Button::B => "B",
            Button::C => "C",
            Button::D => "D",
            Button::Enter => "Enter",
        }
    }

    /// CAP1166 sensor input index (bit position in the status register).
    pub fn index(&self) -> u8 {
        match self {
            Button::Back => 0,
            Button::A => 1,
            Button::B => 2,
            Button::C => 3,
            Button::D => 4,
            Button::Enter => 5,
        }
    }

    /// Resolves a sensor input index back to a pad.
    pub fn from_index(index: u8) -> Option<Button> {
        Button::ALL.get(usize::from(index)).copied()
    }

    /// Whether a settings key refers to this pad.
    ///
    /// Accepts the pad legend (case-insensitive) or the decimal sensor
    /// index, covering both settings-key generations.
    pub fn matches_key(&self, key: &str) -> bool {
        key.eq_ignore_ascii_case(self.name()) || key == self.index().to_string()
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Button {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Button::ALL
            .iter()
            .copied()
            .find(|b| b.matches_key(s))
            .ok_or_else(|| SettingsError::UnknownButton {
                key: s.to_string(),
            })
    }
}
