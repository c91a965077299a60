use crate::prelude::GeomagError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Channel code of a geomagnetic time-series.
///
/// The single-letter element codes used by the three frames get their own
/// variants; anything else that is a valid code (uppercase letters, digits and
/// hyphens, starting with a letter) is carried as [`Channel::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Channel {
    H,
    D,
    E,
    X,
    Y,
    Z,
    F,
    Other(String),
}

impl Channel {
    pub fn code(&self) -> &str {
        match self {
            Channel::H => "H",
            Channel::D => "D",
            Channel::E => "E",
            Channel::X => "X",
            Channel::Y => "Y",
            Channel::Z => "Z",
            Channel::F => "F",
            Channel::Other(code) => code,
        }
    }

    /// Vertical and total-field channels carry the same values in every frame.
    pub fn is_frame_invariant(&self) -> bool {
        matches!(self, Channel::Z | Channel::F)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Channel {
    type Err = GeomagError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let valid = code.chars().next().map_or(false, |c| c.is_ascii_uppercase())
            && code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return Err(GeomagError::InvalidSeries(format!(
                "invalid channel code {:?}",
                code
            )));
        }
        Ok(match code {
            "H" => Channel::H,
            "D" => Channel::D,
            "E" => Channel::E,
            "X" => Channel::X,
            "Y" => Channel::Y,
            "Z" => Channel::Z,
            "F" => Channel::F,
            other => Channel::Other(other.to_string()),
        })
    }
}

impl TryFrom<String> for Channel {
    type Error = GeomagError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        channel.code().to_string()
    }
}
