use crate::prelude::GeomagError;
use crate::timeseries::Channel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Orientation a series' horizontal components are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frame {
    /// X north, Y east of geographic north.
    #[serde(rename = "geo")]
    Geographic,
    /// H and declination D relative to magnetic north.
    #[serde(rename = "mag")]
    Magnetic,
    /// Sensor orientation, H and E.
    #[serde(rename = "obs")]
    Observatory,
    /// Sensor orientation with the declination angle D in place of E.
    #[serde(rename = "obsd")]
    ObservatoryDeclination,
}

impl Frame {
    pub const ALL: [Frame; 4] = [
        Frame::Geographic,
        Frame::Magnetic,
        Frame::Observatory,
        Frame::ObservatoryDeclination,
    ];

    pub fn channels(self) -> [Channel; 4] {
        match self {
            Frame::Geographic => [Channel::X, Channel::Y, Channel::Z, Channel::F],
            Frame::Magnetic | Frame::ObservatoryDeclination => {
                [Channel::H, Channel::D, Channel::Z, Channel::F]
            }
            Frame::Observatory => [Channel::H, Channel::E, Channel::Z, Channel::F],
        }
    }

    /// The two horizontal channels; the frame-invariant Z and F follow them.
    pub fn horizontal_channels(self) -> [Channel; 2] {
        let [first, second, _, _] = self.channels();
        [first, second]
    }

    pub fn is_observatory(self) -> bool {
        matches!(self, Frame::Observatory | Frame::ObservatoryDeclination)
    }

    pub fn code(self) -> &'static str {
        match self {
            Frame::Geographic => "geo",
            Frame::Magnetic => "mag",
            Frame::Observatory => "obs",
            Frame::ObservatoryDeclination => "obsd",
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Frame {
    type Err = GeomagError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|frame| frame.code() == code)
            .ok_or_else(|| GeomagError::Configuration(format!("unknown frame {:?}", code)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_codes_parse_and_list_channels() {
        assert_eq!("obsd".parse::<Frame>().unwrap(), Frame::ObservatoryDeclination);
        assert!("xyz".parse::<Frame>().is_err());
        assert_eq!(Frame::Geographic.horizontal_channels(), [Channel::X, Channel::Y]);
        assert_eq!(Frame::Observatory.channels()[1], Channel::E);
        assert_eq!(serde_json::to_string(&Frame::Magnetic).unwrap(), r#""mag""#);
    }
}
