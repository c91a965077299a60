use crate::frames::convert::{
    geographic_from_magnetic, geographic_from_observatory, magnetic_from_geographic,
    magnetic_from_observatory, observatory_from_geographic, observatory_from_magnetic,
    observatory_from_observatory, ObservatoryChannels,
};
use crate::frames::frame::Frame;
use crate::math::ChannelAlgebra;
use crate::prelude::{GeomagResult, SeriesStage};
use crate::telemetry::LogManager;
use crate::timeseries::{Channel, TimeSeries};
use serde::{Deserialize, Serialize};

/// Converts whole series from one frame to another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameConverter {
    from: Frame,
    to: Frame,
    algebra: ChannelAlgebra,
}

impl FrameConverter {
    pub fn new(from: Frame, to: Frame, algebra: ChannelAlgebra) -> Self {
        Self { from, to, algebra }
    }

    pub fn from_frame(&self) -> Frame {
        self.from
    }

    pub fn to_frame(&self) -> Frame {
        self.to
    }

    pub fn algebra(&self) -> &ChannelAlgebra {
        &self.algebra
    }

    /// Channels the output carries: the target frame's horizontal pair plus
    /// whichever of Z and F the input had.
    fn output_channels(&self, series: &TimeSeries) -> Vec<Channel> {
        let mut channels = self.to.horizontal_channels().to_vec();
        channels.extend(
            [Channel::Z, Channel::F]
                .into_iter()
                .filter(|channel| series.has_channel(channel)),
        );
        channels
    }
}

impl SeriesStage for FrameConverter {
    /// Observatory input needs H and either E or D; the E/D choice is checked
    /// by the conversion itself.
    fn required_channels(&self) -> Vec<Channel> {
        if self.from.is_observatory() {
            vec![Channel::H]
        } else {
            self.from.horizontal_channels().to_vec()
        }
    }

    fn process(&self, series: &TimeSeries) -> GeomagResult<TimeSeries> {
        self.check_series(series)?;
        LogManager::new("converter").record(&format!(
            "{} -> {} for {} ({} samples)",
            self.from,
            self.to,
            series.observatory(),
            series.len()
        ));

        let algebra = &self.algebra;
        let converted = match (self.from, self.to) {
            (from, to) if from == to && !from.is_observatory() => return Ok(series.clone()),
            (Frame::Magnetic, Frame::Geographic) => geographic_from_magnetic(series)?,
            (Frame::Geographic, Frame::Magnetic) => magnetic_from_geographic(series)?,
            (Frame::Geographic, _) => observatory_from_geographic(series, algebra)?,
            (Frame::Magnetic, _) => observatory_from_magnetic(series, algebra)?,
            (_, Frame::Geographic) => geographic_from_observatory(series, algebra)?,
            (_, Frame::Magnetic) => magnetic_from_observatory(series, algebra)?,
            (_, Frame::Observatory) => {
                observatory_from_observatory(series, ObservatoryChannels::e())?
            }
            (_, Frame::ObservatoryDeclination) => {
                observatory_from_observatory(series, ObservatoryChannels::d())?
            }
        };
        converted.select(&self.output_channels(&converted))
    }
}
