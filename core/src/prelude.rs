use crate::timeseries::{Channel, TimeSeries};

/// Common error type for the core.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeomagError {
    /// Required channel missing, unsupported frame combination or invalid flags.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Concatenation preconditions violated.
    #[error("continuity error: {0}")]
    Continuity(String),
    /// Operation needs a sample rate the series cannot define.
    #[error("domain error: {0}")]
    Domain(String),
    /// Construction input breaks the series invariants.
    #[error("invalid series: {0}")]
    InvalidSeries(String),
}

impl GeomagError {
    pub fn missing_channel(channel: &Channel) -> Self {
        GeomagError::Configuration(format!("channel {} not found in input", channel))
    }
}

pub type GeomagResult<T> = Result<T, GeomagError>;

/// A whole-series transformation that validates its input before touching samples.
pub trait SeriesStage {
    /// Channels that must be present on the input series.
    fn required_channels(&self) -> Vec<Channel>;

    /// Fails with [`GeomagError::Configuration`] naming the first absent channel.
    fn check_series(&self, series: &TimeSeries) -> GeomagResult<()> {
        match self
            .required_channels()
            .into_iter()
            .find(|channel| !series.has_channel(channel))
        {
            Some(channel) => Err(GeomagError::missing_channel(&channel)),
            None => Ok(()),
        }
    }

    fn process(&self, series: &TimeSeries) -> GeomagResult<TimeSeries>;
}
