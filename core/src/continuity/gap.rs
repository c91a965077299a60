use crate::prelude::{GeomagError, GeomagResult};
use crate::telemetry::LogManager;
use crate::timeseries::{Channel, SampleClock, TimeSeries};
use chrono::{DateTime, Duration, Utc};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed interval `[start, end]` covering a run of missing samples.
///
/// Both bounds are timestamps of missing samples, not of the present
/// samples around them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gap {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Gap {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True when `other` lies entirely inside this gap.
    pub fn contains(&self, other: &Gap) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    pub fn contains_time(&self, time: DateTime<Utc>) -> bool {
        self.start <= time && time <= self.end
    }
}

pub type GapsByChannel = BTreeMap<Channel, Vec<Gap>>;

/// Iterator over the maximal runs of `NaN` in one channel.
pub struct ChannelGaps<'a> {
    samples: ArrayView1<'a, f64>,
    clock: SampleClock,
    index: usize,
}

impl Iterator for ChannelGaps<'_> {
    type Item = Gap;

    fn next(&mut self) -> Option<Gap> {
        let len = self.samples.len();
        while self.index < len && !self.samples[self.index].is_nan() {
            self.index += 1;
        }
        if self.index >= len {
            return None;
        }
        let first = self.index;
        while self.index < len && self.samples[self.index].is_nan() {
            self.index += 1;
        }
        Some(Gap::new(
            self.clock.time_at(first),
            self.clock.time_at(self.index - 1),
        ))
    }
}

/// Gaps of one channel, in time order, timed by `clock`.
pub fn detect_channel_gaps<'a>(
    samples: ArrayView1<'a, f64>,
    clock: &SampleClock,
) -> ChannelGaps<'a> {
    ChannelGaps {
        samples,
        clock: *clock,
        index: 0,
    }
}

/// Gaps of every requested channel, each channel scanned on its own.
pub fn detect_series_gaps(
    series: &TimeSeries,
    channels: &[Channel],
) -> GeomagResult<GapsByChannel> {
    let logger = LogManager::new("continuity");
    channels
        .iter()
        .map(|channel| {
            let samples = series
                .channel(channel)
                .ok_or_else(|| GeomagError::missing_channel(channel))?;
            let gaps: Vec<Gap> = detect_channel_gaps(samples, series.clock()).collect();
            logger.record(&format!(
                "{} {}: {} gap(s)",
                series.observatory(),
                channel,
                gaps.len()
            ));
            Ok((channel.clone(), gaps))
        })
        .collect()
}

/// Gaps of every channel in the series.
pub fn detect_all_gaps(series: &TimeSeries) -> GapsByChannel {
    series
        .iter()
        .map(|(channel, samples)| {
            (
                channel.clone(),
                detect_channel_gaps(samples, series.clock()).collect(),
            )
        })
        .collect()
}
