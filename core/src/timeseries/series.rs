use crate::prelude::{GeomagError, GeomagResult};
use crate::timeseries::channel::Channel;
use crate::timeseries::clock::{Interval, SampleClock};
use chrono::{DateTime, Duration, Utc};
use ndarray::{concatenate, Array1, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Uniformly sampled set of channels from one observatory.
///
/// Missing samples are `NaN`. Every channel has the same length and the
/// clock ties index 0 to `start` and the last index to `end`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSeries", into = "RawTimeSeries")]
pub struct TimeSeries {
    observatory: String,
    channels: BTreeMap<Channel, Array1<f64>>,
    clock: SampleClock,
}

impl TimeSeries {
    pub fn new<I>(
        observatory: impl Into<String>,
        channels: I,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> GeomagResult<Self>
    where
        I: IntoIterator<Item = (Channel, Vec<f64>)>,
    {
        let channels: BTreeMap<Channel, Array1<f64>> = channels
            .into_iter()
            .map(|(channel, samples)| (channel, Array1::from(samples)))
            .collect();
        let count = common_length(&channels)?;
        Self::from_parts(observatory.into(), channels, SampleClock::new(start, end, count)?)
    }

    /// Series whose samples are spaced `interval` apart from `start`.
    pub fn with_interval<I>(
        observatory: impl Into<String>,
        channels: I,
        start: DateTime<Utc>,
        interval: Duration,
    ) -> GeomagResult<Self>
    where
        I: IntoIterator<Item = (Channel, Vec<f64>)>,
    {
        let channels: BTreeMap<Channel, Array1<f64>> = channels
            .into_iter()
            .map(|(channel, samples)| (channel, Array1::from(samples)))
            .collect();
        let count = common_length(&channels)?;
        let clock = SampleClock::with_interval(start, interval, count)?;
        Self::from_parts(observatory.into(), channels, clock)
    }

    /// All-missing series covering `[start, end]`.
    ///
    /// The first sample is aligned up to the next multiple of `interval`
    /// since the epoch; the last is the final sample at or before `end`.
    pub fn empty(
        observatory: impl Into<String>,
        channels: &[Channel],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> GeomagResult<Self> {
        let delta = interval.duration().num_nanoseconds().unwrap_or(1);
        let start_ns = start.timestamp_nanos_opt().ok_or_else(|| {
            GeomagError::InvalidSeries(format!("{} is outside the nanosecond range", start))
        })?;
        let aligned_ns = -(-start_ns).div_euclid(delta) * delta;
        let aligned = start + Duration::nanoseconds(aligned_ns - start_ns);
        let span_ns = (end - aligned).num_nanoseconds().unwrap_or(-1);
        if span_ns < 0 {
            return Err(GeomagError::InvalidSeries(format!(
                "no {} sample falls between {} and {}",
                interval, start, end
            )));
        }
        let count = (span_ns / delta) as usize + 1;
        let data = channels
            .iter()
            .map(|channel| (channel.clone(), Array1::from_elem(count, f64::NAN)))
            .collect();
        let clock = SampleClock::with_interval(aligned, interval.duration(), count)?;
        Self::from_parts(observatory.into(), data, clock)
    }

    pub(crate) fn from_parts(
        observatory: String,
        channels: BTreeMap<Channel, Array1<f64>>,
        clock: SampleClock,
    ) -> GeomagResult<Self> {
        if let Some((channel, data)) = channels.iter().find(|(_, data)| data.len() != clock.len()) {
            return Err(GeomagError::InvalidSeries(format!(
                "channel {} has {} samples, expected {}",
                channel,
                data.len(),
                clock.len()
            )));
        }
        Ok(Self {
            observatory,
            channels,
            clock,
        })
    }

    /// Same observatory and clock, different channel data.
    pub(crate) fn derive(&self, channels: BTreeMap<Channel, Array1<f64>>) -> GeomagResult<Self> {
        Self::from_parts(self.observatory.clone(), channels, self.clock)
    }

    pub fn observatory(&self) -> &str {
        &self.observatory
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.clock.start()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.clock.end()
    }

    pub fn len(&self) -> usize {
        self.clock.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clock.is_empty()
    }

    pub fn clock(&self) -> &SampleClock {
        &self.clock
    }

    pub fn rate(&self) -> GeomagResult<f64> {
        self.clock.rate()
    }

    pub fn sample_interval(&self) -> GeomagResult<Duration> {
        self.clock.sample_interval()
    }

    pub fn time_at(&self, index: usize) -> DateTime<Utc> {
        self.clock.time_at(index)
    }

    pub fn index_of(&self, time: DateTime<Utc>) -> GeomagResult<Option<usize>> {
        self.clock.index_of(time)
    }

    pub fn has_channel(&self, channel: &Channel) -> bool {
        self.channels.contains_key(channel)
    }

    pub fn channel(&self, channel: &Channel) -> Option<ArrayView1<'_, f64>> {
        self.channels.get(channel).map(|data| data.view())
    }

    /// Like [`TimeSeries::channel`], but a missing channel is a configuration error.
    pub fn require(&self, channel: &Channel) -> GeomagResult<ArrayView1<'_, f64>> {
        self.channel(channel)
            .ok_or_else(|| GeomagError::missing_channel(channel))
    }

    pub fn channel_codes(&self) -> impl Iterator<Item = &Channel> {
        self.channels.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Channel, ArrayView1<'_, f64>)> {
        self.channels.iter().map(|(channel, data)| (channel, data.view()))
    }

    /// Adds or replaces one channel, returning the extended series.
    pub fn with_channel(mut self, channel: Channel, samples: Vec<f64>) -> GeomagResult<Self> {
        if samples.len() != self.len() {
            return Err(GeomagError::InvalidSeries(format!(
                "channel {} has {} samples, expected {}",
                channel,
                samples.len(),
                self.len()
            )));
        }
        self.channels.insert(channel, Array1::from(samples));
        Ok(self)
    }

    /// New series restricted to `channels`.
    pub fn select(&self, channels: &[Channel]) -> GeomagResult<TimeSeries> {
        let selected = channels
            .iter()
            .map(|channel| {
                self.channels
                    .get(channel)
                    .map(|data| (channel.clone(), data.clone()))
                    .ok_or_else(|| GeomagError::missing_channel(channel))
            })
            .collect::<GeomagResult<BTreeMap<_, _>>>()?;
        self.derive(selected)
    }

    /// Concatenates `next` after this series.
    pub fn append(&self, next: &TimeSeries) -> GeomagResult<TimeSeries> {
        if self.observatory != next.observatory {
            return Err(GeomagError::Continuity(format!(
                "observatories differ: {} and {}",
                self.observatory, next.observatory
            )));
        }
        if !self.channels.keys().eq(next.channels.keys()) {
            return Err(GeomagError::Continuity(format!(
                "channel sets differ: [{}] and [{}]",
                join_codes(self.channel_codes()),
                join_codes(next.channel_codes())
            )));
        }
        if !self.clock.same_rate(&next.clock)? {
            return Err(GeomagError::Continuity(format!(
                "sample rates differ: {} Hz and {} Hz",
                self.rate()?,
                next.rate()?
            )));
        }
        if !self.clock.is_followed_by(next.start())? {
            return Err(GeomagError::Continuity(format!(
                "series ending {} is not followed one sample later by series starting {}",
                self.end(),
                next.start()
            )));
        }

        let channels = self
            .channels
            .iter()
            .zip(next.channels.values())
            .map(|((channel, head), tail)| {
                concatenate(Axis(0), &[head.view(), tail.view()])
                    .map(|data| (channel.clone(), data))
                    .map_err(|err| GeomagError::InvalidSeries(err.to_string()))
            })
            .collect::<GeomagResult<BTreeMap<_, _>>>()?;
        let clock = SampleClock::new(self.start(), next.end(), self.len() + next.len())?;
        Self::from_parts(self.observatory.clone(), channels, clock)
    }

    /// Re-windows the series to `[start, end]` on its own sample grid.
    ///
    /// Samples outside the current range are filled as missing, samples
    /// outside the window are dropped.
    pub fn pad_and_trim(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> GeomagResult<TimeSeries> {
        let first = self.clock.ceil_index(start)?;
        let last = self.clock.floor_index(end)?;
        if last < first {
            return Err(GeomagError::InvalidSeries(format!(
                "no sample falls between {} and {}",
                start, end
            )));
        }
        let count = (last - first + 1) as usize;
        let channels = self
            .channels
            .iter()
            .map(|(channel, data)| {
                let window = Array1::from_shape_fn(count, |offset| {
                    let index = first + offset as i64;
                    usize::try_from(index)
                        .ok()
                        .and_then(|index| data.get(index).copied())
                        .unwrap_or(f64::NAN)
                });
                (channel.clone(), window)
            })
            .collect();
        let clock = SampleClock::new(
            self.clock.time_at_offset(first),
            self.clock.time_at_offset(last),
            count,
        )?;
        Self::from_parts(self.observatory.clone(), channels, clock)
    }
}

/// Concatenates two series; see [`TimeSeries::append`].
pub fn append(first: &TimeSeries, second: &TimeSeries) -> GeomagResult<TimeSeries> {
    first.append(second)
}

fn common_length(channels: &BTreeMap<Channel, Array1<f64>>) -> GeomagResult<usize> {
    let mut lengths = channels.iter().map(|(channel, data)| (channel, data.len()));
    let Some((_, expected)) = lengths.next() else {
        return Ok(0);
    };
    match lengths.find(|(_, len)| *len != expected) {
        Some((channel, len)) => Err(GeomagError::InvalidSeries(format!(
            "channel {} has {} samples, expected {}",
            channel, len, expected
        ))),
        None => Ok(expected),
    }
}

fn join_codes<'a>(codes: impl Iterator<Item = &'a Channel>) -> String {
    codes.map(Channel::code).collect::<Vec<_>>().join(", ")
}

/// Serialized form; `NaN` samples travel as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawTimeSeries {
    observatory: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    channels: BTreeMap<Channel, Vec<Option<f64>>>,
}

impl TryFrom<RawTimeSeries> for TimeSeries {
    type Error = GeomagError;

    fn try_from(raw: RawTimeSeries) -> Result<Self, Self::Error> {
        let channels = raw.channels.into_iter().map(|(channel, samples)| {
            let samples = samples
                .into_iter()
                .map(|sample| sample.unwrap_or(f64::NAN))
                .collect();
            (channel, samples)
        });
        TimeSeries::new(raw.observatory, channels, raw.start, raw.end)
    }
}

impl From<TimeSeries> for RawTimeSeries {
    fn from(series: TimeSeries) -> Self {
        let start = series.start();
        let end = series.end();
        let channels = series
            .channels
            .into_iter()
            .map(|(channel, data)| {
                let samples = data
                    .iter()
                    .map(|&sample| (!sample.is_nan()).then_some(sample))
                    .collect();
                (channel, samples)
            })
            .collect();
        RawTimeSeries {
            observatory: series.observatory,
            start,
            end,
            channels,
        }
    }
}
