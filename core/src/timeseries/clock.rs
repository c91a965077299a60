use crate::prelude::{GeomagError, GeomagResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maps sample indexes to absolute times and back.
///
/// Times are derived from the exact span between first and last sample, so
/// index 0 is always `start` and index `len - 1` is always `end`, even when
/// the spacing is not a whole number of nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleClock {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    count: usize,
    span_ns: i64,
}

impl SampleClock {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, count: usize) -> GeomagResult<Self> {
        let span_ns = (end - start).num_nanoseconds().ok_or_else(|| {
            GeomagError::InvalidSeries("time span exceeds nanosecond range".into())
        })?;
        if span_ns < 0 {
            return Err(GeomagError::InvalidSeries(format!(
                "end {} precedes start {}",
                end, start
            )));
        }
        if count == 1 && span_ns != 0 {
            return Err(GeomagError::InvalidSeries(
                "a single sample must start and end at the same time".into(),
            ));
        }
        if count >= 2 && span_ns == 0 {
            return Err(GeomagError::InvalidSeries(format!(
                "{} samples cannot share one timestamp",
                count
            )));
        }
        Ok(Self {
            start,
            end,
            count,
            span_ns,
        })
    }

    /// Clock of `count` samples spaced `interval` apart, starting at `start`.
    pub fn with_interval(
        start: DateTime<Utc>,
        interval: Duration,
        count: usize,
    ) -> GeomagResult<Self> {
        let interval_ns = interval
            .num_nanoseconds()
            .filter(|ns| *ns > 0)
            .ok_or_else(|| {
                GeomagError::InvalidSeries(format!("invalid sample interval {}", interval))
            })?;
        let span = i128::from(interval_ns) * count.saturating_sub(1) as i128;
        let span_ns = i64::try_from(span).map_err(|_| {
            GeomagError::InvalidSeries("time span exceeds nanosecond range".into())
        })?;
        Self::new(start, start + Duration::nanoseconds(span_ns), count)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn require_rate(&self) -> GeomagResult<i128> {
        if self.count < 2 {
            return Err(GeomagError::Domain(format!(
                "sample rate is undefined for a series of {} sample(s)",
                self.count
            )));
        }
        Ok((self.count - 1) as i128)
    }

    /// Samples per second.
    pub fn rate(&self) -> GeomagResult<f64> {
        let steps = self.require_rate()?;
        Ok(steps as f64 / (self.span_ns as f64 / 1e9))
    }

    /// Spacing between samples, truncated to whole nanoseconds.
    pub fn sample_interval(&self) -> GeomagResult<Duration> {
        let steps = self.require_rate()?;
        Ok(Duration::nanoseconds(
            (i128::from(self.span_ns) / steps) as i64,
        ))
    }

    pub fn time_at(&self, index: usize) -> DateTime<Utc> {
        self.time_at_offset(index as i64)
    }

    /// Time of a possibly out-of-range index, keeping the series' sample phase.
    pub(crate) fn time_at_offset(&self, index: i64) -> DateTime<Utc> {
        if self.count < 2 {
            return self.start;
        }
        let offset =
            (i128::from(self.span_ns) * i128::from(index)).div_euclid((self.count - 1) as i128);
        let offset = i64::try_from(offset).unwrap_or(if offset < 0 { i64::MIN } else { i64::MAX });
        self.start + Duration::nanoseconds(offset)
    }

    fn scaled_offset(&self, time: DateTime<Utc>, steps: i128) -> GeomagResult<i128> {
        let offset = (time - self.start).num_nanoseconds().ok_or_else(|| {
            GeomagError::Domain(format!("{} is too far from series start {}", time, self.start))
        })?;
        Ok(i128::from(offset) * steps)
    }

    /// Index of the sample taken exactly at `time`, if there is one.
    pub fn index_of(&self, time: DateTime<Utc>) -> GeomagResult<Option<usize>> {
        match self.count {
            0 => return Ok(None),
            1 => return Ok((time == self.start).then_some(0)),
            _ => {}
        }
        let steps = self.require_rate()?;
        let scaled = self.scaled_offset(time, steps)?;
        let span = i128::from(self.span_ns);
        if scaled.rem_euclid(span) != 0 {
            return Ok(None);
        }
        let index = scaled.div_euclid(span);
        Ok((0..self.count as i128)
            .contains(&index)
            .then_some(index as usize))
    }

    /// First index whose time is at or after `time`; may lie outside the series.
    pub(crate) fn ceil_index(&self, time: DateTime<Utc>) -> GeomagResult<i64> {
        let steps = self.require_rate()?;
        let scaled = self.scaled_offset(time, steps)?;
        let span = i128::from(self.span_ns);
        Ok((-(-scaled).div_euclid(span)) as i64)
    }

    /// Last index whose time is at or before `time`; may lie outside the series.
    pub(crate) fn floor_index(&self, time: DateTime<Utc>) -> GeomagResult<i64> {
        let steps = self.require_rate()?;
        let scaled = self.scaled_offset(time, steps)?;
        Ok(scaled.div_euclid(i128::from(self.span_ns)) as i64)
    }

    /// Compares sample spacing exactly, without going through floating point.
    pub fn same_rate(&self, other: &SampleClock) -> GeomagResult<bool> {
        let steps = self.require_rate()?;
        let other_steps = other.require_rate()?;
        Ok(i128::from(self.span_ns) * other_steps == i128::from(other.span_ns) * steps)
    }

    /// True when `next_start` falls exactly one sample interval after `end`.
    pub fn is_followed_by(&self, next_start: DateTime<Utc>) -> GeomagResult<bool> {
        let steps = self.require_rate()?;
        let gap_ns = (next_start - self.end).num_nanoseconds().ok_or_else(|| {
            GeomagError::Continuity(format!(
                "{} is too far from series end {}",
                next_start, self.end
            ))
        })?;
        Ok(i128::from(gap_ns) * steps == i128::from(self.span_ns))
    }
}

/// Named sample spacings used by observatory products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    TenHertz,
    Second,
    Minute,
    Hour,
    Day,
}

impl Interval {
    pub const ALL: [Interval; 5] = [
        Interval::TenHertz,
        Interval::Second,
        Interval::Minute,
        Interval::Hour,
        Interval::Day,
    ];

    pub fn duration(self) -> Duration {
        match self {
            Interval::TenHertz => Duration::milliseconds(100),
            Interval::Second => Duration::seconds(1),
            Interval::Minute => Duration::seconds(60),
            Interval::Hour => Duration::seconds(3_600),
            Interval::Day => Duration::seconds(86_400),
        }
    }

    /// Name for a spacing; unnamed spacings yield `None`.
    pub fn from_duration(duration: Duration) -> Option<Self> {
        Self::ALL.into_iter().find(|interval| interval.duration() == duration)
    }

    pub fn name(self) -> &'static str {
        match self {
            Interval::TenHertz => "tenhertz",
            Interval::Second => "second",
            Interval::Minute => "minute",
            Interval::Hour => "hour",
            Interval::Day => "day",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Interval {
    type Err = GeomagError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|interval| interval.name() == name)
            .ok_or_else(|| GeomagError::Configuration(format!("unknown interval {:?}", name)))
    }
}
