use crate::continuity::gap::{detect_all_gaps, detect_series_gaps, Gap};
use crate::continuity::merge::merge_gaps;
use crate::prelude::GeomagResult;
use crate::timeseries::{Channel, TimeSeries};
use chrono::{DateTime, Utc};

/// First and last sample time of the series.
///
/// With `without_gaps`, a merged gap touching either end of the series is
/// excluded. `None` when the series is empty or entirely missing.
pub fn data_extent(
    series: &TimeSeries,
    without_gaps: bool,
) -> GeomagResult<Option<(DateTime<Utc>, DateTime<Utc>)>> {
    if series.is_empty() {
        return Ok(None);
    }
    let (mut start, mut end) = (series.start(), series.end());
    if !without_gaps {
        return Ok(Some((start, end)));
    }
    for gap in merge_gaps(&detect_all_gaps(series)) {
        if gap.start == series.start() && gap.end == series.end() {
            return Ok(None);
        }
        if gap.start == series.start() {
            if let Some(index) = series.index_of(gap.end)? {
                start = series.time_at(index + 1);
            }
        } else if gap.end == series.end() {
            if let Some(index) = series.index_of(gap.start)? {
                end = series.time_at(index - 1);
            }
        }
    }
    Ok(Some((start, end)))
}

/// Whether `gap` leaves `[start, end]` without a single present sample.
///
/// The window may end anywhere before the sample that follows the gap; a
/// series too short to define a rate only knows the gap's own bounds.
fn spans(
    series: &TimeSeries,
    gap: &Gap,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> GeomagResult<bool> {
    if gap.start > start {
        return Ok(false);
    }
    let next_sample = match series.index_of(gap.end)? {
        Some(index) if series.len() >= 2 => {
            Some(series.clock().time_at_offset(index as i64 + 1))
        }
        _ => None,
    };
    Ok(match next_sample {
        Some(next) => end < next,
        None => end <= gap.end,
    })
}

fn present_channels(series: &TimeSeries, channels: &[Channel]) -> Vec<Channel> {
    channels
        .iter()
        .filter(|channel| series.has_channel(channel))
        .cloned()
        .collect()
}

fn any_spans(
    series: &TimeSeries,
    gaps: &[Gap],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> GeomagResult<bool> {
    for gap in gaps {
        if spans(series, gap, start, end)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// True unless one merged gap across `channels` covers all of `[start, end]`.
///
/// Channels absent from the series are ignored.
pub fn has_all_channels(
    series: &TimeSeries,
    channels: &[Channel],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> GeomagResult<bool> {
    let present = present_channels(series, channels);
    let merged = merge_gaps(&detect_series_gaps(series, &present)?);
    Ok(!any_spans(series, &merged, start, end)?)
}

/// True when at least one of `channels` has data somewhere in `[start, end]`.
///
/// Channels absent from the series are ignored.
pub fn has_any_channels(
    series: &TimeSeries,
    channels: &[Channel],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> GeomagResult<bool> {
    let present = present_channels(series, channels);
    for channel_gaps in detect_series_gaps(series, &present)?.values() {
        if !any_spans(series, channel_gaps, start, end)? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn secs(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(n)
    }

    fn series(h: Vec<f64>, z: Vec<f64>) -> TimeSeries {
        TimeSeries::with_interval(
            "BOU",
            [(Channel::H, h), (Channel::Z, z)],
            secs(0),
            Duration::seconds(1),
        )
        .unwrap()
    }

    const NAN: f64 = f64::NAN;

    #[test]
    fn extent_excludes_leading_and_trailing_gaps() {
        let s = series(vec![NAN, 1.0, 1.0, 1.0, NAN], vec![NAN, NAN, 1.0, 1.0, 1.0]);
        assert_eq!(data_extent(&s, false).unwrap(), Some((secs(0), secs(4))));
        assert_eq!(data_extent(&s, true).unwrap(), Some((secs(2), secs(3))));
    }

    #[test]
    fn extent_of_all_missing_series_is_none() {
        let s = series(vec![NAN; 3], vec![NAN; 3]);
        assert_eq!(data_extent(&s, true).unwrap(), None);
        assert_eq!(data_extent(&s, false).unwrap(), Some((secs(0), secs(2))));
    }

    #[test]
    fn all_channels_fails_when_window_is_one_gap() {
        let s = series(vec![1.0, NAN, NAN, 1.0, 1.0], vec![1.0, 1.0, NAN, 1.0, 1.0]);
        let channels = [Channel::H, Channel::Z];
        assert!(!has_all_channels(&s, &channels, secs(1), secs(2)).unwrap());
        assert!(has_all_channels(&s, &channels, secs(0), secs(2)).unwrap());
    }

    #[test]
    fn any_channel_succeeds_when_one_has_data() {
        let s = series(vec![1.0, NAN, NAN, 1.0, 1.0], vec![1.0, 1.0, NAN, 1.0, 1.0]);
        assert!(has_any_channels(&s, &[Channel::H, Channel::Z], secs(1), secs(2)).unwrap());
        assert!(!has_any_channels(&s, &[Channel::H], secs(1), secs(2)).unwrap());
        assert!(!has_any_channels(&s, &[Channel::F], secs(0), secs(4)).unwrap());
    }

    #[test]
    fn window_ending_before_next_sample_is_inside_gap() {
        let s = TimeSeries::with_interval(
            "BOU",
            [(Channel::H, vec![1.0, NAN, NAN, 1.0])],
            secs(0),
            Duration::seconds(1),
        )
        .unwrap();
        let end = secs(2) + Duration::milliseconds(500);
        assert!(!has_all_channels(&s, &[Channel::H], secs(1), end).unwrap());
        assert!(!has_any_channels(&s, &[Channel::H], secs(1), end).unwrap());
        assert!(has_all_channels(&s, &[Channel::H], secs(1), secs(3)).unwrap());
        assert!(has_any_channels(&s, &[Channel::H], secs(1), secs(3)).unwrap());
    }

    #[test]
    fn all_channels_ignores_absent_channels() {
        let s = series(vec![1.0, NAN, NAN, 1.0, 1.0], vec![1.0, 1.0, 1.0, 1.0, 1.0]);
        assert!(!has_all_channels(&s, &[Channel::H, Channel::E], secs(1), secs(2)).unwrap());
        assert!(has_all_channels(&s, &[Channel::E], secs(1), secs(2)).unwrap());
    }
}
