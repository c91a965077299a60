//! Whole-series frame conversions.
//!
//! Each entry point checks its input channels before touching any sample,
//! converts index by index, and copies Z and F through untouched. A missing
//! sample in any horizontal input channel leaves every converted channel
//! missing at that index.

use crate::math::ChannelAlgebra;
use crate::prelude::{GeomagError, GeomagResult};
use crate::telemetry::LogManager;
use crate::timeseries::{Channel, TimeSeries};
use ndarray::{Array1, ArrayView1, Zip};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which optional channels an observatory-to-observatory conversion emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObservatoryChannels {
    pub produce_e: bool,
    pub produce_d: bool,
}

impl ObservatoryChannels {
    pub fn e() -> Self {
        Self {
            produce_e: true,
            produce_d: false,
        }
    }

    pub fn d() -> Self {
        Self {
            produce_e: false,
            produce_d: true,
        }
    }

    pub fn both() -> Self {
        Self {
            produce_e: true,
            produce_d: true,
        }
    }
}

/// Second horizontal observatory component as found on the input.
#[derive(Clone, Copy)]
enum Declared<'a> {
    E(ArrayView1<'a, f64>),
    D(ArrayView1<'a, f64>),
}

impl<'a> Declared<'a> {
    fn view(self) -> ArrayView1<'a, f64> {
        match self {
            Declared::E(data) | Declared::D(data) => data,
        }
    }
}

fn logger() -> LogManager {
    LogManager::new("frames")
}

/// Applies `op` element-wise; a `NaN` in either input yields `NaN` without calling `op`.
fn lift2<F>(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, op: F) -> Array1<f64>
where
    F: Fn(f64, f64) -> f64,
{
    Zip::from(a).and(b).map_collect(|&a, &b| {
        if a.is_nan() || b.is_nan() {
            f64::NAN
        } else {
            op(a, b)
        }
    })
}

fn observatory_input(series: &TimeSeries) -> GeomagResult<(ArrayView1<'_, f64>, Declared<'_>)> {
    let h = series.require(&Channel::H)?;
    if let Some(e) = series.channel(&Channel::E) {
        return Ok((h, Declared::E(e)));
    }
    if let Some(d) = series.channel(&Channel::D) {
        return Ok((h, Declared::D(d)));
    }
    Err(GeomagError::Configuration(
        "observatory input needs channel E or D alongside H".into(),
    ))
}

fn observatory_e(h: ArrayView1<'_, f64>, declared: Declared<'_>) -> Array1<f64> {
    match declared {
        Declared::E(e) => lift2(h, e, |_, e| e),
        Declared::D(d) => lift2(h, d, ChannelAlgebra::observatory_e_from_observatory),
    }
}

fn observatory_d(h: ArrayView1<'_, f64>, declared: Declared<'_>) -> Array1<f64> {
    match declared {
        Declared::E(e) => lift2(h, e, ChannelAlgebra::observatory_declination_from_observatory),
        Declared::D(d) => lift2(h, d, |_, d| d),
    }
}

fn log_conversion(name: &str, series: &TimeSeries, inputs: &[ArrayView1<'_, f64>]) {
    let logger = logger();
    logger.record(&format!(
        "{} over {} samples from {}",
        name,
        series.len(),
        series.observatory()
    ));
    let missing = (0..series.len())
        .filter(|&index| inputs.iter().any(|data| data[index].is_nan()))
        .count();
    if missing > 0 {
        logger.warn(&format!(
            "{}: {} sample(s) missing on input stay missing on output",
            name, missing
        ));
    }
}

/// Builds the output series from converted channels plus the untouched Z and F.
fn assemble(
    series: &TimeSeries,
    converted: Vec<(Channel, Array1<f64>)>,
) -> GeomagResult<TimeSeries> {
    let mut channels: BTreeMap<Channel, Array1<f64>> = converted.into_iter().collect();
    for channel in [Channel::Z, Channel::F] {
        if let Some(data) = series.channel(&channel) {
            channels.insert(channel, data.to_owned());
        }
    }
    series.derive(channels)
}

/// Magnetic (H, D) to geographic (X, Y).
pub fn geographic_from_magnetic(series: &TimeSeries) -> GeomagResult<TimeSeries> {
    let h = series.require(&Channel::H)?;
    let d = series.require(&Channel::D)?;
    log_conversion("geographic_from_magnetic", series, &[h, d]);
    assemble(
        series,
        vec![
            (Channel::X, lift2(h, d, ChannelAlgebra::geographic_x_from_magnetic)),
            (Channel::Y, lift2(h, d, ChannelAlgebra::geographic_y_from_magnetic)),
        ],
    )
}

/// Observatory (H, E or D) to geographic (X, Y), by way of the magnetic frame.
pub fn geographic_from_observatory(
    series: &TimeSeries,
    algebra: &ChannelAlgebra,
) -> GeomagResult<TimeSeries> {
    geographic_from_magnetic(&magnetic_from_observatory(series, algebra)?)
}

/// Geographic (X, Y) to magnetic (H, D).
pub fn magnetic_from_geographic(series: &TimeSeries) -> GeomagResult<TimeSeries> {
    let x = series.require(&Channel::X)?;
    let y = series.require(&Channel::Y)?;
    log_conversion("magnetic_from_geographic", series, &[x, y]);
    assemble(
        series,
        vec![
            (Channel::H, lift2(x, y, ChannelAlgebra::magnetic_horizontal_from_geographic)),
            (Channel::D, lift2(x, y, ChannelAlgebra::magnetic_declination_from_geographic)),
        ],
    )
}

/// Observatory (H, E or D) to magnetic (H, D).
pub fn magnetic_from_observatory(
    series: &TimeSeries,
    algebra: &ChannelAlgebra,
) -> GeomagResult<TimeSeries> {
    let (h, declared) = observatory_input(series)?;
    log_conversion("magnetic_from_observatory", series, &[h, declared.view()]);
    let e = observatory_e(h, declared);
    let mag_h = lift2(h, e.view(), ChannelAlgebra::magnetic_horizontal_from_observatory);
    let mag_d = match declared {
        Declared::E(e) => lift2(h, e, |h, e| algebra.magnetic_declination_from_observatory(h, e)),
        Declared::D(d) => lift2(h, d, |_, d| algebra.declination_baseline() + d),
    };
    assemble(series, vec![(Channel::H, mag_h), (Channel::D, mag_d)])
}

/// Geographic (X, Y) to observatory (H, E, D), by way of the magnetic frame.
pub fn observatory_from_geographic(
    series: &TimeSeries,
    algebra: &ChannelAlgebra,
) -> GeomagResult<TimeSeries> {
    observatory_from_magnetic(&magnetic_from_geographic(series)?, algebra)
}

/// Magnetic (H, D) to observatory H, E and declination D.
pub fn observatory_from_magnetic(
    series: &TimeSeries,
    algebra: &ChannelAlgebra,
) -> GeomagResult<TimeSeries> {
    let h = series.require(&Channel::H)?;
    let d = series.require(&Channel::D)?;
    log_conversion("observatory_from_magnetic", series, &[h, d]);
    assemble(
        series,
        vec![
            (
                Channel::H,
                lift2(h, d, |h, d| algebra.observatory_horizontal_from_magnetic(h, d)),
            ),
            (
                Channel::E,
                lift2(h, d, |h, d| algebra.observatory_e_from_magnetic(h, d)),
            ),
            (
                Channel::D,
                lift2(h, d, |_, d| algebra.observatory_declination_from_magnetic(d)),
            ),
        ],
    )
}

/// Re-expresses observatory data with E, D or both as the second component.
pub fn observatory_from_observatory(
    series: &TimeSeries,
    output: ObservatoryChannels,
) -> GeomagResult<TimeSeries> {
    if !output.produce_e && !output.produce_d {
        return Err(GeomagError::Configuration(
            "observatory conversion must produce E, D or both".into(),
        ));
    }
    let (h, declared) = observatory_input(series)?;
    log_conversion("observatory_from_observatory", series, &[h, declared.view()]);

    let mut converted = vec![(Channel::H, lift2(h, declared.view(), |h, _| h))];
    if output.produce_e {
        converted.push((Channel::E, observatory_e(h, declared)));
    }
    if output.produce_d {
        converted.push((Channel::D, observatory_d(h, declared)));
    }
    assemble(series, converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    const D2R: f64 = std::f64::consts::PI / 180.0;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 11, 1, 0, 0, 0).unwrap()
    }

    fn build(channels: Vec<(Channel, Vec<f64>)>) -> TimeSeries {
        TimeSeries::with_interval("BOU", channels, t0(), Duration::seconds(60)).unwrap()
    }

    fn values(series: &TimeSeries, channel: Channel) -> Vec<f64> {
        series.channel(&channel).unwrap().to_vec()
    }

    fn assert_all_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "expected {:?} got {:?}", expected, actual);
        }
    }

    fn cos(deg: f64) -> f64 {
        (deg * D2R).cos()
    }

    fn sin(deg: f64) -> f64 {
        (deg * D2R).sin()
    }

    #[test]
    fn geographic_from_observatory_applies_baseline() {
        let obs = build(vec![
            (Channel::H, vec![cos(15.0), cos(30.0)]),
            (Channel::E, vec![sin(15.0), sin(30.0)]),
            (Channel::Z, vec![1.0, 1.0]),
            (Channel::F, vec![1.0, 1.0]),
        ]);
        let geo = geographic_from_observatory(&obs, &ChannelAlgebra::new(15.0 * D2R)).unwrap();
        assert_all_close(&values(&geo, Channel::X), &[cos(30.0), cos(45.0)]);
        assert_all_close(&values(&geo, Channel::Y), &[sin(30.0), sin(45.0)]);
        assert_eq!(geo.start(), obs.start());
        assert_eq!(geo.end(), obs.end());
        assert_eq!(geo.observatory(), "BOU");
    }

    #[test]
    fn observatory_from_geographic_emits_h_e_and_d() {
        let geo = build(vec![
            (Channel::X, vec![cos(30.0), cos(45.0)]),
            (Channel::Y, vec![sin(30.0), sin(45.0)]),
            (Channel::Z, vec![1.0, 1.0]),
            (Channel::F, vec![1.0, 1.0]),
        ]);
        let obs = observatory_from_geographic(&geo, &ChannelAlgebra::new(15.0 * D2R)).unwrap();
        assert_all_close(&values(&obs, Channel::H), &[cos(15.0), cos(30.0)]);
        assert_all_close(&values(&obs, Channel::E), &[sin(15.0), sin(30.0)]);
        assert_all_close(&values(&obs, Channel::D), &[15.0 * D2R, 30.0 * D2R]);
    }

    #[test]
    fn magnetic_from_observatory_accepts_declination_input() {
        let algebra = ChannelAlgebra::new(15.0 * D2R);
        let obs_d = build(vec![
            (Channel::H, vec![cos(15.0), cos(30.0)]),
            (Channel::D, vec![15.0 * D2R, 30.0 * D2R]),
        ]);
        let mag = magnetic_from_observatory(&obs_d, &algebra).unwrap();
        assert_all_close(&values(&mag, Channel::H), &[1.0, 1.0]);
        assert_all_close(&values(&mag, Channel::D), &[30.0 * D2R, 45.0 * D2R]);
    }

    #[test]
    fn observatory_from_observatory_switches_second_component() {
        let obs_e = build(vec![
            (Channel::H, vec![cos(15.0), cos(30.0)]),
            (Channel::E, vec![sin(15.0), sin(30.0)]),
        ]);
        let with_d = observatory_from_observatory(&obs_e, ObservatoryChannels::d()).unwrap();
        assert_all_close(&values(&with_d, Channel::D), &[15.0 * D2R, 30.0 * D2R]);
        assert!(!with_d.has_channel(&Channel::E));

        let obs_d = build(vec![
            (Channel::H, vec![cos(15.0), cos(30.0)]),
            (Channel::D, vec![15.0 * D2R, 30.0 * D2R]),
        ]);
        let with_e = observatory_from_observatory(&obs_d, ObservatoryChannels::both()).unwrap();
        assert_all_close(&values(&with_e, Channel::E), &[sin(15.0), sin(30.0)]);
        assert_all_close(&values(&with_e, Channel::D), &[15.0 * D2R, 30.0 * D2R]);
    }

    #[test]
    fn observatory_from_observatory_rejects_bad_configuration() {
        let obs = build(vec![(Channel::H, vec![1.0]), (Channel::E, vec![0.0])]);
        assert!(matches!(
            observatory_from_observatory(&obs, ObservatoryChannels::default()),
            Err(GeomagError::Configuration(_))
        ));
        let h_only = build(vec![(Channel::H, vec![1.0]), (Channel::Z, vec![0.0])]);
        assert!(matches!(
            observatory_from_observatory(&h_only, ObservatoryChannels::e()),
            Err(GeomagError::Configuration(_))
        ));
    }

    #[test]
    fn missing_required_channel_is_named() {
        let geo = build(vec![(Channel::X, vec![1.0]), (Channel::Z, vec![1.0])]);
        let err = magnetic_from_geographic(&geo).unwrap_err();
        assert_eq!(err, GeomagError::Configuration("channel Y not found in input".into()));
        let err = geographic_from_magnetic(&geo).unwrap_err();
        assert_eq!(err, GeomagError::Configuration("channel H not found in input".into()));
    }

    #[test]
    fn missing_samples_propagate_to_every_converted_channel() {
        let algebra = ChannelAlgebra::new(0.1);
        let z = vec![5.0, 6.0, 7.0];
        let f = vec![9.0, f64::NAN, 11.0];
        let with = |a: Channel, b: Channel| {
            build(vec![
                (a, vec![2.0, f64::NAN, 3.0]),
                (b, vec![0.5, 0.25, f64::NAN]),
                (Channel::Z, z.clone()),
                (Channel::F, f.clone()),
            ])
        };
        let outputs = vec![
            geographic_from_magnetic(&with(Channel::H, Channel::D)).unwrap(),
            geographic_from_observatory(&with(Channel::H, Channel::E), &algebra).unwrap(),
            magnetic_from_geographic(&with(Channel::X, Channel::Y)).unwrap(),
            magnetic_from_observatory(&with(Channel::H, Channel::D), &algebra).unwrap(),
            observatory_from_geographic(&with(Channel::X, Channel::Y), &algebra).unwrap(),
            observatory_from_magnetic(&with(Channel::H, Channel::D), &algebra).unwrap(),
            observatory_from_observatory(&with(Channel::H, Channel::E), ObservatoryChannels::both())
                .unwrap(),
        ];
        for output in outputs {
            for (channel, data) in output.iter().filter(|(c, _)| !c.is_frame_invariant()) {
                assert!(!data[0].is_nan(), "{} lost a present sample", channel);
                assert!(data[1].is_nan(), "{} kept a missing sample", channel);
                assert!(data[2].is_nan(), "{} kept a missing sample", channel);
            }
            let out_z = output.channel(&Channel::Z).unwrap();
            let out_f = output.channel(&Channel::F).unwrap();
            for index in 0..3 {
                assert_eq!(out_z[index].to_bits(), z[index].to_bits());
                assert_eq!(out_f[index].to_bits(), f[index].to_bits());
            }
        }
    }
}
