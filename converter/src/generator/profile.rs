use anyhow::Context;
use chrono::{DateTime, TimeZone, Utc};
use geomagcore::math::ChannelAlgebra;
use geomagcore::timeseries::Interval;
use geomagcore::{Channel, TimeSeries};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Configuration for generating synthetic observatory-frame data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub observatory: String,
    pub start: DateTime<Utc>,
    pub interval: Interval,
    pub samples: usize,
    /// Mean horizontal intensity, nT.
    pub horizontal: f64,
    /// Mean angle between the field and the sensor H axis, degrees.
    pub declination: f64,
    /// Mean vertical intensity, nT.
    pub vertical: f64,
    pub noise: f64,
    /// Probability that any one sample of any one channel is missing.
    pub dropout: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            observatory: "BOU".to_string(),
            start: Utc
                .timestamp_opt(1_577_836_800, 0)
                .single()
                .unwrap_or_default(),
            interval: Interval::Minute,
            samples: 60,
            horizontal: 20_800.0,
            declination: 0.5,
            vertical: 47_600.0,
            noise: 0.5,
            dropout: 0.0,
            seed: 0,
        }
    }
}

fn jitter(rng: &mut StdRng, noise: f64) -> f64 {
    if noise > 0.0 {
        rng.gen_range(-noise..noise)
    } else {
        0.0
    }
}

pub fn build_observatory_series(config: &GeneratorConfig) -> anyhow::Result<TimeSeries> {
    let samples = config.samples.max(1);
    let dropout = config.dropout.clamp(0.0, 1.0);
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut h = Vec::with_capacity(samples);
    let mut e = Vec::with_capacity(samples);
    let mut z = Vec::with_capacity(samples);
    let mut f = Vec::with_capacity(samples);
    for index in 0..samples {
        let phase = index as f64 / samples as f64 * 2.0 * PI;
        let h_value = config.horizontal + 15.0 * phase.sin() + jitter(&mut rng, config.noise);
        let angle = (config.declination + 0.05 * phase.cos()) * PI / 180.0;
        let e_value = ChannelAlgebra::observatory_e_from_observatory(h_value, angle);
        let z_value = config.vertical - 8.0 * phase.sin() + jitter(&mut rng, config.noise);
        let f_value =
            ChannelAlgebra::computed_f(h_value, e_value, z_value) + jitter(&mut rng, config.noise);
        h.push(h_value);
        e.push(e_value);
        z.push(z_value);
        f.push(f_value);
    }

    let mut channels = vec![(Channel::H, h), (Channel::E, e), (Channel::Z, z), (Channel::F, f)];
    if dropout > 0.0 {
        for (_, data) in channels.iter_mut() {
            for sample in data.iter_mut() {
                if rng.gen_bool(dropout) {
                    *sample = f64::NAN;
                }
            }
        }
    }

    TimeSeries::with_interval(
        config.observatory.clone(),
        channels,
        config.start,
        config.interval.duration(),
    )
    .context("assembling synthetic series")
}
