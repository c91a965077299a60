use anyhow::Context;
use geomagcore::frames::{Frame, FrameConverter};
use geomagcore::math::{units, ChannelAlgebra};
use geomagcore::Channel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub from: Frame,
    pub to: Frame,
    /// Declination baseline in tenths of arcminutes, as in IAGA `DECBAS`.
    #[serde(default)]
    pub declination_baseline: f64,
    /// Channels checked for gaps; empty means every channel.
    #[serde(default)]
    pub gap_channels: Vec<Channel>,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        from: Frame,
        to: Frame,
        declination_baseline: f64,
        gap_channels: Vec<Channel>,
        output: Option<PathBuf>,
    ) -> Self {
        Self {
            from,
            to,
            declination_baseline,
            gap_channels,
            output,
        }
    }

    pub fn algebra(&self) -> ChannelAlgebra {
        ChannelAlgebra::new(units::radians_from_deci_arcminutes(
            self.declination_baseline,
        ))
    }

    pub fn to_converter(&self) -> FrameConverter {
        FrameConverter::new(self.from, self.to, self.algebra())
    }
}
