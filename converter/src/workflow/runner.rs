use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use geomagcore::continuity::{
    detect_all_gaps, detect_series_gaps, is_new_data_available, merge_gaps, Gap,
};
use geomagcore::{Channel, SeriesStage, TimeSeries};
use log::info;

pub struct WorkflowResult {
    pub series: TimeSeries,
    pub input_gaps: Vec<Gap>,
    pub output_gaps: Vec<Gap>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    fn merged_gaps(&self, series: &TimeSeries, channels: &[Channel]) -> anyhow::Result<Vec<Gap>> {
        let gaps = if channels.is_empty() {
            detect_all_gaps(series)
        } else {
            detect_series_gaps(series, channels)?
        };
        Ok(merge_gaps(&gaps))
    }

    /// Joins consecutive inputs into one series.
    pub fn concatenate(&self, inputs: Vec<TimeSeries>) -> anyhow::Result<TimeSeries> {
        let mut inputs = inputs.into_iter();
        let first = inputs.next().context("no input series")?;
        inputs.try_fold(first, |joined, next| {
            joined
                .append(&next)
                .with_context(|| format!("appending series starting {}", next.start()))
        })
    }

    pub fn execute(&self, series: &TimeSeries) -> anyhow::Result<WorkflowResult> {
        let input_gaps = self
            .merged_gaps(series, &self.config.gap_channels)
            .context("scanning input gaps")?;
        info!(
            "{}: {} merged input gap(s) over {} samples",
            series.observatory(),
            input_gaps.len(),
            series.len()
        );

        let converter = self.config.to_converter();
        let output = converter.process(series).with_context(|| {
            format!(
                "converting {} from {} to {}",
                series.observatory(),
                converter.from_frame(),
                converter.to_frame()
            )
        })?;
        anyhow::ensure!(
            output.len() == series.len()
                && output.start() == series.start()
                && output.end() == series.end(),
            "conversion changed the sample grid of {}",
            series.observatory()
        );

        let output_gaps = self
            .merged_gaps(&output, &[])
            .context("scanning output gaps")?;
        Ok(WorkflowResult {
            series: output,
            input_gaps,
            output_gaps,
        })
    }

    /// Whether `current` shows data arriving that `previous` was missing.
    pub fn has_new_data(
        &self,
        previous: &TimeSeries,
        current: &TimeSeries,
    ) -> anyhow::Result<bool> {
        let previous_gaps = self.merged_gaps(previous, &[])?;
        let current_gaps = self.merged_gaps(current, &[])?;
        Ok(is_new_data_available(&previous_gaps, &current_gaps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_observatory_series, GeneratorConfig};
    use chrono::Duration;
    use geomagcore::frames::Frame;

    fn runner(to: Frame) -> Runner {
        Runner::new(WorkflowConfig::from_args(Frame::Observatory, to, 5527.0, vec![], None))
    }

    #[test]
    fn runner_executes_workflow() {
        let series = build_observatory_series(&GeneratorConfig::default()).unwrap();
        let result = runner(Frame::Geographic).execute(&series).unwrap();
        assert_eq!(result.series.len(), series.len());
        assert!(result.series.has_channel(&Channel::X));
        assert!(result.input_gaps.is_empty());
        assert!(result.output_gaps.is_empty());
    }

    #[test]
    fn runner_reports_dropouts_on_both_sides() {
        let config = GeneratorConfig {
            dropout: 0.2,
            seed: 7,
            ..Default::default()
        };
        let series = build_observatory_series(&config).unwrap();
        let result = runner(Frame::Magnetic).execute(&series).unwrap();
        assert!(!result.input_gaps.is_empty());
        // H or E missing means converted H and D are missing; Z and F pass through.
        let in_input_gap = |time: chrono::DateTime<chrono::Utc>| {
            result.input_gaps.iter().any(|gap| gap.contains_time(time))
        };
        for gap in &result.output_gaps {
            assert!(in_input_gap(gap.start) && in_input_gap(gap.end));
        }
    }

    #[test]
    fn runner_concatenates_contiguous_inputs() {
        let first = GeneratorConfig {
            samples: 10,
            ..Default::default()
        };
        let second = GeneratorConfig {
            start: first.start + Duration::seconds(60 * 10),
            samples: 5,
            ..first.clone()
        };
        let runner = runner(Frame::Geographic);
        let joined = runner
            .concatenate(vec![
                build_observatory_series(&first).unwrap(),
                build_observatory_series(&second).unwrap(),
            ])
            .unwrap();
        assert_eq!(joined.len(), 15);

        let late = GeneratorConfig {
            start: first.start + Duration::seconds(60 * 11),
            ..second
        };
        assert!(runner
            .concatenate(vec![
                build_observatory_series(&first).unwrap(),
                build_observatory_series(&late).unwrap(),
            ])
            .is_err());
    }

    #[test]
    fn filled_dropouts_count_as_new_data() {
        let clean = build_observatory_series(&GeneratorConfig::default()).unwrap();
        let gappy = build_observatory_series(&GeneratorConfig {
            dropout: 0.3,
            seed: 3,
            ..Default::default()
        })
        .unwrap();
        let runner = runner(Frame::Geographic);
        assert!(runner.has_new_data(&gappy, &clean).unwrap());
        assert!(!runner.has_new_data(&gappy, &gappy).unwrap());
    }
}
