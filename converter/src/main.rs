use anyhow::Context;
use clap::Parser;
use generator::profile::{build_observatory_series, GeneratorConfig};
use geomagcore::continuity::Gap;
use geomagcore::frames::Frame;
use geomagcore::Channel;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::files::{read_series, write_series};
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Geomagnetic frame conversion and continuity driver")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Series JSON files, appended in the order given
    #[arg(long = "input")]
    inputs: Vec<PathBuf>,
    /// Convert a synthetic observatory series instead of reading input files
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    #[arg(long, default_value_t = 1440)]
    samples: usize,
    #[arg(long, default_value_t = 0.0)]
    dropout: f64,
    #[arg(long, default_value = "obs")]
    from: Frame,
    #[arg(long, default_value = "geo")]
    to: Frame,
    /// Declination baseline in tenths of arcminutes
    #[arg(long, default_value_t = 0.0)]
    declination_baseline: f64,
    /// Channels to check for gaps (defaults to all)
    #[arg(long = "gap-channel")]
    gap_channels: Vec<Channel>,
    /// Earlier output to compare against for newly arrived data
    #[arg(long)]
    previous: Option<PathBuf>,
    #[arg(long)]
    output: Option<PathBuf>,
}

fn describe(gaps: &[Gap]) -> String {
    gaps.iter()
        .map(|gap| format!("[{} .. {}]", gap.start, gap.end))
        .collect::<Vec<_>>()
        .join(", ")
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(
            args.from,
            args.to,
            args.declination_baseline,
            args.gap_channels,
            None,
        )
    };
    if args.output.is_some() {
        workflow_config.output = args.output;
    }

    let runner = Runner::new(workflow_config.clone());
    let series = if args.synthetic {
        build_observatory_series(&GeneratorConfig {
            samples: args.samples,
            dropout: args.dropout,
            ..Default::default()
        })?
    } else {
        let inputs = args
            .inputs
            .iter()
            .map(read_series)
            .collect::<anyhow::Result<Vec<_>>>()?;
        runner.concatenate(inputs).context("assembling input series")?
    };

    let result = runner.execute(&series)?;
    println!(
        "{} {} -> {}: {} samples, input gaps {}, output gaps {}",
        result.series.observatory(),
        workflow_config.from,
        workflow_config.to,
        result.series.len(),
        result.input_gaps.len(),
        result.output_gaps.len()
    );
    if !result.output_gaps.is_empty() {
        println!("output gaps: {}", describe(&result.output_gaps));
    }

    if let Some(path) = args.previous {
        let previous = read_series(&path)?;
        let fresh = runner.has_new_data(&previous, &result.series)?;
        println!("new data since {}: {}", path.display(), fresh);
    }

    if let Some(path) = workflow_config.output.as_ref() {
        write_series(path, &result.series)?;
        println!("wrote {}", path.display());
    }

    Ok(())
}
