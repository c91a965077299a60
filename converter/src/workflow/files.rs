use anyhow::Context;
use geomagcore::TimeSeries;
use std::fs;
use std::path::Path;

pub fn read_series<P: AsRef<Path>>(path: P) -> anyhow::Result<TimeSeries> {
    let path_ref = path.as_ref();
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("reading series {}", path_ref.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing series {}", path_ref.display()))
}

pub fn write_series<P: AsRef<Path>>(path: P, series: &TimeSeries) -> anyhow::Result<()> {
    let path_ref = path.as_ref();
    if let Some(parent) = path_ref.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let contents = serde_json::to_string_pretty(series).context("serializing series")?;
    fs::write(path_ref, contents).with_context(|| format!("writing series {}", path_ref.display()))
}
