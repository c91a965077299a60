//! Core data model and transforms for geomagnetic observatory time-series.
//!
//! The modules cover the sample-indexed series container, the channel algebra
//! relating the geographic, magnetic and observatory frames, whole-series
//! frame conversion, and gap bookkeeping across channels.

pub mod continuity;
pub mod frames;
pub mod math;
pub mod prelude;
pub mod telemetry;
pub mod timeseries;

pub use prelude::{GeomagError, GeomagResult, SeriesStage};
pub use timeseries::{Channel, TimeSeries};
