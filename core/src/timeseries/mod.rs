pub mod channel;
pub mod clock;
pub mod series;

pub use channel::Channel;
pub use clock::{Interval, SampleClock};
pub use series::{append, TimeSeries};
