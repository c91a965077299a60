pub mod algebra;
pub mod units;

pub use algebra::ChannelAlgebra;
