pub mod convert;
pub mod converter;
pub mod frame;

pub use convert::{
    geographic_from_magnetic, geographic_from_observatory, magnetic_from_geographic,
    magnetic_from_observatory, observatory_from_geographic, observatory_from_magnetic,
    observatory_from_observatory, ObservatoryChannels,
};
pub use converter::FrameConverter;
pub use frame::Frame;
