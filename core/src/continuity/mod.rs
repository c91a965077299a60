pub mod coverage;
pub mod gap;
pub mod merge;

pub use coverage::{data_extent, has_all_channels, has_any_channels};
pub use gap::{
    detect_all_gaps, detect_channel_gaps, detect_series_gaps, ChannelGaps, Gap, GapsByChannel,
};
pub use merge::{gap_is_new_data, is_new_data_available, merge_gap_list, merge_gaps};
