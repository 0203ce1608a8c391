//! Hard-coded filter-header checkpoints for light-client sync.
//!
//! Peers serving compact-filter headers can lie; at the recorded heights we
//! refuse anything that disagrees with the values compiled in here.

pub mod filtercontrol;

pub use filtercontrol::{
    control_cf_header, min_backup_height, ControlError, FilterType,
};
