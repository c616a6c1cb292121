#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::cargo_common_metadata)]

pub mod features;
pub mod partition;
pub mod smoothing;
pub mod window;

pub use features::TemporalFeatureEngine;
pub use partition::scan_partitions;
pub use smoothing::{WeightCache, ewma, hma, tema, wma};
pub use window::safe_div;
