//! This module contains the signal sources and processors that modules are
//! assembled from.  Every device is allocation-free, does a bounded amount of
//! work per call to `next`, and keeps its configuration in plain setters that
//! are called at control rate.

pub(crate) mod env_asr;
pub(crate) mod filter_svf;
pub(crate) mod noise;

pub use env_asr::EnvAsr;
pub use filter_svf::FilterSvf;
pub use noise::Noise;
