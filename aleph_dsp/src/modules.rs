//! The concrete synthesis modules.

mod drums;
mod echo;

pub use drums::{Drums, DrumsParam, DRUMS_PARAMS};
pub use echo::{Echo, EchoParam, ECHO_PARAMS};
