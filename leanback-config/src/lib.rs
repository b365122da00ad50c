//! Configuration for the Leanback playback core.
//!
//! Every knob carries a default, so an empty TOML document (or no file at
//! all) yields a working configuration. Files are layered as: defaults, then
//! the TOML file, then `LEANBACK_*` environment overrides.

pub mod loader;
pub mod models;
pub mod util;

pub use loader::{ConfigLoader, error::ConfigLoadError};
pub use models::{
    LoaderConfig, PaginationConfig, PlaybackConfig, StateConfig,
};
