pub mod analyze;
pub mod classify;
pub mod config;
pub mod decide;
pub mod models;
pub mod serve;

use std::path::PathBuf;

use switchwise_core::{storage, Config};

/// Load the config along with the directory relative model paths resolve against.
pub(crate) fn load_config() -> switchwise_core::Result<(Config, PathBuf)> {
    let config = Config::load()?;
    let base_dir = storage::data_dir()?;
    Ok((config, base_dir))
}
