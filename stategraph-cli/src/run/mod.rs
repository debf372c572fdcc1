//! Run entry points: run with env config, run_with_config, or run_with_options.

mod demo;
mod run_with_config;

use crate::config::{Error, RunConfig, RunOptions};

pub use demo::{build_graph, DemoState};
pub use run_with_config::run_with_config;

/// Run the demo graph with config from env (and `.env`); returns the final state.
pub async fn run() -> Result<DemoState, Error> {
    dotenv::dotenv().ok();
    let config = RunConfig::from_env()?;
    run_with_config(&config).await
}

/// Env config (and `.env`) with `options` applied on top.
pub fn load_config(options: &RunOptions) -> Result<RunConfig, Error> {
    dotenv::dotenv().ok();
    let mut config = RunConfig::from_env()?;
    config.apply_options(options);
    Ok(config)
}

/// Run the demo graph with env config plus `options` (e.g. from CLI flags).
pub async fn run_with_options(options: &RunOptions) -> Result<DemoState, Error> {
    let config = load_config(options)?;
    run_with_config(&config).await
}
