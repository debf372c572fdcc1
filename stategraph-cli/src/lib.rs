//! stategraph-cli library: the demo run logic, reusable from tests and other crates.
//!
//! Reads stream/limit settings from env (and `.env`), builds the
//! calculate → write_poem graph, streams it, resumes any pause, and returns
//! the final state.
//!
//! ## Usage
//!
//! ```rust,no_run,ignore
//! let state = stategraph_cli::run().await?;
//! println!("{}", state.poem);
//! ```

mod config;
mod run;

pub use config::{Error, RunConfig, RunOptions};
pub use run::{build_graph, load_config, run, run_with_config, run_with_options, DemoState};
