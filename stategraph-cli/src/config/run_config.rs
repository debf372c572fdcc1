//! Run config: stream modes, buffer size, recursion limit, breakpoints. Filled from env / .env.

use stategraph::{StreamConfig, StreamMode, DEFAULT_RECURSION_LIMIT};

use super::RunOptions;

/// Error type used for config loading and demo runs.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_MODES: &[StreamMode] = &[StreamMode::Values, StreamMode::Messages, StreamMode::Debug];
const DEFAULT_BUFFER_SIZE: usize = 100;

/// Settings for one demo run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// Stream modes to subscribe to. Default: values, messages, debug.
    pub stream_modes: Vec<StreamMode>,
    /// Capacity of the caller-facing stream channels. Default: 100.
    pub buffer_size: usize,
    /// Maximum node executions. Default: [`DEFAULT_RECURSION_LIMIT`].
    pub recursion_limit: usize,
    /// Nodes to pause before.
    pub breakpoints: Vec<String>,
    /// Fixed run id; `None` generates one.
    pub run_id: Option<String>,
    /// When true, the default log filter is `debug`. Set by `--verbose`.
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            stream_modes: DEFAULT_MODES.to_vec(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            breakpoints: Vec::new(),
            run_id: None,
            verbose: false,
        }
    }
}

impl RunConfig {
    /// Fill config from env vars. Call `dotenv::dotenv().ok()` first to include `.env`.
    ///
    /// `STATEGRAPH_STREAM_MODES` (comma-separated, e.g. `values,updates`),
    /// `STATEGRAPH_BUFFER_SIZE`, `STATEGRAPH_RECURSION_LIMIT` and
    /// `STATEGRAPH_BREAKPOINTS` (comma-separated node names) are optional.
    /// A set but unparsable value is an error.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("STATEGRAPH_STREAM_MODES") {
            config.stream_modes = parse_modes(&raw)?;
        }
        if let Ok(raw) = std::env::var("STATEGRAPH_BUFFER_SIZE") {
            config.buffer_size = parse_number("STATEGRAPH_BUFFER_SIZE", &raw)?;
        }
        if let Ok(raw) = std::env::var("STATEGRAPH_RECURSION_LIMIT") {
            config.recursion_limit = parse_number("STATEGRAPH_RECURSION_LIMIT", &raw)?;
        }
        if let Ok(raw) = std::env::var("STATEGRAPH_BREAKPOINTS") {
            config.breakpoints = split_list(&raw).map(str::to_string).collect();
        }
        Ok(config)
    }

    /// Apply optional overrides from `RunOptions` to this config.
    pub fn apply_options(&mut self, options: &RunOptions) {
        if let Some(modes) = &options.stream_modes {
            self.stream_modes = modes.clone();
        }
        if let Some(size) = options.buffer_size {
            self.buffer_size = size;
        }
        if let Some(limit) = options.recursion_limit {
            self.recursion_limit = limit;
        }
        for name in &options.breakpoints {
            if !self.breakpoints.contains(name) {
                self.breakpoints.push(name.clone());
            }
        }
        if options.run_id.is_some() {
            self.run_id = options.run_id.clone();
        }
        self.verbose = options.verbose;
    }

    /// Log filter used when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Stream config for the graph built from this run config.
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig::new(self.stream_modes.iter().copied(), self.buffer_size)
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_modes(raw: &str) -> Result<Vec<StreamMode>, Error> {
    split_list(raw)
        .map(|s| s.parse::<StreamMode>().map_err(Error::from))
        .collect()
}

fn parse_number(var: &str, raw: &str) -> Result<usize, Error> {
    raw.trim().parse::<usize>().map_err(|e| {
        Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} must be a non-negative integer: {}", var, e),
        ))
    })
}
