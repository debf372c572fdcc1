//! Demo binary: streams calculate → write_poem and prints the final state.

use clap::Parser;
use stategraph::StreamMode;
use stategraph_cli::{load_config, run_with_config, RunOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stategraph")]
#[command(about = "State graph demo: calculate → write_poem, streamed")]
struct Args {
    /// Pause before this node (repeatable); the demo resumes each pause
    #[arg(short, long, value_name = "NODE")]
    breakpoint: Vec<String>,

    /// Stream modes, comma-separated (values, updates, custom, messages, debug)
    #[arg(long, value_delimiter = ',', value_name = "MODES")]
    modes: Option<Vec<StreamMode>>,

    /// Stream buffer size
    #[arg(long, value_name = "N")]
    buffer_size: Option<usize>,

    /// Maximum node executions
    #[arg(long, value_name = "N")]
    recursion_limit: Option<usize>,

    /// Fixed run id
    #[arg(long, value_name = "ID")]
    run_id: Option<String>,

    /// Show debug logs (node start/complete, routing)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn to_options(&self) -> RunOptions {
        RunOptions {
            stream_modes: self.modes.clone(),
            buffer_size: self.buffer_size,
            recursion_limit: self.recursion_limit,
            breakpoints: self.breakpoint.clone(),
            run_id: self.run_id.clone(),
            verbose: self.verbose,
        }
    }
}

fn init_tracing(default: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match load_config(&args.to_options()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(config.log_filter());

    let state = match run_with_config(&config).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    println!("Result: {}", state.result);
    println!("---");
    println!("{}", state.poem);
    Ok(())
}
