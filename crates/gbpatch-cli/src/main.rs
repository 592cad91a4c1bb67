use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod interrupt;
mod prompter;
mod selection;

use cli::{Cli, Command};
use interrupt::{InterruptAction, InterruptState};

/// Core warnings show by default; progress lines need `RUST_LOG`
const DEFAULT_LOG_DIRECTIVE: &str = "gbpatch_core=warn";

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(DEFAULT_LOG_DIRECTIVE.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Command::Tile(command)) => commands::tile::run(command),
        None => {
            let interrupt = Arc::new(InterruptState::new());
            let handler_state = Arc::clone(&interrupt);
            ctrlc::set_handler(move || match handler_state.trigger() {
                InterruptAction::Cancel => {
                    println!("\nOperation cancelled.");
                    std::process::exit(0);
                }
                InterruptAction::Defer => {
                    warn!("Interrupt received while writing, finishing the current batch");
                }
            })?;

            commands::apply::run(&cli.apply, interrupt)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::Directive;

    #[test]
    fn test_default_log_directive_parses() {
        let directive: Directive = DEFAULT_LOG_DIRECTIVE.parse().unwrap();
        assert_eq!(directive.to_string(), "gbpatch_core=warn");
    }
}
