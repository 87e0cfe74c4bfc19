//! isrmod - Speech command-word recognition module control
//!
//! Talks to DFR0715-compatible offline recognition modules over I2C or
//! UART: bring-up, model and wake configuration, command word management,
//! and recognition polling.
//!
//! # Architecture
//!
//! Every transport backend produces a `Box<dyn RegisterTransport>`; the
//! commands only see the `IsrModule` facade built on top of it, so the same
//! command works over any link:
//! - **Bus transports** (linux_i2c) - one bus transaction per frame
//! - **Stream transports** (serial) - bytes on a UART, responses polled
//!   with a timeout
//! - **dummy** - an emulated module on either link, for testing

mod cli;
mod commands;
mod transports;
mod words;

use clap::Parser;
use cli::{Cli, Commands};
use commands::{open_module, DeleteTarget};
use isrmod_core::device::ModuleConfig;
use std::time::Duration;

/// Log level selected by the number of `-v` flags
fn log_level(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG, when set, overrides the verbosity flags
    env_logger::Builder::new()
        .filter_level(log_level(cli.verbose))
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Probe { transport } => {
            let mut module = open_module(&transport.transport)?;
            commands::run_probe(&mut module)
        }
        Commands::Init {
            transport,
            model,
            wake,
            no_verify,
        } => {
            let config = ModuleConfig::default()
                .with_model(model)
                .with_wake_duration(wake)
                .with_verify_identity(!no_verify);
            let mut module = open_module(&transport.transport)?;
            commands::run_init(&mut module, &config)
        }
        Commands::SetModel { transport, model } => {
            let mut module = open_module(&transport.transport)?;
            commands::run_set_model(&mut module, model)
        }
        Commands::SetWake { transport, seconds } => {
            let mut module = open_module(&transport.transport)?;
            commands::run_set_wake(&mut module, seconds)
        }
        Commands::Add {
            transport,
            id,
            text,
        } => {
            let mut module = open_module(&transport.transport)?;
            commands::run_add(&mut module, id, &text)
        }
        Commands::Del {
            transport,
            id,
            text,
        } => {
            let target = match (id, text) {
                (Some(id), _) => DeleteTarget::Id(id),
                (None, Some(text)) => DeleteTarget::Text(text),
                (None, None) => return Err("Give --id or --text".into()),
            };
            let mut module = open_module(&transport.transport)?;
            commands::run_delete(&mut module, &target)
        }
        Commands::Provision {
            transport,
            words,
            keep_going,
        } => {
            let mut module = open_module(&transport.transport)?;
            commands::run_provision(&mut module, &words, keep_going)
        }
        Commands::Listen {
            transport,
            interval_ms,
            count,
        } => {
            let mut module = open_module(&transport.transport)?;
            commands::run_listen(&mut module, Duration::from_millis(interval_ms), count)
        }
        Commands::ListTransports => {
            commands::list_transports();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(log_level(0), log::LevelFilter::Info);
        assert_eq!(log_level(1), log::LevelFilter::Debug);
        assert_eq!(log_level(2), log::LevelFilter::Trace);
        assert_eq!(log_level(5), log::LevelFilter::Trace);
    }

    #[test]
    fn test_verbose_flag_enables_debug_records() {
        let cli = Cli::try_parse_from(["isrmod", "-v", "list-transports"]).unwrap();
        let logger = env_logger::Builder::new()
            .filter_level(log_level(cli.verbose))
            .build();
        let debug = log::Metadata::builder()
            .level(log::Level::Debug)
            .target("isrmod_core::manager")
            .build();
        let trace = log::Metadata::builder()
            .level(log::Level::Trace)
            .target("isrmod_core::manager")
            .build();

        assert!(logger.enabled(&debug));
        assert!(!logger.enabled(&trace));
    }
}
