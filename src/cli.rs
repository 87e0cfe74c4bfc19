//! CLI argument parsing

use crate::transports;
use clap::{Args, Parser, Subcommand};
use isrmod_core::register::ModelType;
use std::path::PathBuf;

/// Parse a command word id, rejecting the reserved values
fn parse_word_id(s: &str) -> Result<u8, String> {
    let id: u8 = s.parse().map_err(|e| format!("Invalid id: {}", e))?;
    match id {
        0 => Err("Id 0 is the wake word".to_string()),
        255 => Err("Id 255 means no match".to_string()),
        id => Ok(id),
    }
}

/// Generate dynamic help text for the transport argument
fn transport_help() -> String {
    format!(
        "Transport to use [available: {}]",
        transports::transport_names_short()
    )
}

#[derive(Parser)]
#[command(name = "isrmod")]
#[command(author, version, about = "Speech command-word recognition module control", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Transport selection shared by every module command
#[derive(Args, Debug, Clone)]
pub struct TransportArgs {
    /// Transport to use
    #[arg(short, long, help = transport_help())]
    pub transport: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check the module answers and show its identity
    Probe {
        #[command(flatten)]
        transport: TransportArgs,
    },

    /// Bring the module up with a model and wake duration
    Init {
        #[command(flatten)]
        transport: TransportArgs,

        /// Recognition model (standby, cn, en)
        #[arg(short, long, default_value = "cn")]
        model: ModelType,

        /// Seconds to stay awake after the wake word (0 = always, max 120)
        #[arg(short, long, default_value_t = 10)]
        wake: u8,

        /// Skip the product id check
        #[arg(long)]
        no_verify: bool,
    },

    /// Select the recognition model
    SetModel {
        #[command(flatten)]
        transport: TransportArgs,

        /// Recognition model (standby, cn, en)
        model: ModelType,
    },

    /// Set the wake duration
    SetWake {
        #[command(flatten)]
        transport: TransportArgs,

        /// Seconds to stay awake after the wake word (0 = always, max 120)
        seconds: u8,
    },

    /// Add a command word
    Add {
        #[command(flatten)]
        transport: TransportArgs,

        /// Id reported when the word is recognized (1-254)
        #[arg(short, long, value_parser = parse_word_id)]
        id: u8,

        /// Text of the command word
        #[arg(long)]
        text: String,
    },

    /// Delete a command word by id or by text
    Del {
        #[command(flatten)]
        transport: TransportArgs,

        /// Id of the word to delete
        #[arg(short, long, conflicts_with = "text", required_unless_present = "text")]
        id: Option<u8>,

        /// Text of the word to delete
        #[arg(long)]
        text: Option<String>,
    },

    /// Add every command word listed in a TOML file
    Provision {
        #[command(flatten)]
        transport: TransportArgs,

        /// Word list file ([[word]] tables with id and text)
        #[arg(short, long)]
        words: PathBuf,

        /// Keep going after a word is rejected
        #[arg(long)]
        keep_going: bool,
    },

    /// Poll and print recognition results
    Listen {
        #[command(flatten)]
        transport: TransportArgs,

        /// Milliseconds between polls
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,

        /// Stop after this many results (wake word or command)
        #[arg(short, long)]
        count: Option<u32>,
    },

    /// List supported transports
    ListTransports,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "isrmod", "add", "-t", "dummy", "--id", "5", "--text", "lights on",
        ])
        .unwrap();
        match cli.command {
            Commands::Add { transport, id, text } => {
                assert_eq!(transport.transport, "dummy");
                assert_eq!(id, 5);
                assert_eq!(text, "lights on");
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_reserved_id_rejected() {
        assert!(Cli::try_parse_from(["isrmod", "add", "-t", "dummy", "-i", "0", "--text", "x"]).is_err());
    }

    #[test]
    fn test_del_requires_exactly_one_selector() {
        assert!(Cli::try_parse_from(["isrmod", "del", "-t", "dummy"]).is_err());
        assert!(
            Cli::try_parse_from(["isrmod", "del", "-t", "dummy", "-i", "3", "--text", "x"]).is_err()
        );
        assert!(Cli::try_parse_from(["isrmod", "del", "-t", "dummy", "--text", "x"]).is_ok());
    }

    #[test]
    fn test_model_values() {
        let cli = Cli::try_parse_from(["isrmod", "set-model", "-t", "dummy", "en"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::SetModel {
                model: ModelType::English,
                ..
            }
        ));
        assert!(Cli::try_parse_from(["isrmod", "set-model", "-t", "dummy", "fr"]).is_err());
    }
}
