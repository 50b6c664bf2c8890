use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::input::Button;
use crate::session::ReleaseTarget;

#[derive(Parser)]
#[command(name = "n3ds-pad")]
#[command(about = "Send controller input to a 3DS running input redirection")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Console host (IP or hostname)
    #[arg(long, env = "N3DSPAD_HOST")]
    pub host: Option<String>,

    /// Input redirection UDP port
    #[arg(long)]
    pub port: Option<u16>,

    /// Delay before a oneshot press is released, in milliseconds
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// What a oneshot release resets (buttons, touch)
    #[arg(long, value_parser = clap::value_parser!(ReleaseTarget))]
    pub release_target: Option<ReleaseTarget>,

    /// Path to config file
    #[arg(long, env = "N3DSPAD_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Press a button once and release it
    Press {
        #[arg(value_parser = clap::value_parser!(Button))]
        button: Button,
    },
    /// Touch a point given as "<x> <y>" (0-4095) or a binding name
    Touch {
        #[arg(required = true, num_args = 1..=2)]
        target: Vec<String>,

        /// How long to hold the touch before releasing, in milliseconds
        #[arg(long, default_value_t = 100)]
        hold_ms: u64,
    },
    /// Release the touch screen
    Release,
    /// Print the frame an input state encodes to, without sending it
    Dump {
        #[arg(long, value_parser = clap::value_parser!(Button))]
        button: Option<Button>,

        #[arg(long, num_args = 2, value_names = ["X", "Y"])]
        touch: Option<Vec<u16>>,
    },
}
