//! Clap adapter.
//!
//! Compiled only with the `clap` Cargo feature (on by default). [`Cli`] is the
//! full command line; [`Command::into_action()`] is the only bridge to the core,
//! converting parsed arguments into a framework-agnostic
//! [`VariantsAction`](crate::VariantsAction). Global flags become settings
//! overrides in the binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::platform::Platform;
use crate::types::VariantsAction;

/// Build variants for iOS and Android projects.
#[derive(Debug, Parser)]
#[command(name = "variants", version)]
pub struct Cli {
    /// Path to the variants spec (overrides the `spec` setting).
    #[arg(long, global = true)]
    pub spec: Option<PathBuf>,

    /// Log resolution details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a starter variants spec.
    Init {
        #[arg(ignore_case = true)]
        platform: Platform,
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the variants declared for a platform.
    List {
        #[arg(ignore_case = true)]
        platform: Platform,
    },
    /// Show what a variant resolves to, without writing anything.
    Show {
        #[arg(ignore_case = true)]
        platform: Platform,
        variant: String,
        /// Target to apply the variant to (default: the first declared).
        #[arg(short, long)]
        target: Option<String>,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Write the artifacts for a variant and make it the active one.
    Switch {
        #[arg(ignore_case = true)]
        platform: Platform,
        variant: String,
        /// Target to apply the variant to (default: the first declared).
        #[arg(short, long)]
        target: Option<String>,
    },
}

impl Command {
    pub fn into_action(self) -> VariantsAction {
        match self {
            Command::Init { platform, output } => VariantsAction::Init { platform, output },
            Command::List { platform } => VariantsAction::List { platform },
            Command::Show {
                platform,
                variant,
                target,
                json,
            } => VariantsAction::Show {
                platform,
                variant,
                target,
                json,
            },
            Command::Switch {
                platform,
                variant,
                target,
            } => VariantsAction::Switch {
                platform,
                variant,
                target,
            },
        }
    }
}
