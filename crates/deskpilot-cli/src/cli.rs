//! CLI argument definitions for deskpilot.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// deskpilot -- desktop workspace automation.
#[derive(Parser)]
#[command(
    name = "deskpilot",
    version,
    about = "deskpilot -- desktop workspace automation",
    long_about = "Opens apps, URLs, shortcuts and pointer actions from named layouts \
                  or free-text commands, falling back through every available \
                  automation backend."
)]
pub struct Cli {
    /// Path to a deskpilot.toml configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log capability calls instead of performing them.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a named layout.
    Run {
        /// Layout id (or its display name).
        layout: String,

        /// Include one outcome per action in the result.
        #[arg(long, short)]
        verbose: bool,
    },

    /// List known layouts.
    List,

    /// Resolve and run a free-text command, e.g. `deskpilot do dark mode`.
    Do {
        /// The command phrase.
        #[arg(required = true, num_args = 1..)]
        phrase: Vec<String>,
    },

    /// Show the built-in command catalogue.
    Commands,

    /// Validate a layout file and store it in the user layouts file.
    Save {
        /// Id to store the layout under.
        id: String,

        /// JSON file holding the layout.
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Remove a layout from the user layouts file and the local directory.
    Delete {
        /// Layout id (or the display name of a local layout).
        id: String,
    },

    /// Try one pointer action given as JSON,
    /// e.g. `deskpilot test '{"x": 400, "y": 300, "click": true}'`.
    Test {
        /// The action object.
        action: String,
    },

    /// Seed the default layouts into the user layouts file.
    Init,
}
