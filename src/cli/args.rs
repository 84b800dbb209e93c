use std::path::PathBuf;

use crate::state::{config::DEFAULT_STATE_DIR, CredentialSource};
use clap::{Parser, Subcommand};

/// plsync - keep Spotify playlists in step with a track list file
///
/// Each track is looked up by artist, title and optional album, and the
/// named playlist is created or rewritten to match the file exactly.
#[derive(Parser, Debug)]
#[command(name = "plsync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Where the access token comes from (defaults to the config file setting)
    #[arg(short, long, global = true)]
    pub source: Option<CredentialSource>,

    /// Directory holding config, credentials and history
    #[arg(long, global = true, default_value = DEFAULT_STATE_DIR)]
    pub state_dir: PathBuf,

    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authorize plsync with Spotify and store the token
    Auth,
    /// Delete the stored token
    Logout,
    /// Show the authenticated account
    Whoami,
    /// Create or update a playlist from a JSON or YAML track list
    Build {
        /// Path to the playlist file
        file: PathBuf,
        /// Resolve and compare, but change nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Write one of your playlists out as a track list file
    Export {
        /// Exact playlist name
        playlist: String,
        /// Output file (.json, .yaml or .yml)
        output: PathBuf,
    },
    /// Export every playlist you own into a directory
    Backup {
        /// Output directory
        dir: PathBuf,
    },
    /// Show previous builds
    History {
        /// Number of most recent entries to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
}
