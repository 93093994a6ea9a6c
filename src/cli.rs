use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "palaver", about = "Local-first two-party chat (CLI)")]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create an account and sign in
    Register {
        username: String,
        /// Password (prompted twice when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign in to an existing account
    Login {
        username: String,
        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Update the signed-in account's profile
    Profile {
        /// New username
        #[arg(long)]
        username: Option<String>,
        /// Image file, embedded into the profile as a data URL
        #[arg(long, conflicts_with = "picture_url")]
        picture: Option<PathBuf>,
        /// Picture URL stored as-is (pass an empty string to clear it)
        #[arg(long)]
        picture_url: Option<String>,
    },
    /// List chat partners
    Users {
        /// Case-insensitive username filter
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Send a message to a user
    Send { peer: String, text: String },
    /// Show the conversation with a user
    History { peer: String },
    /// Edit one of your own messages
    Edit {
        peer: String,
        message_id: String,
        text: String,
    },
    /// Delete a message for both sides
    Delete { peer: String, message_id: String },
}
