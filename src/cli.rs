//! Command-line interface definitions using clap
//!
//! The binary is meant to be invoked by an external scheduler (cron,
//! systemd timers), one job per invocation.

use clap::{Parser, Subcommand};

use crate::jobs::JobKind;

/// blogkeeper - scheduled maintenance jobs for the blog backend
#[derive(Parser, Debug)]
#[command(name = "blogkeeper")]
#[command(version)]
#[command(about = "Scheduled maintenance jobs for the blog backend", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one or more jobs in the given order
    ///
    /// Jobs are independent: a failure is reported and the remaining jobs still run.
    Run {
        /// Job names (see `list`)
        #[arg(required = true, num_args = 1..)]
        jobs: Vec<JobKind>,
    },

    /// Run the daily visitor cycle: save-unique-view, user-area-stats, clear-visitor-cache
    ///
    /// Stops at the first failure so visitor data is never cleared before it was saved.
    VisitorCycle,

    /// List available jobs
    List,

    /// Run database migrations and exit
    Migrate,

    /// Manage user profiles
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// User profile commands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Show a user profile as JSON
    Show {
        /// User info id
        id: i32,
    },

    /// Disable a user
    Disable {
        id: i32,
    },

    /// Re-enable a disabled user
    Enable {
        id: i32,
    },

    /// Set nickname and replace roles
    Roles {
        id: i32,

        #[arg(long)]
        nickname: String,

        /// Role ids, comma separated
        #[arg(long, value_delimiter = ',', num_args = 0..)]
        roles: Vec<i32>,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration (file + environment)
    Show,
}
