use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rollbook", bin_name = "rollbook", version)]
#[command(about = "Manage student records from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend API URL (overrides config and ROLLBOOK_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Directory holding config.json
    #[arg(long, global = true, hide = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    /// Full name
    #[arg(long)]
    pub name: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Roll number (letters, digits, hyphens)
    #[arg(long = "roll-number", visible_alias = "roll")]
    pub roll_number: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List students
    #[command(alias = "ls")]
    List {
        /// Search term (matched by the server against name, email and roll number)
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Search students
    Search { term: String },

    /// Show one student
    #[command(alias = "v")]
    View { id: i64 },

    /// Add a student
    #[command(alias = "n")]
    Add {
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Replace a student's fields (unspecified fields keep their current value)
    #[command(alias = "e")]
    Edit {
        id: i64,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Change only the given fields of a student
    Patch {
        id: i64,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete a student
    #[command(alias = "rm")]
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Interactive session
    Shell,

    /// Get or set configuration
    Config {
        /// Configuration key (api-url, stale-time, request-timeout, toast-time)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}
