//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Notebook commands.
#[derive(Debug, Subcommand)]
pub enum NotebookCommand {
    /// Create a notebook
    Create {
        /// Title (defaults to "New Notebook")
        title: Option<String>,
    },

    /// List your notebooks and those shared with you
    List {
        /// Only list notebooks you own
        #[arg(long, conflicts_with = "shared")]
        owned: bool,

        /// Only list notebooks shared with you
        #[arg(short, long)]
        shared: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Show a notebook and its notes
    Show {
        /// Notebook id
        id: i64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Rename a notebook
    Rename {
        /// Notebook id
        id: i64,
        /// New title
        title: String,
    },

    /// Set a notebook's description
    Describe {
        /// Notebook id
        id: i64,
        /// New description
        description: String,
    },

    /// Delete a notebook you own and all of its notes
    Delete {
        /// Notebook id
        id: i64,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Share a notebook with someone by email
    Share {
        /// Notebook id
        id: i64,
        /// Email address to share with
        address: String,
    },

    /// Stop sharing a notebook with an email address
    Unshare {
        /// Notebook id
        id: i64,
        /// Email address to remove
        address: String,
    },
}

/// Friend commands.
#[derive(Debug, Subcommand)]
pub enum FriendCommand {
    /// Add a registered user as a friend by email
    Add {
        /// The friend's email address
        address: String,
    },

    /// List your friends
    List {
        /// Mark friends who can already see this notebook
        #[arg(short, long, value_name = "ID")]
        notebook: Option<i64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Look up registered users by email
    Search {
        /// Email address to look for
        address: String,
    },
}

/// Profile commands.
#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show your profile
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Change your display name or username
    Set {
        /// Display name shown to friends
        #[arg(short, long)]
        name: Option<String>,

        /// Unique username (at least 3 characters)
        #[arg(short, long)]
        username: Option<String>,
    },
}

/// Note commands.
#[derive(Debug, Subcommand)]
pub enum NoteCommand {
    /// Add a note to a notebook
    Add {
        /// Notebook id
        notebook: i64,
    },

    /// List the notes of a notebook
    List {
        /// Notebook id
        notebook: i64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Show a note
    Show {
        /// Notebook id
        notebook: i64,
        /// Note id
        note: i64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Change a note's title or content
    Edit {
        /// Notebook id
        notebook: i64,
        /// Note id
        note: i64,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New content
        #[arg(long)]
        content: Option<String>,
    },

    /// Delete a note
    Delete {
        /// Notebook id
        notebook: i64,
        /// Note id
        note: i64,
    },
}

/// Draw command arguments.
#[derive(Debug, Args)]
pub struct DrawCommand {
    /// Notebook id
    pub notebook: i64,

    /// Note id
    pub note: i64,

    /// Pointer script to replay (reads stdin when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Palette index to start drawing with
    #[arg(long, value_name = "N")]
    pub color: Option<usize>,

    /// Print the resulting drawing without saving it
    #[arg(long)]
    pub no_save: bool,
}

/// Render command arguments.
#[derive(Debug, Args)]
pub struct RenderCommand {
    /// Notebook id
    pub notebook: i64,

    /// Note id
    pub note: i64,

    /// Write the SVG here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Canvas width override in pixels
    #[arg(long)]
    pub width: Option<f64>,

    /// Canvas height override in pixels
    #[arg(long)]
    pub height: Option<f64>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}

impl OutputFormat {
    /// Check if JSON output was requested.
    #[must_use]
    pub fn is_json(self) -> bool {
        self == Self::Json
    }
}
