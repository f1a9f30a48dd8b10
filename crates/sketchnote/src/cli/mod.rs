//! Command-line interface for sketchnote.
//!
//! This module provides the CLI structure for the `sknote` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DrawCommand, FriendCommand, NoteCommand, NotebookCommand, OutputFormat,
    ProfileCommand, RenderCommand, StatusCommand,
};

use crate::logging::Verbosity;

/// sknote - Notebooks with freehand drawings
///
/// Keeps notebooks of notes in a local database. Each note has a title,
/// text, and a drawing that can be edited with pointer scripts and
/// exported as SVG.
#[derive(Debug, Parser)]
#[command(name = "sknote")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Act as this user id instead of the configured one
    #[arg(long, global = true, value_name = "ID")]
    pub user: Option<String>,

    /// Use this email for shared notebooks instead of the configured one
    #[arg(long, global = true, value_name = "EMAIL")]
    pub email: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage notebooks
    #[command(subcommand)]
    Notebook(NotebookCommand),

    /// Manage notes
    #[command(subcommand)]
    Note(NoteCommand),

    /// Find and add friends
    #[command(subcommand)]
    Friend(FriendCommand),

    /// View or change your profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Replay a pointer script into a note's drawing
    Draw(DrawCommand),

    /// Export a note's drawing as SVG
    Render(RenderCommand),

    /// Show library and database status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
