use clap::{Parser, Subcommand};

use crate::schema::NoteId;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Origin of the notes service (overrides config)
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check whether the notes service is reachable
    Health,

    /// Keep checking the notes service and report when it goes up or down
    Watch,

    /// List notes, optionally filtered by title/content
    List {
        /// Substring to search for
        #[arg(value_name = "SEARCH")]
        search: Option<String>,

        /// Maximum number of notes to fetch
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show one note
    Show {
        #[arg(value_name = "NOTE_ID")]
        id: NoteId,
    },

    /// Create a note
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,

        /// Comma-separated labels
        #[arg(long, default_value = "")]
        tags: String,
    },

    /// Change fields of an existing note
    Edit {
        #[arg(value_name = "NOTE_ID")]
        id: NoteId,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        content: Option<String>,

        #[arg(long)]
        tags: Option<String>,
    },

    /// Delete a note
    Delete {
        #[arg(value_name = "NOTE_ID")]
        id: NoteId,
    },
}
