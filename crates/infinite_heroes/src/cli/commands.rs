//! CLI command definitions.

use clap::{Parser, Subcommand};
use infinite_heroes::Genre;
use std::path::PathBuf;

/// Infinite Heroes - choose-your-path comic books
#[derive(Parser, Debug)]
#[command(name = "infinite-heroes")]
#[command(about = "Generate choose-your-path comic books page by page", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a new story from a hero portrait
    New {
        /// Hero portrait (png, jpg, webp or gif)
        #[arg(long)]
        hero: PathBuf,

        /// Hero name
        #[arg(long, default_value = "")]
        hero_name: String,

        /// Optional co-star portrait
        #[arg(long)]
        costar: Option<PathBuf>,

        /// Co-star name
        #[arg(long, default_value = "")]
        costar_name: String,

        /// Genre, e.g. "High Fantasy" or "Custom"
        #[arg(long, default_value = "Superhero Action", value_parser = parse_genre)]
        genre: Genre,

        /// Output language code, e.g. "en-US"
        #[arg(long, default_value = "en-US")]
        language: String,

        /// Premise for the custom genre
        #[arg(long, default_value = "")]
        premise: String,

        /// Longer captions and dialogue
        #[arg(long)]
        rich: bool,
    },

    /// Make a decision in the saved story and generate what follows
    Choose {
        /// Decision page number
        #[arg(long, default_value = "3")]
        page: u32,

        /// One of the offered choices
        choice: String,
    },

    /// Show the saved story
    Status,

    /// Print a share token for the saved story
    Share,

    /// Replay a shared story
    Replay {
        /// Share token
        token: String,

        /// Hero portrait for the replay
        #[arg(long)]
        hero: PathBuf,

        /// Write the replayed issue to this HTML file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Export the saved story as a printable HTML document
    Export {
        /// Output file
        output: PathBuf,
    },

    /// Discard the saved story
    Reset,
}

fn parse_genre(value: &str) -> Result<Genre, String> {
    value.parse::<Genre>()
}
