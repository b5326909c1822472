use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "playmart")]
#[command(version, about = "Stand up and load a star-schema music-streaming data mart")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline (drop, create, copy, insert) against a local warehouse database
    Run {
        /// Output warehouse database path
        output_db: PathBuf,

        /// Load configuration file
        #[arg(short, long, default_value = "dwh.json")]
        config: PathBuf,

        /// Only run these phases (comma-separated: drop,create,copy,insert)
        #[arg(long, value_delimiter = ',')]
        only: Option<Vec<String>>,

        /// Skip these phases (comma-separated)
        #[arg(long, value_delimiter = ',')]
        skip: Option<Vec<String>>,

        /// Custom cache directory for remote sources
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Re-download remote sources even if cached
        #[arg(short, long)]
        refresh: bool,
    },

    /// Print the warehouse SQL script for the selected phases
    Render {
        /// Load configuration file (needed for the copy phase)
        #[arg(short, long, default_value = "dwh.json")]
        config: PathBuf,

        /// Only render these phases (comma-separated)
        #[arg(long, value_delimiter = ',')]
        only: Option<Vec<String>>,

        /// Skip these phases (comma-separated)
        #[arg(long, value_delimiter = ',')]
        skip: Option<Vec<String>>,
    },

    /// List all warehouse table names
    ListTables,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
