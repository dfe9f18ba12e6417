use clap::Parser;
use std::path::PathBuf;

pub mod process;

pub use process::handle_process_command;

#[derive(Parser, Debug)]
#[command(name = "recap", version)]
#[command(about = "Turn meeting recordings into transcripts and to-do lists", long_about = None)]
pub struct Cli {
    /// One or more audio/video recordings to process
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Directory where transcript and task artifacts are written
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
