use std::path::PathBuf;

use clap::Parser;

/// Download every merit badge pamphlet published on scouting.org.
#[derive(Parser, Debug)]
#[command(name = "pamphlets")]
#[command(author, version, about)]
pub struct Args {
    /// Folder the pamphlets are written to (created if missing)
    #[arg(short, long)]
    pub save_folder: Option<PathBuf>,

    /// Wait for Enter before exiting
    #[arg(long)]
    pub pause: bool,

    /// Increase diagnostic output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
