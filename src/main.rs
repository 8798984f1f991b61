use std::io::{self, BufRead, Write};

use chrono::Local;
use clap::Parser;
use pamphlets::{info_time, process::process_site, Config, Result};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = Config::default();
    if let Some(save_folder) = args.save_folder {
        config.save_folder = save_folder;
    }

    let start_time = Local::now();
    let report = process_site(&config).await?;
    println!("{}", report.summary(&config.save_folder));
    info_time!(start_time, "Full program time:");

    if args.pause {
        print!("\n\n\nWork complete... press Enter to continue");
        io::stdout().flush()?;
        io::stdin().lock().read_line(&mut String::new())?;
    }

    Ok(())
}
