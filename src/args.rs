use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "update-scan")]
#[command(about = "Watches web pages and reports when their content changes")]
#[command(version)]
pub struct Args {
    /// Path to JSON configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Page store to read and update (overrides the configuration)
    #[arg(short, long)]
    pub store: Option<String>,

    /// Number of concurrent fetches
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Seconds between checks for due scans
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Scan every page once, save and exit
    #[arg(long)]
    pub once: bool,
}
