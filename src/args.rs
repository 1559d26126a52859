use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "unfollowers",
    about = "Find accounts you follow on Instagram that do not follow you back",
    version,
    long_about = None
)]
pub struct Args {
    /// Instagram username to analyze (prompted for when omitted)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Directory where report files are written
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
