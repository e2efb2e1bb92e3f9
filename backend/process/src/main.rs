use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

/// Audits menu orders and renumbers them in place.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Writes a PNG QR code pointing at the public menu
    Qr {
        /// Public menu address
        url: String,

        /// Output PNG path
        #[arg(default_value = "mhanna-menu-qr.png")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();

    match args.command {
        Some(Command::Qr { url, out }) => process::write_menu_qr(&url, &out),
        None => process::normalize_orders(args.dry_run).await,
    }
}
