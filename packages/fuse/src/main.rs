use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use searchfs_client::EsClient;
use searchfs_core::{NamespaceCache, Resolver};

mod fs;
mod inode;

/// Mount a document store as a read-only filesystem.
#[derive(Parser, Debug)]
#[command(name = "searchfs")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Comma-separated store endpoint URLs
    #[arg(long, default_value = "http://localhost:9200")]
    urls: String,

    /// Directory to mount the filesystem on
    #[arg(long)]
    mount_path: PathBuf,

    /// Documents per page directory
    #[arg(long, default_value_t = 10)]
    page_size: u64,

    /// Log every filesystem operation
    #[arg(long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    let filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    anyhow::ensure!(args.page_size >= 1, "--page-size must be at least 1");

    let client = EsClient::from_url_list(&args.urls).context("invalid --urls")?;
    let cache = NamespaceCache::new(Arc::new(client), args.page_size);
    let filesystem = fs::SearchFs::new(Resolver::new(cache));

    let options = [
        fuser::MountOption::FSName("searchfs".to_string()),
        fuser::MountOption::RO,
        fuser::MountOption::AutoUnmount,
    ];
    log::info!("mounting searchfs at {}", args.mount_path.display());
    fuser::mount2(filesystem, &args.mount_path, &options)
        .with_context(|| format!("mount {}", args.mount_path.display()))?;
    Ok(())
}
