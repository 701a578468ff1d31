use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use nw_storage::{SeedData, SqliteStore};
use nw_web::{create_app, AppState};

mod logging;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the SQLite database file. Created on first use.
    #[arg(long, default_value = "newswire.db")]
    database: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server.
    Serve {
        #[arg(long, default_value = "127.0.0.1:9090")]
        addr: SocketAddr,
        /// Load the demo dataset before serving.
        #[arg(long)]
        seed: bool,
    },
    /// Load the demo dataset and exit. Replaces any existing data.
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();
    let cli = Cli::parse();

    let store = SqliteStore::open(&cli.database).await?;
    info!("💾 Database ready at {}", cli.database.display());

    match cli.command {
        Commands::Serve { addr, seed } => {
            if seed {
                store.seed(&SeedData::demo()).await?;
                info!("🌱 Demo dataset loaded");
            }

            let app = create_app(AppState {
                store: store.clone(),
            })
            .await;
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("📰 Serving on http://{}", listener.local_addr()?);
            axum::serve(listener, app).await?;
        }
        Commands::Seed => {
            store.seed(&SeedData::demo()).await?;
            info!("🌱 Demo dataset loaded");
        }
    }

    store.close().await;
    Ok(())
}
