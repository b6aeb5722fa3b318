use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod components;
mod config;
mod db;
mod entity;
mod error;
mod filter;
mod html;
mod models;
mod report;
mod risk;
mod server;

#[derive(Parser)]
#[command(name = "hr-risk-dashboard")]
#[command(about = "Employee and team recruitment-risk dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import employee event rows from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Serve the dashboard over HTTP
    Serve {
        /// Overrides BIND_ADDR
        #[arg(long)]
        bind: Option<SocketAddr>,
        /// Overrides MODEL_PATH
        #[arg(long)]
        model: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::AppConfig::from_env()?;
    let pool = db::connect(&config.database_url).await?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} event rows from {}.", csv.display());
        }
        Commands::Serve { bind, model } => {
            tracing_subscriber::registry()
                .with(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "hr_risk_dashboard=info".into()),
                )
                .with(tracing_subscriber::fmt::layer())
                .init();

            let model_path = model.unwrap_or(config.model_path);
            let bind_addr = bind.unwrap_or(config.bind_addr);

            let predictor = risk::LogisticModel::load(&model_path)?;
            tracing::info!(path = %model_path.display(), "risk model loaded");

            let state = server::AppState {
                source: Arc::new(db::SqliteSource::new(pool)),
                report: Arc::new(report::Report::new(Arc::new(predictor))),
            };

            let listener = tokio::net::TcpListener::bind(bind_addr)
                .await
                .with_context(|| format!("failed to bind {bind_addr}"))?;
            tracing::info!(%bind_addr, "dashboard listening");
            axum::serve(listener, server::router(state))
                .await
                .context("server error")?;
        }
    }

    Ok(())
}
