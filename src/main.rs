use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;

use meal_insight::handlers::ReportHandler;
use meal_insight::models::DEFAULT_BATCH_LIMIT;
use meal_insight::{InsightConfig, MealInsightGenerator};

/// AI nutrition reports for the lifelog meal diary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze the most recent meals from an exported meal log
    Analyze {
        /// JSON array of logged meals
        #[arg(short, long)]
        meals: PathBuf,

        /// Personal dietary context passed to the nutritionist prompt
        #[arg(short, long, env = "INSIGHT_GUIDANCE")]
        guidance: Option<String>,

        /// How many recent meals to include
        #[arg(short, long, default_value_t = DEFAULT_BATCH_LIMIT)]
        limit: usize,

        /// Print the full result as JSON instead of the Markdown report
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Serve the insight endpoint over HTTP
    #[cfg(feature = "http-server")]
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    let config = InsightConfig::from_env()?;

    let generator = Arc::new(MealInsightGenerator::new(&config)?);
    log::info!(
        "✅ Meal insight generator initialized with models: {}",
        generator.candidate_models().join(", ")
    );

    match args.command {
        Command::Analyze {
            meals,
            guidance,
            limit,
            json,
        } => {
            let records = ReportHandler::load_meal_log(&meals)?;
            let handler = ReportHandler::new(generator, limit);
            let result = handler.handle(&records, guidance).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }

            match (&result.report_text, &result.failure) {
                (Some(report), _) => {
                    if !json {
                        println!("{}", report);
                    }
                }
                (None, Some(failure)) => {
                    log::error!("❌ Analysis failed: {}", failure.message);
                    if !json {
                        eprintln!("{}", failure.user_message);
                    }
                    std::process::exit(1);
                }
                (None, None) => anyhow::bail!("Analysis returned neither a report nor a failure"),
            }
        }

        #[cfg(feature = "http-server")]
        Command::Serve { addr } => {
            use meal_insight::server::create_insight_router;

            if config.access_token.is_none() {
                log::warn!("⚠️ INSIGHT_ACCESS_TOKEN not set, insight endpoint is open");
            }

            let app = create_insight_router(generator, config.access_token.clone());
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            log::info!("🌐 Insight server listening on {}", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    tokio::signal::ctrl_c().await.ok();
                    log::info!("🛑 Shutting down...");
                })
                .await?;
        }
    }

    Ok(())
}
