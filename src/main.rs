use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use rental_insights::engine::InsightEngine;
use rental_insights::fixtures;
use rental_insights::llm::LlmClient;
use rental_insights::registry::CanonicalRegistry;

/// Demo question set answered when no question is given
const DEMO_QUESTIONS: &[&str] = &[
    "What's the occupancy rate of properties in Bradford?",
    "Who are the top 10 tenants by total rent paid?",
    "What's the average rating of apartments vs houses?",
    "Which landlords generated the most revenue this year?",
    "List all currently available 2BHKs under $2500 in London.",
];

#[derive(Parser)]
#[command(name = "rental-insights")]
#[command(about = "Natural-language analytics over a rental property database")]
struct Args {
    /// Question to answer; omit to run the built-in demo set
    question: Option<String>,

    /// Path to the SQLite database file
    #[arg(short, long, default_value = "rental_app.db")]
    database: PathBuf,

    /// Recreate the schema and sample data before answering
    #[arg(long)]
    seed: bool,

    /// OpenAI API key (or set OPENAI_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    if args.seed {
        info!("Seeding database at {}", args.database.display());
        fixtures::setup_database(&args.database)?;
    }

    let api_key = args
        .api_key
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .unwrap_or_default();

    let registry = Arc::new(CanonicalRegistry::builtin());
    let generator = Arc::new(LlmClient::new(api_key));
    let engine = InsightEngine::new(registry, generator, &args.database);

    match args.question {
        Some(question) => {
            let response = engine.process(&question).await;
            println!("{}", response);
        }
        None => {
            for question in DEMO_QUESTIONS {
                println!("\nUser Query: {}", question);
                let response = engine.process(question).await;
                println!("System Response: {}", response);
            }
        }
    }

    Ok(())
}
