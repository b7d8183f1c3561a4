//! # Daily News Digest
//!
//! Scrapes the latest articles from a news portal section, summarizes each
//! one, renders the summaries into a paginated document and emails it once
//! a day.
//!
//! ## Usage
//!
//! ```sh
//! EMAIL_USERNAME=me@gmail.com EMAIL_PASSWORD=app-password daily_news_digest -o ./digests
//! ```
//!
//! ## Architecture
//!
//! 1. **Indexing**: parse the section listing into article headers
//! 2. **Extraction**: fetch each article and pull out its body text
//! 3. **Summarization**: extractive by default, optionally model-based
//! 4. **Output**: write the paginated document and a JSON copy
//! 5. **Delivery**: mail the document, then wait for the next scheduled run

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod http;
mod job;
mod mail;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod summarize;
mod utils;

use cli::{Cli, SummarizerKind};
use http::HttpFetcher;
use job::{DailyJob, JobSettings, start_scheduler};
use mail::SmtpMailer;
use pipeline::Pipeline;
use summarize::Summarizer;
use summarize::extractive::ExtractiveSummarizer;
use summarize::model::{ChatCompletionClient, ModelSummarizer, RetryAsk};
use utils::ensure_writable_dir;

const MODEL_TIMEOUT: Duration = Duration::from_secs(120);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let dotenv = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("daily_news_digest starting up");
    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "Loaded .env file");
    }

    let args = Cli::parse();
    debug!(output_dir = %args.output_dir.display(), limit = args.limit, summarizer = ?args.summarizer, "Parsed CLI arguments");

    let config = config::load_config(args.config.as_deref())?;

    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let fetcher = Arc::new(HttpFetcher::new(&config.listing.user_agent)?);
    let summarizer: Arc<dyn Summarizer> = match args.summarizer {
        SummarizerKind::Extractive => Arc::new(ExtractiveSummarizer::new(config.summary.clone())),
        SummarizerKind::Model => {
            let client = ChatCompletionClient::new(
                &args.model_endpoint,
                &args.model_name,
                args.model_api_key.clone(),
                MODEL_TIMEOUT,
            )?;
            info!(endpoint = %args.model_endpoint, model = %args.model_name, "Using model summarizer");
            Arc::new(ModelSummarizer::new(
                RetryAsk::new(client, 5, Duration::from_secs(1)),
                config.summary.max_chars,
            ))
        }
    };

    let pipeline = Pipeline::from_config(&config, fetcher, summarizer)?;
    let mailer = Arc::new(SmtpMailer::new(
        &args.smtp_host,
        &args.email_username,
        &args.email_password,
    )?);
    let job = Arc::new(DailyJob::new(
        pipeline,
        mailer,
        JobSettings {
            recipient: args.recipient().to_string(),
            output_dir: args.output_dir.clone(),
            limit: args.limit as usize,
            keywords: args.keywords.clone(),
            articles_per_page: config.articles_per_page,
        },
    ));

    job.run_logged().await;
    if args.once {
        return Ok(());
    }

    let mut scheduler = start_scheduler(Arc::clone(&job), &args.schedule).await?;
    info!(schedule = %args.schedule, "Scheduler running; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    info!("Shutting down scheduler");
    scheduler.shutdown().await?;
    Ok(())
}
