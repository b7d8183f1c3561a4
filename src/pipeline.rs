//! Run orchestration: listing → per-article extraction → summarization.
//!
//! ```text
//! START → FETCH_LISTING ─ empty ─→ ABORT
//!                       └ headers → PROCESS_ITEMS → ASSEMBLE → DONE
//! ```
//!
//! Articles are processed one at a time in listing order with a fixed pause
//! between them. A failed article is logged and dropped; it never aborts the
//! batch.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::http::PageFetcher;
use crate::models::{ArticleHeader, ArticleRecord};
use crate::scrapers::article::ContentExtractor;
use crate::scrapers::listing::ListingFetcher;
use crate::summarize::Summarizer;
use futures::stream::{self, StreamExt};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Why an article was dropped from the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fetch failed, no container matched, or the body was too short.
    NoBody,
    /// The summarizer rejected the body.
    NoSummary,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoBody => f.write_str("article body unavailable"),
            SkipReason::NoSummary => f.write_str("summary could not be generated"),
        }
    }
}

pub struct Pipeline {
    listing: ListingFetcher,
    extractor: ContentExtractor,
    summarizer: Arc<dyn Summarizer>,
    pause: Duration,
}

impl Pipeline {
    pub fn new(
        listing: ListingFetcher,
        extractor: ContentExtractor,
        summarizer: Arc<dyn Summarizer>,
        pause: Duration,
    ) -> Self {
        Self {
            listing,
            extractor,
            summarizer,
            pause,
        }
    }

    /// Build every stage from configuration over a shared fetcher.
    pub fn from_config(
        config: &PipelineConfig,
        fetcher: Arc<dyn PageFetcher>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Result<Self> {
        Ok(Self::new(
            ListingFetcher::new(Arc::clone(&fetcher), &config.listing)?,
            ContentExtractor::new(fetcher, &config.article)?,
            summarizer,
            Duration::from_millis(config.pause_ms),
        ))
    }

    /// Run one batch: fetch up to `limit` headers and summarize each.
    ///
    /// Articles are processed sequentially in listing order with the
    /// configured pause between them. A failed article is logged and
    /// dropped.
    ///
    /// # Arguments
    ///
    /// * `limit` - Maximum number of listing headers to process
    /// * `keyword_filter` - Optional title keywords passed to the listing
    ///
    /// # Returns
    ///
    /// The records that made it through extraction and summarization. An
    /// empty result means the run failed as a whole; callers should not
    /// render or send anything for it.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let pipeline = Pipeline::from_config(&config, fetcher, summarizer)?;
    /// let records = pipeline.run(10, None).await;
    /// ```
    #[instrument(level = "info", skip_all, fields(limit = limit))]
    pub async fn run(&self, limit: usize, keyword_filter: Option<&[String]>) -> Vec<ArticleRecord> {
        let headers = self.listing.fetch_headers(limit, keyword_filter).await;
        if headers.is_empty() {
            error!("No news available; aborting run");
            return Vec::new();
        }

        let total = headers.len();
        let records = self.process_headers(headers).await;
        if records.is_empty() {
            error!(total, "No article could be summarized");
        } else {
            info!(
                total,
                successful = records.len(),
                failed = total - records.len(),
                "Completed article processing"
            );
        }
        records
    }

    /// Fold over `headers` in order, keeping only the articles that made it
    /// through extraction and summarization.
    pub async fn process_headers(&self, headers: Vec<ArticleHeader>) -> Vec<ArticleRecord> {
        stream::iter(headers.into_iter().enumerate())
            .then(|(index, header)| async move {
                if index > 0 {
                    sleep(self.pause).await;
                }
                let title = header.title.clone();
                (index, title, self.process_header(header).await)
            })
            .fold(Vec::new(), |mut records, (index, title, outcome)| async move {
                match outcome {
                    Ok(record) => {
                        info!(index, %title, "Summarized article");
                        records.push(record);
                    }
                    Err(reason) => warn!(index, %title, %reason, "Skipping article"),
                }
                records
            })
            .await
    }

    /// Extract and summarize a single article.
    #[instrument(level = "info", skip_all, fields(link = %header.link))]
    pub async fn process_header(
        &self,
        header: ArticleHeader,
    ) -> std::result::Result<ArticleRecord, SkipReason> {
        let body = self
            .extractor
            .fetch_body(&header.link)
            .await
            .ok_or(SkipReason::NoBody)?;
        let summary = self
            .summarizer
            .summarize(&body.text)
            .await
            .ok_or(SkipReason::NoSummary)?;
        Ok(ArticleRecord::new(header, summary))
    }
}
