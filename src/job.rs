//! The daily digest job and its cron schedule.
//!
//! ```text
//! Scheduler (cron, default 08:00 UTC)
//!     │
//!     └─► DailyJob::run
//!             ├─► Pipeline::run            (empty → NoRecords, stop)
//!             ├─► write document + JSON
//!             └─► mail the document
//! ```

use crate::error::{NewsError, Result};
use crate::mail::MailTransport;
use crate::models::NewsDigest;
use crate::outputs::{document, json};
use crate::pipeline::Pipeline;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, instrument};

pub const MAIL_BODY: &str =
    "안녕하세요,\n\n오늘의 세계 뉴스 요약을 보내드립니다.\n자세한 내용은 첨부된 문서를 확인해 주세요.";

pub fn mail_subject(date: &str) -> String {
    format!("{date} 세계 뉴스 요약")
}

#[derive(Debug, Clone)]
pub struct JobSettings {
    pub recipient: String,
    pub output_dir: PathBuf,
    pub limit: usize,
    /// Title keywords; empty keeps every article.
    pub keywords: Vec<String>,
    pub articles_per_page: usize,
}

pub struct DailyJob {
    pipeline: Pipeline,
    mailer: Arc<dyn MailTransport>,
    settings: JobSettings,
}

impl DailyJob {
    pub fn new(pipeline: Pipeline, mailer: Arc<dyn MailTransport>, settings: JobSettings) -> Self {
        Self {
            pipeline,
            mailer,
            settings,
        }
    }

    /// Collect, render and mail one digest. Returns the document path.
    #[instrument(level = "info", skip_all, fields(limit = self.settings.limit))]
    pub async fn run(&self) -> Result<PathBuf> {
        let keywords = (!self.settings.keywords.is_empty()).then_some(self.settings.keywords.as_slice());
        let records = self.pipeline.run(self.settings.limit, keywords).await;
        if records.is_empty() {
            return Err(NewsError::NoRecords);
        }

        let digest = NewsDigest::new(records);
        let path = document::write_document(
            &digest,
            &self.settings.output_dir,
            self.settings.articles_per_page,
        )
        .await?;
        if let Err(e) = json::write_digest(&digest, &self.settings.output_dir).await {
            error!(error = %e, "Failed to write JSON digest");
        }

        self.mailer
            .send(
                &self.settings.recipient,
                &mail_subject(&digest.date),
                MAIL_BODY,
                &path,
            )
            .await?;
        Ok(path)
    }

    /// [`run`](Self::run), with the outcome logged instead of returned.
    pub async fn run_logged(&self) {
        let start = Instant::now();
        info!("Daily news digest job starting");
        match self.run().await {
            Ok(path) => info!(
                path = %path.display(),
                secs = start.elapsed().as_secs(),
                "Daily news digest job complete"
            ),
            Err(e) => error!(error = %e, "Daily news digest job failed"),
        }
    }
}

/// Register the job on `cron` (six fields, seconds first, UTC) and start
/// the scheduler.
pub async fn start_scheduler(job: Arc<DailyJob>, cron: &str) -> Result<JobScheduler> {
    let daily = Job::new_async(cron, move |_uuid, _lock| {
        let job = Arc::clone(&job);
        Box::pin(async move {
            job.run_logged().await;
        })
    })?;

    let scheduler = JobScheduler::new().await?;
    scheduler.add(daily).await?;
    scheduler.start().await?;
    info!(%cron, "Scheduled daily digest");
    Ok(scheduler)
}
