//! Error type shared by the fetch, summarize, render and mail stages.
//!
//! Core pipeline stages never let these escape past their own boundary: the
//! listing fetch turns them into an empty batch and per-article stages turn
//! them into a skipped article. They surface to the caller only from the
//! daily job and from start-up code.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("config file error: {0}")]
    ConfigFile(#[from] serde_yaml::Error),

    #[error("model error: {0}")]
    Model(String),

    #[error("mail error: {0}")]
    Mail(String),

    #[error("scheduler error: {0}")]
    Schedule(#[from] tokio_cron_scheduler::JobSchedulerError),

    #[error("no article could be summarized")]
    NoRecords,
}

impl From<lettre::error::Error> for NewsError {
    fn from(e: lettre::error::Error) -> Self {
        NewsError::Mail(e.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for NewsError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        NewsError::Mail(e.to_string())
    }
}

impl From<lettre::address::AddressError> for NewsError {
    fn from(e: lettre::address::AddressError) -> Self {
        NewsError::Mail(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NewsError>;
