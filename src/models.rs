//! Data models for scraped headers, extracted bodies, summaries and the
//! final digest.
//!
//! - [`ArticleHeader`]: an article discovered on the listing page
//! - [`ArticleBody`]: normalized main text of one article
//! - [`Summary`]: a bounded-length summary derived from a body
//! - [`ArticleRecord`]: header joined with its summary, ready for display
//! - [`NewsDigest`]: the dated collection produced by one successful job

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Source label used when the listing does not name the publisher.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// An article discovered on a section listing page, before its body is fetched.
///
/// Headers are unique by `link` within one listing fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleHeader {
    /// Headline text, whitespace-normalized.
    pub title: String,
    /// Absolute article URL.
    pub link: String,
    /// Publisher label, or [`UNKNOWN_SOURCE`].
    pub source: String,
    /// Section label for the article.
    pub category: String,
    /// When the header was discovered.
    pub discovered_at: DateTime<Local>,
}

/// Normalized main text of an article.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleBody {
    pub link: String,
    /// Single-spaced, trimmed, at least the configured minimum length.
    pub text: String,
}

/// A summary and the sentences it was rendered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub sentences: Vec<String>,
    pub rendered: String,
}

/// The final unit of a run: a header joined with its summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub source: String,
    pub category: String,
    /// Discovery time formatted as `%Y-%m-%d %H:%M:%S`.
    pub timestamp: String,
}

impl ArticleRecord {
    pub fn new(header: ArticleHeader, summary: Summary) -> Self {
        Self {
            timestamp: header.discovered_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            title: header.title,
            summary: summary.rendered,
            link: header.link,
            source: header.source,
            category: header.category,
        }
    }
}

/// Records produced by one job, stamped with the run date.
#[derive(Debug, Serialize, Deserialize)]
pub struct NewsDigest {
    /// Run date in `YYYYMMDD` form.
    pub date: String,
    /// Local time the digest was assembled, `%Y-%m-%d %H:%M:%S`.
    pub generated_at: String,
    pub articles: Vec<ArticleRecord>,
}

impl NewsDigest {
    pub fn new(articles: Vec<ArticleRecord>) -> Self {
        let now = Local::now();
        Self {
            date: now.format("%Y%m%d").to_string(),
            generated_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            articles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn header() -> ArticleHeader {
        ArticleHeader {
            title: "반도체 수출 석 달 연속 증가".to_string(),
            link: "https://n.news.example.com/article/001/0000000001".to_string(),
            source: "연합뉴스".to_string(),
            category: "세계".to_string(),
            discovered_at: Local.with_ymd_and_hms(2025, 5, 6, 8, 0, 5).unwrap(),
        }
    }

    #[test]
    fn test_record_joins_header_and_summary() {
        let summary = Summary {
            sentences: vec!["첫 문장".to_string()],
            rendered: "첫 문장.".to_string(),
        };
        let record = ArticleRecord::new(header(), summary);

        assert_eq!(record.title, "반도체 수출 석 달 연속 증가");
        assert_eq!(record.summary, "첫 문장.");
        assert_eq!(record.source, "연합뉴스");
        assert_eq!(record.timestamp, "2025-05-06 08:00:05");
    }

    #[test]
    fn test_digest_serialization() {
        let digest = NewsDigest {
            date: "20250506".to_string(),
            generated_at: "2025-05-06 08:01:00".to_string(),
            articles: vec![],
        };

        let json = serde_json::to_string(&digest).unwrap();
        assert!(json.contains("20250506"));

        let back: NewsDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.articles.len(), 0);
    }

    #[test]
    fn test_digest_date_format() {
        let digest = NewsDigest::new(vec![]);
        assert_eq!(digest.date.len(), 8);
        assert!(digest.date.chars().all(|c| c.is_ascii_digit()));
    }
}
