//! Pipeline tunables: portal URLs, selector chains, thresholds and denylists.
//!
//! Every field has a default aimed at the portal's world-news section. An
//! optional YAML file overrides any subset of them:
//!
//! ```yaml
//! listing:
//!   url: https://news.naver.com/section/105
//!   default_category: IT/과학
//! pause_ms: 500
//! ```

use crate::error::{NewsError, Result};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub listing: ListingConfig,
    pub article: ArticleConfig,
    pub summary: SummaryConfig,
    /// Pause between articles, in milliseconds.
    pub pause_ms: u64,
    /// Records per page of the rendered document.
    pub articles_per_page: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            listing: ListingConfig::default(),
            article: ArticleConfig::default(),
            summary: SummaryConfig::default(),
            pause_ms: 1000,
            articles_per_page: 5,
        }
    }
}

/// One entry of the listing selector chain.
///
/// `item` selects the structural node of one article. The other selectors are
/// evaluated inside it; when `title` or `link` is absent the item node itself
/// is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelector {
    pub item: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub url: String,
    /// Prefix for relative article links.
    pub origin: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub min_title_chars: usize,
    pub default_category: String,
    pub selectors: Vec<ListingSelector>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            url: "https://news.naver.com/section/104".to_string(),
            origin: "https://news.naver.com".to_string(),
            timeout_secs: 10,
            user_agent: BROWSER_USER_AGENT.to_string(),
            min_title_chars: 5,
            default_category: "세계".to_string(),
            selectors: vec![
                ListingSelector {
                    item: "div.sa_text".to_string(),
                    title: Some("strong.sa_text_strong".to_string()),
                    link: Some("a.sa_text_title".to_string()),
                    source: Some("div.sa_text_press".to_string()),
                },
                ListingSelector {
                    item: "a.sa_text_title".to_string(),
                    title: Some("strong".to_string()),
                    link: None,
                    source: None,
                },
                ListingSelector {
                    item: "ul.type06_headline li".to_string(),
                    title: Some("dt:not(.photo) a".to_string()),
                    link: Some("dt a".to_string()),
                    source: Some("span.writing".to_string()),
                },
                ListingSelector {
                    item: "div.list_body li".to_string(),
                    title: Some("a".to_string()),
                    link: Some("a".to_string()),
                    source: Some("span.writing".to_string()),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleConfig {
    pub timeout_secs: u64,
    pub min_body_chars: usize,
    /// Content containers, highest priority first.
    pub containers: Vec<String>,
    /// Elements removed from the container before text extraction.
    pub noise: Vec<String>,
}

impl Default for ArticleConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            min_body_chars: 100,
            containers: [
                "article#dic_area",
                "#dic_area",
                "#newsct_article",
                "#articleBodyContents",
                "#articeBody",
                "#newsEndContents",
                "div._article_content",
            ]
            .map(String::from)
            .to_vec(),
            noise: [
                "script",
                "style",
                "noscript",
                ".byline",
                ".byline_s",
                ".media_end_head_journalist",
                ".reporter_area",
                ".journalistcard",
                ".copyright",
                ".c_text",
                ".link_news",
                ".related_article",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

/// A row of the sentence-count policy: texts longer than `above` characters
/// keep `sentences` sentences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthBand {
    pub above: usize,
    pub sentences: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub min_sentence_chars: usize,
    pub max_sentence_chars: usize,
    /// Sentences containing any of these are dropped.
    pub denylist: Vec<String>,
    /// Sentences ending in any of these, terminal punctuation aside, are
    /// dropped. Catches bare credit lines such as `홍길동 기자.`
    pub credit_suffixes: Vec<String>,
    /// Sentences starting with any of these are dropped.
    pub bullet_markers: Vec<String>,
    /// Checked in order; the first band whose threshold is exceeded wins.
    pub length_bands: Vec<LengthBand>,
    pub default_sentences: usize,
    /// Fewer surviving sentences than this rejects the text.
    pub min_sentences: usize,
    pub max_chars: usize,
    /// Summaries shorter than this are extended when more sentences exist.
    pub short_summary_chars: usize,
    pub extra_sentences: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            min_sentence_chars: 30,
            max_sentence_chars: 200,
            denylist: [
                "기자 =",
                "기자=",
                "특파원 =",
                "특파원=",
                "@",
                "Copyright",
                "copyright",
                "ⓒ",
                "©",
                "무단전재",
                "무단 전재",
                "재배포 금지",
                "재배포금지",
                "구독",
                "저작권",
            ]
            .map(String::from)
            .to_vec(),
            credit_suffixes: ["기자", "특파원"].map(String::from).to_vec(),
            bullet_markers: ["▶", "■", "※", "☞", "#", "@", "●", "◆", "◇", "□", "▲", "△", "★", "☆"]
                .map(String::from)
                .to_vec(),
            length_bands: vec![
                LengthBand { above: 2000, sentences: 5 },
                LengthBand { above: 1000, sentences: 4 },
            ],
            default_sentences: 3,
            min_sentences: 2,
            max_chars: 1000,
            short_summary_chars: 200,
            extra_sentences: 2,
        }
    }
}

impl PipelineConfig {
    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.listing.selectors.is_empty() {
            return Err(NewsError::Config("listing selector chain is empty".into()));
        }
        if self.article.containers.is_empty() {
            return Err(NewsError::Config("article container chain is empty".into()));
        }
        if self.summary.min_sentence_chars > self.summary.max_sentence_chars {
            return Err(NewsError::Config(
                "min_sentence_chars exceeds max_sentence_chars".into(),
            ));
        }
        if self.summary.max_chars < 4 {
            return Err(NewsError::Config("summary max_chars must be at least 4".into()));
        }
        if self.articles_per_page == 0 {
            return Err(NewsError::Config("articles_per_page must be positive".into()));
        }
        if !self
            .summary
            .length_bands
            .windows(2)
            .all(|w| w[0].above > w[1].above)
        {
            return Err(NewsError::Config(
                "length_bands must be ordered by descending threshold".into(),
            ));
        }
        Ok(())
    }
}

/// Compile a CSS selector, reporting the offending text on failure.
pub fn compile_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| NewsError::Config(format!("invalid selector {s:?}: {e:?}")))
}

/// Load the pipeline configuration, applying a YAML override file when given.
#[instrument(level = "info", skip_all)]
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let config: PipelineConfig = serde_yaml::from_str(&raw)?;
            info!(path = %path.display(), "Loaded pipeline configuration");
            config
        }
        None => PipelineConfig::default(),
    };
    config.validate()?;
    Ok(config)
}
