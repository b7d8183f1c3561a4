//! Section listing scraper.
//!
//! Turns one section page of the portal into an ordered, deduplicated list of
//! [`ArticleHeader`]s. The page is matched against a chain of layouts; the
//! first layout whose item selector finds any node is the only one used.

use crate::config::{ListingConfig, compile_selector};
use crate::error::Result;
use crate::http::PageFetcher;
use crate::models::{ArticleHeader, UNKNOWN_SOURCE};
use crate::utils::{char_len, clean_display_text};
use chrono::{DateTime, Local};
use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// A compiled entry of the listing selector chain.
#[derive(Debug)]
struct ListingLayout {
    item: Selector,
    title: Option<Selector>,
    link: Option<Selector>,
    source: Option<Selector>,
}

pub struct ListingFetcher {
    fetcher: Arc<dyn PageFetcher>,
    url: String,
    origin: Url,
    timeout: Duration,
    min_title_chars: usize,
    default_category: String,
    layouts: Vec<ListingLayout>,
}

impl ListingFetcher {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &ListingConfig) -> Result<Self> {
        let optional = |s: &Option<String>| s.as_deref().map(compile_selector).transpose();
        let layouts = config
            .selectors
            .iter()
            .map(|sel| {
                Ok(ListingLayout {
                    item: compile_selector(&sel.item)?,
                    title: optional(&sel.title)?,
                    link: optional(&sel.link)?,
                    source: optional(&sel.source)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            fetcher,
            url: config.url.clone(),
            origin: Url::parse(&config.origin)?,
            timeout: Duration::from_secs(config.timeout_secs),
            min_title_chars: config.min_title_chars,
            default_category: config.default_category.clone(),
            layouts,
        })
    }

    /// Fetch the section page and return at most `limit` unique headers.
    ///
    /// Network and HTTP failures are logged at error level and yield an empty
    /// list; they never propagate.
    ///
    /// # Arguments
    ///
    /// * `limit` - Maximum number of headers; `0` returns an empty list
    ///   without a request
    /// * `keyword_filter` - When given, keeps only headers whose title
    ///   contains one of the keywords (case-sensitive), applied after `limit`
    ///
    /// # Returns
    ///
    /// Headers in document order, unique by link.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let listing = ListingFetcher::new(fetcher, &config.listing)?;
    /// let headers = listing.fetch_headers(10, Some(&["반도체".to_string()])).await;
    /// ```
    #[instrument(level = "info", skip_all, fields(url = %self.url, limit = limit))]
    pub async fn fetch_headers(
        &self,
        limit: usize,
        keyword_filter: Option<&[String]>,
    ) -> Vec<ArticleHeader> {
        if limit == 0 {
            return Vec::new();
        }

        let html = match self.fetcher.fetch(&self.url, self.timeout).await {
            Ok(html) => html,
            Err(e) => {
                error!(error = %e, "Listing fetch failed");
                return Vec::new();
            }
        };

        let headers = self.parse_headers(&html, limit, Local::now());
        let headers = match keyword_filter {
            Some(keywords) => filter_by_keywords(headers, keywords),
            None => headers,
        };

        info!(count = headers.len(), "Indexed article headers");
        debug!(links = ?headers.iter().map(|h| &h.link).collect::<Vec<_>>(), "Header links");
        headers
    }

    /// Parse listing markup into headers, in document order.
    pub fn parse_headers(
        &self,
        html: &str,
        limit: usize,
        discovered_at: DateTime<Local>,
    ) -> Vec<ArticleHeader> {
        let document = Html::parse_document(html);

        let Some((position, layout, nodes)) =
            self.layouts.iter().enumerate().find_map(|(i, layout)| {
                let nodes = document.select(&layout.item).collect::<Vec<_>>();
                (!nodes.is_empty()).then_some((i, layout, nodes))
            })
        else {
            warn!(url = %self.url, "No listing layout matched the page");
            return Vec::new();
        };
        debug!(layout = position, nodes = nodes.len(), "Listing layout matched");

        let mut seen = HashSet::new();
        let mut headers = Vec::new();
        for node in nodes {
            if headers.len() >= limit {
                break;
            }
            let Some(header) = self.header_from_node(node, layout, discovered_at) else {
                continue;
            };
            if !seen.insert(header.link.clone()) {
                debug!(link = %header.link, "Skipping duplicate link");
                continue;
            }
            headers.push(header);
        }
        headers
    }

    fn header_from_node(
        &self,
        node: ElementRef<'_>,
        layout: &ListingLayout,
        discovered_at: DateTime<Local>,
    ) -> Option<ArticleHeader> {
        let raw_title = match &layout.title {
            Some(sel) => node.select(sel).map(|el| el.text().join(" ")).join(" "),
            None => node.text().join(" "),
        };
        let title = clean_display_text(&raw_title);
        if char_len(&title) < self.min_title_chars {
            debug!(%title, "Rejecting short or empty title");
            return None;
        }

        let link_node = match &layout.link {
            Some(sel) => node.select(sel).next()?,
            None => node,
        };
        let href = link_node.value().attr("href")?.trim();
        let link = self.resolve_link(href)?;

        let source = layout
            .source
            .as_ref()
            .and_then(|sel| node.select(sel).next())
            .map(|el| clean_display_text(&el.text().join(" ")))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

        Some(ArticleHeader {
            title,
            link,
            source,
            category: self.default_category.clone(),
            discovered_at,
        })
    }

    /// Resolve `href` against the site origin, keeping only web links.
    fn resolve_link(&self, href: &str) -> Option<String> {
        if href.is_empty() || href.starts_with('#') {
            return None;
        }
        let resolved = self.origin.join(href).ok()?;
        matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
    }
}

/// Keep headers whose title contains any of `keywords`. An empty keyword set
/// keeps everything.
pub fn filter_by_keywords(headers: Vec<ArticleHeader>, keywords: &[String]) -> Vec<ArticleHeader> {
    if keywords.is_empty() {
        return headers;
    }
    headers
        .into_iter()
        .filter(|h| keywords.iter().any(|k| h.title.contains(k.as_str())))
        .collect()
}
