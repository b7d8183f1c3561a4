//! Article body extraction.
//!
//! Locates the main content container through a priority chain, detaches
//! bylines, copyright notices, related-link boxes and scripts from the parsed
//! tree, then flattens what is left into single-spaced text with control
//! characters removed.

use crate::config::{ArticleConfig, compile_selector};
use crate::error::Result;
use crate::http::PageFetcher;
use crate::models::ArticleBody;
use crate::utils::{char_len, clean_display_text};
use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub struct ContentExtractor {
    fetcher: Arc<dyn PageFetcher>,
    timeout: Duration,
    min_body_chars: usize,
    containers: Vec<Selector>,
    noise: Vec<Selector>,
}

impl ContentExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &ArticleConfig) -> Result<Self> {
        let compile_all = |list: &[String]| {
            list.iter()
                .map(|s| compile_selector(s))
                .collect::<Result<Vec<_>>>()
        };
        Ok(Self {
            fetcher,
            timeout: Duration::from_secs(config.timeout_secs),
            min_body_chars: config.min_body_chars,
            containers: compile_all(config.containers.as_slice())?,
            noise: compile_all(config.noise.as_slice())?,
        })
    }

    /// Fetch an article page and extract its body.
    ///
    /// # Arguments
    ///
    /// * `link` - Absolute article URL
    ///
    /// # Returns
    ///
    /// The normalized [`ArticleBody`], or `None` on a network failure, when no
    /// container matched, or when the body is below the minimum length.
    #[instrument(level = "info", skip_all, fields(%link))]
    pub async fn fetch_body(&self, link: &str) -> Option<ArticleBody> {
        let html = match self.fetcher.fetch(link, self.timeout).await {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, "Article fetch failed");
                return None;
            }
        };

        let text = self.extract_text(&html)?;
        info!(chars = char_len(&text), "Extracted article body");
        Some(ArticleBody {
            link: link.to_string(),
            text,
        })
    }

    /// Extract normalized body text from article markup.
    pub fn extract_text(&self, html: &str) -> Option<String> {
        let mut document = Html::parse_document(html);

        let Some(container_id) = self.containers.iter().find_map(|sel| {
            document
                .select(sel)
                .find(|el| el.text().any(|t| !t.trim().is_empty()))
                .map(|el| el.id())
        }) else {
            warn!("No content container matched");
            return None;
        };

        let noise_ids = {
            let container = ElementRef::wrap(document.tree.get(container_id)?)?;
            self.noise
                .iter()
                .flat_map(|sel| container.select(sel).map(|el| el.id()))
                .collect::<Vec<_>>()
        };
        debug!(removed = noise_ids.len(), "Detaching noise elements");
        for id in noise_ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }

        let container = ElementRef::wrap(document.tree.get(container_id)?)?;
        let text = clean_display_text(&container.text().join(" "));
        let chars = char_len(&text);
        if chars < self.min_body_chars {
            warn!(chars, min = self.min_body_chars, "Article body too short");
            return None;
        }
        Some(text)
    }
}
