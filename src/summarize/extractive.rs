//! Sentence-selection summarizer.
//!
//! Keeps the leading sentences that look like article prose (reasonable
//! length, no credits or subscription prompts, no bullet glyphs), with the
//! number kept driven by how long the article is.

use super::{Summarizer, TERMINAL_PUNCTUATION, bound_length, render_sentences, split_sentences};
use crate::config::SummaryConfig;
use crate::models::Summary;
use crate::utils::char_len;
use async_trait::async_trait;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ExtractiveSummarizer {
    config: SummaryConfig,
}

impl ExtractiveSummarizer {
    pub fn new(config: SummaryConfig) -> Self {
        Self { config }
    }

    /// Number of sentences to keep for a text of `text_chars` characters.
    pub fn target_sentences(&self, text_chars: usize) -> usize {
        self.config
            .length_bands
            .iter()
            .find(|band| text_chars > band.above)
            .map_or(self.config.default_sentences, |band| band.sentences)
    }

    fn is_candidate(&self, sentence: &str) -> bool {
        let len = char_len(sentence);
        if len < self.config.min_sentence_chars || len > self.config.max_sentence_chars {
            return false;
        }
        if self.config.denylist.iter().any(|d| sentence.contains(d.as_str())) {
            return false;
        }
        let body = sentence.trim_end_matches(TERMINAL_PUNCTUATION).trim_end();
        if self.config.credit_suffixes.iter().any(|c| body.ends_with(c.as_str())) {
            return false;
        }
        !self
            .config
            .bullet_markers
            .iter()
            .any(|m| sentence.starts_with(m.as_str()))
    }

    pub fn summarize_text(&self, text: &str) -> Option<Summary> {
        let candidates = split_sentences(text)
            .into_iter()
            .filter(|s| self.is_candidate(s))
            .collect::<Vec<_>>();
        if candidates.is_empty() {
            warn!("No sentence survived filtering");
            return None;
        }

        let target = self.target_sentences(char_len(text));
        if candidates.len() < target && candidates.len() < self.config.min_sentences {
            warn!(candidates = candidates.len(), target, "Too few usable sentences");
            return None;
        }

        let mut take = target.min(candidates.len());
        let mut rendered = render_sentences(&candidates[..take]);
        if char_len(&rendered) < self.config.short_summary_chars && candidates.len() > take {
            take = (take + self.config.extra_sentences).min(candidates.len());
            rendered = render_sentences(&candidates[..take]);
            debug!(take, "Extended short summary");
        }

        Some(Summary {
            sentences: candidates[..take].iter().map(|s| s.to_string()).collect(),
            rendered: bound_length(rendered, self.config.max_chars),
        })
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    async fn summarize(&self, text: &str) -> Option<Summary> {
        self.summarize_text(text)
    }
}
