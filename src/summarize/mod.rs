//! Article summarization.
//!
//! Two interchangeable strategies implement [`Summarizer`]:
//!
//! - [`extractive::ExtractiveSummarizer`]: picks original sentences by
//!   length and content heuristics (default, no external service)
//! - [`model::ModelSummarizer`]: asks a chat-completion model for a summary
//!   bounded by the input's word count
//!
//! Both return `None` instead of an error so the pipeline can drop the
//! article and move on.

pub mod extractive;
pub mod model;

use crate::models::Summary;
use crate::utils::{char_len, truncate_chars};
use async_trait::async_trait;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

/// Appended to summaries cut at the length limit.
pub const ELLIPSIS: &str = "...";

const TERMINAL_PUNCTUATION: &[char] = &['.', '!', '?', '。'];

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?。]+\s+").unwrap());
static PERIOD_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").unwrap());

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize normalized article text, or `None` if it carries too little
    /// signal or the strategy failed.
    async fn summarize(&self, text: &str) -> Option<Summary>;
}

/// Split text at sentence-ending punctuation followed by whitespace.
/// Each sentence keeps its punctuation and is trimmed.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        let sentence = text[start..m.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = m.end();
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

/// Join sentences as `a. b. c.` with every run of periods collapsed to one.
pub fn render_sentences<S: AsRef<str>>(sentences: &[S]) -> String {
    let joined = sentences
        .iter()
        .map(|s| s.as_ref().trim().trim_end_matches(TERMINAL_PUNCTUATION))
        .join(". ");
    PERIOD_RUN.replace_all(&format!("{joined}."), ".").into_owned()
}

/// Cap `rendered` at `max_chars`, replacing the tail with [`ELLIPSIS`].
pub fn bound_length(rendered: String, max_chars: usize) -> String {
    if char_len(&rendered) <= max_chars {
        return rendered;
    }
    let keep = max_chars.saturating_sub(char_len(ELLIPSIS));
    format!("{}{}", truncate_chars(&rendered, keep), ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let text = "첫 문장입니다. 두 번째인가요? 세 번째!  네 번째는 끝에 마침표가 없다";
        assert_eq!(
            split_sentences(text),
            vec!["첫 문장입니다.", "두 번째인가요?", "세 번째!", "네 번째는 끝에 마침표가 없다"]
        );
    }

    #[test]
    fn test_split_keeps_decimals_together() {
        let text = "성장률은 3.5%로 집계됐다. 물가는 2.1% 올랐다.";
        assert_eq!(
            split_sentences(text),
            vec!["성장률은 3.5%로 집계됐다.", "물가는 2.1% 올랐다."]
        );
    }

    #[test]
    fn test_render_normalizes_terminal_punctuation() {
        let rendered = render_sentences(&["Markets rallied!", "Will it last?", "Analysts doubt it..."]);
        assert_eq!(rendered, "Markets rallied. Will it last. Analysts doubt it.");
    }

    #[test]
    fn test_render_collapses_inner_period_runs() {
        assert_eq!(render_sentences(&["Wait.. what"]), "Wait. what.");
    }

    #[test]
    fn test_bound_length_truncates_to_exact_limit() {
        let long = "가".repeat(1200);
        let bounded = bound_length(long, 1000);
        assert_eq!(char_len(&bounded), 1000);
        assert!(bounded.ends_with(ELLIPSIS));
        assert_eq!(bound_length("short.".to_string(), 1000), "short.");
    }
}
