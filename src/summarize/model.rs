//! Model-backed summarization over an OpenAI-compatible chat API.
//!
//! # Architecture
//!
//! - [`AskAsync`]: one prompt in, one completion out
//! - [`ChatCompletionClient`]: `POST {endpoint}/chat/completions` via `reqwest`
//! - [`RetryAsk`]: decorator adding exponential backoff to any [`AskAsync`]
//! - [`ModelSummarizer`]: derives length bounds from the article and asks
//!
//! # Retry Strategy
//!
//! - Maximum 5 retry attempts
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use super::{Summarizer, bound_length, render_sentences, split_sentences};
use crate::error::{NewsError, Result};
use crate::models::Summary;
use crate::utils::{clean_display_text, truncate_for_log};
use async_trait::async_trait;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Inputs with fewer words are returned unchanged.
pub const SHORT_TEXT_WORDS: usize = 30;
const MAX_WORDS_FLOOR: usize = 30;
const MIN_WORDS_FLOOR: usize = 10;

/// A prompt to send to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub max_tokens: usize,
}

/// Trait for async LLM interaction.
#[async_trait]
pub trait AskAsync: Send + Sync {
    async fn ask(&self, prompt: &Prompt) -> Result<String>;
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`] implementation.
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryAsk<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    /// Wrap `inner` with retry logic.
    ///
    /// # Arguments
    ///
    /// * `inner` - The client to retry
    /// * `max_retries` - Retries after the first failure before giving up
    /// * `base_delay` - Delay before the first retry; doubles each attempt
    ///
    /// The delay is capped at 30 seconds.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = ChatCompletionClient::new(endpoint, model, None, timeout)?;
    /// let retrying = RetryAsk::new(client, 5, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

#[async_trait]
impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync,
{
    #[instrument(level = "info", skip_all)]
    async fn ask(&self, prompt: &Prompt) -> Result<String> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.ask(prompt).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self
                        .base_delay
                        .saturating_mul(1 << (attempt - 1).min(16))
                        .min(self.max_delay);
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Client for an OpenAI-compatible `chat/completions` endpoint.
#[derive(Clone)]
pub struct ChatCompletionClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl fmt::Debug for ChatCompletionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionClient {
    pub fn new(endpoint: &str, model: &str, api_key: Option<String>, timeout: StdDuration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl AskAsync for ChatCompletionClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, prompt: &Prompt) -> Result<String> {
        let t0 = Instant::now();
        let url = format!("{}/chat/completions", self.endpoint);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: &prompt.system },
                ChatMessage { role: "user", content: &prompt.user },
            ],
            max_tokens: prompt.max_tokens,
            temperature: 0.0,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(elapsed_ms = t0.elapsed().as_millis() as u64, %status, "API call failed");
            return Err(NewsError::HttpStatus { status: status.as_u16(), url });
        }

        let parsed: ChatResponse = serde_json::from_str(&response.text().await?)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| NewsError::Model("response carried no completion".into()))?;
        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "API call succeeded");
        Ok(content)
    }
}

/// Word-count bounds `(min, max)` for a summary of a `words`-word article:
/// 20% and 30% of the input, floored at 10 and 30 words.
pub fn length_bounds(words: usize) -> (usize, usize) {
    let max = MAX_WORDS_FLOOR.max(words * 3 / 10);
    let min = MIN_WORDS_FLOOR.max(words / 5).min(max);
    (min, max)
}

/// [`Summarizer`] that delegates to a language model.
#[derive(Debug)]
pub struct ModelSummarizer<C> {
    client: C,
    max_chars: usize,
}

impl<C: AskAsync> ModelSummarizer<C> {
    pub fn new(client: C, max_chars: usize) -> Self {
        Self { client, max_chars }
    }

    fn prompt(text: &str, words: usize) -> Prompt {
        let (min, max) = length_bounds(words);
        Prompt {
            system: format!(
                "You summarize news articles. Reply with the summary only, in the article's \
                 language, using between {min} and {max} words."
            ),
            user: text.to_string(),
            max_tokens: max * 3,
        }
    }
}

#[async_trait]
impl<C: AskAsync> Summarizer for ModelSummarizer<C> {
    #[instrument(level = "info", skip_all)]
    async fn summarize(&self, text: &str) -> Option<Summary> {
        let words = text.split_whitespace().count();
        if words < SHORT_TEXT_WORDS {
            info!(words, "Text too short to summarize; returning as-is");
            let text = clean_display_text(text);
            if text.is_empty() {
                return None;
            }
            return Some(Summary {
                rendered: bound_length(text.clone(), self.max_chars),
                sentences: vec![text],
            });
        }

        let reply = match self.client.ask(&Self::prompt(text, words)).await {
            Ok(reply) => clean_display_text(&reply),
            Err(e) => {
                warn!(error = %e, "Model summarization failed");
                return None;
            }
        };
        let sentences = split_sentences(&reply)
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        if sentences.is_empty() {
            warn!(reply = %truncate_for_log(&reply, 200), "Model returned an empty summary");
            return None;
        }

        Some(Summary {
            rendered: bound_length(render_sentences(&sentences), self.max_chars),
            sentences,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays scripted replies in order and records prompts.
    #[derive(Default)]
    struct ScriptedModel {
        replies: Mutex<Vec<Result<String>>>,
        prompts: Mutex<Vec<Prompt>>,
    }

    impl ScriptedModel {
        fn new(mut replies: Vec<Result<String>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AskAsync for ScriptedModel {
        async fn ask(&self, prompt: &Prompt) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.clone());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(NewsError::Model("script exhausted".into())))
        }
    }

    #[async_trait]
    impl<'a> AskAsync for &'a ScriptedModel {
        async fn ask(&self, prompt: &Prompt) -> Result<String> {
            (**self).ask(prompt).await
        }
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(length_bounds(30), (10, 30));
        assert_eq!(length_bounds(100), (20, 30));
        assert_eq!(length_bounds(500), (100, 150));
    }

    #[tokio::test]
    async fn test_short_text_returned_unchanged() {
        let model = ScriptedModel::new(vec![]);
        let summarizer = ModelSummarizer::new(&model, 1000);

        let summary = summarizer.summarize(&words(29)).await.unwrap();
        assert_eq!(summary.rendered, words(29));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_model_reply_rendered() {
        let model = ScriptedModel::new(vec![Ok("Rates held steady!\nMarkets shrugged.".into())]);
        let summarizer = ModelSummarizer::new(&model, 1000);

        let summary = summarizer.summarize(&words(200)).await.unwrap();
        assert_eq!(summary.sentences.len(), 2);
        assert_eq!(summary.rendered, "Rates held steady. Markets shrugged.");

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].system.contains("between 40 and 60 words"));
        assert_eq!(prompts[0].max_tokens, 180);
    }

    #[tokio::test]
    async fn test_model_failure_is_absent() {
        let model = ScriptedModel::new(vec![Err(NewsError::Model("boom".into()))]);
        let summarizer = ModelSummarizer::new(&model, 1000);
        assert!(summarizer.summarize(&words(200)).await.is_none());
    }

    #[tokio::test]
    async fn test_blank_reply_is_absent() {
        let model = ScriptedModel::new(vec![Ok("  \n ".into())]);
        let summarizer = ModelSummarizer::new(&model, 1000);
        assert!(summarizer.summarize(&words(200)).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_after_failures() {
        let model = ScriptedModel::new(vec![
            Err(NewsError::Model("503".into())),
            Err(NewsError::Model("503".into())),
            Ok("done".into()),
        ]);
        let retry = RetryAsk::new(&model, 5, StdDuration::from_secs(1));
        let prompt = ModelSummarizer::<&ScriptedModel>::prompt("text", 1);

        assert_eq!(retry.ask(&prompt).await.unwrap(), "done");
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up() {
        struct AlwaysFails(AtomicUsize);

        #[async_trait]
        impl AskAsync for AlwaysFails {
            async fn ask(&self, _prompt: &Prompt) -> Result<String> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Err(NewsError::Model("down".into()))
            }
        }

        let retry = RetryAsk::new(AlwaysFails(AtomicUsize::new(0)), 2, StdDuration::from_secs(1));
        let prompt = ModelSummarizer::<AlwaysFails>::prompt("text", 1);

        assert!(retry.ask(&prompt).await.is_err());
        assert_eq!(retry.inner.0.load(Ordering::SeqCst), 3);
    }
}
