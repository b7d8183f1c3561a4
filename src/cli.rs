//! Command-line interface definitions.
//!
//! Every option can also come from an environment variable (a `.env` file in
//! the working directory is loaded first). The SMTP credentials are required;
//! start-up fails without them.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummarizerKind {
    /// Pick original sentences; no external service needed
    Extractive,
    /// Ask an OpenAI-compatible chat model
    Model,
}

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Run now, then every day at 08:00 UTC
/// EMAIL_USERNAME=me@gmail.com EMAIL_PASSWORD=app-password daily_news_digest
///
/// # One run, only articles mentioning a keyword
/// daily_news_digest --once -k 반도체 -o /tmp/digests
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// SMTP account that sends the digest
    #[arg(long, env = "EMAIL_USERNAME")]
    pub email_username: String,

    /// SMTP password (an app password for Gmail)
    #[arg(long, env = "EMAIL_PASSWORD", hide_env_values = true)]
    pub email_password: String,

    /// Digest recipient; defaults to the sending account
    #[arg(long, env = "EMAIL_RECIPIENT")]
    pub recipient: Option<String>,

    /// SMTP relay host
    #[arg(long, env = "SMTP_HOST", default_value = "smtp.gmail.com")]
    pub smtp_host: String,

    /// Directory for the rendered document and JSON copy
    #[arg(short, long, env = "NEWS_OUTPUT_DIR", default_value = "./digests")]
    pub output_dir: PathBuf,

    /// Optional YAML file overriding pipeline settings
    #[arg(short, long, env = "NEWS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Maximum number of articles per digest
    #[arg(short, long, env = "NEWS_LIMIT", default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: u32,

    /// Keep only articles whose title contains this keyword (repeatable;
    /// comma-separated in the environment)
    #[arg(short = 'k', long = "keyword", env = "NEWS_KEYWORDS", value_delimiter = ',')]
    pub keywords: Vec<String>,

    /// Cron expression (seconds first, UTC) for scheduled runs
    #[arg(long, env = "NEWS_SCHEDULE", default_value = "0 0 8 * * *")]
    pub schedule: String,

    /// Run a single digest and exit
    #[arg(long, env = "NEWS_ONCE")]
    pub once: bool,

    /// Summarization strategy
    #[arg(long, env = "NEWS_SUMMARIZER", value_enum, default_value_t = SummarizerKind::Extractive)]
    pub summarizer: SummarizerKind,

    /// Base URL of the OpenAI-compatible API (model summarizer only)
    #[arg(long, env = "MODEL_ENDPOINT", default_value = "http://localhost:11434/v1")]
    pub model_endpoint: String,

    /// Model name (model summarizer only)
    #[arg(long, env = "MODEL_NAME", default_value = "llama3.1")]
    pub model_name: String,

    /// API key for the model endpoint
    #[arg(long, env = "MODEL_API_KEY", hide_env_values = true)]
    pub model_api_key: Option<String>,
}

impl Cli {
    pub fn recipient(&self) -> &str {
        self.recipient.as_deref().unwrap_or(&self.email_username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::sync::{Mutex, MutexGuard};

    const CREDS: [&str; 5] = [
        "daily_news_digest",
        "--email-username",
        "me@example.com",
        "--email-password",
        "secret",
    ];

    /// Serializes tests that parse the CLI, since one of them edits the
    /// process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn test_cli_defaults() {
        let _guard = env_lock();
        let cli = Cli::parse_from(CREDS);

        assert_eq!(cli.limit, 10);
        assert_eq!(cli.schedule, "0 0 8 * * *");
        assert_eq!(cli.summarizer, SummarizerKind::Extractive);
        assert!(!cli.once);
        assert!(cli.keywords.is_empty());
    }

    #[test]
    fn test_recipient_defaults_to_sender() {
        let _guard = env_lock();
        let cli = Cli::parse_from(CREDS.iter().copied().chain(["--recipient", "you@example.com"]));
        assert_eq!(cli.recipient(), "you@example.com");

        let cli = Cli::parse_from(CREDS);
        if std::env::var("EMAIL_RECIPIENT").is_err() {
            assert_eq!(cli.recipient(), "me@example.com");
        }
    }

    #[test]
    fn test_cli_short_flags() {
        let _guard = env_lock();
        let cli = Cli::parse_from(
            CREDS
                .iter()
                .copied()
                .chain(["-l", "3", "-k", "미국", "-k", "중국", "-o", "/tmp/out", "--once"]),
        );

        assert_eq!(cli.limit, 3);
        assert_eq!(cli.keywords, vec!["미국", "중국"]);
        assert_eq!(cli.output_dir, PathBuf::from("/tmp/out"));
        assert!(cli.once);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let _guard = env_lock();
        let result = Cli::try_parse_from(CREDS.iter().copied().chain(["--limit", "0"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_model_summarizer_flag() {
        let _guard = env_lock();
        let cli = Cli::parse_from(CREDS.iter().copied().chain(["--summarizer", "model"]));
        assert_eq!(cli.summarizer, SummarizerKind::Model);
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let _guard = env_lock();
        if std::env::var("EMAIL_USERNAME").is_err() && std::env::var("EMAIL_PASSWORD").is_err() {
            assert!(Cli::try_parse_from(["daily_news_digest"]).is_err());
        }
    }

    #[test]
    fn test_every_option_has_env_fallback() {
        let command = Cli::command();
        let missing = command
            .get_arguments()
            .filter(|arg| !matches!(arg.get_id().as_str(), "help" | "version"))
            .filter(|arg| arg.get_env().is_none())
            .map(|arg| arg.get_id().to_string())
            .collect::<Vec<_>>();
        assert!(missing.is_empty(), "options without env fallback: {missing:?}");
    }

    #[test]
    fn test_options_read_from_environment() {
        let _guard = env_lock();
        let vars = [
            ("NEWS_LIMIT", "4"),
            ("NEWS_KEYWORDS", "미국,중국"),
            ("NEWS_ONCE", "true"),
            ("NEWS_SUMMARIZER", "model"),
            ("NEWS_CONFIG", "/etc/news/pipeline.yaml"),
        ];
        // SAFETY: every test that reads these variables holds `ENV_LOCK`.
        unsafe {
            for (key, value) in vars {
                std::env::set_var(key, value);
            }
        }
        let cli = Cli::try_parse_from(CREDS);
        unsafe {
            for (key, _) in vars {
                std::env::remove_var(key);
            }
        }

        let cli = cli.unwrap();
        assert_eq!(cli.limit, 4);
        assert_eq!(cli.keywords, vec!["미국", "중국"]);
        assert!(cli.once);
        assert_eq!(cli.summarizer, SummarizerKind::Model);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/news/pipeline.yaml")));
    }
}
