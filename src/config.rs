//! Configuration types.
//!
//! Run inputs come from the command line (each flag also reads an env var);
//! service settings and secrets come from the environment.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use secrecy::SecretString;

use crate::channels::EmailConfig;
use crate::error::ConfigError;
use crate::llm::{DEFAULT_MAX_ATTEMPTS, DEFAULT_MODEL, LlmBackend, LlmConfig};
use crate::registry::{DEFAULT_BASE_URL, DEFAULT_PUBLISHER, DateRange, Period, SearchFilter};
use crate::summarizer::SummarizerConfig;

/// Reporting period selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PeriodArg {
    LastWeek,
    CurrentMonth,
    LastMonth,
}

/// Command-line arguments for one digest run.
#[derive(Debug, Parser)]
#[command(name = "law-digest", version, about = "Email a digest of newly effective legal acts")]
pub struct RunArgs {
    /// Keyword filter; repeat the flag or separate with commas.
    #[arg(short, long = "keyword", env = "LAW_DIGEST_KEYWORDS", value_delimiter = ',')]
    pub keywords: Vec<String>,

    /// Period to report on, ending today.
    #[arg(long, value_enum, env = "LAW_DIGEST_PERIOD", default_value_t = PeriodArg::LastWeek)]
    pub period: PeriodArg,

    /// Start of an explicit date range (YYYY-MM-DD). Overrides --period.
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    /// End of an explicit date range (YYYY-MM-DD).
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,

    /// Publication year to search (defaults to the current year).
    #[arg(long)]
    pub year: Option<i32>,

    /// Log the digest instead of emailing it.
    #[arg(long, env = "LAW_DIGEST_DRY_RUN")]
    pub dry_run: bool,

    /// Also write logs to a timestamped file in this directory.
    #[arg(long, env = "LAW_DIGEST_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl RunArgs {
    /// The period this run covers.
    pub fn period(&self) -> Result<Period, ConfigError> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => DateRange::new(from, to)
                .map(Period::Custom)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "--from/--to".into(),
                    message: format!("{from} is after {to}"),
                }),
            _ => Ok(match self.period {
                PeriodArg::LastWeek => Period::LastWeek,
                PeriodArg::CurrentMonth => Period::CurrentMonth,
                PeriodArg::LastMonth => Period::LastMonth,
            }),
        }
    }

    /// The registry filter for this run, as of `today`.
    pub fn filter(&self, today: NaiveDate) -> Result<SearchFilter, ConfigError> {
        let mut filter =
            SearchFilter::for_period(self.period()?, today).with_keywords(self.keywords.clone());
        if let Some(year) = self.year {
            filter = filter.with_year(year);
        }
        Ok(filter)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Directory for a per-run log file; stderr only when `None`.
    pub dir: Option<PathBuf>,
}

/// Service configuration for a digest run.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub registry_url: String,
    pub publisher: String,
    pub llm: LlmConfig,
    pub summarizer: SummarizerConfig,
    /// `None` in dry-run mode.
    pub email: Option<EmailConfig>,
}

impl DigestConfig {
    /// Build config from environment variables.
    pub fn from_env(dry_run: bool) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), dry_run)
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F, dry_run: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend: LlmBackend = match lookup("LAW_DIGEST_LLM_BACKEND") {
            Some(raw) => raw.parse()?,
            None => LlmBackend::Anthropic,
        };

        let key_var = match backend {
            LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
            LlmBackend::OpenAi => "OPENAI_API_KEY",
        };
        let api_key = lookup(key_var)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(key_var.to_string()))?;

        let max_attempts = parse_or(&lookup, "LAW_DIGEST_LLM_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        let mut summarizer = SummarizerConfig::default();
        summarizer.max_chars = parse_or(&lookup, "LAW_DIGEST_SUMMARY_CHARS", summarizer.max_chars)?;

        let email = if dry_run {
            None
        } else {
            Some(EmailConfig::from_lookup(&lookup)?.ok_or_else(|| {
                ConfigError::MissingRequired {
                    key: "SMTP_SERVER".into(),
                    hint: "Set SMTP_* variables or pass --dry-run.".into(),
                }
            })?)
        };

        Ok(Self {
            registry_url: lookup("LAW_DIGEST_REGISTRY_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            publisher: lookup("LAW_DIGEST_PUBLISHER")
                .unwrap_or_else(|| DEFAULT_PUBLISHER.to_string()),
            llm: LlmConfig {
                backend,
                api_key: SecretString::from(api_key),
                model: lookup("LAW_DIGEST_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                max_attempts,
            },
            summarizer,
            email,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{raw}' is not a valid number"),
        }),
        None => Ok(default),
    }
}
