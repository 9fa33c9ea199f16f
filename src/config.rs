use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use url::Url;

use crate::client::ClientConfig;
use crate::error::{ConfigError, Result};
use crate::feed::FeedFetcher;
use crate::skill::Dispatcher;

/// Settings shared by every subcommand. Read once at startup.
#[derive(Args, Clone, Debug)]
pub struct SkillConfig {
  /// URL of the updates RSS feed
  #[clap(long, env = "UpdatesURL")]
  pub feed_url: Url,
  /// Skill identifier requests must be addressed to
  #[clap(long, env = "SKILL_ID")]
  pub skill_id: String,
  /// Service name used in spoken responses
  #[clap(long, env = "SERVICE_NAME", default_value = "Azure")]
  pub service_name: String,
  /// Timeout for fetching the feed (Examples: "10s", "1m")
  #[clap(
    long,
    env = "FEED_TIMEOUT",
    default_value = "10s",
    value_parser = parse_duration
  )]
  pub timeout: Duration,
  /// User agent sent when fetching the feed
  #[clap(long, env = "FEED_USER_AGENT")]
  pub user_agent: Option<String>,
}

fn parse_duration(s: &str) -> Result<Duration, String> {
  duration_str::parse(s).map_err(|e| e.to_string())
}

impl SkillConfig {
  pub fn validate(&self) -> Result<(), ConfigError> {
    if !matches!(self.feed_url.scheme(), "http" | "https") {
      return Err(ConfigError::Invalid {
        name: "UpdatesURL",
        reason: format!("unsupported scheme {}", self.feed_url.scheme()),
      });
    }

    if self.skill_id.trim().is_empty() {
      return Err(ConfigError::Missing("SKILL_ID"));
    }

    if self.service_name.trim().is_empty() {
      return Err(ConfigError::Missing("SERVICE_NAME"));
    }

    if self.timeout.is_zero() {
      return Err(ConfigError::Invalid {
        name: "FEED_TIMEOUT",
        reason: "must be positive".into(),
      });
    }

    Ok(())
  }

  fn client_config(&self) -> ClientConfig {
    ClientConfig {
      user_agent: self.user_agent.clone(),
      timeout: self.timeout,
    }
  }

  pub fn build_dispatcher(&self) -> Result<Dispatcher> {
    let client = self.client_config().build()?;
    let fetcher = FeedFetcher::new(self.feed_url.clone(), client);
    Ok(Dispatcher::new(Arc::new(fetcher), self.service_name.trim()))
  }
}
