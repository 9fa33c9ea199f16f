use http::StatusCode;

pub use anyhow::Result;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("missing required configuration: {0}")]
  Missing(&'static str),

  #[error("invalid value for {name}: {reason}")]
  Invalid { name: &'static str, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
  #[error("HTTP request failed")]
  Http(#[from] reqwest::Error),

  #[error("HTTP status error {0} (url: {1})")]
  Status(reqwest::StatusCode, url::Url),

  #[error("failed to parse feed")]
  Feed(#[from] rss::Error),

  #[error("feed item is missing <{0}>")]
  MissingField(&'static str),

  #[error("unparsable pubDate {value:?}")]
  PubDate {
    value: String,
    #[source]
    source: chrono::ParseError,
  },

  #[cfg(test)]
  #[error("failed to read fixture {0}")]
  Fixture(String),
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

#[derive(Debug, thiserror::Error)]
pub enum SkillError {
  #[error("slot {slot} {reason}")]
  Slot { slot: &'static str, reason: String },

  #[error("no handler for intent {0}")]
  UnhandledIntent(String),
}

// Marker type for rejecting requests addressed to another skill
#[derive(Debug, thiserror::Error)]
#[error("application id {0:?} does not match the configured skill id")]
pub struct ForeignApplication(pub Option<String>);

pub fn into_http(e: anyhow::Error) -> (StatusCode, String) {
  for cause in e.chain() {
    if cause.downcast_ref::<ForeignApplication>().is_some() {
      return (StatusCode::FORBIDDEN, format!("{e}"));
    }
  }

  (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:?}"))
}
