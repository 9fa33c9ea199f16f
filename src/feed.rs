use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};
use url::Url;

use crate::client::Client;
use crate::error::{FetchError, FetchResult};
use crate::util::parse_pub_date;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnnouncementKind {
  Preview,
  GeneralAvailability,
}

impl AnnouncementKind {
  pub fn from_title(title: &str) -> Self {
    if title.to_lowercase().contains("preview") {
      AnnouncementKind::Preview
    } else {
      AnnouncementKind::GeneralAvailability
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FeedEntry {
  pub title: String,
  pub link: String,
  pub published_at: DateTime<Utc>,
  /// `pubDate` exactly as it appeared in the feed
  pub published_raw: String,
  pub kind: AnnouncementKind,
}

impl FeedEntry {
  fn from_rss_item(item: rss::Item) -> FetchResult<Self> {
    let published_raw =
      item.pub_date.ok_or(FetchError::MissingField("pubDate"))?;
    let published_at =
      parse_pub_date(&published_raw).map_err(|source| FetchError::PubDate {
        value: published_raw.clone(),
        source,
      })?;
    let title = item.title.ok_or(FetchError::MissingField("title"))?;
    let link = item.link.ok_or(FetchError::MissingField("link"))?;
    let kind = AnnouncementKind::from_title(&title);

    Ok(Self {
      title,
      link,
      published_at,
      published_raw,
      kind,
    })
  }
}

/// Parse an RSS document into entries, in document order.
///
/// A single item with a missing field or an unparsable `pubDate` fails the
/// whole document; no partial list is returned.
pub fn parse_entries(content: &[u8]) -> FetchResult<Vec<FeedEntry>> {
  let cursor = std::io::Cursor::new(content);
  let channel = rss::Channel::read_from(cursor)?;
  channel
    .items
    .into_iter()
    .map(FeedEntry::from_rss_item)
    .collect()
}

#[async_trait::async_trait]
pub trait EntrySource: Send + Sync {
  async fn fetch_entries(&self) -> FetchResult<Vec<FeedEntry>>;

  /// Fetch entries, logging any failure and reporting it as an empty feed.
  async fn fetch_entries_or_empty(&self) -> Vec<FeedEntry> {
    match self.fetch_entries().await {
      Ok(entries) => entries,
      Err(e) => {
        let e = anyhow::Error::from(e);
        error!("couldn't fetch the updates feed: {e:?}");
        Vec::new()
      }
    }
  }
}

pub struct FeedFetcher {
  source: Url,
  client: Client,
}

impl FeedFetcher {
  pub fn new(source: Url, client: Client) -> Self {
    Self { source, client }
  }
}

#[async_trait::async_trait]
impl EntrySource for FeedFetcher {
  async fn fetch_entries(&self) -> FetchResult<Vec<FeedEntry>> {
    let resp = self.client.get(&self.source).await?.error_for_status()?;

    if let Some(content_type) = resp.content_type() {
      if content_type.subtype() != mime::XML
        && content_type.suffix() != Some(mime::XML)
      {
        warn!(
          "feed {} served as {}, parsing as RSS anyway",
          resp.url(),
          content_type.essence_str()
        );
      }
    }

    let entries = parse_entries(resp.body())?;
    debug!("fetched {} entries from {}", entries.len(), resp.url());
    Ok(entries)
  }
}
