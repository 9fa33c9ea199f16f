use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::envelope::NEWS_DATE_SLOT;
use crate::error::SkillError;
use crate::feed::{AnnouncementKind, EntrySource};
use crate::speech::{TOP_N, render_list};
use crate::util::{SLOT_DATE_FORMAT, parse_news_date};
use crate::window::{DateWindow, filter_by_window};

/// How far back "the most recent" items reach.
const TOP_FIVE_DAYS: i64 = 7;

const GOODBYE: &str = "Goodbye!";
const APOLOGY: &str =
  "Sorry, I had trouble doing what you asked. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
  Launch,
  ReadTopFive,
  ReadItemsFromDate { news_date: Option<String> },
  Help,
  Cancel,
  Stop,
  SessionEnded,
  Unknown(String),
}

impl Intent {
  /// Map a request type or intent name, as the voice platform spells them.
  pub fn from_name(name: &str, news_date: Option<String>) -> Self {
    match name {
      "LaunchRequest" => Intent::Launch,
      "SessionEndedRequest" => Intent::SessionEnded,
      "ReadTopFive" => Intent::ReadTopFive,
      // the interaction model has shipped with both spellings
      "ReadItemsFromDate" | "ReadItemsFromADate" => {
        Intent::ReadItemsFromDate { news_date }
      }
      "AMAZON.HelpIntent" => Intent::Help,
      "AMAZON.CancelIntent" => Intent::Cancel,
      "AMAZON.StopIntent" => Intent::Stop,
      _ => Intent::Unknown(name.to_string()),
    }
  }

  pub fn name(&self) -> &str {
    match self {
      Intent::Launch => "LaunchRequest",
      Intent::ReadTopFive => "ReadTopFive",
      Intent::ReadItemsFromDate { .. } => "ReadItemsFromDate",
      Intent::Help => "AMAZON.HelpIntent",
      Intent::Cancel => "AMAZON.CancelIntent",
      Intent::Stop => "AMAZON.StopIntent",
      Intent::SessionEnded => "SessionEndedRequest",
      Intent::Unknown(name) => name,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntentRequest {
  pub intent: Intent,
  pub request_id: Option<String>,
}

impl IntentRequest {
  pub fn new(intent: Intent) -> Self {
    Self {
      intent,
      request_id: None,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillResponse {
  pub speech: String,
  pub reprompt: Option<String>,
}

impl SkillResponse {
  /// Speak `speech` and keep listening, repeating it if the user is silent.
  pub fn with_reprompt(speech: String) -> Self {
    Self {
      reprompt: Some(speech.clone()),
      speech,
    }
  }

  pub fn ending(speech: String) -> Self {
    Self {
      speech,
      reprompt: None,
    }
  }

  pub fn should_end_session(&self) -> bool {
    self.reprompt.is_none()
  }
}

#[derive(Clone)]
pub struct Dispatcher {
  source: Arc<dyn EntrySource>,
  service_name: Arc<str>,
}

impl Dispatcher {
  pub fn new(source: Arc<dyn EntrySource>, service_name: &str) -> Self {
    Self {
      source,
      service_name: service_name.into(),
    }
  }

  pub async fn dispatch(&self, req: &IntentRequest) -> SkillResponse {
    self.dispatch_at(req, Utc::now()).await
  }

  pub async fn dispatch_at(
    &self,
    req: &IntentRequest,
    now: DateTime<Utc>,
  ) -> SkillResponse {
    debug!(
      "dispatching {} (request {})",
      req.intent.name(),
      req.request_id.as_deref().unwrap_or("-")
    );

    match self.handle(&req.intent, now).await {
      Ok(resp) => resp,
      Err(e) => {
        error!(
          "error handling {} (request {}): {:?}",
          req.intent.name(),
          req.request_id.as_deref().unwrap_or("-"),
          anyhow::Error::from(e)
        );
        SkillResponse::with_reprompt(APOLOGY.into())
      }
    }
  }

  async fn handle(
    &self,
    intent: &Intent,
    now: DateTime<Utc>,
  ) -> Result<SkillResponse, SkillError> {
    match intent {
      Intent::Launch | Intent::Help => {
        Ok(SkillResponse::with_reprompt(self.help_message()))
      }
      Intent::ReadTopFive => Ok(self.read_top_five(now).await),
      Intent::ReadItemsFromDate { news_date } => {
        self.read_items_from_date(news_date.as_deref()).await
      }
      Intent::Cancel | Intent::Stop => {
        Ok(SkillResponse::ending(GOODBYE.into()))
      }
      Intent::SessionEnded => Ok(SkillResponse::with_reprompt(GOODBYE.into())),
      Intent::Unknown(name) => Err(SkillError::UnhandledIntent(name.clone())),
    }
  }

  async fn read_top_five(&self, now: DateTime<Utc>) -> SkillResponse {
    let service = &self.service_name;
    let window = DateWindow::last_days(now, TOP_FIVE_DAYS);
    let entries =
      filter_by_window(self.source.fetch_entries_or_empty().await, &window);
    debug!(
      "{} entries ({} previews) in the last {TOP_FIVE_DAYS} days",
      entries.len(),
      entries
        .iter()
        .filter(|e| e.kind == AnnouncementKind::Preview)
        .count()
    );

    if entries.is_empty() {
      let speech =
        format!("There are no new {service} items currently available.");
      return SkillResponse::with_reprompt(speech);
    }

    let speech = format!(
      "Here are the most recent {TOP_N} {service} news items.{} \
       That's the most recent {TOP_N} announcements on {service}!",
      render_list(&entries)
    );
    SkillResponse::with_reprompt(speech)
  }

  // A malformed date gets the generic apology, not a targeted message.
  async fn read_items_from_date(
    &self,
    news_date: Option<&str>,
  ) -> Result<SkillResponse, SkillError> {
    let service = &self.service_name;
    let news_date = news_date
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .ok_or_else(|| SkillError::Slot {
        slot: NEWS_DATE_SLOT,
        reason: "is missing".into(),
      })?;
    let date = parse_news_date(news_date).map_err(|e| SkillError::Slot {
      slot: NEWS_DATE_SLOT,
      reason: format!("{news_date:?} is not a {SLOT_DATE_FORMAT} date: {e}"),
    })?;

    let window = DateWindow::for_day(date);
    let entries =
      filter_by_window(self.source.fetch_entries_or_empty().await, &window);
    debug!("{} entries on {news_date}", entries.len());

    if entries.is_empty() {
      let speech =
        format!("I couldn't find any {service} news items for {news_date}.");
      return Ok(SkillResponse::with_reprompt(speech));
    }

    let speech = format!(
      "Here are the {service} news items from {news_date}.{} \
       That's all the {service} news for {news_date}!",
      render_list(&entries)
    );
    Ok(SkillResponse::with_reprompt(speech))
  }

  fn help_message(&self) -> String {
    let service = &self.service_name;
    format!(
      "Hi there! I'm the {service} News Service and I can read you the \
       latest {service} cloud news. Ask for the top five most recent items \
       or ask to hear items from a specific date."
    )
  }
}
