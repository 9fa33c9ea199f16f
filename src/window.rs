use chrono::{DateTime, Days, NaiveDate, TimeDelta, Utc};

use crate::feed::FeedEntry;

/// Inclusive range of publication times.
///
/// `start <= end` is not enforced; an inverted window simply matches
/// nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
}

impl DateWindow {
  pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
    Self { start, end }
  }

  /// `[now - days, now]`
  pub fn last_days(now: DateTime<Utc>, days: i64) -> Self {
    Self::new(now - TimeDelta::days(days), now)
  }

  /// The UTC calendar day `date`: from its midnight to the next midnight.
  pub fn for_day(date: NaiveDate) -> Self {
    let start = date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    let end = start
      .checked_add_days(Days::new(1))
      .unwrap_or(DateTime::<Utc>::MAX_UTC);
    Self::new(start, end)
  }

  pub fn contains(&self, time: &DateTime<Utc>) -> bool {
    self.start <= *time && *time <= self.end
  }
}

/// Entries published inside `window`, in their original order.
pub fn filter_by_window(
  entries: Vec<FeedEntry>,
  window: &DateWindow,
) -> Vec<FeedEntry> {
  entries
    .into_iter()
    .filter(|entry| window.contains(&entry.published_at))
    .collect()
}
