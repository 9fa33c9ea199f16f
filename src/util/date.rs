use chrono::{DateTime, NaiveDate, NaiveDateTime, ParseResult, Utc, Weekday};

/// The `pubDate` layout used by the updates feed, for example
/// `Mon, 01 Jan 2024 10:00:00 Z`. The trailing `Z` is a literal and the
/// timestamp is taken as UTC.
const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S Z";
/// [`PUB_DATE_FORMAT`] after the `<weekday>, ` prefix
const PUB_DATE_TAIL_FORMAT: &str = "%d %b %Y %H:%M:%S Z";

pub const SLOT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a feed `pubDate`. The weekday has to be a weekday name but is not
/// checked against the date.
pub fn parse_pub_date(date_str: impl AsRef<str>) -> ParseResult<DateTime<Utc>> {
  let date_str = date_str.as_ref().trim();
  let parsed = match date_str.split_once(", ") {
    Some((weekday, tail)) if weekday.parse::<Weekday>().is_ok() => {
      NaiveDateTime::parse_from_str(tail, PUB_DATE_TAIL_FORMAT)
    }
    // fails on the weekday, reported against the full layout
    _ => NaiveDateTime::parse_from_str(date_str, PUB_DATE_FORMAT),
  };

  parsed.map(|parsed| parsed.and_utc())
}

pub fn parse_news_date(date_str: impl AsRef<str>) -> ParseResult<NaiveDate> {
  NaiveDate::parse_from_str(date_str.as_ref().trim(), SLOT_DATE_FORMAT)
}
