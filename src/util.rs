mod date;

pub use date::{SLOT_DATE_FORMAT, parse_news_date, parse_pub_date};

pub const USER_AGENT: &str =
  concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
