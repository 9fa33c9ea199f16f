use crate::feed::FeedEntry;

/// Number of entries read out in a single response.
pub const TOP_N: usize = 5;

const SHORT_PAUSE: &str = r#"<break time="0.5s"/>"#;
const LONG_PAUSE: &str = r#"<break time="1s"/>"#;

/// Render the first [`TOP_N`] entries as a numbered, paced list.
///
/// Titles are escaped since they are embedded verbatim in speech markup.
pub fn render_list(entries: &[FeedEntry]) -> String {
  let mut output = String::new();

  for (i, entry) in entries.iter().take(TOP_N).enumerate() {
    let title = htmlescape::encode_minimal(entry.title.trim());
    output.push_str(&format!(
      " Item {}: {SHORT_PAUSE}{title}.{LONG_PAUSE}",
      i + 1
    ));
  }

  output
}

pub fn wrap_speak(text: &str) -> String {
  format!("<speak>{}</speak>", text.trim())
}
