use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Status codes that may be remapped to a synthetic success. Tokens outside
/// this vocabulary are dropped during parsing.
const RECOGNIZED_STATUSES: [u16; 4] = [429, 500, 502, 504];

/// Immutable set of upstream status codes reported to the caller as success.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverrideSet(BTreeSet<u16>);

impl OverrideSet {
  /// Parses a comma-separated status list. Unrecognized tokens are ignored,
  /// so a list with no valid member yields an empty set.
  pub fn parse(raw: &str) -> OverrideSet {
    let codes = raw
      .split(',')
      .filter_map(|token| token.trim().parse::<u16>().ok())
      .filter(|code| RECOGNIZED_STATUSES.contains(code))
      .collect();

    OverrideSet(codes)
  }

  pub fn contains(&self, status: u16) -> bool {
    self.0.contains(&status)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl Display for OverrideSet {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let mut first = true;
    f.write_str("[")?;

    for code in self.0.iter() {
      if !first {
        f.write_str(",")?;
      }
      write!(f, "{}", code)?;
      first = false;
    }

    f.write_str("]")
  }
}

/// Process-lifetime view of the single upstream origin. Shared read-only
/// across every in-flight request.
pub struct UpstreamConfig {
  pub base_url: Box<str>,
  pub override_set: OverrideSet,
}

impl UpstreamConfig {
  pub fn new(base_url: &str, override_set: OverrideSet) -> UpstreamConfig {
    UpstreamConfig {
      base_url: Box::from(base_url.trim_end_matches('/')),
      override_set,
    }
  }

  /// Joins the upstream base with an inbound path and raw query string.
  pub fn target_url(&self, path: &str, query: &str) -> String {
    if query.is_empty() {
      format!("{}{}", self.base_url, path)
    } else {
      format!("{}{}?{}", self.base_url, path, query)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_recognized_status_tokens() {
    let set = OverrideSet::parse("502,504");

    assert!(set.contains(502));
    assert!(set.contains(504));
    assert!(!set.contains(500));
  }

  #[test]
  fn ignores_unrecognized_tokens() {
    let set = OverrideSet::parse("418,999,abc,500");

    assert!(set.contains(500));
    assert!(!set.contains(418));
    assert_eq!(set, OverrideSet::parse("500"));
  }

  #[test]
  fn tolerates_whitespace_around_tokens() {
    let set = OverrideSet::parse(" 429 , 502 ");

    assert!(set.contains(429));
    assert!(set.contains(502));
  }

  #[test]
  fn no_valid_tokens_yields_an_empty_set() {
    assert!(OverrideSet::parse("").is_empty());
    assert!(OverrideSet::parse("teapot,301").is_empty());
  }

  #[test]
  fn display_lists_codes_in_order() {
    assert_eq!(OverrideSet::parse("504,429,502").to_string(), "[429,502,504]");
    assert_eq!(OverrideSet::default().to_string(), "[]");
  }

  #[test]
  fn target_url_strips_trailing_slashes_from_base() {
    let config = UpstreamConfig::new("https://origin.example//", OverrideSet::default());

    assert_eq!(
      config.target_url("/api/items", ""),
      "https://origin.example/api/items"
    );
  }

  #[test]
  fn target_url_appends_raw_query_when_present() {
    let config = UpstreamConfig::new("https://origin.example", OverrideSet::default());

    assert_eq!(
      config.target_url("/search", "q=a%20b&page=2"),
      "https://origin.example/search?q=a%20b&page=2"
    );
  }

  #[test]
  fn target_url_keeps_root_path() {
    let config = UpstreamConfig::new("http://127.0.0.1:9000/", OverrideSet::default());

    assert_eq!(config.target_url("/", ""), "http://127.0.0.1:9000/");
  }
}
