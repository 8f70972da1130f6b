use actix_web::http::header::{self, HeaderName, HeaderValue};

/// Headers scoped to a single connection. They must not cross the proxy
/// boundary in either direction.
const HOP_BY_HOP: [&str; 9] = [
  "connection",
  "proxy-connection",
  "keep-alive",
  "proxy-authenticate",
  "proxy-authorization",
  "te",
  "trailer",
  "transfer-encoding",
  "upgrade",
];

// HeaderName is always lowercase, so a plain comparison is case-insensitive.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
  HOP_BY_HOP.iter().any(|excluded| name.as_str() == *excluded)
}

/// Builds the outbound header map from the inbound one. Hop-by-hop headers
/// are dropped, as is `Host` (the upstream host comes from the target URL).
/// Duplicate headers keep their per-key value order.
pub fn filter_request_headers(source: &actix_web::http::header::HeaderMap) -> reqwest::header::HeaderMap {
  let mut filtered = reqwest::header::HeaderMap::new();

  for (name, value) in source.iter() {
    if is_hop_by_hop(name) || name == header::HOST {
      continue;
    }

    filtered.append(name.clone(), value.clone());
  }

  filtered
}

/// Iterates the upstream response headers that may be forwarded to the caller.
pub fn filter_response_headers(
  source: &reqwest::header::HeaderMap,
) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
  source.iter().filter(|(name, _)| !is_hop_by_hop(name))
}
