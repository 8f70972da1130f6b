use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::Client;

// Bounds connection establishment, TLS handshake included.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
// Pooled upstream connections are dropped after this much idle time.
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpClientConfig {
  pub timeout: Duration,
}

impl HttpClientConfig {
  /// Builds the shared upstream client. The timeout covers the full
  /// round trip of one call, not individual body chunks. Ambient
  /// `HTTP(S)_PROXY`/`NO_PROXY` settings are honored by default; redirects
  /// are disabled so 3xx responses reach the caller untouched.
  pub fn to_client(self) -> Result<Client, reqwest::Error> {
    reqwest::ClientBuilder::new()
      .timeout(self.timeout)
      .connect_timeout(CONNECT_TIMEOUT)
      .pool_idle_timeout(POOL_IDLE_TIMEOUT)
      .redirect(Policy::none())
      .build()
  }
}
