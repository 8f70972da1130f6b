use std::env;
use std::io::{Error, ErrorKind};
use std::time::Duration;

use crate::proxy_service::upstream_config::OverrideSet;

const DEFAULT_LISTEN_ADDR: &str = ":8080";
const DEFAULT_SUCCESS_ON: &str = "502,504";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct AppConfig {
    pub upstream_base: String,
    pub listen_addr: String,
    pub timeout: Duration,
    pub override_statuses: OverrideSet,
    pub log_requests: bool,
}

impl AppConfig {
    /// Reads the whole configuration surface from the environment. The only
    /// fatal condition is a missing `UPSTREAM_BASE`; everything else falls
    /// back to a default.
    pub fn from_env() -> std::io::Result<AppConfig> {
        let upstream_base = match env::var("UPSTREAM_BASE") {
            Ok(value) if !value.is_empty() => value,
            _ => return Err(Error::new(ErrorKind::Other, "UPSTREAM_BASE is required")),
        };

        let listen_addr = normalize_listen_addr(env::var("LISTEN_ADDR").ok());

        let timeout = env::var("UPSTREAM_TIMEOUT")
            .map_or(DEFAULT_TIMEOUT, |raw| parse_timeout(&raw));

        let override_statuses = match env::var("SUCCESS_ON") {
            Ok(raw) if !raw.is_empty() => OverrideSet::parse(&raw),
            _ => OverrideSet::parse(DEFAULT_SUCCESS_ON),
        };

        let log_requests = env::var("LOG_REQUESTS").map_or(false, |value| value == "true");

        Ok(AppConfig {
            upstream_base,
            listen_addr,
            timeout,
            override_statuses,
            log_requests,
        })
    }
}

// Invalid duration strings fall back to the default silently.
fn parse_timeout(raw: &str) -> Duration {
    humantime::parse_duration(raw).unwrap_or(DEFAULT_TIMEOUT)
}

// A bare `:port` binds every interface.
fn normalize_listen_addr(raw: Option<String>) -> String {
    let addr = match raw {
        Some(value) if !value.is_empty() => value,
        _ => String::from(DEFAULT_LISTEN_ADDR),
    };

    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr
    }
}
