use crate::app_config::AppConfig;
use crate::proxy_service::upstream_config::UpstreamConfig;

pub mod forward_factory;
pub mod forward_service;
pub mod upstream_config;

impl From<&AppConfig> for UpstreamConfig {
  fn from(config: &AppConfig) -> UpstreamConfig {
    UpstreamConfig::new(&config.upstream_base, config.override_statuses.clone())
  }
}
