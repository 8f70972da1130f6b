pub mod app_config;
pub mod hop_headers;
pub mod http_client;
pub mod proxy_service;
pub mod std_logger;
