use std::env;
use std::io::{ErrorKind, Result};
use std::sync::Arc;

use actix_web::middleware::{Condition, Logger};
use actix_web::{web, App, HttpResponse, HttpServer};
use log::{info, LevelFilter};

use override_proxy::app_config::AppConfig;
use override_proxy::http_client::HttpClientConfig;
use override_proxy::proxy_service::forward_factory::ForwardServiceFactory;
use override_proxy::proxy_service::upstream_config::UpstreamConfig;
use override_proxy::std_logger;

#[actix_web::main]
async fn main() -> Result<()> {
    let level = env::var("LOG_LEVEL")
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    if let Err(error) = std_logger::init(level) {
        eprintln!("Unable to install logger: {}", error);
    }

    let config = AppConfig::from_env()?;

    let http_client = HttpClientConfig {
        timeout: config.timeout,
    }
    .to_client()
    .map_err(|error| std::io::Error::new(ErrorKind::Other, error))?;

    let upstream: Arc<UpstreamConfig> = Arc::new(UpstreamConfig::from(&config));

    info!(
        "proxy listening on {} -> upstream {} (success on: {}, timeout: {:?})",
        config.listen_addr, upstream.base_url, upstream.override_set, config.timeout
    );

    let log_requests = config.log_requests;

    HttpServer::new(move || {
        App::new()
            .wrap(Condition::new(log_requests, Logger::default()))
            .route("/healthz", web::route().to(health))
            .route("/readyz", web::route().to(health))
            .default_service(ForwardServiceFactory::create(
                http_client.clone(),
                upstream.clone(),
            ))
    })
    .bind(config.listen_addr.as_str())?
    .run()
    .await
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().finish()
}
