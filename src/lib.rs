#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "server")]
mod error_conversions;
#[cfg(feature = "data")]
pub mod errors;
#[cfg(feature = "server")]
pub mod models;
#[cfg(feature = "server")]
pub mod orchestrator;
#[cfg(feature = "server")]
pub mod pagination;
#[cfg(feature = "server")]
pub mod proxy;
#[cfg(feature = "data")]
pub mod query;
#[cfg(feature = "server")]
pub mod resources;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

#[cfg(feature = "server")]
pub use server::*;

#[cfg(feature = "server")]
mod server {
    use actix_cors::Cors;
    use actix_web::{App, HttpServer, middleware, web};

    use crate::errors::{ErrorEnvelope, ErrorKind};
    use crate::models::config::ServerConfig;
    use crate::proxy::ProxyRequestExecutor;
    use crate::proxy::http::ReqwestTransport;
    use crate::routes::{configure, health};

    /// Executor type shared by the HTTP handlers.
    pub type Executor = ProxyRequestExecutor<ReqwestTransport>;

    /// Builds the upstream executor described by the configuration.
    pub fn build_executor(server_config: &ServerConfig) -> std::io::Result<Executor> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| std::io::Error::other(format!("Failed to build HTTP client: {e}")))?;

        let transport = ReqwestTransport::new(client);
        Ok(
            ProxyRequestExecutor::new(transport, &server_config.upstream_base_url)
                .with_timeout(server_config.request_timeout()),
        )
    }

    /// Rejects malformed JSON bodies with a `BAD_REQUEST` envelope.
    pub fn json_config() -> web::JsonConfig {
        web::JsonConfig::default().error_handler(|err, _req| {
            log::warn!("Rejected request body: {err}");
            ErrorEnvelope::new(ErrorKind::BadRequest)
                .with_message(format!("Invalid JSON body: {err}"))
                .into()
        })
    }

    /// Builds and runs the Actix-Web HTTP server using the provided configuration.
    pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
        let executor = web::Data::new(build_executor(&server_config)?);
        let registry = web::Data::new(server_config.registry());
        let scope_path = server_config.scope_path();

        if registry.is_empty() {
            log::warn!("No resources configured; every resource route will answer 404");
        }
        let names: Vec<&str> = registry.iter().map(|resource| resource.name.as_str()).collect();
        log::info!(
            "Proxying {} resources ({}) to {} under '{}'",
            registry.len(),
            names.join(", "),
            executor.base_url(),
            scope_path
        );

        let bind_address = (server_config.address.clone(), server_config.port);

        HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(middleware::Logger::default())
                .app_data(json_config())
                .app_data(executor.clone())
                .app_data(registry.clone())
                .service(web::scope(&scope_path).service(health).configure(configure))
        })
        .bind(bind_address)?
        .run()
        .await
    }
}
