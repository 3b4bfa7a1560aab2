//! This module holds the server definition

use std::net::SocketAddr;
use std::sync::Arc;

use actix_cors::Cors;
use actix_toolbox::tb_middleware::{setup_logging_mw, LoggingMiddlewareConfig};
use actix_web::http::StatusCode;
use actix_web::middleware::{Compress, Condition, ErrorHandlers};
use actix_web::web::{self, Data, JsonConfig, PayloadConfig, ServiceConfig};
use actix_web::{App, HttpServer};
use log::{info, warn};
use rorm::Database;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{Config, Environment};
use crate::server::error::StartServerError;
use crate::server::handler::{resource_scope, welcome_page, Games, Reviews, Users, UsersGames};
use crate::server::middleware::{
    expose_server_error, handle_not_found, json_extractor_error, security_headers,
    AuthenticationRequired,
};
use crate::server::swagger::ApiDoc;

pub mod error;
pub mod handler;
pub mod middleware;
pub mod swagger;

/// Register the routes of the catalog
///
/// Every resource group is guarded by `token`, the welcome page and the api docs are open.
pub(crate) fn configure(cfg: &mut ServiceConfig, token: Arc<str>) {
    cfg.app_data(JsonConfig::default().error_handler(json_extractor_error))
        .service(SwaggerUi::new("/docs/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .service(welcome_page)
        .service(
            resource_scope::<Users>("/api/users").wrap(AuthenticationRequired::new(token.clone())),
        )
        .service(
            resource_scope::<Games>("/api/games").wrap(AuthenticationRequired::new(token.clone())),
        )
        .service(
            resource_scope::<UsersGames>("/api/users-games")
                .wrap(AuthenticationRequired::new(token.clone())),
        )
        .service(
            resource_scope::<Reviews>("/api/reviews").wrap(AuthenticationRequired::new(token)),
        );
}

/// Start the catalog server
///
/// **Parameter**:
/// - `config`: Reference to a [Config] struct
/// - `db`: [Database]
pub async fn start_server(config: &Config, db: Database) -> Result<(), StartServerError> {
    if config.auth.token.is_empty() {
        return Err(StartServerError::EmptyToken);
    }
    let token: Arc<str> = Arc::from(config.auth.token.as_str());

    let development = config.environment == Environment::Development;
    if development {
        warn!("Running in development mode, internal errors are exposed to clients");
    }

    let s_addr = SocketAddr::new(config.server.listen_address, config.server.listen_port);

    info!("Starting to listen on {}", s_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(PayloadConfig::default())
            .app_data(Data::new(db.clone()))
            .wrap(Condition::new(
                development,
                ErrorHandlers::new()
                    .handler(StatusCode::INTERNAL_SERVER_ERROR, expose_server_error),
            ))
            .wrap(security_headers())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .wrap(setup_logging_mw(LoggingMiddlewareConfig::default()))
            .wrap(Compress::default())
            .default_service(web::to(handle_not_found))
            .configure(|cfg| configure(cfg, token.clone()))
    })
    .bind(s_addr)?
    .run()
    .await?;

    Ok(())
}
