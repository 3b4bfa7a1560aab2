//! This module holds the handler of the catalog

use std::fmt::{Display, Formatter};

use actix_web::body::BoxBody;
use actix_web::HttpResponse;
use log::{debug, error, trace};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

pub use crate::server::handler::games::*;
pub(crate) use crate::server::handler::resource::*;
pub use crate::server::handler::reviews::*;
pub use crate::server::handler::users::*;
pub use crate::server::handler::users_games::*;
pub use crate::server::handler::welcome_page::*;

pub mod games;
pub mod resource;
pub mod reviews;
pub mod users;
pub mod users_games;
pub mod welcome_page;

/// The result that is used throughout the complete api.
pub type ApiResult<T> = Result<T, ApiError>;

/// The message of an error response
#[derive(Serialize, ToSchema)]
pub struct ApiErrorMessage {
    #[schema(example = "Error message is here")]
    message: String,
}

/// The body of every error response except `401`
#[derive(Serialize, ToSchema)]
pub struct ApiErrorResponse {
    error: ApiErrorMessage,
}

impl ApiErrorResponse {
    fn new(message: String) -> Self {
        Self {
            error: ApiErrorMessage { message },
        }
    }
}

/// This enum holds all possible error types that can occur in the API
#[derive(Debug)]
pub enum ApiError {
    /// The bearer token is missing or wrong
    Unauthorized,

    /// The body could not be parsed as the expected json
    InvalidJson(String),
    /// The query parameters could not be parsed
    InvalidQuery(String),
    /// A field that is required to create the resource is missing.
    ///
    /// Holds the message of the resource.
    MissingFields(&'static str),
    /// A partial update did not contain any of the known fields
    EmptyUpdate(&'static [&'static str]),
    /// A partial update tried to set a required text field to `""`
    EmptyField(&'static str),
    /// The requested resource does not exist.
    ///
    /// Holds the message of the resource.
    NotFound(&'static str),
    /// No route matched the request
    RouteNotFound,

    /// All errors that are thrown by the database
    DatabaseError(rorm::Error),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "Unauthorized request"),
            ApiError::InvalidJson(err) => write!(f, "Invalid json: {err}"),
            ApiError::InvalidQuery(err) => write!(f, "Invalid query: {err}"),
            ApiError::MissingFields(message) => write!(f, "{message}"),
            ApiError::EmptyUpdate(fields) => write!(
                f,
                "Request body must contain one of the following fields: {}",
                fields.join(", ")
            ),
            ApiError::EmptyField(field) => write!(f, "{field} must not be empty"),
            ApiError::NotFound(message) => write!(f, "{message}"),
            ApiError::RouteNotFound => write!(f, "Not found"),
            ApiError::DatabaseError(err) => write!(f, "Database error occurred: {err}"),
        }
    }
}

impl actix_web::ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse<BoxBody> {
        match self {
            ApiError::Unauthorized => {
                trace!("Unauthorized");

                HttpResponse::Unauthorized().json(json!({ "error": self.to_string() }))
            }
            ApiError::InvalidJson(err) => {
                debug!("Received invalid json: {err}");

                HttpResponse::BadRequest().json(ApiErrorResponse::new(self.to_string()))
            }
            ApiError::InvalidQuery(err) => {
                debug!("Received invalid query: {err}");

                HttpResponse::BadRequest().json(ApiErrorResponse::new(self.to_string()))
            }
            ApiError::MissingFields(_) | ApiError::EmptyUpdate(_) | ApiError::EmptyField(_) => {
                debug!("{self}");

                HttpResponse::BadRequest().json(ApiErrorResponse::new(self.to_string()))
            }
            ApiError::NotFound(_) | ApiError::RouteNotFound => {
                debug!("{self}");

                HttpResponse::NotFound().json(ApiErrorResponse::new(self.to_string()))
            }
            ApiError::DatabaseError(err) => {
                error!("Database error: {err}");

                HttpResponse::InternalServerError()
                    .json(ApiErrorResponse::new("server error".to_string()))
            }
        }
    }
}

impl From<rorm::Error> for ApiError {
    fn from(value: rorm::Error) -> Self {
        Self::DatabaseError(value)
    }
}

/// Replace the angle brackets by their entities so no tag survives
///
/// Quotes, apostrophes and ampersands are left as they are.
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Connect to the database the live accessor tests run against.
///
/// The connection is read from `DATABASE_HOST`, `DATABASE_PORT`, `DATABASE_NAME`,
/// `DATABASE_USER` and `DATABASE_PASSWORD`, the schema has to be migrated.
#[cfg(test)]
pub(crate) async fn test_db() -> rorm::Database {
    use std::env::var;

    use rorm::{DatabaseConfiguration, DatabaseDriver};

    let setting = |name: &str, default: &str| var(name).unwrap_or_else(|_| default.to_string());

    rorm::Database::connect(DatabaseConfiguration {
        driver: DatabaseDriver::Postgres {
            host: setting("DATABASE_HOST", "localhost"),
            port: setting("DATABASE_PORT", "5432").parse().unwrap(),
            name: setting("DATABASE_NAME", "boardgame-catalog"),
            user: setting("DATABASE_USER", "boardgame-catalog"),
            password: setting("DATABASE_PASSWORD", ""),
        },
        min_connections: 1,
        max_connections: 2,
        disable_logging: Some(true),
        statement_log_level: None,
        slow_statement_log_level: None,
    })
    .await
    .unwrap()
}

/// A suffix that keeps the rows of concurrent live test runs apart
#[cfg(test)]
pub(crate) fn unique_suffix() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_micros()
}
