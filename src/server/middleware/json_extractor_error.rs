use actix_web::error::JsonPayloadError;
use actix_web::HttpRequest;

use crate::server::handler::ApiError;

/// Turns errors of the json extractor into `400` responses of the api
pub(crate) fn json_extractor_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::InvalidJson(err.to_string()).into()
}
