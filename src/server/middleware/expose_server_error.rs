use actix_web::dev::ServiceResponse;
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::HttpResponse;
use serde_json::json;

/// Replaces the generic body of a `500` response by the details of the error.
///
/// Only installed in [Environment::Development](crate::config::Environment::Development).
pub(crate) fn expose_server_error<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let Some(body) = res.response().error().map(|err| {
        json!({
            "message": err.to_string(),
            "error": format!("{err:?}"),
        })
    }) else {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    };

    let (req, _) = res.into_parts();
    let res = HttpResponse::InternalServerError().json(body);

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, res).map_into_right_body(),
    ))
}
