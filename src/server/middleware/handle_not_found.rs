use actix_web::HttpResponse;

use crate::server::handler::{ApiError, ApiResult};

/// The default service answering every request no route matched
pub(crate) async fn handle_not_found() -> ApiResult<HttpResponse> {
    Err(ApiError::RouteNotFound)
}
