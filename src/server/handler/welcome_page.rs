//! The greeting at the root of the server

use actix_web::{get, HttpResponse};

/// Greets everyone, no token required
#[utoipa::path(
    tag = "Welcome",
    responses(
        (status = 200, description = "The greeting", body = String, content_type = "text/plain"),
    ),
)]
#[get("/")]
pub async fn welcome_page() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hello, world!")
}
