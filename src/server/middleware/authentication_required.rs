use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::AUTHORIZATION;
use futures::future::LocalBoxFuture;

use crate::server::handler::ApiError;

/// Rejects every request that doesn't carry the shared token as
/// `Authorization: Bearer <token>` with `401`.
#[derive(Clone)]
pub(crate) struct AuthenticationRequired {
    token: Arc<str>,
}

impl AuthenticationRequired {
    /// Guard the wrapped services with `token`
    pub(crate) fn new(token: Arc<str>) -> Self {
        Self { token }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthenticationRequired
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Transform = AuthenticationRequiredMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticationRequiredMiddleware {
            service,
            token: self.token.clone(),
        }))
    }
}

pub(crate) struct AuthenticationRequiredMiddleware<S> {
    service: S,
    token: Arc<str>,
}

impl<S, B> Service<ServiceRequest> for AuthenticationRequiredMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let authorized = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(' ').nth(1))
            .is_some_and(|token| token == &*self.token);

        if !authorized {
            let res = req.error_response(ApiError::Unauthorized);
            return Box::pin(async { Ok(res.map_into_right_body()) });
        }

        let next = self.service.call(req);
        Box::pin(async move { next.await.map(ServiceResponse::map_into_left_body) })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{call_service, init_service, read_body_json, TestRequest};
    use actix_web::{web, App, HttpResponse};
    use serde_json::{json, Value};

    use super::*;

    macro_rules! app {
        () => {
            init_service(
                App::new()
                    .service(
                        web::scope("/guarded")
                            .wrap(AuthenticationRequired::new(Arc::from("secret")))
                            .route("", web::get().to(HttpResponse::Ok)),
                    )
                    .route("/open", web::get().to(HttpResponse::Ok)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn missing_header_is_401() {
        let app = app!();

        let res = call_service(&app, TestRequest::get().uri("/guarded").to_request()).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = read_body_json(res).await;
        assert_eq!(body, json!({"error": "Unauthorized request"}));
    }

    #[actix_web::test]
    async fn wrong_token_is_401() {
        let app = app!();

        for header in ["Bearer nope", "secret", "Bearer", "Bearer  secret"] {
            let req = TestRequest::get()
                .uri("/guarded")
                .insert_header((AUTHORIZATION, header))
                .to_request();

            let res = call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{header}");
        }
    }

    #[actix_web::test]
    async fn matching_token_passes() {
        let app = app!();

        let req = TestRequest::get()
            .uri("/guarded")
            .insert_header((AUTHORIZATION, "Bearer secret"))
            .to_request();

        assert_eq!(call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn unguarded_routes_are_open() {
        let app = app!();

        let res = call_service(&app, TestRequest::get().uri("/open").to_request()).await;

        assert_eq!(res.status(), StatusCode::OK);
    }
}
