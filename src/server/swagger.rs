//! This module holds the definition of the swagger declaration

use utoipa::openapi::path::{HttpMethod, Operation, OperationBuilder};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::schema::ArrayBuilder;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityRequirement, SecurityScheme};
use utoipa::openapi::{ContentBuilder, Ref, RefOr, ResponseBuilder, Schema};
use utoipa::{Modify, OpenApi};

use crate::server::handler::{self, Games, Resource, Reviews, Users, UsersGames};

const SECURITY_SCHEME: &str = "api_token";

struct TokenSecurity;

impl Modify for TokenSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                SECURITY_SCHEME,
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "The token is set in the configuration file in the server.",
                        ))
                        .build(),
                ),
            )
        }
    }
}

/// The schemas a resource is documented with
struct ResourceDoc {
    collection: &'static str,
    response: &'static str,
    create: &'static str,
    update: &'static str,
}

/// Adds the operations of the generic resource endpoints
struct ResourcePaths;

impl Modify for ResourcePaths {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        add_resource::<Users>(
            openapi,
            ResourceDoc {
                collection: "/api/users",
                response: "UserResponse",
                create: "CreateUserRequest",
                update: "UpdateUserRequest",
            },
        );
        add_resource::<Games>(
            openapi,
            ResourceDoc {
                collection: "/api/games",
                response: "GameResponse",
                create: "CreateGameRequest",
                update: "UpdateGameRequest",
            },
        );
        add_resource::<UsersGames>(
            openapi,
            ResourceDoc {
                collection: "/api/users-games",
                response: "UserGameResponse",
                create: "CreateUserGameRequest",
                update: "UpdateUserGameRequest",
            },
        );
        add_resource::<Reviews>(
            openapi,
            ResourceDoc {
                collection: "/api/reviews",
                response: "ReviewResponse",
                create: "CreateReviewRequest",
                update: "UpdateReviewRequest",
            },
        );
    }
}

fn add_resource<R: Resource>(openapi: &mut utoipa::openapi::OpenApi, doc: ResourceDoc) {
    let item = format!("{}{}", doc.collection, R::ITEM_PATH);
    let json = |schema: RefOr<Schema>| ContentBuilder::new().schema(Some(schema)).build();
    let error = |description: &str| {
        ResponseBuilder::new()
            .description(description)
            .content("application/json", json(Ref::from_schema_name("ApiErrorResponse").into()))
            .build()
    };
    let operation = |summary: String| {
        OperationBuilder::new()
            .tag(R::NAME)
            .summary(Some(summary))
            .security(SecurityRequirement::new(SECURITY_SCHEME, Vec::<String>::new()))
            .response("401", ResponseBuilder::new().description("Missing or wrong token"))
            .response("500", error("Server error"))
    };
    let single = |description: &str| {
        ResponseBuilder::new()
            .description(description)
            .content("application/json", json(Ref::from_schema_name(doc.response).into()))
            .build()
    };
    let body = |schema: &str| {
        Some(
            RequestBodyBuilder::new()
                .content("application/json", json(Ref::from_schema_name(schema).into()))
                .build(),
        )
    };

    let list: Operation = operation(format!("Retrieve all items of {}", doc.collection))
        .response(
            "200",
            ResponseBuilder::new().description("All matching items").content(
                "application/json",
                json(RefOr::T(Schema::Array(
                    ArrayBuilder::new()
                        .items(Ref::from_schema_name(doc.response))
                        .build(),
                ))),
            ),
        )
        .build();
    let create = operation(format!("Create a {}", R::NAME))
        .request_body(body(doc.create))
        .response("201", single("The created item, its path is in the Location header"))
        .response("400", error(R::MISSING_FIELDS))
        .build();
    let get = operation(format!("Retrieve a single {}", R::NAME))
        .response("200", single("The requested item"))
        .response("404", error(R::NOT_FOUND))
        .build();
    let update = operation(format!("Change fields of a {}", R::NAME))
        .request_body(body(doc.update))
        .response("204", ResponseBuilder::new().description("The item got updated"))
        .response("400", error("None of the known fields was sent"))
        .response("404", error(R::NOT_FOUND))
        .build();
    let delete = operation(format!("Delete a {}", R::NAME))
        .response("204", ResponseBuilder::new().description("The item got deleted"))
        .response("404", error(R::NOT_FOUND))
        .build();

    let paths = &mut openapi.paths;
    paths.add_path_operation(doc.collection, vec![HttpMethod::Get], list);
    paths.add_path_operation(doc.collection, vec![HttpMethod::Post], create);
    paths.add_path_operation(&item, vec![HttpMethod::Get], get);
    paths.add_path_operation(&item, vec![HttpMethod::Patch], update);
    paths.add_path_operation(&item, vec![HttpMethod::Delete], delete);
}

/// Helper struct for the openapi definitions.
#[derive(OpenApi)]
#[openapi(
    paths(handler::welcome_page),
    components(schemas(
        handler::ApiErrorResponse,
        handler::ApiErrorMessage,
        handler::UserResponse,
        handler::CreateUserRequest,
        handler::UpdateUserRequest,
        handler::GameResponse,
        handler::CreateGameRequest,
        handler::UpdateGameRequest,
        handler::UserGameResponse,
        handler::CreateUserGameRequest,
        handler::UpdateUserGameRequest,
        handler::ReviewResponse,
        handler::CreateReviewRequest,
        handler::UpdateReviewRequest,
    )),
    modifiers(&TokenSecurity, &ResourcePaths)
)]
pub struct ApiDoc;
