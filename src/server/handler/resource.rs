//! The generic resource endpoints
//!
//! Every resource of the catalog is exposed the same way:
//!
//! - `GET <collection>` lists all items, narrowed by the filters the resource knows
//! - `POST <collection>` validates the required fields and creates an item
//! - `GET`, `PATCH` and `DELETE <collection>/<key>` first look the item up and answer
//!   `404` if it does not exist
//!
//! A resource only describes its names, its key, its request and response types and
//! how to talk to its store. The handlers are implemented once in here.

use std::fmt::Display;

use actix_web::http::header::LOCATION;
use actix_web::web::{self, Data, Json, Path, PathConfig, Query, QueryConfig};
use actix_web::{HttpRequest, HttpResponse, Scope};
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::server::handler::{ApiError, ApiResult};

/// A request that changes a subset of the fields of an item
pub(crate) trait PartialUpdate {
    /// Returns `true` if none of the known fields was sent
    fn is_empty(&self) -> bool;

    /// The first required text field that was sent as `""`
    fn blank_field(&self) -> Option<&'static str> {
        None
    }
}

/// The identity of an item
pub(crate) trait ItemKey: DeserializeOwned + Display {
    /// The values of the path segments, in the order of [Resource::ITEM_PATH]
    fn segments(&self) -> Vec<String>;
}

/// The description of a resource that is exposed through the generic handlers
pub(crate) trait Resource: 'static {
    /// The name of a single item, used for messages and the api docs
    const NAME: &'static str;
    /// The route of a single item, relative to the collection
    const ITEM_PATH: &'static str;
    /// The message of the `404` response
    const NOT_FOUND: &'static str;
    /// The message of the `400` response if a required field is missing on creation
    const MISSING_FIELDS: &'static str;
    /// The fields that can be changed with `PATCH`
    const UPDATE_FIELDS: &'static [&'static str];

    /// The store the items live in
    type Store: 'static;
    /// The identity of an item, parsed from [Resource::ITEM_PATH]
    type Key: ItemKey;
    /// The query parameters of the collection endpoint
    type Filter: DeserializeOwned;
    /// The request body of the creation
    type Create: DeserializeOwned;
    /// A validated [Resource::Create]
    type New;
    /// The request body of the partial update
    type Update: DeserializeOwned + PartialUpdate;
    /// The representation that is sent to clients
    type Response: Serialize;

    /// Check that all required fields of the creation are present.
    ///
    /// Returns `None` if any of them is missing.
    fn validate(req: Self::Create) -> Option<Self::New>;

    /// Retrieve the key of an item
    fn key_of(item: &Self::Response) -> Self::Key;

    /// The error of a partial update without any of [Resource::UPDATE_FIELDS]
    fn empty_update() -> ApiError {
        ApiError::EmptyUpdate(Self::UPDATE_FIELDS)
    }

    /// Retrieve all items that match the filter
    async fn list(store: &Self::Store, filter: Self::Filter) -> ApiResult<Vec<Self::Response>>;

    /// Retrieve a single item
    async fn get(store: &Self::Store, key: &Self::Key) -> ApiResult<Option<Self::Response>>;

    /// Store a new item and return it the way it was persisted
    async fn insert(store: &Self::Store, new: Self::New) -> ApiResult<Self::Response>;

    /// Apply a partial update, returning the number of changed items
    async fn update(store: &Self::Store, key: &Self::Key, update: Self::Update) -> ApiResult<u64>;

    /// Remove an item, returning the number of removed items
    async fn delete(store: &Self::Store, key: &Self::Key) -> ApiResult<u64>;
}

/// Deserialize a field that distinguishes an explicit `null` from a missing field.
///
/// Use it as `#[serde(default, deserialize_with = "present")]` on an `Option<Option<T>>`:
/// a missing field stays `None`, `null` becomes `Some(None)`.
pub(crate) fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Treat an empty text as missing
pub(crate) fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|text| !text.is_empty())
}

/// Build the scope serving a resource below `path`
///
/// A key that can't be parsed is answered like a key that doesn't exist.
pub(crate) fn resource_scope<R: Resource>(path: &str) -> Scope {
    web::scope(path)
        .app_data(
            PathConfig::default().error_handler(|err, _| {
                debug!("Unparsable key of {}: {err}", R::NAME);
                ApiError::NotFound(R::NOT_FOUND).into()
            }),
        )
        .app_data(
            QueryConfig::default()
                .error_handler(|err, _| ApiError::InvalidQuery(err.to_string()).into()),
        )
        .service(
            web::resource("")
                .route(web::get().to(list_items::<R>))
                .route(web::post().to(create_item::<R>)),
        )
        .service(
            web::resource(R::ITEM_PATH)
                .route(web::get().to(get_item::<R>))
                .route(web::patch().to(update_item::<R>))
                .route(web::delete().to(delete_item::<R>)),
        )
}

/// The path of an item below `collection`, every key segment percent-encoded
fn item_location(collection: &str, key: &impl ItemKey) -> String {
    let mut location = collection.trim_end_matches('/').to_string();
    for segment in key.segments() {
        location.push('/');
        location.push_str(&urlencoding::encode(&segment));
    }
    location
}

async fn guard<R: Resource>(store: &R::Store, key: &R::Key) -> ApiResult<R::Response> {
    R::get(store, key)
        .await?
        .ok_or(ApiError::NotFound(R::NOT_FOUND))
}

async fn list_items<R: Resource>(
    store: Data<R::Store>,
    filter: Query<R::Filter>,
) -> ApiResult<Json<Vec<R::Response>>> {
    Ok(Json(R::list(store.get_ref(), filter.into_inner()).await?))
}

async fn create_item<R: Resource>(
    req: HttpRequest,
    store: Data<R::Store>,
    body: Json<R::Create>,
) -> ApiResult<HttpResponse> {
    let new = R::validate(body.into_inner()).ok_or(ApiError::MissingFields(R::MISSING_FIELDS))?;

    let item = R::insert(store.get_ref(), new).await?;

    let location = item_location(req.path(), &R::key_of(&item));
    debug!("Created {} {location}", R::NAME);

    Ok(HttpResponse::Created()
        .insert_header((LOCATION, location))
        .json(item))
}

async fn get_item<R: Resource>(
    path: Path<R::Key>,
    store: Data<R::Store>,
) -> ApiResult<Json<R::Response>> {
    Ok(Json(guard::<R>(store.get_ref(), &path).await?))
}

async fn update_item<R: Resource>(
    path: Path<R::Key>,
    store: Data<R::Store>,
    body: Json<R::Update>,
) -> ApiResult<HttpResponse> {
    let key = path.into_inner();
    guard::<R>(store.get_ref(), &key).await?;

    let update = body.into_inner();
    if update.is_empty() {
        return Err(R::empty_update());
    }
    if let Some(field) = update.blank_field() {
        return Err(ApiError::EmptyField(field));
    }

    let changed = R::update(store.get_ref(), &key, update).await?;
    debug!("Updated {changed} {} {key}", R::NAME);

    Ok(HttpResponse::NoContent().finish())
}

async fn delete_item<R: Resource>(
    path: Path<R::Key>,
    store: Data<R::Store>,
) -> ApiResult<HttpResponse> {
    let key = path.into_inner();
    guard::<R>(store.get_ref(), &key).await?;

    R::delete(store.get_ref(), &key).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use std::fmt::Formatter;

    use actix_web::http::StatusCode;
    use actix_web::test::{call_service, init_service, read_body, read_body_json, TestRequest};
    use actix_web::App;
    use serde_json::{json, Value};
    use tokio::sync::Mutex;

    use super::*;
    use crate::server::handler::escape_html;

    #[derive(Clone)]
    struct Note {
        id: u32,
        text: String,
        pinned: Option<bool>,
    }

    #[derive(Serialize)]
    struct NoteResponse {
        id: u32,
        text: String,
        pinned: Option<bool>,
    }

    impl From<Note> for NoteResponse {
        fn from(note: Note) -> Self {
            Self {
                id: note.id,
                text: escape_html(&note.text),
                pinned: note.pinned,
            }
        }
    }

    #[derive(Default)]
    struct NoteStore {
        notes: Mutex<Vec<Note>>,
    }

    #[derive(Deserialize)]
    struct NoteKey {
        id: u32,
    }

    impl Display for NoteKey {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.id)
        }
    }

    impl ItemKey for NoteKey {
        fn segments(&self) -> Vec<String> {
            vec![self.id.to_string()]
        }
    }

    #[derive(Deserialize)]
    struct NoteFilter {
        pinned: Option<bool>,
    }

    #[derive(Deserialize)]
    struct CreateNote {
        text: Option<String>,
        pinned: Option<bool>,
    }

    #[derive(Deserialize)]
    struct UpdateNote {
        text: Option<String>,
        #[serde(default, deserialize_with = "present")]
        pinned: Option<Option<bool>>,
    }

    impl PartialUpdate for UpdateNote {
        fn is_empty(&self) -> bool {
            self.text.is_none() && self.pinned.is_none()
        }

        fn blank_field(&self) -> Option<&'static str> {
            (self.text.as_deref() == Some("")).then_some("text")
        }
    }

    struct Notes;

    impl Resource for Notes {
        const NAME: &'static str = "Note";
        const ITEM_PATH: &'static str = "/{id}";
        const NOT_FOUND: &'static str = "Note doesn't exist";
        const MISSING_FIELDS: &'static str = "A text is required";
        const UPDATE_FIELDS: &'static [&'static str] = &["text", "pinned"];

        type Store = NoteStore;
        type Key = NoteKey;
        type Filter = NoteFilter;
        type Create = CreateNote;
        type New = (String, Option<bool>);
        type Update = UpdateNote;
        type Response = NoteResponse;

        fn validate(req: Self::Create) -> Option<Self::New> {
            Some((non_empty(req.text)?, req.pinned))
        }

        fn key_of(item: &Self::Response) -> Self::Key {
            NoteKey { id: item.id }
        }

        async fn list(store: &NoteStore, filter: NoteFilter) -> ApiResult<Vec<NoteResponse>> {
            Ok(store
                .notes
                .lock()
                .await
                .iter()
                .filter(|n| filter.pinned.map_or(true, |p| n.pinned == Some(p)))
                .cloned()
                .map(NoteResponse::from)
                .collect())
        }

        async fn get(store: &NoteStore, key: &NoteKey) -> ApiResult<Option<NoteResponse>> {
            Ok(store
                .notes
                .lock()
                .await
                .iter()
                .find(|n| n.id == key.id)
                .cloned()
                .map(NoteResponse::from))
        }

        async fn insert(store: &NoteStore, (text, pinned): Self::New) -> ApiResult<NoteResponse> {
            let mut notes = store.notes.lock().await;
            let note = Note {
                id: notes.len() as u32 + 1,
                text,
                pinned,
            };
            notes.push(note.clone());
            Ok(note.into())
        }

        async fn update(store: &NoteStore, key: &NoteKey, update: UpdateNote) -> ApiResult<u64> {
            let mut notes = store.notes.lock().await;
            let mut changed = 0;
            for note in notes.iter_mut().filter(|n| n.id == key.id) {
                if let Some(text) = &update.text {
                    note.text = text.clone();
                }
                if let Some(pinned) = update.pinned {
                    note.pinned = pinned;
                }
                changed += 1;
            }
            Ok(changed)
        }

        async fn delete(store: &NoteStore, key: &NoteKey) -> ApiResult<u64> {
            let mut notes = store.notes.lock().await;
            let before = notes.len();
            notes.retain(|n| n.id != key.id);
            Ok((before - notes.len()) as u64)
        }
    }

    macro_rules! app {
        () => {
            init_service(
                App::new()
                    .app_data(Data::new(NoteStore::default()))
                    .service(resource_scope::<Notes>("/api/notes")),
            )
            .await
        };
    }

    fn create(body: Value) -> TestRequest {
        TestRequest::post().uri("/api/notes").set_json(body)
    }

    #[actix_web::test]
    async fn create_answers_201_with_location_and_escaped_body() {
        let app = app!();

        let res = call_service(&app, create(json!({"text": "<b>hi</b>"})).to_request()).await;

        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(
            res.headers().get(LOCATION).unwrap().to_str().unwrap(),
            "/api/notes/1"
        );
        let body: Value = read_body_json(res).await;
        assert_eq!(
            body,
            json!({"id": 1, "text": "&lt;b&gt;hi&lt;/b&gt;", "pinned": null})
        );
    }

    #[actix_web::test]
    async fn create_without_required_field_is_400() {
        let app = app!();

        for body in [json!({"pinned": true}), json!({"text": ""}), json!({"text": null})] {
            let res = call_service(&app, create(body).to_request()).await;

            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
            let body: Value = read_body_json(res).await;
            assert_eq!(body, json!({"error": {"message": "A text is required"}}));
        }

        let req = TestRequest::get().uri("/api/notes").to_request();
        let listed: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(listed, json!([]));
    }

    #[actix_web::test]
    async fn unknown_key_is_404_for_every_verb() {
        let app = app!();

        let requests = [
            TestRequest::get().uri("/api/notes/7").to_request(),
            TestRequest::delete().uri("/api/notes/7").to_request(),
            TestRequest::patch()
                .uri("/api/notes/7")
                .set_json(json!({"text": "x"}))
                .to_request(),
        ];
        for req in requests {
            let res = call_service(&app, req).await;

            assert_eq!(res.status(), StatusCode::NOT_FOUND);
            let body: Value = read_body_json(res).await;
            assert_eq!(body, json!({"error": {"message": "Note doesn't exist"}}));
        }
    }

    #[actix_web::test]
    async fn patch_without_known_fields_is_400_and_keeps_item() {
        let app = app!();
        call_service(&app, create(json!({"text": "keep", "pinned": true})).to_request()).await;

        let req = TestRequest::patch()
            .uri("/api/notes/1")
            .set_json(json!({"color": "red"}))
            .to_request();
        let res = call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(res).await;
        assert_eq!(
            body["error"]["message"],
            "Request body must contain one of the following fields: text, pinned"
        );

        let req = TestRequest::get().uri("/api/notes/1").to_request();
        let note: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(note, json!({"id": 1, "text": "keep", "pinned": true}));
    }

    #[actix_web::test]
    async fn patch_counts_false_and_null_as_present() {
        let app = app!();
        call_service(&app, create(json!({"text": "keep", "pinned": true})).to_request()).await;

        let req = TestRequest::patch()
            .uri("/api/notes/1")
            .set_json(json!({"pinned": false}))
            .to_request();
        let res = call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(read_body(res).await.is_empty());

        let req = TestRequest::get().uri("/api/notes/1").to_request();
        let note: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(note, json!({"id": 1, "text": "keep", "pinned": false}));

        let req = TestRequest::patch()
            .uri("/api/notes/1")
            .set_json(json!({"pinned": null}))
            .to_request();
        assert_eq!(
            call_service(&app, req).await.status(),
            StatusCode::NO_CONTENT
        );

        let req = TestRequest::get().uri("/api/notes/1").to_request();
        let note: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(note, json!({"id": 1, "text": "keep", "pinned": null}));
    }

    #[actix_web::test]
    async fn delete_is_204_and_item_is_gone() {
        let app = app!();
        call_service(&app, create(json!({"text": "bye"})).to_request()).await;

        let req = TestRequest::delete().uri("/api/notes/1").to_request();
        let res = call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(read_body(res).await.is_empty());

        let req = TestRequest::get().uri("/api/notes/1").to_request();
        assert_eq!(
            call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[actix_web::test]
    async fn list_applies_filter() {
        let app = app!();
        call_service(&app, create(json!({"text": "a", "pinned": true})).to_request()).await;
        call_service(&app, create(json!({"text": "b", "pinned": false})).to_request()).await;
        call_service(&app, create(json!({"text": "c", "pinned": true})).to_request()).await;

        let req = TestRequest::get()
            .uri("/api/notes?pinned=true")
            .to_request();
        let pinned: Vec<Value> = read_body_json(call_service(&app, req).await).await;
        let mut texts: Vec<_> = pinned.iter().map(|n| n["text"].clone()).collect();
        texts.sort_by_key(|t| t.to_string());
        assert_eq!(texts, vec![json!("a"), json!("c")]);

        let req = TestRequest::get().uri("/api/notes").to_request();
        let all: Vec<Value> = read_body_json(call_service(&app, req).await).await;
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn present_distinguishes_null_from_missing() {
        let missing: UpdateNote = serde_json::from_value(json!({})).unwrap();
        let null: UpdateNote = serde_json::from_value(json!({"pinned": null})).unwrap();
        let value: UpdateNote = serde_json::from_value(json!({"pinned": false})).unwrap();

        assert_eq!(missing.pinned, None);
        assert!(missing.is_empty());
        assert_eq!(null.pinned, Some(None));
        assert_eq!(value.pinned, Some(Some(false)));
        assert!(!value.is_empty());
    }

    #[actix_web::test]
    async fn unparsable_key_is_resource_404() {
        let app = app!();

        let res = call_service(&app, TestRequest::get().uri("/api/notes/abc").to_request()).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = read_body_json(res).await;
        assert_eq!(body, json!({"error": {"message": "Note doesn't exist"}}));
    }

    #[actix_web::test]
    async fn unparsable_filter_is_json_400() {
        let app = app!();

        let req = TestRequest::get().uri("/api/notes?pinned=maybe").to_request();
        let res = call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(res).await;
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.starts_with("Invalid query: "), "{message}");
    }

    #[actix_web::test]
    async fn patch_to_blank_required_text_is_400() {
        let app = app!();
        call_service(&app, create(json!({"text": "keep"})).to_request()).await;

        let req = TestRequest::patch()
            .uri("/api/notes/1")
            .set_json(json!({"text": "", "pinned": true}))
            .to_request();
        let res = call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(res).await;
        assert_eq!(body, json!({"error": {"message": "text must not be empty"}}));

        let req = TestRequest::get().uri("/api/notes/1").to_request();
        let note: Value = read_body_json(call_service(&app, req).await).await;
        assert_eq!(note, json!({"id": 1, "text": "keep", "pinned": null}));
    }

    #[derive(Deserialize)]
    struct TwoPartKey(String, String);

    impl Display for TwoPartKey {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}/{}", self.0, self.1)
        }
    }

    impl ItemKey for TwoPartKey {
        fn segments(&self) -> Vec<String> {
            vec![self.0.clone(), self.1.clone()]
        }
    }

    #[test]
    fn location_encodes_every_segment() {
        assert_eq!(
            item_location("/api/reviews", &TwoPartKey("1".to_string(), "G1".to_string())),
            "/api/reviews/1/G1"
        );
        assert_eq!(
            item_location(
                "/api/games/",
                &TwoPartKey("a b?".to_string(), "c/d".to_string())
            ),
            "/api/games/a%20b%3F/c%2Fd"
        );
    }
}
