//! All handlers for the user endpoints live in here

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use rorm::{insert, query, update, Database, FieldAccess, Model};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{User, UserInsert};
use crate::server::handler::{
    escape_html, non_empty, ApiError, ApiResult, ItemKey, PartialUpdate, Resource,
};

/// The path of a single user
#[derive(Deserialize)]
pub struct UserKey {
    pub(crate) id: i64,
}

impl Display for UserKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl ItemKey for UserKey {
    fn segments(&self) -> Vec<String> {
        vec![self.id.to_string()]
    }
}

/// The query to narrow the listed users
#[derive(Deserialize)]
pub struct UserFilter {
    /// Only list users with exactly this name
    username: Option<String>,
}

/// The request to create a user
#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "Tessa Testerson")]
    username: Option<String>,
}

/// The request to rename a user
#[derive(Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[schema(example = "Danny Dummy")]
    username: Option<String>,
}

impl PartialUpdate for UpdateUserRequest {
    fn is_empty(&self) -> bool {
        self.username.is_none()
    }

    fn blank_field(&self) -> Option<&'static str> {
        (self.username.as_deref() == Some("")).then_some("username")
    }
}

/// A user
///
/// The `username` is html escaped.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub(crate) id: i64,
    #[schema(example = "Tessa Testerson")]
    pub(crate) username: String,
    pub(crate) acct_created: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: escape_html(&user.username),
            acct_created: user.acct_created.and_utc(),
        }
    }
}

/// The users of the catalog, exposed at `/api/users`
pub struct Users;

impl Resource for Users {
    const NAME: &'static str = "User";
    const ITEM_PATH: &'static str = "/{id}";
    const NOT_FOUND: &'static str = "User doesn't exist";
    const MISSING_FIELDS: &'static str = "You must provide a username";
    const UPDATE_FIELDS: &'static [&'static str] = &["username"];

    type Store = Database;
    type Key = UserKey;
    type Filter = UserFilter;
    type Create = CreateUserRequest;
    type New = UserInsert;
    type Update = UpdateUserRequest;
    type Response = UserResponse;

    fn validate(req: CreateUserRequest) -> Option<UserInsert> {
        Some(UserInsert {
            username: non_empty(req.username)?,
        })
    }

    fn key_of(user: &UserResponse) -> UserKey {
        UserKey { id: user.id }
    }

    fn empty_update() -> ApiError {
        ApiError::MissingFields("You must provide a new username to change your username")
    }

    async fn list(db: &Database, filter: UserFilter) -> ApiResult<Vec<UserResponse>> {
        let users = match &filter.username {
            Some(username) => {
                query!(db, User)
                    .condition(User::F.username.equals(username.as_str()))
                    .all()
                    .await?
            }
            None => query!(db, User).all().await?,
        };

        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    async fn get(db: &Database, key: &UserKey) -> ApiResult<Option<UserResponse>> {
        Ok(query!(db, User)
            .condition(User::F.id.equals(key.id))
            .optional()
            .await?
            .map(UserResponse::from))
    }

    async fn insert(db: &Database, new: UserInsert) -> ApiResult<UserResponse> {
        let mut tx = db.start_transaction().await?;

        let id = insert!(&mut tx, UserInsert)
            .return_primary_key()
            .single(&new)
            .await?;

        let user = query!(&mut tx, User)
            .condition(User::F.id.equals(id))
            .one()
            .await?;

        tx.commit().await?;

        Ok(user.into())
    }

    async fn update(db: &Database, key: &UserKey, req: UpdateUserRequest) -> ApiResult<u64> {
        Ok(update!(db, User)
            .condition(User::F.id.equals(key.id))
            .begin_dyn_set()
            .set_if(User::F.username, req.username)
            .finish_dyn_set()
            .map_err(|_| Self::empty_update())?
            .exec()
            .await?)
    }

    async fn delete(db: &Database, key: &UserKey) -> ApiResult<u64> {
        Ok(rorm::delete!(db, User)
            .condition(User::F.id.equals(key.id))
            .await?)
    }
}
