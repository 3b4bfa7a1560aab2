//! All handlers for the relations between users and games live in here

use std::fmt::{Display, Formatter};

use rorm::fields::types::ForeignModelByField;
use rorm::{and, insert, query, update, Database, FieldAccess, Model};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{user_game_pair, UserGame, UserGameInsert};
use crate::server::handler::{non_empty, present, ApiResult, ItemKey, PartialUpdate, Resource};

/// The path of an item that is identified by a user and a game
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct UserGameKey {
    pub(crate) user_id: i64,
    pub(crate) game_id: String,
}

impl Display for UserGameKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user_id, self.game_id)
    }
}

impl ItemKey for UserGameKey {
    fn segments(&self) -> Vec<String> {
        vec![self.user_id.to_string(), self.game_id.clone()]
    }
}

/// The query to narrow the listed relations
#[derive(Deserialize)]
pub struct UserGameFilter {
    /// Only list the relations of this user
    user_id: Option<i64>,
}

/// The request to relate a user to a game
///
/// `user_id` and `game_id` are required, the flags are optional.
#[derive(Deserialize, ToSchema)]
pub struct CreateUserGameRequest {
    #[schema(example = 1)]
    user_id: Option<i64>,
    #[schema(example = "AuBvbISHR6")]
    game_id: Option<String>,
    #[schema(example = true)]
    user_played: Option<bool>,
    #[schema(example = false)]
    user_loved: Option<bool>,
    user_saved: Option<bool>,
}

/// The request to change the flags of a relation
///
/// All parameters are optional, but at least one of them is required.
/// `false` is a valid value, `null` unsets a flag.
#[derive(Deserialize, ToSchema)]
pub struct UpdateUserGameRequest {
    #[serde(default, deserialize_with = "present")]
    user_played: Option<Option<bool>>,
    #[serde(default, deserialize_with = "present")]
    user_loved: Option<Option<bool>>,
    #[serde(default, deserialize_with = "present")]
    user_saved: Option<Option<bool>>,
}

impl PartialUpdate for UpdateUserGameRequest {
    fn is_empty(&self) -> bool {
        self.user_played.is_none() && self.user_loved.is_none() && self.user_saved.is_none()
    }
}

/// The relation of a user to a game
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct UserGameResponse {
    #[schema(example = 1)]
    pub(crate) user_id: i64,
    #[schema(example = "AuBvbISHR6")]
    pub(crate) game_id: String,
    #[schema(example = true)]
    pub(crate) user_played: Option<bool>,
    #[schema(example = false)]
    pub(crate) user_loved: Option<bool>,
    pub(crate) user_saved: Option<bool>,
}

impl From<UserGame> for UserGameResponse {
    fn from(user_game: UserGame) -> Self {
        Self {
            user_id: *user_game.user_id.key(),
            game_id: user_game.game_id.key().clone(),
            user_played: user_game.user_played,
            user_loved: user_game.user_loved,
            user_saved: user_game.user_saved,
        }
    }
}

/// The relations of users to games, exposed at `/api/users-games`
pub struct UsersGames;

impl Resource for UsersGames {
    const NAME: &'static str = "Users-game item";
    const ITEM_PATH: &'static str = "/{user_id}/{game_id}";
    const NOT_FOUND: &'static str = "Users-game item not in system";
    const MISSING_FIELDS: &'static str = "User_id and game_id are required";
    const UPDATE_FIELDS: &'static [&'static str] = &["user_played", "user_loved", "user_saved"];

    type Store = Database;
    type Key = UserGameKey;
    type Filter = UserGameFilter;
    type Create = CreateUserGameRequest;
    type New = UserGameInsert;
    type Update = UpdateUserGameRequest;
    type Response = UserGameResponse;

    fn validate(req: CreateUserGameRequest) -> Option<UserGameInsert> {
        let user_id = req.user_id?;
        let game_id = non_empty(req.game_id)?;
        Some(UserGameInsert {
            pair: user_game_pair(user_id, &game_id),
            user_id: ForeignModelByField::Key(user_id),
            game_id: ForeignModelByField::Key(game_id),
            user_played: req.user_played,
            user_loved: req.user_loved,
            user_saved: req.user_saved,
        })
    }

    fn key_of(user_game: &UserGameResponse) -> UserGameKey {
        UserGameKey {
            user_id: user_game.user_id,
            game_id: user_game.game_id.clone(),
        }
    }

    async fn list(db: &Database, filter: UserGameFilter) -> ApiResult<Vec<UserGameResponse>> {
        let users_games = match filter.user_id {
            Some(user_id) => {
                query!(db, UserGame)
                    .condition(UserGame::F.user_id.equals(user_id))
                    .all()
                    .await?
            }
            None => query!(db, UserGame).all().await?,
        };

        Ok(users_games
            .into_iter()
            .map(UserGameResponse::from)
            .collect())
    }

    async fn get(db: &Database, key: &UserGameKey) -> ApiResult<Option<UserGameResponse>> {
        Ok(query!(db, UserGame)
            .condition(and!(
                UserGame::F.user_id.equals(key.user_id),
                UserGame::F.game_id.equals(key.game_id.clone())
            ))
            .optional()
            .await?
            .map(UserGameResponse::from))
    }

    async fn insert(db: &Database, new: UserGameInsert) -> ApiResult<UserGameResponse> {
        let mut tx = db.start_transaction().await?;

        // A second relation of the same pair violates the unique `pair`
        let id = insert!(&mut tx, UserGameInsert)
            .return_primary_key()
            .single(&new)
            .await?;

        let user_game = query!(&mut tx, UserGame)
            .condition(UserGame::F.id.equals(id))
            .one()
            .await?;

        tx.commit().await?;

        Ok(user_game.into())
    }

    async fn update(
        db: &Database,
        key: &UserGameKey,
        req: UpdateUserGameRequest,
    ) -> ApiResult<u64> {
        Ok(update!(db, UserGame)
            .condition(and!(
                UserGame::F.user_id.equals(key.user_id),
                UserGame::F.game_id.equals(key.game_id.clone())
            ))
            .begin_dyn_set()
            .set_if(UserGame::F.user_played, req.user_played)
            .set_if(UserGame::F.user_loved, req.user_loved)
            .set_if(UserGame::F.user_saved, req.user_saved)
            .finish_dyn_set()
            .map_err(|_| Self::empty_update())?
            .exec()
            .await?)
    }

    async fn delete(db: &Database, key: &UserGameKey) -> ApiResult<u64> {
        Ok(rorm::delete!(db, UserGame)
            .condition(and!(
                UserGame::F.user_id.equals(key.user_id),
                UserGame::F.game_id.equals(key.game_id.clone())
            ))
            .await?)
    }
}
