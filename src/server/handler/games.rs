//! All handlers for the game endpoints live in here

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use rorm::{insert, query, update, Database, FieldAccess, Model};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{user_game_pair, Game, GameInsert, Review, UserGame};
use crate::server::handler::{
    non_empty, present, ApiResult, ItemKey, PartialUpdate, Resource,
};

/// The path of a single game
#[derive(Deserialize)]
pub struct GameKey {
    pub(crate) id: String,
}

impl Display for GameKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl ItemKey for GameKey {
    fn segments(&self) -> Vec<String> {
        vec![self.id.clone()]
    }
}

/// Games can't be filtered, all query parameters are ignored
#[derive(Deserialize)]
pub struct GameFilter {}

/// The request to add a game to the catalog
///
/// `id` and `name` are required, everything else is optional.
#[derive(Deserialize, ToSchema)]
pub struct CreateGameRequest {
    #[schema(example = "AuBvbISHR6")]
    id: Option<String>,
    #[schema(example = "Ticket To Ride")]
    name: Option<String>,
    #[schema(example = 49.99)]
    msrp: Option<f64>,
    #[schema(example = 2)]
    min_players: Option<i16>,
    #[schema(example = 5)]
    max_players: Option<i16>,
    #[schema(example = 45)]
    min_playtime: Option<i16>,
    #[schema(example = 90)]
    max_playtime: Option<i16>,
    #[schema(example = 8)]
    min_age: Option<i16>,
    description: Option<String>,
    rules: Option<String>,
    small_image: Option<String>,
    medium_image: Option<String>,
    large_image: Option<String>,
}

/// The request to change a game
///
/// All parameters are optional, but at least one of them is required.
/// Sending `null` clears an optional field.
#[derive(Deserialize, ToSchema)]
pub struct UpdateGameRequest {
    id: Option<String>,
    #[schema(example = "Ticket To Ride: Europe")]
    name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    msrp: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    min_players: Option<Option<i16>>,
    #[serde(default, deserialize_with = "present")]
    max_players: Option<Option<i16>>,
    #[serde(default, deserialize_with = "present")]
    min_playtime: Option<Option<i16>>,
    #[serde(default, deserialize_with = "present")]
    max_playtime: Option<Option<i16>>,
    #[serde(default, deserialize_with = "present")]
    min_age: Option<Option<i16>>,
    #[serde(default, deserialize_with = "present")]
    description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    rules: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    small_image: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    medium_image: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    large_image: Option<Option<String>>,
}

impl PartialUpdate for UpdateGameRequest {
    fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.name.is_none()
            && self.msrp.is_none()
            && self.min_players.is_none()
            && self.max_players.is_none()
            && self.min_playtime.is_none()
            && self.max_playtime.is_none()
            && self.min_age.is_none()
            && self.description.is_none()
            && self.rules.is_none()
            && self.small_image.is_none()
            && self.medium_image.is_none()
            && self.large_image.is_none()
    }

    fn blank_field(&self) -> Option<&'static str> {
        if self.id.as_deref() == Some("") {
            Some("id")
        } else if self.name.as_deref() == Some("") {
            Some("name")
        } else {
            None
        }
    }
}

/// A game of the catalog
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct GameResponse {
    #[schema(example = "AuBvbISHR6")]
    pub(crate) id: String,
    #[schema(example = "Ticket To Ride")]
    pub(crate) name: String,
    #[schema(example = 49.99)]
    pub(crate) msrp: Option<f64>,
    #[schema(example = 2)]
    pub(crate) min_players: Option<i16>,
    #[schema(example = 5)]
    pub(crate) max_players: Option<i16>,
    #[schema(example = 45)]
    pub(crate) min_playtime: Option<i16>,
    #[schema(example = 90)]
    pub(crate) max_playtime: Option<i16>,
    #[schema(example = 8)]
    pub(crate) min_age: Option<i16>,
    pub(crate) description: Option<String>,
    pub(crate) rules: Option<String>,
    pub(crate) small_image: Option<String>,
    pub(crate) medium_image: Option<String>,
    pub(crate) large_image: Option<String>,
    pub(crate) data_entered: DateTime<Utc>,
}

impl From<Game> for GameResponse {
    fn from(game: Game) -> Self {
        Self {
            id: game.id,
            name: game.name,
            msrp: game.msrp,
            min_players: game.min_players,
            max_players: game.max_players,
            min_playtime: game.min_playtime,
            max_playtime: game.max_playtime,
            min_age: game.min_age,
            description: game.description,
            rules: game.rules,
            small_image: game.small_image,
            medium_image: game.medium_image,
            large_image: game.large_image,
            data_entered: game.data_entered.and_utc(),
        }
    }
}

/// The games of the catalog, exposed at `/api/games`
pub struct Games;

impl Resource for Games {
    const NAME: &'static str = "Game";
    const ITEM_PATH: &'static str = "/{id}";
    const NOT_FOUND: &'static str = "Game not in system";
    const MISSING_FIELDS: &'static str = "An id and name are required";
    const UPDATE_FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "min_players",
        "msrp",
        "max_players",
        "min_playtime",
        "max_playtime",
        "min_age",
        "description",
        "rules",
        "small_image",
        "medium_image",
        "large_image",
    ];

    type Store = Database;
    type Key = GameKey;
    type Filter = GameFilter;
    type Create = CreateGameRequest;
    type New = GameInsert;
    type Update = UpdateGameRequest;
    type Response = GameResponse;

    fn validate(req: CreateGameRequest) -> Option<GameInsert> {
        Some(GameInsert {
            id: non_empty(req.id)?,
            name: non_empty(req.name)?,
            msrp: req.msrp,
            min_players: req.min_players,
            max_players: req.max_players,
            min_playtime: req.min_playtime,
            max_playtime: req.max_playtime,
            min_age: req.min_age,
            description: req.description,
            rules: req.rules,
            small_image: req.small_image,
            medium_image: req.medium_image,
            large_image: req.large_image,
        })
    }

    fn key_of(game: &GameResponse) -> GameKey {
        GameKey {
            id: game.id.clone(),
        }
    }

    async fn list(db: &Database, _filter: GameFilter) -> ApiResult<Vec<GameResponse>> {
        Ok(query!(db, Game)
            .all()
            .await?
            .into_iter()
            .map(GameResponse::from)
            .collect())
    }

    async fn get(db: &Database, key: &GameKey) -> ApiResult<Option<GameResponse>> {
        Ok(query!(db, Game)
            .condition(Game::F.id.equals(key.id.as_str()))
            .optional()
            .await?
            .map(GameResponse::from))
    }

    async fn insert(db: &Database, new: GameInsert) -> ApiResult<GameResponse> {
        let mut tx = db.start_transaction().await?;

        let id = insert!(&mut tx, GameInsert)
            .return_primary_key()
            .single(&new)
            .await?;

        let game = query!(&mut tx, Game)
            .condition(Game::F.id.equals(id.as_str()))
            .one()
            .await?;

        tx.commit().await?;

        Ok(game.into())
    }

    async fn update(db: &Database, key: &GameKey, req: UpdateGameRequest) -> ApiResult<u64> {
        let renamed = req.id.clone().filter(|id| *id != key.id);

        let mut tx = db.start_transaction().await?;

        let changed = update!(&mut tx, Game)
            .condition(Game::F.id.equals(key.id.as_str()))
            .begin_dyn_set()
            .set_if(Game::F.id, req.id)
            .set_if(Game::F.name, req.name)
            .set_if(Game::F.msrp, req.msrp)
            .set_if(Game::F.min_players, req.min_players)
            .set_if(Game::F.max_players, req.max_players)
            .set_if(Game::F.min_playtime, req.min_playtime)
            .set_if(Game::F.max_playtime, req.max_playtime)
            .set_if(Game::F.min_age, req.min_age)
            .set_if(Game::F.description, req.description)
            .set_if(Game::F.rules, req.rules)
            .set_if(Game::F.small_image, req.small_image)
            .set_if(Game::F.medium_image, req.medium_image)
            .set_if(Game::F.large_image, req.large_image)
            .finish_dyn_set()
            .map_err(|_| Self::empty_update())?
            .exec()
            .await?;

        // The foreign keys follow the new id, the unique pairs have to be rebuilt
        if let Some(id) = renamed {
            let relations = query!(&mut tx, (UserGame::F.id, UserGame::F.user_id))
                .condition(UserGame::F.game_id.equals(id.clone()))
                .all()
                .await?;
            for (relation, user_id) in relations {
                let pair = user_game_pair(*user_id.key(), &id);
                update!(&mut tx, UserGame)
                    .condition(UserGame::F.id.equals(relation))
                    .set(UserGame::F.pair, pair)
                    .exec()
                    .await?;
            }

            let reviews = query!(&mut tx, (Review::F.id, Review::F.user_id))
                .condition(Review::F.game_id.equals(id.clone()))
                .all()
                .await?;
            for (review, user_id) in reviews {
                let pair = user_game_pair(*user_id.key(), &id);
                update!(&mut tx, Review)
                    .condition(Review::F.id.equals(review))
                    .set(Review::F.pair, pair)
                    .exec()
                    .await?;
            }
        }

        tx.commit().await?;

        Ok(changed)
    }

    async fn delete(db: &Database, key: &GameKey) -> ApiResult<u64> {
        Ok(rorm::delete!(db, Game)
            .condition(Game::F.id.equals(key.id.as_str()))
            .await?)
    }
}
