//! All handlers for the review endpoints live in here

use chrono::{DateTime, Utc};
use rorm::fields::types::ForeignModelByField;
use rorm::{and, insert, query, update, Database, FieldAccess, Model};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{user_game_pair, Review, ReviewInsert};
use crate::server::handler::{
    escape_html, non_empty, ApiResult, PartialUpdate, Resource, UserGameKey,
};

/// The query to narrow the listed reviews
///
/// If both are given, `user_id` wins.
#[derive(Deserialize)]
pub struct ReviewFilter {
    /// Only list the reviews written by this user
    user_id: Option<i64>,
    /// Only list the reviews of this game
    game_id: Option<String>,
}

/// The request to review a game
///
/// All parameters are required.
#[derive(Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    #[schema(example = 1)]
    user_id: Option<i64>,
    #[schema(example = "uOhZRZa3xN")]
    game_id: Option<String>,
    #[schema(example = "If you rock at 3-letter words like me, this game will be your jam.")]
    review: Option<String>,
    #[schema(example = 5)]
    rating: Option<i16>,
}

/// The request to change a review
///
/// All parameters are optional, but at least one of them is required.
#[derive(Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    #[schema(example = "Still fun after the tenth round.")]
    review: Option<String>,
    #[schema(example = 4)]
    rating: Option<i16>,
}

impl PartialUpdate for UpdateReviewRequest {
    fn is_empty(&self) -> bool {
        self.review.is_none() && self.rating.is_none()
    }

    fn blank_field(&self) -> Option<&'static str> {
        (self.review.as_deref() == Some("")).then_some("review")
    }
}

/// A review of a game
///
/// The `review` is html escaped.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ReviewResponse {
    #[schema(example = 1)]
    pub(crate) user_id: i64,
    #[schema(example = "uOhZRZa3xN")]
    pub(crate) game_id: String,
    #[schema(example = 5)]
    pub(crate) rating: i16,
    #[schema(example = "If you rock at 3-letter words like me, this game will be your jam.")]
    pub(crate) review: String,
    pub(crate) review_posted: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            user_id: *review.user_id.key(),
            game_id: review.game_id.key().clone(),
            rating: review.rating,
            review: escape_html(&review.review),
            review_posted: review.review_posted.and_utc(),
        }
    }
}

/// The reviews of the catalog, exposed at `/api/reviews`
pub struct Reviews;

impl Resource for Reviews {
    const NAME: &'static str = "Review";
    const ITEM_PATH: &'static str = "/{user_id}/{game_id}";
    const NOT_FOUND: &'static str = "This review does not exist.";
    const MISSING_FIELDS: &'static str = "User_id, game_id, review, and rating are required";
    const UPDATE_FIELDS: &'static [&'static str] = &["review", "rating"];

    type Store = Database;
    type Key = UserGameKey;
    type Filter = ReviewFilter;
    type Create = CreateReviewRequest;
    type New = ReviewInsert;
    type Update = UpdateReviewRequest;
    type Response = ReviewResponse;

    fn validate(req: CreateReviewRequest) -> Option<ReviewInsert> {
        let user_id = req.user_id?;
        let game_id = non_empty(req.game_id)?;
        Some(ReviewInsert {
            pair: user_game_pair(user_id, &game_id),
            user_id: ForeignModelByField::Key(user_id),
            game_id: ForeignModelByField::Key(game_id),
            rating: req.rating?,
            review: non_empty(req.review)?,
        })
    }

    fn key_of(review: &ReviewResponse) -> UserGameKey {
        UserGameKey {
            user_id: review.user_id,
            game_id: review.game_id.clone(),
        }
    }

    async fn list(db: &Database, filter: ReviewFilter) -> ApiResult<Vec<ReviewResponse>> {
        let reviews = match (filter.user_id, filter.game_id) {
            (Some(user_id), _) => {
                query!(db, Review)
                    .condition(Review::F.user_id.equals(user_id))
                    .all()
                    .await?
            }
            (None, Some(game_id)) => {
                query!(db, Review)
                    .condition(Review::F.game_id.equals(game_id))
                    .all()
                    .await?
            }
            (None, None) => query!(db, Review).all().await?,
        };

        Ok(reviews.into_iter().map(ReviewResponse::from).collect())
    }

    async fn get(db: &Database, key: &UserGameKey) -> ApiResult<Option<ReviewResponse>> {
        Ok(query!(db, Review)
            .condition(and!(
                Review::F.user_id.equals(key.user_id),
                Review::F.game_id.equals(key.game_id.clone())
            ))
            .optional()
            .await?
            .map(ReviewResponse::from))
    }

    async fn insert(db: &Database, new: ReviewInsert) -> ApiResult<ReviewResponse> {
        let mut tx = db.start_transaction().await?;

        // A second review of the same pair violates the unique `pair`
        let id = insert!(&mut tx, ReviewInsert)
            .return_primary_key()
            .single(&new)
            .await?;

        let review = query!(&mut tx, Review)
            .condition(Review::F.id.equals(id))
            .one()
            .await?;

        tx.commit().await?;

        Ok(review.into())
    }

    async fn update(db: &Database, key: &UserGameKey, req: UpdateReviewRequest) -> ApiResult<u64> {
        Ok(update!(db, Review)
            .condition(and!(
                Review::F.user_id.equals(key.user_id),
                Review::F.game_id.equals(key.game_id.clone())
            ))
            .begin_dyn_set()
            .set_if(Review::F.review, req.review)
            .set_if(Review::F.rating, req.rating)
            .finish_dyn_set()
            .map_err(|_| Self::empty_update())?
            .exec()
            .await?)
    }

    async fn delete(db: &Database, key: &UserGameKey) -> ApiResult<u64> {
        Ok(rorm::delete!(db, Review)
            .condition(and!(
                Review::F.user_id.equals(key.user_id),
                Review::F.game_id.equals(key.game_id.clone())
            ))
            .await?)
    }
}
