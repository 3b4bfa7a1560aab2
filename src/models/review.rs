use rorm::fields::types::ForeignModel;
use rorm::{Model, Patch};

use crate::models::{Game, User};

/// A review of a game written by a user
///
/// A user can review every game once.
#[derive(Model)]
pub struct Review {
    /// Primary key of the review
    #[rorm(id)]
    pub id: i64,

    /// The author of the review
    #[rorm(on_delete = "Cascade", on_update = "Cascade")]
    pub user_id: ForeignModel<User>,

    /// The reviewed game
    #[rorm(on_delete = "Cascade", on_update = "Cascade")]
    pub game_id: ForeignModel<Game>,

    /// `<user_id>/<game_id>`, keeps the pair unique in the database
    #[rorm(max_length = 300, unique)]
    pub pair: String,

    /// The rating of the game
    pub rating: i16,

    /// The text of the review
    ///
    /// Stored as sent, escaped on the way out.
    #[rorm(max_length = 4096)]
    pub review: String,

    /// The point in time the review was posted
    #[rorm(auto_create_time)]
    pub review_posted: chrono::NaiveDateTime,
}

#[derive(Patch)]
#[rorm(model = "Review")]
pub(crate) struct ReviewInsert {
    pub(crate) user_id: ForeignModel<User>,
    pub(crate) game_id: ForeignModel<Game>,
    pub(crate) pair: String,
    pub(crate) rating: i16,
    pub(crate) review: String,
}
