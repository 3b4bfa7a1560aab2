use rorm::fields::types::ForeignModel;
use rorm::{Model, Patch};

use crate::models::{Game, User};

/// The m2m relation between users and games
///
/// There is at most one relation per user and game.
#[derive(Model)]
pub struct UserGame {
    /// Primary key of the relation
    #[rorm(id)]
    pub id: i64,

    /// The user
    #[rorm(on_delete = "Cascade", on_update = "Cascade")]
    pub user_id: ForeignModel<User>,

    /// The game
    #[rorm(on_delete = "Cascade", on_update = "Cascade")]
    pub game_id: ForeignModel<Game>,

    /// `<user_id>/<game_id>`, keeps the pair unique in the database
    #[rorm(max_length = 300, unique)]
    pub pair: String,

    /// The user has played the game
    pub user_played: Option<bool>,

    /// The user loves the game
    pub user_loved: Option<bool>,

    /// The user saved the game for later
    pub user_saved: Option<bool>,
}

#[derive(Patch)]
#[rorm(model = "UserGame")]
pub(crate) struct UserGameInsert {
    pub(crate) user_id: ForeignModel<User>,
    pub(crate) game_id: ForeignModel<Game>,
    pub(crate) pair: String,
    pub(crate) user_played: Option<bool>,
    pub(crate) user_loved: Option<bool>,
    pub(crate) user_saved: Option<bool>,
}
