//! All the database models live here.

pub use game::*;
pub use review::*;
pub use user::*;
pub use user_game::*;

mod game;
mod review;
mod user;
mod user_game;

/// The value of the unique `pair` column of [UserGame] and [Review]
pub(crate) fn user_game_pair(user_id: i64, game_id: &str) -> String {
    format!("{user_id}/{game_id}")
}
