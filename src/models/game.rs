use rorm::{Model, Patch};

/// A board game of the catalog
///
/// Games are identified by a short string id chosen by the client.
#[derive(Model)]
pub struct Game {
    /// Primary key of the game
    #[rorm(primary_key, max_length = 255)]
    pub id: String,

    /// Name of the game
    #[rorm(max_length = 255)]
    pub name: String,

    /// The suggested retail price
    pub msrp: Option<f64>,

    /// The minimum count of players
    pub min_players: Option<i16>,

    /// The maximum count of players
    pub max_players: Option<i16>,

    /// The minimum playtime in minutes
    pub min_playtime: Option<i16>,

    /// The maximum playtime in minutes
    pub max_playtime: Option<i16>,

    /// The minimum age of the players
    pub min_age: Option<i16>,

    /// Free text description of the game
    #[rorm(max_length = 8192)]
    pub description: Option<String>,

    /// Link to the rules of the game
    #[rorm(max_length = 2048)]
    pub rules: Option<String>,

    /// Link to a small image of the game
    #[rorm(max_length = 2048)]
    pub small_image: Option<String>,

    /// Link to a medium sized image of the game
    #[rorm(max_length = 2048)]
    pub medium_image: Option<String>,

    /// Link to the full sized image of the game
    #[rorm(max_length = 2048)]
    pub large_image: Option<String>,

    /// The point in time the game was entered into the catalog
    #[rorm(auto_create_time)]
    pub data_entered: chrono::NaiveDateTime,
}

#[derive(Patch)]
#[rorm(model = "Game")]
pub(crate) struct GameInsert {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) msrp: Option<f64>,
    pub(crate) min_players: Option<i16>,
    pub(crate) max_players: Option<i16>,
    pub(crate) min_playtime: Option<i16>,
    pub(crate) max_playtime: Option<i16>,
    pub(crate) min_age: Option<i16>,
    pub(crate) description: Option<String>,
    pub(crate) rules: Option<String>,
    pub(crate) small_image: Option<String>,
    pub(crate) medium_image: Option<String>,
    pub(crate) large_image: Option<String>,
}
