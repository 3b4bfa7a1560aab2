use rorm::{Model, Patch};

/// A user of the catalog
#[derive(Model)]
pub struct User {
    /// The primary key of a user
    #[rorm(id)]
    pub id: i64,

    /// The name that is displayed for this user
    ///
    /// Stored as sent, escaped on the way out.
    #[rorm(max_length = 255)]
    pub username: String,

    /// The point in time the account was created
    #[rorm(auto_create_time)]
    pub acct_created: chrono::NaiveDateTime,
}

#[derive(Patch)]
#[rorm(model = "User")]
pub(crate) struct UserInsert {
    pub(crate) username: String,
}
