pub use super::anime::Entity as Anime;
pub use super::episodes::Entity as Episodes;
pub use super::favorites::Entity as Favorites;
pub use super::users::Entity as Users;
pub use super::watch_history::Entity as WatchHistory;
pub use super::watchlist::Entity as Watchlist;
