pub mod prelude;

pub mod anime;
pub mod episodes;
pub mod favorites;
pub mod users;
pub mod watch_history;
pub mod watchlist;
