pub mod anime;
pub mod catalog;
pub mod episode;
pub mod user;
