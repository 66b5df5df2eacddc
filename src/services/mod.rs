pub mod catalog;
pub use catalog::{CatalogError, CatalogRequest, CatalogService};

pub mod episode_service;
pub mod episode_service_impl;
pub use episode_service::{EpisodeError, EpisodeService};
pub use episode_service_impl::SeaOrmEpisodeService;

pub mod library_service;
pub mod library_service_impl;
pub use library_service::{LibraryError, LibraryService};
pub use library_service_impl::SeaOrmLibraryService;
