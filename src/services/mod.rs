pub mod catalog;
pub mod genres;
pub mod metadata;
pub mod model;
pub mod player;
pub mod recommendations;

pub use catalog::{AnimeCategory, BrowseCategory, Catalog, HomeFeed, Section};
pub use genres::GenreResolver;
pub use metadata::{MetadataProvider, TmdbClient};
pub use model::{OllamaModel, RecommendationModel};
pub use player::{PlayerUrls, PlayerView};
pub use recommendations::RecommendationService;
