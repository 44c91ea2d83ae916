pub mod catalog;
pub mod images;
pub mod range_parser;
pub mod recommender;
pub mod sessions;

pub use catalog::{Catalog, CatalogError, LoadReport};
pub use images::{ImageError, ImageStore};
pub use range_parser::parse_temp_range;
pub use recommender::{Query, RandomSource, Recommendation, Recommender, SeededRandom, ThreadRandom};
pub use sessions::SessionStore;
