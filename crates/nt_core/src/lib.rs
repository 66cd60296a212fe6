pub mod domain;
pub mod error;
pub mod models;
pub mod search;
pub mod types;

pub use error::{Error, Result};
pub use models::InferenceModel;
pub use search::WebSearch;
pub use types::{
    Article, Extraction, NewsSource, NewsSourceList, NoArticlesFound, SearchContext, SearchHit,
    SearchMethod, SearchQuery,
};
