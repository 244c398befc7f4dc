pub mod defs;
pub mod state;

pub use defs::{
    Article, ArticleFilter, ArticleStore, Category, InsertOutcome, NewArticle, Source, StoreStats,
    UnknownVariant,
};
pub use state::{SqliteArticleStore, StoreError};
