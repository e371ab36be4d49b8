//! Query translation: grid query descriptions in, Elasticsearch Query DSL out

pub mod dsl;
pub mod translator;
pub mod types;

pub use dsl::{DslFilter, DslQuery};
pub use translator::QueryTranslator;
pub use types::{Filter, FilterKind, QueryDescription, SortSpec};
