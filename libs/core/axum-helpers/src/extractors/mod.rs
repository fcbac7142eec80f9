//! Custom extractors for Axum handlers.
//!
//! They turn extraction and validation failures into [`crate::AppError`]
//! responses so every 4xx has the same JSON shape.

pub mod uuid_path;
pub mod validated_json;
pub mod validated_query;

pub use uuid_path::UuidPath;
pub use validated_json::ValidatedJson;
pub use validated_query::ValidatedQuery;
