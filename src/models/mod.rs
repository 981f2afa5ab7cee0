//! Data models for the namespace-over-object-store service.
//!
//! `Bucket` and `ObjectRecord` map to SQLite rows via `sqlx::FromRow`;
//! the node types are ephemeral projections of one listing page and
//! serialize as JSON via `serde`.

pub mod bucket;
pub mod node;
pub mod object;
