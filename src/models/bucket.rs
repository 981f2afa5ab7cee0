//! Represents a logical bucket — a top-level, independent namespace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A bucket row. Buckets do not share keys with one another.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Bucket {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    /// Unique bucket name.
    pub name: String,

    /// When this bucket was created.
    pub created_at: DateTime<Utc>,
}
