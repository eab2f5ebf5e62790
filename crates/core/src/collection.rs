//! Collections group feeds per user and carry the ownership boundary the
//! rule engine relies on: articles reach a user only through
//! collection → feed containment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-defined collection of feeds.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Collection {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Many-to-many link between collections and feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct CollectionFeed {
    pub collection_id: i64,
    pub feed_id: i64,
}
