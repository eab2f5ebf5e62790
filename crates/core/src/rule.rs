//! Rule and match records for keyword-based article tagging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-defined keyword filter with a schedule.
///
/// Keywords are stored as single comma-delimited strings and parsed at
/// evaluation time; this keeps the persisted shape portable across
/// database backends. `collection_id = None` scopes the rule to all of
/// the owning user's collections.
///
/// The engine only ever reads rules and writes `last_run_at`; creation,
/// update, and deletion belong to the web layer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rule {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    /// Comma-delimited include keywords; `None` or empty matches everything
    /// not excluded.
    pub include_keywords: Option<String>,
    /// Comma-delimited exclude keywords; any hit vetoes a match.
    pub exclude_keywords: Option<String>,
    /// Explicit collection scope, or `None` for all of the user's collections.
    pub collection_id: Option<i64>,
    /// Execution interval in minutes. Zero permanently disables scheduling.
    pub frequency_minutes: i32,
    pub last_run_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A recorded fact that a rule matched an article.
///
/// Unique on `(rule_id, article_id)`: one rule matches one article at most
/// once across any number of executions. Created exclusively by the rule
/// runner and never updated.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RuleMatch {
    pub id: i64,
    pub rule_id: i64,
    pub article_id: i64,
    pub matched_at: DateTime<Utc>,
}
